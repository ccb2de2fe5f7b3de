//! Domain and boundary integrals of weak forms and their derivatives.
//!
//! An integral is set up once from geometric factors, a test space, a tuple of trial spaces and
//! a q-function. It can then repeatedly
//!
//! - evaluate the integral ([`DomainIntegral::mult`]),
//! - evaluate the integral together with its derivative with respect to one of the trial fields,
//!   which is stored at every quadrature point,
//! - apply the stored derivative to a direction without forming a matrix
//!   ([`DomainIntegral::gradient_mult`]),
//! - assemble the stored derivative into dense element matrices
//!   ([`DomainIntegral::compute_element_gradients`]).
//!
//! Derivatives are computed by evaluating the q-function with dual numbers.

mod boundary;
mod cache;
mod domain;
mod element_gradients;
mod kernels;
mod options;
mod qfunction;
mod trial;

pub use boundary::*;
pub use cache::*;
pub use domain::*;
pub use element_gradients::*;
pub use options::*;
pub use qfunction::*;
pub use trial::*;
