//! Quadrature-point kernels for finite element weak forms.
//!
//! The crate is organized bottom-up:
//!
//! - [`tensor`]: small tensors with shapes fixed at compile time, and the [`Zero`](tensor::Zero)
//!   tensor.
//! - [`dual`]: forward-mode automatic differentiation with dual numbers whose derivatives are
//!   themselves tensors.
//! - [`space`] and [`geometry`]: reference-element shape functions and the per-point geometric
//!   data of a mesh.
//! - [`integral`]: domain and boundary integrals of user-provided q-functions, their
//!   derivatives as matrix-free operators and as dense element matrices.

pub mod dual;
pub mod field;
pub mod geometry;
pub mod integral;
pub mod scalar;
pub mod space;
pub mod tensor;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;
