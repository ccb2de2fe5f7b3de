//! Traits for the entries of tensors: plain values, dual numbers and derivatives.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Plain data that may be stored in tensors and shared between threads.
pub trait Leaf: Copy + Default + Debug + Send + Sync + 'static {}

impl<T> Leaf for T where T: Copy + Default + Debug + Send + Sync + 'static {}

/// A real number type that q-functions can be evaluated with.
///
/// Implemented by `f64` and by [`Dual`](crate::dual::Dual) numbers, so that the same generic
/// code computes values and derivatives.
pub trait Scalar:
    Leaf
    + From<f64>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + Add<f64, Output = Self>
    + Sub<f64, Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
    + MulAssign<f64>
{
    /// The primal value.
    fn value(&self) -> f64;

    fn sqrt(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn powi(self, n: i32) -> Self;
    fn powf(self, p: f64) -> Self;
    fn abs(self) -> Self;
}

impl Scalar for f64 {
    fn value(&self) -> f64 {
        *self
    }

    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    fn exp(self) -> Self {
        f64::exp(self)
    }

    fn ln(self) -> Self {
        f64::ln(self)
    }

    fn sin(self) -> Self {
        f64::sin(self)
    }

    fn cos(self) -> Self {
        f64::cos(self)
    }

    fn powi(self, n: i32) -> Self {
        f64::powi(self, n)
    }

    fn powf(self, p: f64) -> Self {
        f64::powf(self, p)
    }

    fn abs(self) -> Self {
        f64::abs(self)
    }
}

/// The derivative part of a dual number.
///
/// Derivatives form a vector space over `f64`: they can be added, negated and scaled.
pub trait Tangent:
    Leaf
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + AddAssign
    + SubAssign
{
}

impl<G> Tangent for G where
    G: Leaf + Add<Output = G> + Sub<Output = G> + Neg<Output = G> + Mul<f64, Output = G> + AddAssign + SubAssign
{
}
