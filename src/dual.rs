//! Forward-mode automatic differentiation with dual numbers.
//!
//! A [`Dual`] carries a value together with its derivative with respect to some input. The
//! derivative may have any [`Tangent`] type: `f64` for a scalar input, a [`Tensor`] for a
//! tensor-valued input, or [`Zero`] for quantities that do not depend on the input at all.
//!
//! [`make_dual`] seeds the derivative of an input with respect to itself. Evaluating any
//! expression built from [`Scalar`] operations on the seeded input then yields the value of the
//! expression together with its full Jacobian, which [`get_value`] and [`get_gradient`]
//! extract. [`chain_rule`] applies such a Jacobian to a perturbation of the input.

use crate::scalar::{Leaf, Scalar, Tangent};
use crate::tensor::{Lift, Lifted, Shape, Tensor};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

mod chain_rule;
mod differentiable;

pub use chain_rule::*;
pub use differentiable::*;

/// A value paired with its derivative.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Dual<G> {
    pub value: f64,
    pub gradient: G,
}

impl<G> Dual<G> {
    pub fn new(value: f64, gradient: G) -> Self {
        Self { value, gradient }
    }
}

impl<G: Default> Dual<G> {
    /// A dual number with vanishing derivative.
    pub fn constant(value: f64) -> Self {
        Self::new(value, G::default())
    }
}

impl<G: Default> From<f64> for Dual<G> {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl<G: Tangent> Add for Dual<G> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.value + rhs.value, self.gradient + rhs.gradient)
    }
}

impl<G: Tangent> Sub for Dual<G> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.value - rhs.value, self.gradient - rhs.gradient)
    }
}

impl<G: Tangent> Mul for Dual<G> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.value * rhs.value,
            self.gradient * rhs.value + rhs.gradient * self.value,
        )
    }
}

impl<G: Tangent> Div for Dual<G> {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let inv = 1.0 / rhs.value;
        Self::new(
            self.value * inv,
            self.gradient * inv - rhs.gradient * (self.value * inv * inv),
        )
    }
}

impl<G: Tangent> Neg for Dual<G> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.value, -self.gradient)
    }
}

impl<G: Tangent> Add<f64> for Dual<G> {
    type Output = Self;

    fn add(self, rhs: f64) -> Self {
        Self::new(self.value + rhs, self.gradient)
    }
}

impl<G: Tangent> Sub<f64> for Dual<G> {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self {
        Self::new(self.value - rhs, self.gradient)
    }
}

impl<G: Tangent> Mul<f64> for Dual<G> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.value * rhs, self.gradient * rhs)
    }
}

impl<G: Tangent> Div<f64> for Dual<G> {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self * (1.0 / rhs)
    }
}

impl<G: Tangent> Add<Dual<G>> for f64 {
    type Output = Dual<G>;

    fn add(self, rhs: Dual<G>) -> Dual<G> {
        rhs + self
    }
}

impl<G: Tangent> Sub<Dual<G>> for f64 {
    type Output = Dual<G>;

    fn sub(self, rhs: Dual<G>) -> Dual<G> {
        -rhs + self
    }
}

impl<G: Tangent> Mul<Dual<G>> for f64 {
    type Output = Dual<G>;

    fn mul(self, rhs: Dual<G>) -> Dual<G> {
        rhs * self
    }
}

impl<G: Tangent> Div<Dual<G>> for f64 {
    type Output = Dual<G>;

    fn div(self, rhs: Dual<G>) -> Dual<G> {
        let inv = 1.0 / rhs.value;
        Dual::new(self * inv, rhs.gradient * (-self * inv * inv))
    }
}

impl<G: Tangent, T, const N: usize> Mul<Tensor<T, N>> for Dual<G>
where
    T: Copy + Mul<Dual<G>>,
{
    type Output = Tensor<T::Output, N>;

    fn mul(self, rhs: Tensor<T, N>) -> Self::Output {
        rhs * self
    }
}

impl<G: Tangent> AddAssign for Dual<G> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<G: Tangent> SubAssign for Dual<G> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<G: Tangent> MulAssign for Dual<G> {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<G: Tangent> MulAssign<f64> for Dual<G> {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

impl<G: Tangent> Scalar for Dual<G> {
    fn value(&self) -> f64 {
        self.value
    }

    fn sqrt(self) -> Self {
        let value = self.value.sqrt();
        Self::new(value, self.gradient * (0.5 / value))
    }

    fn exp(self) -> Self {
        let value = self.value.exp();
        Self::new(value, self.gradient * value)
    }

    fn ln(self) -> Self {
        Self::new(self.value.ln(), self.gradient * (1.0 / self.value))
    }

    fn sin(self) -> Self {
        Self::new(self.value.sin(), self.gradient * self.value.cos())
    }

    fn cos(self) -> Self {
        Self::new(self.value.cos(), self.gradient * -self.value.sin())
    }

    fn powi(self, n: i32) -> Self {
        let derivative = match n {
            0 => 0.0,
            _ => n as f64 * self.value.powi(n - 1),
        };
        Self::new(self.value.powi(n), self.gradient * derivative)
    }

    fn powf(self, p: f64) -> Self {
        Self::new(self.value.powf(p), self.gradient * (p * self.value.powf(p - 1.0)))
    }

    fn abs(self) -> Self {
        if self.value < 0.0 {
            -self
        } else {
            self
        }
    }
}

/// Seeds the derivative of `x` with respect to itself.
///
/// Entry `i` (in flat order) of the result is a dual number whose gradient is the unit tensor
/// of the shape of `x` with a one at position `i`.
pub fn make_dual<X>(x: &X) -> Lifted<X, Dual<X>>
where
    X: Lift + Tangent,
{
    x.lift_with(0, &|i, value| Dual::new(value, X::unit(i)))
}

/// Lifts `x` to dual numbers with vanishing derivative of type `G`.
pub fn make_constant<X, G>(x: &X) -> Lifted<X, Dual<G>>
where
    X: Lift,
    G: Leaf,
{
    x.lift_with(0, &|_, value| Dual::constant(value))
}

/// Extracts the values of a structure of dual numbers.
pub fn collapse_value<X: Lift, G: Leaf>(lifted: &Lifted<X, Dual<G>>) -> X {
    X::collapse(lifted, &|dual: &Dual<G>| dual.value)
}

/// Extracts the derivatives of a structure of dual numbers, keeping its layout.
pub fn collapse_gradient<X: Lift, G: Leaf>(lifted: &Lifted<X, Dual<G>>) -> Lifted<X, G> {
    X::map_leaves(lifted, &|dual: &Dual<G>| dual.gradient)
}

/// Applies a derivative of layout `X` with leaves `Dx` to the perturbation `dx`.
pub fn apply_gradient<X, Dx>(gradient: &Lifted<X, Dx>, dx: &Dx) -> X
where
    X: Lift,
    Dx: Leaf + ChainRule<Dx, Output = f64>,
{
    X::collapse(gradient, &|g: &Dx| (*g).chain_rule(*dx))
}
