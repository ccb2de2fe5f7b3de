//! Quadrature-point arguments and results of q-functions.

use crate::scalar::Leaf;
use crate::tensor::{Lift, Shape};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// The value of a field and its spatial gradient at a quadrature point.
///
/// In flat layout, the entries of `value` come first, followed by those of `gradient`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValue<V, W> {
    pub value: V,
    pub gradient: W,
}

/// The integrand of a weak form at a quadrature point.
///
/// The `source` is tested against the values of the test functions, the `flux` against their
/// gradients, so that the contribution to test function `phi` is `source · phi + flux : ∇phi`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Integrand<S, F> {
    pub source: S,
    pub flux: F,
}

macro_rules! impl_pair {
    ($name:ident, $first:ident, $second:ident) => {
        impl<A: Add<Output = A>, B: Add<Output = B>> Add for $name<A, B> {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self {
                    $first: self.$first + rhs.$first,
                    $second: self.$second + rhs.$second,
                }
            }
        }

        impl<A: Sub<Output = A>, B: Sub<Output = B>> Sub for $name<A, B> {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self {
                    $first: self.$first - rhs.$first,
                    $second: self.$second - rhs.$second,
                }
            }
        }

        impl<A: Neg<Output = A>, B: Neg<Output = B>> Neg for $name<A, B> {
            type Output = Self;

            fn neg(self) -> Self {
                Self {
                    $first: -self.$first,
                    $second: -self.$second,
                }
            }
        }

        impl<A: Mul<f64, Output = A>, B: Mul<f64, Output = B>> Mul<f64> for $name<A, B> {
            type Output = Self;

            fn mul(self, rhs: f64) -> Self {
                Self {
                    $first: self.$first * rhs,
                    $second: self.$second * rhs,
                }
            }
        }

        impl<A: AddAssign, B: AddAssign> AddAssign for $name<A, B> {
            fn add_assign(&mut self, rhs: Self) {
                self.$first += rhs.$first;
                self.$second += rhs.$second;
            }
        }

        impl<A: SubAssign, B: SubAssign> SubAssign for $name<A, B> {
            fn sub_assign(&mut self, rhs: Self) {
                self.$first -= rhs.$first;
                self.$second -= rhs.$second;
            }
        }

        impl<A: Shape, B: Shape> Shape for $name<A, B> {
            const SIZE: usize = A::SIZE + B::SIZE;

            fn flat(&self, index: usize) -> f64 {
                if index < A::SIZE {
                    self.$first.flat(index)
                } else {
                    self.$second.flat(index - A::SIZE)
                }
            }

            fn flat_mut(&mut self, index: usize) -> &mut f64 {
                if index < A::SIZE {
                    self.$first.flat_mut(index)
                } else {
                    self.$second.flat_mut(index - A::SIZE)
                }
            }
        }

        impl<A: Lift, B: Lift> Lift for $name<A, B> {
            type Output<S: Leaf> = $name<A::Output<S>, B::Output<S>>;

            fn lift_with<S: Leaf, F: Fn(usize, f64) -> S>(&self, offset: usize, f: &F) -> Self::Output<S> {
                $name {
                    $first: self.$first.lift_with(offset, f),
                    $second: self.$second.lift_with(offset + A::SIZE, f),
                }
            }

            fn map_leaves<S: Leaf, R: Leaf, F: Fn(&S) -> R>(lifted: &Self::Output<S>, f: &F) -> Self::Output<R> {
                $name {
                    $first: A::map_leaves(&lifted.$first, f),
                    $second: B::map_leaves(&lifted.$second, f),
                }
            }

            fn collapse<S: Leaf, F: Fn(&S) -> f64>(lifted: &Self::Output<S>, f: &F) -> Self {
                $name {
                    $first: A::collapse(&lifted.$first, f),
                    $second: B::collapse(&lifted.$second, f),
                }
            }
        }
    };
}

impl_pair!(FieldValue, value, gradient);
impl_pair!(Integrand, source, flux);
