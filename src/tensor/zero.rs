use crate::dual::Dual;
use crate::scalar::Tangent;
use crate::tensor::Tensor;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Div, Index, Mul, Neg, Sub, SubAssign};

/// A tensor of any shape that is known to vanish.
///
/// `Zero` is the additive identity and absorbs every product, so derivatives with respect to
/// quantities that an expression does not depend on are pruned by the type system instead of
/// being computed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Zero;

impl Display for Zero {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "zero")
    }
}

impl<X> Add<X> for Zero {
    type Output = X;

    fn add(self, rhs: X) -> X {
        rhs
    }
}

impl<X: Neg> Sub<X> for Zero {
    type Output = X::Output;

    fn sub(self, rhs: X) -> Self::Output {
        -rhs
    }
}

impl<X> Mul<X> for Zero {
    type Output = Zero;

    fn mul(self, _: X) -> Zero {
        Zero
    }
}

impl<X> Div<X> for Zero {
    type Output = Zero;

    fn div(self, _: X) -> Zero {
        Zero
    }
}

impl Neg for Zero {
    type Output = Zero;

    fn neg(self) -> Zero {
        Zero
    }
}

impl AddAssign for Zero {
    fn add_assign(&mut self, _: Zero) {}
}

impl SubAssign for Zero {
    fn sub_assign(&mut self, _: Zero) {}
}

impl Index<usize> for Zero {
    type Output = Zero;

    fn index(&self, _: usize) -> &Zero {
        &Zero
    }
}

impl From<Zero> for f64 {
    fn from(_: Zero) -> f64 {
        0.0
    }
}

impl<T: Default, const N: usize> From<Zero> for Tensor<T, N> {
    fn from(_: Zero) -> Self {
        Self::default()
    }
}

macro_rules! impl_zero_arithmetic {
    ([$($generics:tt)*] $ty:ty) => {
        impl<$($generics)*> Add<Zero> for $ty {
            type Output = $ty;

            fn add(self, _: Zero) -> $ty {
                self
            }
        }

        impl<$($generics)*> Sub<Zero> for $ty {
            type Output = $ty;

            fn sub(self, _: Zero) -> $ty {
                self
            }
        }

        impl<$($generics)*> Mul<Zero> for $ty {
            type Output = Zero;

            fn mul(self, _: Zero) -> Zero {
                Zero
            }
        }

        impl<$($generics)*> AddAssign<Zero> for $ty {
            fn add_assign(&mut self, _: Zero) {}
        }

        impl<$($generics)*> SubAssign<Zero> for $ty {
            fn sub_assign(&mut self, _: Zero) {}
        }
    };
}

impl_zero_arithmetic!([] f64);
impl_zero_arithmetic!([G: Tangent] Dual<G>);

impl<T, const N: usize> Add<Zero> for Tensor<T, N> {
    type Output = Self;

    fn add(self, _: Zero) -> Self {
        self
    }
}

impl<T, const N: usize> Sub<Zero> for Tensor<T, N> {
    type Output = Self;

    fn sub(self, _: Zero) -> Self {
        self
    }
}

impl<T, const N: usize> Mul<Zero> for Tensor<T, N> {
    type Output = Zero;

    fn mul(self, _: Zero) -> Zero {
        Zero
    }
}

impl<T, const N: usize> AddAssign<Zero> for Tensor<T, N> {
    fn add_assign(&mut self, _: Zero) {}
}

impl<T, const N: usize> SubAssign<Zero> for Tensor<T, N> {
    fn sub_assign(&mut self, _: Zero) {}
}
