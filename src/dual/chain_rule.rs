use crate::field::{FieldValue, Integrand};
use crate::tensor::{Shape, Tensor, Tensor2, Tensor3, Tensor4, Zero};

/// Composition of a derivative `df/dx` with a perturbation `dx` of its input.
///
/// The shape of `dx` selects the contraction: a scalar perturbation scales the derivative,
/// a tensor perturbation is contracted with the trailing indices of the derivative that match
/// its shape. A derivative of exactly the shape of `dx` contracts fully to a scalar.
pub trait ChainRule<Dx> {
    type Output;

    fn chain_rule(self, dx: Dx) -> Self::Output;
}

pub fn chain_rule<D, Dx>(df_dx: D, dx: Dx) -> D::Output
where
    D: ChainRule<Dx>,
{
    df_dx.chain_rule(dx)
}

impl ChainRule<f64> for f64 {
    type Output = f64;

    fn chain_rule(self, dx: f64) -> f64 {
        self * dx
    }
}

impl<T, const N: usize> ChainRule<f64> for Tensor<T, N>
where
    T: Copy + ChainRule<f64>,
{
    type Output = Tensor<T::Output, N>;

    fn chain_rule(self, dx: f64) -> Self::Output {
        self.map(|df| (*df).chain_rule(dx))
    }
}

/// For a perturbation of rank `r`, a derivative of the same shape contracts fully, and a
/// derivative with leading indices contracts its trailing `r` indices entry by entry.
macro_rules! impl_tensor_chain_rule {
    ($dx:ty; $($n:ident),+) => {
        impl<$(const $n: usize),+> ChainRule<$dx> for $dx {
            type Output = f64;

            fn chain_rule(self, dx: $dx) -> f64 {
                self.flat_inner(&dx)
            }
        }

        impl<X, $(const $n: usize,)+ const M: usize> ChainRule<$dx> for Tensor<X, M>
        where
            X: Copy + ChainRule<$dx>,
        {
            type Output = Tensor<X::Output, M>;

            fn chain_rule(self, dx: $dx) -> Self::Output {
                self.map(|df| (*df).chain_rule(dx))
            }
        }
    };
}

impl_tensor_chain_rule!(Tensor<f64, K>; K);
impl_tensor_chain_rule!(Tensor2<f64, K, L>; K, L);
impl_tensor_chain_rule!(Tensor3<f64, K, L, P>; K, L, P);
impl_tensor_chain_rule!(Tensor4<f64, K, L, P, R>; K, L, P, R);

impl<V: Shape, W: Shape> ChainRule<FieldValue<V, W>> for FieldValue<V, W> {
    type Output = f64;

    fn chain_rule(self, dx: FieldValue<V, W>) -> f64 {
        self.flat_inner(&dx)
    }
}

impl<X, V, W, const M: usize> ChainRule<FieldValue<V, W>> for Tensor<X, M>
where
    X: Copy + ChainRule<FieldValue<V, W>>,
    V: Copy,
    W: Copy,
{
    type Output = Tensor<X::Output, M>;

    fn chain_rule(self, dx: FieldValue<V, W>) -> Self::Output {
        self.map(|df| (*df).chain_rule(dx))
    }
}

impl<A, B, Dx> ChainRule<Dx> for Integrand<A, B>
where
    A: ChainRule<Dx>,
    B: ChainRule<Dx>,
    Dx: Copy,
{
    type Output = Integrand<A::Output, B::Output>;

    fn chain_rule(self, dx: Dx) -> Self::Output {
        Integrand {
            source: self.source.chain_rule(dx),
            flux: self.flux.chain_rule(dx),
        }
    }
}

impl<X> ChainRule<X> for Zero {
    type Output = Zero;

    fn chain_rule(self, _: X) -> Zero {
        Zero
    }
}

impl ChainRule<Zero> for f64 {
    type Output = Zero;

    fn chain_rule(self, _: Zero) -> Zero {
        Zero
    }
}

impl<T, const N: usize> ChainRule<Zero> for Tensor<T, N> {
    type Output = Zero;

    fn chain_rule(self, _: Zero) -> Zero {
        Zero
    }
}

impl<V, W> ChainRule<Zero> for FieldValue<V, W> {
    type Output = Zero;

    fn chain_rule(self, _: Zero) -> Zero {
        Zero
    }
}
