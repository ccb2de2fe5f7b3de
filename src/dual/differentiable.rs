use crate::dual::Dual;
use crate::field::{FieldValue, Integrand};
use crate::tensor::{Tensor, Zero};

/// Access to the value and derivative parts of (possibly) dual-valued quantities.
///
/// Values without any dual numbers in them have derivative [`Zero`].
pub trait Differentiable {
    type Value;
    type Gradient;

    fn get_value(&self) -> Self::Value;

    fn get_gradient(&self) -> Self::Gradient;
}

pub fn get_value<X: Differentiable>(x: &X) -> X::Value {
    x.get_value()
}

pub fn get_gradient<X: Differentiable>(x: &X) -> X::Gradient {
    x.get_gradient()
}

/// Stacks `M` derivatives along a new leading index.
pub trait Stack<const M: usize>: Sized {
    type Output;

    fn stack(parts: [Self; M]) -> Self::Output;
}

impl<const M: usize> Stack<M> for Zero {
    type Output = Zero;

    fn stack(_: [Self; M]) -> Zero {
        Zero
    }
}

impl<T, const N: usize, const M: usize> Stack<M> for Tensor<T, N> {
    type Output = Tensor<Tensor<T, N>, M>;

    fn stack(parts: [Self; M]) -> Self::Output {
        Tensor::new(parts)
    }
}

impl Differentiable for f64 {
    type Value = f64;
    type Gradient = Zero;

    fn get_value(&self) -> f64 {
        *self
    }

    fn get_gradient(&self) -> Zero {
        Zero
    }
}

impl Differentiable for Zero {
    type Value = Zero;
    type Gradient = Zero;

    fn get_value(&self) -> Zero {
        Zero
    }

    fn get_gradient(&self) -> Zero {
        Zero
    }
}

impl<G: Copy> Differentiable for Dual<G> {
    type Value = f64;
    type Gradient = G;

    fn get_value(&self) -> f64 {
        self.value
    }

    fn get_gradient(&self) -> G {
        self.gradient
    }
}

impl<const N: usize> Differentiable for Tensor<f64, N> {
    type Value = Self;
    type Gradient = Zero;

    fn get_value(&self) -> Self {
        *self
    }

    fn get_gradient(&self) -> Zero {
        Zero
    }
}

impl<G: Copy, const N: usize> Differentiable for Tensor<Dual<G>, N> {
    type Value = Tensor<f64, N>;
    type Gradient = Tensor<G, N>;

    fn get_value(&self) -> Self::Value {
        self.map(|dual| dual.value)
    }

    fn get_gradient(&self) -> Self::Gradient {
        self.map(|dual| dual.gradient)
    }
}

impl<T, const N: usize, const M: usize> Differentiable for Tensor<Tensor<T, N>, M>
where
    Tensor<T, N>: Differentiable,
    <Tensor<T, N> as Differentiable>::Gradient: Stack<M>,
{
    type Value = Tensor<<Tensor<T, N> as Differentiable>::Value, M>;
    type Gradient = <<Tensor<T, N> as Differentiable>::Gradient as Stack<M>>::Output;

    fn get_value(&self) -> Self::Value {
        self.map(|row| row.get_value())
    }

    fn get_gradient(&self) -> Self::Gradient {
        <<Tensor<T, N> as Differentiable>::Gradient as Stack<M>>::stack(std::array::from_fn(|i| {
            self[i].get_gradient()
        }))
    }
}

impl<V: Differentiable, W: Differentiable> Differentiable for FieldValue<V, W> {
    type Value = FieldValue<V::Value, W::Value>;
    type Gradient = FieldValue<V::Gradient, W::Gradient>;

    fn get_value(&self) -> Self::Value {
        FieldValue {
            value: self.value.get_value(),
            gradient: self.gradient.get_value(),
        }
    }

    fn get_gradient(&self) -> Self::Gradient {
        FieldValue {
            value: self.value.get_gradient(),
            gradient: self.gradient.get_gradient(),
        }
    }
}

impl<A: Differentiable, B: Differentiable> Differentiable for Integrand<A, B> {
    type Value = Integrand<A::Value, B::Value>;
    type Gradient = Integrand<A::Gradient, B::Gradient>;

    fn get_value(&self) -> Self::Value {
        Integrand {
            source: self.source.get_value(),
            flux: self.flux.get_value(),
        }
    }

    fn get_gradient(&self) -> Self::Gradient {
        Integrand {
            source: self.source.get_gradient(),
            flux: self.flux.get_gradient(),
        }
    }
}
