use crate::dual::Dual;
use crate::scalar::{Scalar, Tangent};
use crate::tensor::{Tensor, Tensor2, Zero};
use std::ops::{Add, Div, Mul};

/// Contraction over the shared adjacent index.
///
/// A vector on the left contracts over the first index of the right operand, any higher-rank
/// left operand contracts over its last index. This covers vector-vector, matrix-vector,
/// vector-matrix and matrix-matrix products as well as their higher-rank analogues.
pub trait Dot<Rhs> {
    type Output;

    fn dot(self, rhs: Rhs) -> Self::Output;
}

/// Vector on the left: `sum_i a_i B_i`.
impl<S, X, const N: usize> Dot<Tensor<X, N>> for Tensor<S, N>
where
    S: Scalar,
    X: Copy + Mul<S>,
    X::Output: Add<Output = X::Output>,
{
    type Output = X::Output;

    fn dot(self, rhs: Tensor<X, N>) -> Self::Output {
        (1..N).fold(rhs[0] * self[0], |sum, i| sum + rhs[i] * self[i])
    }
}

/// Rank two or higher on the left: contract each row with the right operand.
impl<A, B, const N: usize, const M: usize, const P: usize> Dot<Tensor<B, P>> for Tensor<Tensor<A, N>, M>
where
    Tensor<A, N>: Copy + Dot<Tensor<B, P>>,
    B: Copy,
{
    type Output = Tensor<<Tensor<A, N> as Dot<Tensor<B, P>>>::Output, M>;

    fn dot(self, rhs: Tensor<B, P>) -> Self::Output {
        Tensor::from_fn(|i| self[i].dot(rhs))
    }
}

impl<T, const N: usize> Dot<Zero> for Tensor<T, N> {
    type Output = Zero;

    fn dot(self, _: Zero) -> Zero {
        Zero
    }
}

impl<X> Dot<X> for Zero {
    type Output = Zero;

    fn dot(self, _: X) -> Zero {
        Zero
    }
}

pub fn dot<A: Dot<B>, B>(a: A, b: B) -> A::Output {
    a.dot(b)
}

/// The bilinear form `u^T A v`.
pub fn dot3<U, A, V>(u: U, a: A, v: V) -> <U::Output as Dot<V>>::Output
where
    U: Dot<A>,
    U::Output: Dot<V>,
{
    u.dot(a).dot(v)
}

/// Full contraction of two tensors of the same shape, `sum_ij.. a_ij.. b_ij..`.
pub trait Inner<Rhs> {
    type Output;

    fn inner(self, rhs: Rhs) -> Self::Output;
}

impl<S: Scalar> Inner<S> for f64 {
    type Output = S;

    fn inner(self, rhs: S) -> S {
        rhs * self
    }
}

impl<G: Tangent> Inner<f64> for Dual<G> {
    type Output = Self;

    fn inner(self, rhs: f64) -> Self {
        self * rhs
    }
}

impl<G: Tangent> Inner<Dual<G>> for Dual<G> {
    type Output = Self;

    fn inner(self, rhs: Self) -> Self {
        self * rhs
    }
}

impl<T, U, const N: usize> Inner<Tensor<U, N>> for Tensor<T, N>
where
    T: Copy + Inner<U>,
    U: Copy,
    T::Output: Add<Output = T::Output>,
{
    type Output = T::Output;

    fn inner(self, rhs: Tensor<U, N>) -> Self::Output {
        (1..N).fold(self[0].inner(rhs[0]), |sum, i| sum + self[i].inner(rhs[i]))
    }
}

pub fn inner<A: Inner<B>, B>(a: A, b: B) -> A::Output {
    a.inner(b)
}

/// Outer product `a ⊗ b`, with every entry of `a` multiplying all of `b`.
///
/// A scalar on either side scales the other operand. Two tensors give a tensor whose rank is
/// the sum of their ranks, indexed by the indices of `a` followed by those of `b`.
pub trait Outer<Rhs> {
    type Output;

    fn outer(self, rhs: Rhs) -> Self::Output;
}

impl<Rhs> Outer<Rhs> for f64
where
    f64: Mul<Rhs>,
{
    type Output = <f64 as Mul<Rhs>>::Output;

    fn outer(self, rhs: Rhs) -> Self::Output {
        self * rhs
    }
}

impl<G: Tangent, Rhs> Outer<Rhs> for Dual<G>
where
    Dual<G>: Mul<Rhs>,
{
    type Output = <Dual<G> as Mul<Rhs>>::Output;

    fn outer(self, rhs: Rhs) -> Self::Output {
        self * rhs
    }
}

impl<T, Rhs, const N: usize> Outer<Rhs> for Tensor<T, N>
where
    T: Copy + Outer<Rhs>,
    Rhs: Copy,
{
    type Output = Tensor<T::Output, N>;

    fn outer(self, rhs: Rhs) -> Self::Output {
        Tensor::from_fn(|i| self[i].outer(rhs))
    }
}

impl<Rhs> Outer<Rhs> for Zero {
    type Output = Zero;

    fn outer(self, _: Rhs) -> Zero {
        Zero
    }
}

pub fn outer<A: Outer<B>, B>(a: A, b: B) -> A::Output {
    a.outer(b)
}

/// Contraction of the two trailing indices of the left operand with the right operand.
///
/// For a fourth-order tensor `C` and a matrix `E` this is `C_ijkl E_kl`, for two matrices it
/// coincides with [`inner`].
pub trait DoubleDot<Rhs> {
    type Output;

    fn ddot(self, rhs: Rhs) -> Self::Output;
}

impl<S, U, const M: usize, const N: usize> DoubleDot<Tensor2<U, M, N>> for Tensor2<S, M, N>
where
    S: Scalar,
    Tensor2<S, M, N>: Inner<Tensor2<U, M, N>>,
{
    type Output = <Tensor2<S, M, N> as Inner<Tensor2<U, M, N>>>::Output;

    fn ddot(self, rhs: Tensor2<U, M, N>) -> Self::Output {
        self.inner(rhs)
    }
}

impl<A, R, const N: usize, const M: usize, const P: usize> DoubleDot<R> for Tensor<Tensor2<A, M, N>, P>
where
    Tensor2<A, M, N>: Copy + DoubleDot<R>,
    R: Copy,
{
    type Output = Tensor<<Tensor2<A, M, N> as DoubleDot<R>>::Output, P>;

    fn ddot(self, rhs: R) -> Self::Output {
        Tensor::from_fn(|i| self[i].ddot(rhs))
    }
}

pub fn ddot<A: DoubleDot<B>, B>(a: A, b: B) -> A::Output {
    a.ddot(b)
}

/// Squared Frobenius norm.
pub fn sqnorm<A: Copy + Inner<A>>(a: A) -> A::Output {
    a.inner(a)
}

/// Frobenius norm.
pub fn norm<A>(a: A) -> A::Output
where
    A: Copy + Inner<A>,
    A::Output: Scalar,
{
    sqnorm(a).sqrt()
}

/// Scales `a` to unit norm.
pub fn normalize<A>(a: A) -> <A as Div<<A as Inner<A>>::Output>>::Output
where
    A: Copy + Inner<A> + Div<<A as Inner<A>>::Output>,
    <A as Inner<A>>::Output: Scalar,
{
    a / norm(a)
}
