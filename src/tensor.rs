//! Small, fixed-shape tensors.
//!
//! A tensor of rank `r` is represented as `r` nested [`Tensor`] values, so that
//! `Tensor<Tensor<f64, 3>, 2>` is a `2 x 3` matrix stored in row-major order. All shapes are
//! part of the type, and mismatched shapes in any contraction are compile errors.
//!
//! The leaves of a tensor are usually `f64` or [`Dual`](crate::dual::Dual) numbers. The
//! [`Zero`] sentinel stands in for a tensor known to vanish and absorbs any product it takes
//! part in.

use crate::scalar::Scalar;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

mod contraction;
mod linalg;
mod shape;
mod zero;

pub use contraction::*;
pub use linalg::*;
pub use shape::*;
pub use zero::*;

/// A fixed-size array of `N` entries of type `T`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tensor<T, const N: usize> {
    data: [T; N],
}

/// A `M x N` tensor of rank 2.
pub type Tensor2<T, const M: usize, const N: usize> = Tensor<Tensor<T, N>, M>;

/// A `M x N x P` tensor of rank 3.
pub type Tensor3<T, const M: usize, const N: usize, const P: usize> = Tensor<Tensor2<T, N, P>, M>;

/// A `M x N x P x Q` tensor of rank 4.
pub type Tensor4<T, const M: usize, const N: usize, const P: usize, const Q: usize> =
    Tensor<Tensor3<T, N, P, Q>, M>;

impl<T, const N: usize> Tensor<T, N> {
    pub const fn new(data: [T; N]) -> Self {
        Self { data }
    }

    /// Constructs a tensor whose `i`-th entry is `f(i)`.
    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Self {
            data: std::array::from_fn(f),
        }
    }

    pub fn as_array(&self) -> &[T; N] {
        &self.data
    }

    pub fn into_array(self) -> [T; N] {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<T> {
        self.data.iter_mut()
    }

    /// Applies `f` to every entry.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Tensor<U, N> {
        Tensor::from_fn(|i| f(&self.data[i]))
    }

    pub(crate) fn swap(&mut self, i: usize, j: usize) {
        self.data.swap(i, j);
    }
}

/// Constructs a `M x N` tensor whose entry `(i, j)` is `f(i, j)`.
pub fn make_tensor<T, const M: usize, const N: usize>(mut f: impl FnMut(usize, usize) -> T) -> Tensor2<T, M, N> {
    Tensor::from_fn(|i| Tensor::from_fn(|j| f(i, j)))
}

impl<T: Default, const N: usize> Default for Tensor<T, N> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T, const N: usize> From<[T; N]> for Tensor<T, N> {
    fn from(data: [T; N]) -> Self {
        Self { data }
    }
}

impl<const M: usize, const N: usize> From<[[f64; N]; M]> for Tensor2<f64, M, N> {
    fn from(rows: [[f64; N]; M]) -> Self {
        Tensor::from_fn(|i| Tensor::new(rows[i]))
    }
}

impl<T, const N: usize> Index<usize> for Tensor<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for Tensor<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl<T, U, const N: usize> Add<Tensor<U, N>> for Tensor<T, N>
where
    T: Copy + Add<U>,
    U: Copy,
{
    type Output = Tensor<T::Output, N>;

    fn add(self, rhs: Tensor<U, N>) -> Self::Output {
        Tensor::from_fn(|i| self.data[i] + rhs.data[i])
    }
}

impl<T, U, const N: usize> Sub<Tensor<U, N>> for Tensor<T, N>
where
    T: Copy + Sub<U>,
    U: Copy,
{
    type Output = Tensor<T::Output, N>;

    fn sub(self, rhs: Tensor<U, N>) -> Self::Output {
        Tensor::from_fn(|i| self.data[i] - rhs.data[i])
    }
}

impl<T, const N: usize> Neg for Tensor<T, N>
where
    T: Copy + Neg,
{
    type Output = Tensor<T::Output, N>;

    fn neg(self) -> Self::Output {
        Tensor::from_fn(|i| -self.data[i])
    }
}

impl<T, S, const N: usize> Mul<S> for Tensor<T, N>
where
    T: Copy + Mul<S>,
    S: Scalar,
{
    type Output = Tensor<T::Output, N>;

    fn mul(self, rhs: S) -> Self::Output {
        Tensor::from_fn(|i| self.data[i] * rhs)
    }
}

impl<T, S, const N: usize> Div<S> for Tensor<T, N>
where
    T: Copy + Div<S>,
    S: Scalar,
{
    type Output = Tensor<T::Output, N>;

    fn div(self, rhs: S) -> Self::Output {
        Tensor::from_fn(|i| self.data[i] / rhs)
    }
}

impl<T, const N: usize> Mul<Tensor<T, N>> for f64
where
    T: Copy + Mul<f64>,
{
    type Output = Tensor<T::Output, N>;

    fn mul(self, rhs: Tensor<T, N>) -> Self::Output {
        rhs * self
    }
}

impl<T, U, const N: usize> AddAssign<Tensor<U, N>> for Tensor<T, N>
where
    T: AddAssign<U>,
    U: Copy,
{
    fn add_assign(&mut self, rhs: Tensor<U, N>) {
        for (a, b) in self.data.iter_mut().zip(rhs.data) {
            *a += b;
        }
    }
}

impl<T, U, const N: usize> SubAssign<Tensor<U, N>> for Tensor<T, N>
where
    T: SubAssign<U>,
    U: Copy,
{
    fn sub_assign(&mut self, rhs: Tensor<U, N>) {
        for (a, b) in self.data.iter_mut().zip(rhs.data) {
            *a -= b;
        }
    }
}

impl<T, S, const N: usize> MulAssign<S> for Tensor<T, N>
where
    T: MulAssign<S>,
    S: Scalar,
{
    fn mul_assign(&mut self, rhs: S) {
        for a in self.data.iter_mut() {
            *a *= rhs;
        }
    }
}

impl<T: Display, const N: usize> Display for Tensor<T, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, entry) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", entry)?;
        }
        write!(f, "}}")
    }
}

/// Returns the `N x N` identity matrix.
pub fn identity<const N: usize>() -> Tensor2<f64, N, N> {
    make_tensor(|i, j| if i == j { 1.0 } else { 0.0 })
}

pub fn transpose<T: Copy, const M: usize, const N: usize>(a: &Tensor2<T, M, N>) -> Tensor2<T, N, M> {
    make_tensor(|i, j| a[j][i])
}

/// Trace of a square matrix.
pub fn tr<S: Scalar, const N: usize>(a: &Tensor2<S, N, N>) -> S {
    (1..N).fold(a[0][0], |sum, i| sum + a[i][i])
}

/// Symmetric part `(A + A^T) / 2`.
pub fn sym<S: Scalar, const N: usize>(a: &Tensor2<S, N, N>) -> Tensor2<S, N, N> {
    make_tensor(|i, j| (a[i][j] + a[j][i]) * 0.5)
}

/// Antisymmetric part `(A - A^T) / 2`.
pub fn antisym<S: Scalar, const N: usize>(a: &Tensor2<S, N, N>) -> Tensor2<S, N, N> {
    make_tensor(|i, j| (a[i][j] - a[j][i]) * 0.5)
}

/// Deviatoric part `A - tr(A) I / N`.
pub fn dev<S: Scalar, const N: usize>(a: &Tensor2<S, N, N>) -> Tensor2<S, N, N> {
    let mean = tr(a) / N as f64;
    make_tensor(|i, j| if i == j { a[i][j] - mean } else { a[i][j] })
}

/// Replaces entries with magnitude below `1e-10` by zero.
pub fn chop<T: Shape>(mut a: T) -> T {
    for i in 0..T::SIZE {
        let entry = a.flat_mut(i);
        if entry.abs() < 1e-10 {
            *entry = 0.0;
        }
    }
    a
}

impl<const M: usize, const N: usize> From<nalgebra::SMatrix<f64, M, N>> for Tensor2<f64, M, N> {
    fn from(matrix: nalgebra::SMatrix<f64, M, N>) -> Self {
        make_tensor(|i, j| matrix[(i, j)])
    }
}

impl<const M: usize, const N: usize> From<Tensor2<f64, M, N>> for nalgebra::SMatrix<f64, M, N> {
    fn from(tensor: Tensor2<f64, M, N>) -> Self {
        Self::from_fn(|i, j| tensor[i][j])
    }
}

impl<const N: usize> From<nalgebra::SVector<f64, N>> for Tensor<f64, N> {
    fn from(vector: nalgebra::SVector<f64, N>) -> Self {
        Tensor::from_fn(|i| vector[i])
    }
}

impl<const N: usize> From<Tensor<f64, N>> for nalgebra::SVector<f64, N> {
    fn from(tensor: Tensor<f64, N>) -> Self {
        Self::from_fn(|i, _| tensor[i])
    }
}

impl<const N: usize> From<nalgebra::Point<f64, N>> for Tensor<f64, N> {
    fn from(point: nalgebra::Point<f64, N>) -> Self {
        Tensor::from_fn(|i| point[i])
    }
}
