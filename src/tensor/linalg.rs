use crate::dual::Dual;
use crate::scalar::{Scalar, Tangent};
use crate::tensor::{identity, make_tensor, Tensor, Tensor2};
use std::ops::{Div, Mul, Sub};

/// Determinant of a square matrix.
///
/// Closed-form expressions are used up to `3 x 3`, Gauss elimination with partial pivoting
/// beyond that.
pub fn det<S: Scalar, const N: usize>(a: &Tensor2<S, N, N>) -> S {
    match N {
        0 => S::from(1.0),
        1 => a[0][0],
        2 => a[0][0] * a[1][1] - a[0][1] * a[1][0],
        3 => {
            a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1]) - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
                + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0])
        }
        _ => {
            let mut m = *a;
            let mut result = S::from(1.0);
            for k in 0..N {
                let p = pivot_row(&m, k);
                if m[p][k].value() == 0.0 {
                    return S::from(0.0);
                }
                if p != k {
                    m.swap(p, k);
                    result = -result;
                }
                result *= m[k][k];
                for i in k + 1..N {
                    let factor = m[i][k] / m[k][k];
                    for j in k..N {
                        let update = m[k][j] * factor;
                        m[i][j] -= update;
                    }
                }
            }
            result
        }
    }
}

/// Row index `p >= k` maximizing `|m[p][k]|`.
fn pivot_row<S: Scalar, const N: usize>(m: &Tensor2<S, N, N>, k: usize) -> usize {
    (k + 1..N).fold(k, |p, i| {
        if m[i][k].value().abs() > m[p][k].value().abs() {
            i
        } else {
            p
        }
    })
}

/// Solves `A X = B` in place by Gauss elimination with partial pivoting.
///
/// Zero pivots are not detected: a singular `A` produces non-finite entries.
fn eliminate<T, const N: usize>(mut a: Tensor2<f64, N, N>, mut b: Tensor<T, N>) -> Tensor<T, N>
where
    T: Copy + Sub<Output = T> + Mul<f64, Output = T> + Div<f64, Output = T>,
{
    for k in 0..N {
        let p = pivot_row(&a, k);
        a.swap(p, k);
        b.swap(p, k);
        for i in k + 1..N {
            let factor = a[i][k] / a[k][k];
            for j in k..N {
                a[i][j] -= factor * a[k][j];
            }
            b[i] = b[i] - b[k] * factor;
        }
    }

    for i in (0..N).rev() {
        for j in i + 1..N {
            b[i] = b[i] - b[j] * a[i][j];
        }
        b[i] = b[i] / a[i][i];
    }

    b
}

/// Solves the linear system `A x = b`.
pub fn linear_solve<const N: usize>(a: &Tensor2<f64, N, N>, b: &Tensor<f64, N>) -> Tensor<f64, N> {
    eliminate(*a, *b)
}

/// Matrix inversion.
pub trait Inverse: Sized {
    fn inverse(&self) -> Self;
}

pub fn inv<A: Inverse>(a: &A) -> A {
    a.inverse()
}

impl<const N: usize> Inverse for Tensor2<f64, N, N> {
    fn inverse(&self) -> Self {
        let a = self;
        match N {
            1 => make_tensor(|_, _| 1.0 / a[0][0]),
            2 => {
                let inv_det = 1.0 / det(a);
                let entries = [[a[1][1], -a[0][1]], [-a[1][0], a[0][0]]];
                make_tensor(|i, j| entries[i][j] * inv_det)
            }
            3 => {
                let inv_det = 1.0 / det(a);
                // Transposed cofactor matrix
                make_tensor(|i, j| {
                    let (j1, j2) = ((i + 1) % 3, (i + 2) % 3);
                    let (i1, i2) = ((j + 1) % 3, (j + 2) % 3);
                    (a[i1][j1] * a[i2][j2] - a[i1][j2] * a[i2][j1]) * inv_det
                })
            }
            _ => eliminate(*a, identity()),
        }
    }
}

/// Inversion of matrices of dual numbers, using `d(A^-1) = -A^-1 dA A^-1`.
impl<G: Tangent, const N: usize> Inverse for Tensor2<Dual<G>, N, N> {
    fn inverse(&self) -> Self {
        let values: Tensor2<f64, N, N> = make_tensor(|i, j| self[i][j].value);
        let a_inv = values.inverse();
        make_tensor(|i, j| {
            let mut gradient = G::default();
            for k in 0..N {
                for l in 0..N {
                    gradient -= self[k][l].gradient * (a_inv[i][k] * a_inv[l][j]);
                }
            }
            Dual::new(a_inv[i][j], gradient)
        })
    }
}

/// Whether `|a_ij - a_ji| <= tolerance` for all `i, j`.
pub fn is_symmetric<const N: usize>(a: &Tensor2<f64, N, N>, tolerance: f64) -> bool {
    (0..N).all(|i| (i + 1..N).all(|j| (a[i][j] - a[j][i]).abs() <= tolerance))
}

/// Tests symmetry (with tolerance `1e-8`) and positive definiteness by Sylvester's criterion.
///
/// All leading principal minors must be strictly positive.
pub fn is_symmetric_and_positive_definite<const N: usize>(a: &Tensor2<f64, N, N>) -> bool {
    is_symmetric(a, 1e-8) && leading_minors_positive(a, N)
}

fn leading_minors_positive<const N: usize>(a: &Tensor2<f64, N, N>, k: usize) -> bool {
    k == 0 || (leading_minors_positive(a, k - 1) && leading_minor(a, k) > 0.0)
}

/// Determinant of the upper-left `k x k` block, padded with the identity.
fn leading_minor<const N: usize>(a: &Tensor2<f64, N, N>, k: usize) -> f64 {
    let block: Tensor2<f64, N, N> = make_tensor(|i, j| {
        if i < k && j < k {
            a[i][j]
        } else if i == j {
            1.0
        } else {
            0.0
        }
    });
    det(&block)
}
