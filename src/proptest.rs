use crate::tensor::{dot, make_tensor, transpose, Tensor, Tensor2};
use ::proptest::prelude::*;
use nalgebra::{Point2, Vector2};

/// Tensors with entries drawn from a moderate range.
pub fn tensor<const N: usize>() -> impl Strategy<Value = Tensor<f64, N>> {
    // Keep entries small enough that products of a few of them stay well within f64 precision
    proptest::collection::vec(-10.0..10.0, N).prop_map(|entries| Tensor::from_fn(|i| entries[i]))
}

pub fn matrix<const M: usize, const N: usize>() -> impl Strategy<Value = Tensor2<f64, M, N>> {
    proptest::collection::vec(-10.0..10.0, M * N).prop_map(|entries| make_tensor(|i, j| entries[i * N + j]))
}

/// Strictly diagonally dominant matrices, which are invertible with a moderate condition number.
pub fn invertible_matrix<const N: usize>() -> impl Strategy<Value = Tensor2<f64, N, N>> {
    proptest::collection::vec(-1.0..1.0, N * N).prop_map(|entries| {
        make_tensor(|i, j| {
            let offset = entries[i * N + j];
            if i == j {
                N as f64 + 1.0 + offset
            } else {
                offset
            }
        })
    })
}

/// Symmetric positive definite matrices of the form `B^T B + I`.
pub fn spd_matrix<const N: usize>() -> impl Strategy<Value = Tensor2<f64, N, N>> {
    proptest::collection::vec(-1.0..1.0, N * N).prop_map(|entries| {
        let b: Tensor2<f64, N, N> = make_tensor(|i, j| entries[i * N + j]);
        let btb: Tensor2<f64, N, N> = dot(transpose(&b), b);
        make_tensor(|i, j| if i == j { btb[i][j] + 1.0 } else { btb[i][j] })
    })
}

pub fn point2() -> impl Strategy<Value = Point2<f64>> {
    let range = -10.0..10.0;
    [range.clone(), range].prop_map(|[x, y]| Point2::new(x, y))
}

/// Counter-clockwise parallelograms with edges that are perturbations of the unit axes.
pub fn parallelogram() -> impl Strategy<Value = [Point2<f64>; 4]> {
    let perturbation = -0.4..0.4;
    (point2(), [perturbation.clone(), perturbation.clone(), perturbation.clone(), perturbation]).prop_map(
        |(origin, [a, b, c, d])| {
            let u = Vector2::new(1.0 + a, b);
            let v = Vector2::new(c, 1.0 + d);
            [origin, origin + u, origin + u + v, origin + v]
        },
    )
}
