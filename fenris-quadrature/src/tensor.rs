//! Quadrature rules formed by tensor product formulations.
//!
//! For quadrilaterals and hexahedra, quadrature rules can be constructed as tensor products
//! of 1D rules. This module provides rules constructed in this fashion. The first coordinate
//! runs fastest, so that point `i + n * j` of a 2D rule with `n` points per dimension is
//! the product of the 1D points `i` and `j`.

use crate::univariate::gauss;
use crate::Rule;

/// Forms the D-dimensional tensor product of a 1D rule.
pub fn tensor_product<const D: usize>(rule1d: &Rule<1>) -> Rule<D> {
    let (weights1d, points1d) = rule1d;
    let n = weights1d.len();
    let num_points = n.pow(D as u32);
    let mut weights = Vec::with_capacity(num_points);
    let mut points = Vec::with_capacity(num_points);

    for flat_idx in 0..num_points {
        let mut remainder = flat_idx;
        let mut w = 1.0;
        let mut x = [0.0; D];
        for x_k in &mut x {
            let i = remainder % n;
            remainder /= n;
            w *= weights1d[i];
            *x_k = points1d[i][0];
        }
        weights.push(w);
        points.push(x);
    }

    (weights, points)
}

/// A Gauss quadrature rule for the D-dimensional reference cube `[-1, 1]^D`.
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn tensor_gauss<const D: usize>(num_points_per_dim: usize) -> Rule<D> {
    tensor_product(&gauss(num_points_per_dim))
}

/// A Gauss quadrature rule for the reference quadrilateral.
///
/// The rule is constructed as a tensor product from 1D rules, with the provided number of
/// points per dimension.
pub fn quadrilateral_gauss(num_points_per_dim: usize) -> Rule<2> {
    tensor_gauss(num_points_per_dim)
}

/// A Gauss quadrature rule for the reference hexahedron.
///
/// The rule is constructed as a tensor product from 1D rules, with the provided number of
/// points per dimension.
pub fn hexahedron_gauss(num_points_per_dim: usize) -> Rule<3> {
    tensor_gauss(num_points_per_dim)
}
