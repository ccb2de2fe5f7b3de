//! Test helpers shared by the crates in this workspace.

use nalgebra::{DMatrix, DVector, DVectorView, DVectorViewMut};

/// Approximates the gradient of `f: R^n -> R` with central finite differences.
pub fn approximate_gradient_fd(mut f: impl FnMut(DVectorView<f64>) -> f64, x: &DVector<f64>, h: f64) -> DVector<f64> {
    let mut x = x.clone();
    let mut df = DVector::zeros(x.len());
    for i in 0..x.len() {
        let x_i = x[i];
        x[i] = x_i + h;
        let f_plus = f(DVectorView::from(&x));
        x[i] = x_i - h;
        let f_minus = f(DVectorView::from(&x));
        df[i] = (f_plus - f_minus) / (2.0 * h);
        x[i] = x_i;
    }
    df
}

/// Approximates the Jacobian of `f: R^n -> R^m` with central finite differences.
///
/// The function writes its value into the provided output vector of length `m`.
pub fn approximate_jacobian_fd(
    m: usize,
    mut f: impl FnMut(DVectorView<f64>, DVectorViewMut<f64>),
    x: &DVector<f64>,
    h: f64,
) -> DMatrix<f64> {
    let mut x = x.clone();
    let mut jacobian = DMatrix::zeros(m, x.len());
    let mut f_plus = DVector::zeros(m);
    let mut f_minus = DVector::zeros(m);
    for j in 0..x.len() {
        let x_j = x[j];
        x[j] = x_j + h;
        f_plus.fill(0.0);
        f(DVectorView::from(&x), DVectorViewMut::from(&mut f_plus));
        x[j] = x_j - h;
        f_minus.fill(0.0);
        f(DVectorView::from(&x), DVectorViewMut::from(&mut f_minus));
        x[j] = x_j;
        jacobian
            .column_mut(j)
            .copy_from(&((&f_plus - &f_minus) / (2.0 * h)));
    }
    jacobian
}
