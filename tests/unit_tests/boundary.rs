use fenris_functional::geometry::BoundaryFactors;
use fenris_functional::integral::*;
use fenris_functional::scalar::Scalar;
use fenris_functional::space::H1;
use fenris_functional::tensor::*;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{DMatrix, DVector, DVectorView, Point2, Point3};
use util::approximate_jacobian_fd;

/// Constant traction `t` applied in the normal direction.
struct NormalTraction;

impl<const D: usize> BoundaryQFunction<D> for NormalTraction {
    type Args = (Tensor<f64, D>,);
    type Output = Tensor<f64, D>;

    fn evaluate<S: Scalar>(
        &self,
        _: &Tensor<f64, D>,
        normal: &Tensor<f64, D>,
        _: &Lifted<Self::Args, S>,
    ) -> Lifted<Self::Output, S> {
        normal.map(|n_i| S::from(-2.0 * n_i))
    }
}

/// Robin-type flux `alpha u^2 - g(x)`.
struct Robin;

impl BoundaryQFunction<2> for Robin {
    type Args = (f64,);
    type Output = f64;

    fn evaluate<S: Scalar>(&self, x: &Tensor<f64, 2>, _: &Tensor<f64, 2>, (u,): &(S,)) -> S {
        *u * *u * 3.0 - x[0]
    }
}

/// Identity, `u`.
struct Identity;

impl<const D: usize> BoundaryQFunction<D> for Identity {
    type Args = (f64,);
    type Output = f64;

    fn evaluate<S: Scalar>(&self, _: &Tensor<f64, D>, _: &Tensor<f64, D>, (u,): &(S,)) -> S {
        *u
    }
}

/// Product of two scalar fields, `u v`.
struct Product;

impl BoundaryQFunction<2> for Product {
    type Args = (f64, f64);
    type Output = f64;

    fn evaluate<S: Scalar>(&self, _: &Tensor<f64, 2>, _: &Tensor<f64, 2>, (u, v): &(S, S)) -> S {
        *u * *v
    }
}

/// Pressure load `p^2 n + p u` of a scalar pressure `p` on a displacement `u`.
struct PressureLoad;

impl BoundaryQFunction<2> for PressureLoad {
    type Args = (f64, Tensor<f64, 2>);
    type Output = Tensor<f64, 2>;

    fn evaluate<S: Scalar>(
        &self,
        _: &Tensor<f64, 2>,
        normal: &Tensor<f64, 2>,
        (p, u): &Lifted<Self::Args, S>,
    ) -> Lifted<Self::Output, S> {
        Tensor::from_fn(|i| *p * *p * normal[i] + *p * u[i])
    }
}

fn square_boundary() -> Vec<[Point2<f64>; 2]> {
    let corners = [
        Point2::new(0.0, 0.0),
        Point2::new(2.0, 0.0),
        Point2::new(2.0, 1.0),
        Point2::new(0.0, 1.0),
    ];
    (0..4).map(|i| [corners[i], corners[(i + 1) % 4]]).collect()
}

#[test]
fn constant_field_on_segments() {
    let segments = square_boundary();
    let geometry = BoundaryFactors::from_segments(&segments, 2).unwrap();
    let options = IntegralOptions::default();
    let integral = BoundaryIntegral::new(H1::<1, 1>, (H1::<1, 1>,), geometry, Identity, options).unwrap();
    assert_eq!(integral.num_elements(), 4);
    assert_eq!(integral.test_dofs_per_element(), 2);
    assert_eq!(integral.trial_dofs_per_element(), [2]);

    let c = 0.75;
    let u = DVector::from_element(8, c);
    let mut r = DVector::zeros(8);
    integral.mult([DVectorView::from(&u)], &mut r, Some(0)).unwrap();
    // Each linear shape function integrates to half the segment length
    let lengths = [2.0, 1.0, 2.0, 1.0];
    for (e, length) in lengths.iter().enumerate() {
        assert_scalar_eq!(r[2 * e], c * length / 2.0, comp = abs, tol = 1e-14);
        assert_scalar_eq!(r[2 * e + 1], c * length / 2.0, comp = abs, tol = 1e-14);
    }

    // Boundary mass matrices
    let gradients = integral.element_gradients(0).unwrap();
    for (e, length) in lengths.iter().enumerate() {
        let expected = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]) * (length / 6.0);
        assert_matrix_eq!(gradients.element(e), expected, comp = abs, tol = 1e-14);
    }
}

#[test]
fn normal_traction_integrates_to_zero_on_closed_boundary() {
    let segments = square_boundary();
    let geometry = BoundaryFactors::from_segments(&segments, 2).unwrap();
    let integral = BoundaryIntegral::new(
        H1::<1, 2>,
        (H1::<1, 2>,),
        geometry,
        NormalTraction,
        IntegralOptions::default(),
    )
    .unwrap();
    let u = DVector::zeros(16);
    let mut r = DVector::zeros(16);
    integral.mult([DVectorView::from(&u)], &mut r, None).unwrap();

    // Bottom edge has outward normal (0, -1), so the traction (0, 2) is spread over its nodes
    assert_scalar_eq!(r[0], 0.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(r[1], 2.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(r[3], 2.0, comp = abs, tol = 1e-14);

    let total_x: f64 = (0..8).map(|a| r[2 * a]).sum();
    let total_y: f64 = (0..8).map(|a| r[2 * a + 1]).sum();
    assert_scalar_eq!(total_x, 0.0, comp = abs, tol = 1e-13);
    assert_scalar_eq!(total_y, 0.0, comp = abs, tol = 1e-13);

    // The integrand does not depend on the field
    integral.mult([DVectorView::from(&u)], &mut r, Some(0)).unwrap();
    let gradients = integral.element_gradients(0).unwrap();
    assert!(gradients.as_slice().iter().all(|&entry| entry == 0.0));
}

#[test]
fn nonlinear_boundary_gradient_agrees_with_finite_differences() {
    let segments = square_boundary();
    let geometry = BoundaryFactors::from_segments(&segments, 2).unwrap();
    let integral = BoundaryIntegral::new(
        H1::<1, 1>,
        (H1::<1, 1>,),
        geometry,
        Robin,
        IntegralOptions::serial(),
    )
    .unwrap();
    let n = 8;
    let u = DVector::from_fn(n, |i, _| (0.3 * i as f64).cos());

    let mut r = DVector::zeros(n);
    integral.mult([DVectorView::from(&u)], &mut r, Some(0)).unwrap();
    let jacobian_fd = approximate_jacobian_fd(n, |u, r| integral.mult([u], r, None).unwrap(), &u, 1e-6);

    let gradients = integral.element_gradients(0).unwrap();
    for e in 0..4 {
        assert_matrix_eq!(gradients.element(e), jacobian_fd.view((2 * e, 2 * e), (2, 2)), comp = abs, tol = 1e-6);
    }

    let direction = DVector::from_fn(n, |i, _| 1.0 - 0.2 * i as f64);
    let mut action = DVector::zeros(n);
    integral.gradient_mult(&direction, &mut action, 0).unwrap();
    assert_matrix_eq!(action, &jacobian_fd * &direction, comp = abs, tol = 1e-6);
}

#[test]
fn multiple_boundary_fields() {
    let segments = square_boundary();
    let geometry = BoundaryFactors::from_segments(&segments, 2).unwrap();
    let options = IntegralOptions::default();
    let integral = BoundaryIntegral::new(H1::<1, 1>, (H1::<1, 1>, H1::<1, 1>), geometry, Product, options).unwrap();
    let u = DVector::from_element(8, 2.0);
    let v = DVector::from_element(8, 3.0);

    let mut r = DVector::zeros(8);
    integral
        .mult([DVectorView::from(&u), DVectorView::from(&v)], &mut r, Some(1))
        .unwrap();
    // Total boundary length is 6
    assert_scalar_eq!(r.sum(), 36.0, comp = abs, tol = 1e-13);

    // d(u v)/dv = u
    let gradients = integral.element_gradients(1).unwrap();
    let total: f64 = (0..4).map(|e| gradients.element(e).sum()).sum();
    assert_scalar_eq!(total, 12.0, comp = abs, tol = 1e-13);
    assert!(integral.element_gradients(2).is_err());
}

#[test]
fn boundary_fields_from_different_spaces() {
    let segments = square_boundary();
    let geometry = BoundaryFactors::from_segments(&segments, 2).unwrap();
    let integral = BoundaryIntegral::new(
        H1::<1, 2>,
        (H1::<1, 1>, H1::<1, 2>),
        geometry,
        PressureLoad,
        IntegralOptions::serial(),
    )
    .unwrap();
    assert_eq!(integral.test_dofs_per_element(), 4);
    assert_eq!(integral.trial_dofs_per_element(), [2, 4]);

    let n = 16;
    let p = DVector::from_fn(8, |i, _| 0.5 + 0.1 * i as f64);
    let u = DVector::from_fn(16, |i, _| (0.7 * i as f64).sin());
    let mut r = DVector::zeros(n);
    integral
        .mult([DVectorView::from(&p), DVectorView::from(&u)], &mut r, Some(0))
        .unwrap();
    let dp = integral.element_gradients(0).unwrap();
    assert_eq!((dp.rows(), dp.cols()), (4, 2));

    let dp_fd = approximate_jacobian_fd(
        n,
        |p, r| {
            integral
                .mult([p, DVectorView::from(&u)], r, None)
                .unwrap()
        },
        &p,
        1e-6,
    );
    for e in 0..4 {
        assert_matrix_eq!(dp.element(e), dp_fd.view((4 * e, 2 * e), (4, 2)), comp = abs, tol = 1e-6);
    }

    let direction = DVector::from_fn(16, |i, _| 1.0 - 0.1 * i as f64);
    let mut action = DVector::zeros(n);
    integral
        .mult([DVectorView::from(&p), DVectorView::from(&u)], &mut r, Some(1))
        .unwrap();
    integral.gradient_mult(&direction, &mut action, 1).unwrap();
    let du_fd = approximate_jacobian_fd(
        n,
        |u, r| {
            integral
                .mult([DVectorView::from(&p), u], r, None)
                .unwrap()
        },
        &u,
        1e-6,
    );
    assert_matrix_eq!(action, &du_fd * &direction, comp = abs, tol = 1e-6);
}

#[test]
fn quadrilateral_faces() {
    // Bottom (outward normal -z) and top (+z) faces of the unit cube
    let bottom = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
    ];
    let top = [
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];
    let geometry = BoundaryFactors::from_quadrilateral_faces(&[bottom, top], 2).unwrap();

    let identity = BoundaryIntegral::new(
        H1::<1, 1>,
        (H1::<1, 1>,),
        geometry.clone(),
        Identity,
        IntegralOptions::default(),
    )
    .unwrap();
    assert_eq!(identity.test_dofs_per_element(), 4);
    let ones = DVector::from_element(8, 1.0);
    let mut r = DVector::zeros(8);
    identity.mult([DVectorView::from(&ones)], &mut r, None).unwrap();
    assert_matrix_eq!(r, DVector::from_element(8, 0.25), comp = abs, tol = 1e-14);

    let traction = BoundaryIntegral::new(
        H1::<1, 3>,
        (H1::<1, 3>,),
        geometry,
        NormalTraction,
        IntegralOptions::default(),
    )
    .unwrap();
    let u = DVector::zeros(24);
    let mut r = DVector::zeros(24);
    traction.mult([DVectorView::from(&u)], &mut r, None).unwrap();
    for a in 0..4 {
        assert_scalar_eq!(r[3 * a + 2], 0.5, comp = abs, tol = 1e-14);
        assert_scalar_eq!(r[12 + 3 * a + 2], -0.5, comp = abs, tol = 1e-14);
    }
}

#[test]
fn boundary_layout_must_match_spaces() {
    let geometry = BoundaryFactors::from_segments(&square_boundary(), 2).unwrap();
    let options = IntegralOptions::default();
    let result = BoundaryIntegral::<1>::new(H1::<1, 2>, (H1::<1, 2>,), geometry.clone(), Robin, options);
    assert!(result.is_err());
    // Segments need 3 points for quadratic spaces
    let result = BoundaryIntegral::<1>::new(H1::<2, 1>, (H1::<2, 1>,), geometry.clone(), Robin, options);
    assert!(result.is_err());
    let options = options.with_execution_space(ExecutionSpace::Gpu);
    let result = BoundaryIntegral::<1>::new(H1::<1, 1>, (H1::<1, 1>,), geometry, Robin, options);
    assert!(result.is_err());
}
