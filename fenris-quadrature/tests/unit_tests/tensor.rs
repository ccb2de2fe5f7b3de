use fenris_quadrature::integrate;
use fenris_quadrature::tensor::{hexahedron_gauss, quadrilateral_gauss, tensor_gauss};
use fenris_quadrature::univariate::gauss;
use matrixcompare::assert_scalar_eq;

fn monomial_integral_1d(alpha: i32) -> f64 {
    (1.0 - (-1.0f64).powi(alpha + 1)) / (alpha as f64 + 1.0)
}

#[test]
fn quadrilateral_gauss_rules_satisfy_expected_accuracy() {
    // Number of points in each dimension of rule
    for n in 1..=20 {
        // Expected polynomial degree that the rule can exactly integrate *along each dimension*
        let expected_polynomial_degree = 2 * n - 1;
        let rule = quadrilateral_gauss(n);

        assert!(rule.0.iter().all(|&w| w > 0.0));

        for alpha in 0..=expected_polynomial_degree as i32 {
            for beta in 0..=expected_polynomial_degree as i32 {
                let expected = monomial_integral_1d(alpha) * monomial_integral_1d(beta);
                let estimated_integral = integrate(&rule, |&[x, y]| x.powi(alpha) * y.powi(beta));
                assert_scalar_eq!(estimated_integral, expected, comp = abs, tol = 1e-14);
            }
        }
    }
}

#[test]
fn hexahedral_gauss_rules_satisfy_expected_accuracy() {
    for n in 1..=8 {
        let expected_polynomial_degree = 2 * n - 1;
        let rule = hexahedron_gauss(n);

        assert!(rule.0.iter().all(|&w| w > 0.0));

        for alpha in 0..=expected_polynomial_degree as i32 {
            for beta in 0..=expected_polynomial_degree as i32 {
                for gamma in 0..=expected_polynomial_degree as i32 {
                    let expected =
                        monomial_integral_1d(alpha) * monomial_integral_1d(beta) * monomial_integral_1d(gamma);
                    let estimated_integral =
                        integrate(&rule, |&[x, y, z]| x.powi(alpha) * y.powi(beta) * z.powi(gamma));
                    assert_scalar_eq!(estimated_integral, expected, comp = abs, tol = 1e-13);
                }
            }
        }
    }
}

#[test]
fn tensor_rules_enumerate_first_coordinate_fastest() {
    let (_, points1d) = gauss(3);
    let (weights, points) = tensor_gauss::<2>(3);
    assert_eq!(weights.len(), 9);
    for j in 0..3 {
        for i in 0..3 {
            assert_eq!(points[i + 3 * j], [points1d[i][0], points1d[j][0]]);
        }
    }
}
