use fenris_functional::proptest::{invertible_matrix, matrix, spd_matrix, tensor};
use fenris_functional::tensor::*;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{Matrix2, Matrix3, SMatrix, Vector3};
use proptest::prelude::*;

fn to_matrix<const M: usize, const N: usize>(a: Tensor2<f64, M, N>) -> SMatrix<f64, M, N> {
    a.into()
}

#[test]
fn dot_conventions() {
    let u = Tensor::new([1.0, 2.0]);
    let v = Tensor::new([3.0, -1.0, 2.0]);
    let a = Tensor2::from([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);

    // vector-vector
    assert_scalar_eq!(dot(v, v), 14.0);
    // matrix-vector contracts over the last index
    assert_eq!(dot(a, v), Tensor::new([7.0, 19.0]));
    // vector-matrix contracts over the first index
    assert_eq!(dot(u, a), Tensor::new([9.0, 12.0, 15.0]));
    // matrix-matrix
    let b = Tensor2::from([[1.0, 0.0], [0.0, 2.0], [1.0, 1.0]]);
    assert_eq!(dot(a, b), Tensor2::from([[4.0, 7.0], [10.0, 16.0]]));
    // u^T A v
    assert_scalar_eq!(dot3(u, a, v), dot(u, dot(a, v)));
}

#[test]
fn dot_matches_nalgebra_matrix_product() {
    let a = Tensor2::from([[1.0, -2.0, 0.5], [3.0, 0.0, 1.0]]);
    let b = Tensor2::from([[2.0, 1.0], [0.0, -1.0], [4.0, 3.0]]);
    let expected = to_matrix(a) * to_matrix(b);
    assert_matrix_eq!(to_matrix(dot(a, b)), expected, comp = abs, tol = 1e-14);
}

#[test]
fn rank_three_dot_vector() {
    let a: Tensor3<f64, 2, 2, 3> = Tensor::from_fn(|i| make_tensor(|j, k| (i * 6 + j * 3 + k) as f64));
    let v = Tensor::new([1.0, 0.0, -1.0]);
    let av = dot(a, v);
    for i in 0..2 {
        for j in 0..2 {
            assert_scalar_eq!(av[i][j], a[i][j][0] - a[i][j][2]);
        }
    }
}

#[test]
fn ddot_with_identity_tensor() {
    let identity4: Tensor4<f64, 3, 3, 3, 3> =
        make_tensor(|i, j| make_tensor(|k, l| if i == k && j == l { 1.0 } else { 0.0 }));
    let e = Tensor2::from([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
    assert_eq!(ddot(identity4, e), e);
    assert_scalar_eq!(ddot(e, e), 285.0);
    assert_scalar_eq!(inner(e, identity::<3>()), tr(&e));
}

#[test]
fn zero_identities() {
    let t = Tensor2::from([[1.0, 2.0], [3.0, 4.0]]);
    assert_eq!(Zero + t, t);
    assert_eq!(t + Zero, t);
    assert_eq!(t - Zero, t);
    assert_eq!(Zero - t, -t);
    assert_eq!(Zero * t, Zero);
    assert_eq!(t * Zero, Zero);
    assert_eq!(dot(Zero, t), Zero);
    assert_eq!(dot(t, Zero), Zero);
    assert_eq!(Zero + 3.0_f64, 3.0);
    assert_eq!(3.0_f64 * Zero, Zero);

    let mut s = t;
    s += Zero;
    s -= Zero;
    assert_eq!(s, t);

    assert_eq!(Tensor2::<f64, 2, 2>::from(Zero), Tensor2::default());
    assert_eq!(f64::from(Zero), 0.0);
}

#[test]
fn algebraic_decompositions() {
    let a = Tensor2::from([[1.0, 2.0, 0.0], [4.0, 5.0, 6.0], [-1.0, 8.0, 9.0]]);
    assert_eq!(sym(&a) + antisym(&a), a);
    assert_eq!(sym(&a), transpose(&sym(&a)));
    assert_eq!(antisym(&a), -transpose(&antisym(&a)));
    assert_scalar_eq!(tr(&dev(&a)), 0.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(tr(&a), 15.0);
}

#[test]
fn outer_norm_and_normalize() {
    let u: Tensor<f64, 2> = Tensor::new([3.0, 4.0]);
    let v: Tensor<f64, 3> = Tensor::new([1.0, 2.0, 3.0]);
    assert_eq!(outer(u, v), Tensor2::from([[3.0, 6.0, 9.0], [4.0, 8.0, 12.0]]));
    assert_scalar_eq!(sqnorm(u), 25.0);
    assert_scalar_eq!(norm(u), 5.0);
    let n = normalize(u);
    assert_scalar_eq!(n[0], 0.6, comp = abs, tol = 1e-15);
    assert_scalar_eq!(n[1], 0.8, comp = abs, tol = 1e-15);
}

#[test]
fn outer_products_of_scalars_and_tensors() {
    let u: Tensor<f64, 2> = Tensor::new([3.0, 4.0]);
    let a = Tensor2::from([[1.0, 2.0], [0.5, -1.0]]);
    assert_eq!(outer(2.0_f64, 3.0_f64), 6.0);
    assert_eq!(outer(2.0_f64, u), Tensor::new([6.0, 8.0]));
    assert_eq!(outer(u, 2.0_f64), Tensor::new([6.0, 8.0]));
    assert_eq!(outer(2.0_f64, a), a * 2.0_f64);

    // Matrix times vector gives a rank-3 tensor indexed (i, j, k)
    let t: Tensor3<f64, 2, 2, 2> = outer(a, u);
    let s: Tensor3<f64, 2, 2, 2> = outer(u, a);
    for (i, j, k) in itertools::iproduct!(0..2, 0..2, 0..2) {
        assert_eq!(t[i][j][k], a[i][j] * u[k]);
        assert_eq!(s[i][j][k], u[i] * a[j][k]);
    }

    // Rank 2 with rank 2 gives a rank-4 tensor
    let aa: Tensor4<f64, 2, 2, 2, 2> = outer(a, a);
    assert_eq!(aa[1][0][0][1], a[1][0] * a[0][1]);
    assert_eq!(outer(Zero, a), Zero);
}

#[test]
fn scalar_operations() {
    let mut a = Tensor::new([2.0, -4.0]);
    assert_eq!(a / 2.0, Tensor::new([1.0, -2.0]));
    assert_eq!(2.0 * a, a * 2.0);
    a *= 0.5;
    assert_eq!(a, Tensor::new([1.0, -2.0]));
    a += Tensor::new([1.0, 1.0]);
    a -= Tensor::new([0.5, 0.5]);
    assert_eq!(a, Tensor::new([1.5, -1.5]));
}

#[test]
fn determinant() {
    assert_scalar_eq!(det(&Tensor2::from([[2.0]])), 2.0);
    assert_scalar_eq!(det(&Tensor2::from([[1.0, 2.0], [3.0, 4.0]])), -2.0);
    let a3 = Tensor2::from([[2.0, 0.0, 1.0], [1.0, 3.0, 2.0], [1.0, 1.0, 2.0]]);
    assert_scalar_eq!(det(&a3), 6.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(det(&identity::<6>()), 1.0);

    // Row swap of the identity
    let mut p = identity::<4>();
    p[0] = Tensor::new([0.0, 1.0, 0.0, 0.0]);
    p[1] = Tensor::new([1.0, 0.0, 0.0, 0.0]);
    assert_scalar_eq!(det(&p), -1.0);

    let a4 = Tensor2::from([
        [1.0, 0.0, 2.0, -1.0],
        [3.0, 0.0, 0.0, 5.0],
        [2.0, 1.0, 4.0, -3.0],
        [1.0, 0.0, 5.0, 0.0],
    ]);
    assert_scalar_eq!(det(&a4), 30.0, comp = abs, tol = 1e-12);

    let singular = Tensor2::from([
        [1.0, 2.0, 3.0, 4.0],
        [2.0, 4.0, 6.0, 8.0],
        [0.0, 1.0, 0.0, 1.0],
        [1.0, 0.0, 0.0, 1.0],
    ]);
    assert_scalar_eq!(det(&singular), 0.0, comp = abs, tol = 1e-12);
}

#[test]
fn closed_form_inverses_match_nalgebra() {
    let a2 = Tensor2::from([[4.0, 1.0], [2.0, 3.0]]);
    let a3 = Tensor2::from([[2.0, 0.0, 1.0], [1.0, 3.0, 2.0], [1.0, 1.0, 2.0]]);
    let expected2 = Matrix2::from(a2).try_inverse().unwrap();
    let expected3 = Matrix3::from(a3).try_inverse().unwrap();
    assert_matrix_eq!(to_matrix(inv(&a2)), expected2, comp = abs, tol = 1e-14);
    assert_matrix_eq!(to_matrix(inv(&a3)), expected3, comp = abs, tol = 1e-14);
}

#[test]
fn singular_inverse_is_not_finite() {
    let a = Tensor2::from([[1.0, 2.0], [2.0, 4.0]]);
    assert!(inv(&a).iter().flat_map(|row| row.iter()).any(|x| !x.is_finite()));
}

#[test]
fn linear_solve_3x3() {
    let a = Tensor2::from([[0.0, 2.0, 1.0], [1.0, -1.0, 0.0], [3.0, 0.0, 1.0]]);
    let b = Tensor::new([1.0, 2.0, 3.0]);
    let x = linear_solve(&a, &b);
    let residual = dot(a, x) - b;
    assert_matrix_eq!(Vector3::from(residual), Vector3::<f64>::zeros(), comp = abs, tol = 1e-14);
}

#[test]
fn sylvester_criterion() {
    let spd = Tensor2::from([[2.0, -1.0, 0.0], [-1.0, 2.0, -1.0], [0.0, -1.0, 2.0]]);
    assert!(is_symmetric_and_positive_definite(&spd));

    let indefinite = Tensor2::from([[1.0, 2.0], [2.0, 1.0]]);
    assert!(!is_symmetric_and_positive_definite(&indefinite));

    let nonsymmetric = Tensor2::from([[2.0, 1.0], [0.0, 2.0]]);
    assert!(!is_symmetric_and_positive_definite(&nonsymmetric));

    // Positive semi-definite matrices are rejected
    let semidefinite = Tensor2::from([[1.0, 1.0], [1.0, 1.0]]);
    assert!(!is_symmetric_and_positive_definite(&semidefinite));

    assert!(is_symmetric(&Tensor2::from([[1.0, 2.0 + 1e-9], [2.0, 1.0]]), 1e-8));
    assert!(!is_symmetric(&Tensor2::from([[1.0, 2.1], [2.0, 1.0]]), 1e-8));
}

#[test]
fn display_and_chop() {
    let a = Tensor2::from([[1.0, 2.5], [-3.0, 4.0]]);
    assert_eq!(format!("{}", a), "{{1, 2.5}, {-3, 4}}");
    assert_eq!(format!("{}", Zero), "zero");

    let b = chop(Tensor::new([1e-12, -1e-11, 0.5]));
    assert_eq!(b, Tensor::new([0.0, 0.0, 0.5]));
}

#[test]
fn nalgebra_interop() {
    let m = Matrix2::new(1.0, 2.0, 3.0, 4.0);
    let t = Tensor2::from(m);
    assert_eq!(t, Tensor2::from([[1.0, 2.0], [3.0, 4.0]]));
    assert_eq!(Matrix2::from(t), m);
    let p = nalgebra::Point3::new(1.0, 2.0, 3.0);
    assert_eq!(Tensor::from(p), Tensor::new([1.0, 2.0, 3.0]));
    assert_eq!(Vector3::from(Tensor::new([1.0, 2.0, 3.0])), p.coords);
}

#[test]
fn shape_flat_layout_is_row_major() {
    let a = Tensor2::from([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    assert_eq!(<Tensor2<f64, 2, 3> as Shape>::SIZE, 6);
    let flat: Vec<f64> = (0..6).map(|i| a.flat(i)).collect();
    assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(Tensor2::<f64, 2, 3>::unit(4), Tensor2::from([[0.0, 0.0, 0.0], [0.0, 1.0, 0.0]]));
}

proptest! {
    #[test]
    fn dot_is_associative(a in matrix::<2, 3>(), b in matrix::<3, 4>(), c in matrix::<4, 2>()) {
        let left = dot(dot(a, b), c);
        let right = dot(a, dot(b, c));
        assert_matrix_eq!(to_matrix(left), to_matrix(right), comp = abs, tol = 1e-9);
    }

    #[test]
    fn dot_with_vector_is_associative(a in matrix::<3, 3>(), b in matrix::<3, 3>(), v in tensor::<3>()) {
        let left = dot(dot(a, b), v);
        let right = dot(a, dot(b, v));
        assert_matrix_eq!(Vector3::from(left), Vector3::from(right), comp = abs, tol = 1e-9);
    }

    #[test]
    fn inverse_2x2(a in invertible_matrix::<2>()) {
        assert_matrix_eq!(to_matrix(dot(a, inv(&a))), to_matrix(identity::<2>()), comp = abs, tol = 1e-10);
        assert_matrix_eq!(to_matrix(dot(inv(&a), a)), to_matrix(identity::<2>()), comp = abs, tol = 1e-10);
    }

    #[test]
    fn inverse_3x3(a in invertible_matrix::<3>()) {
        assert_matrix_eq!(to_matrix(dot(a, inv(&a))), to_matrix(identity::<3>()), comp = abs, tol = 1e-10);
        assert_matrix_eq!(to_matrix(dot(inv(&a), a)), to_matrix(identity::<3>()), comp = abs, tol = 1e-10);
    }

    #[test]
    fn inverse_5x5(a in invertible_matrix::<5>()) {
        assert_matrix_eq!(to_matrix(dot(a, inv(&a))), to_matrix(identity::<5>()), comp = abs, tol = 1e-10);
        assert_matrix_eq!(to_matrix(dot(inv(&a), a)), to_matrix(identity::<5>()), comp = abs, tol = 1e-10);
    }

    #[test]
    fn determinant_by_elimination_matches_nalgebra(a in invertible_matrix::<5>()) {
        let expected = to_matrix(a).determinant();
        assert_scalar_eq!(det(&a), expected, comp = abs, tol = 1e-8);
    }

    #[test]
    fn linear_solve_inverts_matrix_vector_product(a in invertible_matrix::<4>(), x in tensor::<4>()) {
        let b = dot(a, x);
        let x_solved = linear_solve(&a, &b);
        for i in 0..4 {
            assert_scalar_eq!(x_solved[i], x[i], comp = abs, tol = 1e-10);
        }
    }

    #[test]
    fn spd_matrices_pass_sylvester_criterion(a in spd_matrix::<4>()) {
        prop_assert!(is_symmetric_and_positive_definite(&a));
        prop_assert!(!is_symmetric_and_positive_definite(&(-a)));
    }

    #[test]
    fn zero_absorbs_and_is_neutral(a in matrix::<3, 2>()) {
        prop_assert_eq!(a + Zero, a);
        prop_assert_eq!(Zero + a, a);
        prop_assert_eq!(a * Zero, Zero);
    }
}
