//! Per-element geometric data at quadrature points.
//!
//! Integrals consume Jacobians, physical coordinates and (on boundaries) normals that are
//! normally provided by the mesh layer. The constructors from element vertices cover the
//! common case of bilinear quadrilaterals, trilinear hexahedra and their boundary facets.

use crate::tensor::{det, make_tensor, Tensor, Tensor2};
use eyre::{ensure, eyre};
use fenris_quadrature::tensor::{hexahedron_gauss, quadrilateral_gauss};
use fenris_quadrature::univariate::gauss;
use itertools::izip;
use nalgebra::{Point2, Point3, Vector3};

/// Jacobians `J_ij = dx_i / dxi_j` and physical positions at all quadrature points of all
/// elements, stored element by element.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometricFactors<const D: usize> {
    num_elements: usize,
    points_per_element: usize,
    jacobians: Vec<Tensor2<f64, D, D>>,
    positions: Vec<Tensor<f64, D>>,
}

impl<const D: usize> GeometricFactors<D> {
    /// Validates and collects geometric factors.
    ///
    /// Returns an error if the lengths do not match `num_elements * points_per_element`, or if
    /// any Jacobian is singular.
    pub fn new(
        num_elements: usize,
        points_per_element: usize,
        jacobians: Vec<Tensor2<f64, D, D>>,
        positions: Vec<Tensor<f64, D>>,
    ) -> eyre::Result<Self> {
        let expected = num_elements * points_per_element;
        ensure!(
            jacobians.len() == expected,
            "Expected {expected} Jacobians, got {}",
            jacobians.len()
        );
        ensure!(
            positions.len() == expected,
            "Expected {expected} positions, got {}",
            positions.len()
        );
        if let Some(index) = jacobians.iter().position(|j| det(j) == 0.0) {
            return Err(eyre!(
                "Singular element Jacobian encountered (element {}, point {})",
                index / points_per_element,
                index % points_per_element
            ));
        }
        Ok(Self {
            num_elements,
            points_per_element,
            jacobians,
            positions,
        })
    }

    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    pub fn points_per_element(&self) -> usize {
        self.points_per_element
    }

    pub fn jacobians(&self) -> &[Tensor2<f64, D, D>] {
        &self.jacobians
    }

    pub fn positions(&self) -> &[Tensor<f64, D>] {
        &self.positions
    }

    /// Jacobians of element `e`.
    pub fn element_jacobians(&self, e: usize) -> &[Tensor2<f64, D, D>] {
        &self.jacobians[e * self.points_per_element..(e + 1) * self.points_per_element]
    }

    /// Positions of the quadrature points of element `e`.
    pub fn element_positions(&self, e: usize) -> &[Tensor<f64, D>] {
        &self.positions[e * self.points_per_element..(e + 1) * self.points_per_element]
    }
}

impl GeometricFactors<2> {
    /// Geometric factors of bilinear quadrilaterals at `points_per_dim^2` Gauss points.
    ///
    /// Vertices are given in counter-clockwise order, starting from the vertex mapped from
    /// the reference corner `(-1, -1)`.
    pub fn from_quadrilaterals(elements: &[[Point2<f64>; 4]], points_per_dim: usize) -> eyre::Result<Self> {
        let (_, points) = quadrilateral_gauss(points_per_dim);
        let reference_vertices = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
        let mut jacobians = Vec::with_capacity(elements.len() * points.len());
        let mut positions = Vec::with_capacity(elements.len() * points.len());

        for vertices in elements {
            for xi in &points {
                let mut x = Tensor::<f64, 2>::default();
                let mut j = Tensor2::<f64, 2, 2>::default();
                for (v, xi_a) in izip!(vertices, &reference_vertices) {
                    let v = Tensor::from(*v);
                    // Bilinear shape function (1 + xi_a xi)(1 + eta_a eta) / 4 and its gradient
                    let phi = [0.5 * (1.0 + xi_a[0] * xi[0]), 0.5 * (1.0 + xi_a[1] * xi[1])];
                    let dphi = [0.5 * xi_a[0] * phi[1], 0.5 * xi_a[1] * phi[0]];
                    x += v * (phi[0] * phi[1]);
                    let dj: Tensor2<f64, 2, 2> = make_tensor(|r, c| v[r] * dphi[c]);
                    j += dj;
                }
                jacobians.push(j);
                positions.push(x);
            }
        }

        Self::new(elements.len(), points.len(), jacobians, positions)
    }
}

impl GeometricFactors<3> {
    /// Geometric factors of trilinear hexahedra at `points_per_dim^3` Gauss points.
    ///
    /// The first four vertices form the face mapped from `zeta = -1` in counter-clockwise order
    /// (seen from the opposite face), the last four the face mapped from `zeta = 1`.
    pub fn from_hexahedra(elements: &[[Point3<f64>; 8]], points_per_dim: usize) -> eyre::Result<Self> {
        let (_, points) = hexahedron_gauss(points_per_dim);
        let reference_vertices = [
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [1.0, 1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, 1.0],
        ];
        let mut jacobians = Vec::with_capacity(elements.len() * points.len());
        let mut positions = Vec::with_capacity(elements.len() * points.len());

        for vertices in elements {
            for xi in &points {
                let mut x = Tensor::<f64, 3>::default();
                let mut j = Tensor2::<f64, 3, 3>::default();
                for (v, xi_a) in izip!(vertices, &reference_vertices) {
                    let v = Tensor::from(*v);
                    let phi: [f64; 3] = std::array::from_fn(|k| 0.5 * (1.0 + xi_a[k] * xi[k]));
                    let dphi = [
                        0.5 * xi_a[0] * phi[1] * phi[2],
                        0.5 * xi_a[1] * phi[0] * phi[2],
                        0.5 * xi_a[2] * phi[0] * phi[1],
                    ];
                    x += v * (phi[0] * phi[1] * phi[2]);
                    let dj: Tensor2<f64, 3, 3> = make_tensor(|r, c| v[r] * dphi[c]);
                    j += dj;
                }
                jacobians.push(j);
                positions.push(x);
            }
        }

        Self::new(elements.len(), points.len(), jacobians, positions)
    }
}

/// Surface measure scaling, physical positions and unit outward normals at all quadrature
/// points of all boundary elements.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryFactors<const D: usize> {
    num_elements: usize,
    points_per_element: usize,
    determinants: Vec<f64>,
    positions: Vec<Tensor<f64, D>>,
    normals: Vec<Tensor<f64, D>>,
}

impl<const D: usize> BoundaryFactors<D> {
    pub fn new(
        num_elements: usize,
        points_per_element: usize,
        determinants: Vec<f64>,
        positions: Vec<Tensor<f64, D>>,
        normals: Vec<Tensor<f64, D>>,
    ) -> eyre::Result<Self> {
        let expected = num_elements * points_per_element;
        ensure!(
            determinants.len() == expected,
            "Expected {expected} surface determinants, got {}",
            determinants.len()
        );
        ensure!(
            positions.len() == expected,
            "Expected {expected} positions, got {}",
            positions.len()
        );
        ensure!(
            normals.len() == expected,
            "Expected {expected} normals, got {}",
            normals.len()
        );
        Ok(Self {
            num_elements,
            points_per_element,
            determinants,
            positions,
            normals,
        })
    }

    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    pub fn points_per_element(&self) -> usize {
        self.points_per_element
    }

    pub fn element_determinants(&self, e: usize) -> &[f64] {
        &self.determinants[e * self.points_per_element..(e + 1) * self.points_per_element]
    }

    pub fn element_positions(&self, e: usize) -> &[Tensor<f64, D>] {
        &self.positions[e * self.points_per_element..(e + 1) * self.points_per_element]
    }

    pub fn element_normals(&self, e: usize) -> &[Tensor<f64, D>] {
        &self.normals[e * self.points_per_element..(e + 1) * self.points_per_element]
    }
}

impl BoundaryFactors<2> {
    /// Boundary factors of straight segments `[a, b]` at `points_per_dim` Gauss points.
    ///
    /// The domain is assumed to lie to the left of each segment, so that segments of a
    /// counter-clockwise oriented boundary get outward normals.
    pub fn from_segments(segments: &[[Point2<f64>; 2]], points_per_dim: usize) -> eyre::Result<Self> {
        let (_, points) = gauss(points_per_dim);
        let n = segments.len() * points.len();
        let (mut determinants, mut positions, mut normals) =
            (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));

        for [a, b] in segments {
            let tangent = b - a;
            let length = tangent.norm();
            ensure!(length > 0.0, "Degenerate boundary segment encountered");
            let normal = Tensor::new([tangent.y / length, -tangent.x / length]);
            for [xi] in &points {
                let x = a.coords * (0.5 * (1.0 - xi)) + b.coords * (0.5 * (1.0 + xi));
                determinants.push(0.5 * length);
                positions.push(Tensor::from(x));
                normals.push(normal);
            }
        }

        Self::new(segments.len(), points.len(), determinants, positions, normals)
    }
}

impl BoundaryFactors<3> {
    /// Boundary factors of bilinear quadrilateral faces at `points_per_dim^2` Gauss points.
    ///
    /// Vertices are ordered counter-clockwise when seen from outside the domain, so that the
    /// normal `dx/dxi x dx/deta` points outward.
    pub fn from_quadrilateral_faces(faces: &[[Point3<f64>; 4]], points_per_dim: usize) -> eyre::Result<Self> {
        let (_, points) = quadrilateral_gauss(points_per_dim);
        let reference_vertices = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
        let n = faces.len() * points.len();
        let (mut determinants, mut positions, mut normals) =
            (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));

        for vertices in faces {
            for xi in &points {
                let mut x = Vector3::zeros();
                let mut dx_dxi = Vector3::zeros();
                let mut dx_deta = Vector3::zeros();
                for (v, xi_a) in izip!(vertices, &reference_vertices) {
                    let phi = [0.5 * (1.0 + xi_a[0] * xi[0]), 0.5 * (1.0 + xi_a[1] * xi[1])];
                    x += v.coords * (phi[0] * phi[1]);
                    dx_dxi += v.coords * (0.5 * xi_a[0] * phi[1]);
                    dx_deta += v.coords * (0.5 * xi_a[1] * phi[0]);
                }
                let cross = dx_dxi.cross(&dx_deta);
                let area = cross.norm();
                ensure!(area > 0.0, "Degenerate boundary face encountered");
                determinants.push(area);
                positions.push(Tensor::from(x));
                normals.push(Tensor::from(cross / area));
            }
        }

        Self::new(faces.len(), points.len(), determinants, positions, normals)
    }
}
