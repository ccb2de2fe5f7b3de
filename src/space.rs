//! Function spaces and their reference-element shape function tables.
//!
//! Only the element-local view of a space is needed here: polynomial order, number of
//! components and the values and gradients of the shape functions at quadrature points of the
//! reference element `[-1, 1]^d`.
//!
//! Nodes of an order `p` element are the tensor products of the `p + 1` Gauss-Lobatto points,
//! enumerated lexicographically with the first coordinate running fastest. For fields with `C`
//! components, the element-local degree of freedom of component `c` at node `a` has index
//! `a * C + c`.

use eyre::{bail, eyre};
use fenris_quadrature::tensor::tensor_product;
use fenris_quadrature::univariate::{gauss, gauss_lobatto};
use fenris_quadrature::Rule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Element-local description of a finite element space.
pub trait FunctionSpace: Copy + Send + Sync + 'static {
    const ORDER: usize;
    const COMPONENTS: usize;

    fn order(&self) -> usize {
        Self::ORDER
    }

    fn components(&self) -> usize {
        Self::COMPONENTS
    }

    /// Number of element-local degrees of freedom on a reference element of dimension `dim`.
    fn dofs_per_element(&self, dim: usize) -> usize {
        Self::COMPONENTS * (Self::ORDER + 1).pow(dim as u32)
    }
}

/// Continuous Lagrange elements of order `P` with `C` components.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct H1<const P: usize, const C: usize>;

impl<const P: usize, const C: usize> FunctionSpace for H1<P, C> {
    const ORDER: usize = P;
    const COMPONENTS: usize = C;
}

/// Reference element geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Geometry {
    Segment,
    Quadrilateral,
    Hexahedron,
}

impl Geometry {
    /// Geometry of the volumetric elements of a mesh embedded in `dim` dimensions.
    pub fn domain(dim: usize) -> eyre::Result<Self> {
        match dim {
            2 => Ok(Self::Quadrilateral),
            3 => Ok(Self::Hexahedron),
            _ => Err(eyre!("No domain integral kernels available for dimension {dim}")),
        }
    }

    /// Geometry of the boundary elements of a mesh embedded in `dim` dimensions.
    pub fn boundary(dim: usize) -> eyre::Result<Self> {
        match dim {
            2 => Ok(Self::Segment),
            3 => Ok(Self::Quadrilateral),
            _ => Err(eyre!("No boundary integral kernels available for dimension {dim}")),
        }
    }

    pub fn reference_dim(&self) -> usize {
        match self {
            Self::Segment => 1,
            Self::Quadrilateral => 2,
            Self::Hexahedron => 3,
        }
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Segment => write!(f, "segment"),
            Self::Quadrilateral => write!(f, "quadrilateral"),
            Self::Hexahedron => write!(f, "hexahedron"),
        }
    }
}

/// Number of Gauss points per dimension used for a pair of test and trial spaces.
pub fn quadrature_points_per_dim(test_order: usize, trial_order: usize) -> usize {
    test_order.max(trial_order) + 1
}

/// One-dimensional Lagrange polynomials on a set of distinct nodes.
#[derive(Clone, Debug)]
pub struct LagrangeBasis1d {
    nodes: Vec<f64>,
}

impl LagrangeBasis1d {
    /// Basis of the given order with Gauss-Lobatto nodes.
    pub fn gauss_lobatto(order: usize) -> eyre::Result<Self> {
        if order == 0 {
            bail!("H1 spaces of order 0 are not supported");
        }
        let (_, points) = gauss_lobatto(order + 1)?;
        Ok(Self {
            nodes: points.into_iter().map(|[x]| x).collect(),
        })
    }

    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn value(&self, a: usize, xi: f64) -> f64 {
        let x_a = self.nodes[a];
        self.nodes
            .iter()
            .enumerate()
            .filter(|&(b, _)| b != a)
            .map(|(_, x_b)| (xi - x_b) / (x_a - x_b))
            .product()
    }

    pub fn derivative(&self, a: usize, xi: f64) -> f64 {
        let x_a = self.nodes[a];
        let mut sum = 0.0;
        for (c, x_c) in self.nodes.iter().enumerate().filter(|&(c, _)| c != a) {
            let product: f64 = self
                .nodes
                .iter()
                .enumerate()
                .filter(|&(b, _)| b != a && b != c)
                .map(|(_, x_b)| (xi - x_b) / (x_a - x_b))
                .product();
            sum += product / (x_a - x_c);
        }
        sum
    }
}

/// Shape function values and reference gradients at the Gauss points of a reference element.
///
/// Point `q` and node `a` are both enumerated with the first coordinate running fastest.
#[derive(Clone, Debug)]
pub struct ShapeTable {
    dim: usize,
    num_nodes: usize,
    weights: Vec<f64>,
    // (point, node)
    values: Vec<f64>,
    // (point, node, reference coordinate)
    gradients: Vec<f64>,
}

impl ShapeTable {
    /// Tabulates the order `order` tensor-product basis in `dim` dimensions at
    /// `points_per_dim^dim` Gauss points.
    pub fn new(dim: usize, order: usize, points_per_dim: usize) -> eyre::Result<Self> {
        let basis = LagrangeBasis1d::gauss_lobatto(order)?;
        let rule1d = gauss(points_per_dim);
        let (weights, points) = match dim {
            1 => flatten_rule(rule1d),
            2 => flatten_rule(tensor_product::<2>(&rule1d)),
            3 => flatten_rule(tensor_product::<3>(&rule1d)),
            _ => bail!("Unsupported reference dimension {dim}"),
        };

        let n = basis.num_nodes();
        let num_nodes = n.pow(dim as u32);
        let num_points = weights.len();
        let mut values = Vec::with_capacity(num_points * num_nodes);
        let mut gradients = Vec::with_capacity(num_points * num_nodes * dim);

        for xi in points.chunks_exact(dim) {
            for node in 0..num_nodes {
                let multi_index = multi_index(node, n, dim);
                let phi_1d: Vec<f64> = (0..dim).map(|k| basis.value(multi_index[k], xi[k])).collect();
                values.push(phi_1d.iter().product());
                for k in 0..dim {
                    let grad_k: f64 = (0..dim)
                        .map(|l| {
                            if l == k {
                                basis.derivative(multi_index[l], xi[l])
                            } else {
                                phi_1d[l]
                            }
                        })
                        .product();
                    gradients.push(grad_k);
                }
            }
        }

        Ok(Self {
            dim,
            num_nodes,
            weights,
            values,
            gradients,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_points(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Values of all shape functions at point `q`.
    pub fn values(&self, q: usize) -> &[f64] {
        &self.values[q * self.num_nodes..(q + 1) * self.num_nodes]
    }

    /// Reference gradient of shape function `a` at point `q`.
    pub fn gradient(&self, q: usize, a: usize) -> &[f64] {
        let offset = (q * self.num_nodes + a) * self.dim;
        &self.gradients[offset..offset + self.dim]
    }
}

/// Splits a rule into its weights and its points in flat coordinate layout.
fn flatten_rule<const D: usize>((weights, points): Rule<D>) -> (Vec<f64>, Vec<f64>) {
    (weights, points.into_iter().flatten().collect())
}

fn multi_index(mut flat: usize, n: usize, dim: usize) -> [usize; 3] {
    let mut index = [0; 3];
    for entry in index.iter_mut().take(dim) {
        *entry = flat % n;
        flat /= n;
    }
    index
}
