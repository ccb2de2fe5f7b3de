use eyre::ensure;
use nalgebra::{DMatrixView, DMatrixViewMut};

/// Dense element Jacobian blocks of an integral, one `rows x cols` block per element.
///
/// Rows correspond to element-local test degrees of freedom, columns to element-local trial
/// degrees of freedom. Blocks are stored contiguously and in column-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementGradients {
    num_elements: usize,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ElementGradients {
    pub fn zeros(num_elements: usize, rows: usize, cols: usize) -> Self {
        Self {
            num_elements,
            rows,
            cols,
            data: vec![0.0; num_elements * rows * cols],
        }
    }

    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn element(&self, e: usize) -> DMatrixView<f64> {
        let n = self.rows * self.cols;
        DMatrixView::from_slice(&self.data[e * n..(e + 1) * n], self.rows, self.cols)
    }

    pub fn element_mut(&mut self, e: usize) -> DMatrixViewMut<f64> {
        let n = self.rows * self.cols;
        DMatrixViewMut::from_slice(&mut self.data[e * n..(e + 1) * n], self.rows, self.cols)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    pub(crate) fn ensure_dimensions(&self, num_elements: usize, rows: usize, cols: usize) -> eyre::Result<()> {
        ensure!(
            (self.num_elements, self.rows, self.cols) == (num_elements, rows, cols),
            "Element gradient buffer has dimensions {} x {} x {}, expected {} x {} x {}",
            self.num_elements,
            self.rows,
            self.cols,
            num_elements,
            rows,
            cols
        );
        Ok(())
    }
}
