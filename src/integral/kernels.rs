//! Element loops shared by domain and boundary integrals.
//!
//! An [`ElementKernel`] knows how to evaluate a q-function on all quadrature points of an
//! element. [`IntegralKernels`] erases the q-function and geometry types by wrapping a kernel in
//! one closure per operation and trial field, each holding the derivative cache it needs.

use crate::integral::{
    DerivativeCache, ElementGradients, ExecutionSpace, FieldArg, FieldVisitor, IntegralOptions, TrialArgs,
};
use crate::space::ShapeTable;
use crate::tensor::{Lift, Lifted, Shape, Tensor, Tensor2};
use eyre::ensure;
use log::{debug, warn};
use rayon::prelude::*;
use std::sync::Arc;

/// Evaluation of a q-function on elements, with element-local degree-of-freedom arrays as
/// input and output.
///
/// All methods accumulate into their output. Inputs and outputs hold the degrees of freedom of
/// element `e` in the `e`-th contiguous block. Derivatives with respect to trial field `field`
/// are stored with leaves of the field argument type `A`, one entry per quadrature point.
pub(crate) trait ElementKernel<const K: usize>: Send + Sync + 'static {
    type Args: TrialArgs<K>;
    type Output: Lift;

    fn num_elements(&self) -> usize;

    fn points_per_element(&self) -> usize;

    fn test_dofs_per_element(&self) -> usize;

    fn trial_dofs_per_element(&self, field: usize) -> usize;

    fn evaluate(&self, inputs: &[&[f64]; K], output: &mut [f64]);

    /// Evaluates with the field argument at flat offset `offset` differentiated, storing the
    /// derivatives at all points.
    fn evaluate_with_derivatives<A: FieldArg>(
        &self,
        offset: usize,
        inputs: &[&[f64]; K],
        output: &mut [f64],
        derivatives: &mut [Lifted<Self::Output, A>],
    );

    fn action_of_gradient<A: FieldArg>(
        &self,
        field: usize,
        derivatives: &[Lifted<Self::Output, A>],
        direction: &[f64],
        output: &mut [f64],
    );

    fn element_gradient<A: FieldArg>(
        &self,
        field: usize,
        derivatives: &[Lifted<Self::Output, A>],
        gradients: &mut ElementGradients,
    );
}

type Evaluation<const K: usize> = Box<dyn Fn(&[&[f64]; K], &mut [f64]) + Send + Sync>;
type GradientAction = Box<dyn Fn(&[f64], &mut [f64]) + Send + Sync>;
type ElementGradient = Box<dyn Fn(&mut ElementGradients) + Send + Sync>;
type Status = Box<dyn Fn() -> bool + Send + Sync>;

/// Kernels operating on the derivative cache of a single trial field.
struct FieldKernels<const K: usize> {
    trial_dofs_per_element: usize,
    evaluation_with_derivatives: Evaluation<K>,
    action_of_gradient: GradientAction,
    element_gradient: ElementGradient,
    is_populated: Status,
}

/// Builds the [`FieldKernels`] of each trial field with a cache of the matching derivative type.
struct FieldKernelBuilder<E, const K: usize> {
    kernel: Arc<E>,
}

impl<E: ElementKernel<K>, const K: usize> FieldVisitor for FieldKernelBuilder<E, K> {
    type Output = FieldKernels<K>;

    fn visit<A: FieldArg>(&mut self, field: usize, offset: usize) -> FieldKernels<K> {
        let cache: Arc<DerivativeCache<Lifted<E::Output, A>>> = Arc::new(DerivativeCache::new(
            self.kernel.num_elements(),
            self.kernel.points_per_element(),
        ));

        let evaluation_with_derivatives = {
            let kernel = Arc::clone(&self.kernel);
            let cache = Arc::clone(&cache);
            Box::new(move |inputs: &[&[f64]; K], output: &mut [f64]| {
                debug!("Evaluating derivatives with respect to trial field {field}");
                let mut derivatives = cache.write();
                kernel.evaluate_with_derivatives::<A>(offset, inputs, output, &mut derivatives);
                cache.mark_populated();
            }) as Evaluation<K>
        };

        let action_of_gradient = {
            let kernel = Arc::clone(&self.kernel);
            let cache = Arc::clone(&cache);
            Box::new(move |direction: &[f64], output: &mut [f64]| {
                warn_if_unpopulated(&cache, field);
                kernel.action_of_gradient::<A>(field, &cache.read(), direction, output)
            }) as GradientAction
        };

        let element_gradient = {
            let kernel = Arc::clone(&self.kernel);
            let cache = Arc::clone(&cache);
            Box::new(move |gradients: &mut ElementGradients| {
                warn_if_unpopulated(&cache, field);
                kernel.element_gradient::<A>(field, &cache.read(), gradients)
            }) as ElementGradient
        };

        FieldKernels {
            trial_dofs_per_element: self.kernel.trial_dofs_per_element(field),
            evaluation_with_derivatives,
            action_of_gradient,
            element_gradient,
            is_populated: Box::new(move || cache.is_populated()),
        }
    }
}

/// Type-erased kernels of an integral with `K` trial fields.
pub(crate) struct IntegralKernels<const K: usize> {
    num_elements: usize,
    test_dofs_per_element: usize,
    evaluation: Evaluation<K>,
    fields: [FieldKernels<K>; K],
}

impl<const K: usize> IntegralKernels<K> {
    pub fn new<E: ElementKernel<K>>(kernel: E) -> Self {
        let kernel = Arc::new(kernel);
        let fields = <E::Args as TrialArgs<K>>::visit_fields(&mut FieldKernelBuilder::<E, K> {
            kernel: Arc::clone(&kernel),
        });

        let evaluation: Evaluation<K> = {
            let kernel = Arc::clone(&kernel);
            Box::new(move |inputs: &[&[f64]; K], output: &mut [f64]| kernel.evaluate(inputs, output))
        };

        Self {
            num_elements: kernel.num_elements(),
            test_dofs_per_element: kernel.test_dofs_per_element(),
            evaluation,
            fields,
        }
    }

    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    pub fn test_dofs_per_element(&self) -> usize {
        self.test_dofs_per_element
    }

    pub fn trial_dofs_per_element(&self) -> [usize; K] {
        std::array::from_fn(|k| self.fields[k].trial_dofs_per_element)
    }

    pub fn trial_dofs(&self, which: usize) -> eyre::Result<usize> {
        Ok(self.field(which)?.trial_dofs_per_element)
    }

    pub fn has_derivatives(&self, which: usize) -> bool {
        self.fields
            .get(which)
            .is_some_and(|field| (field.is_populated)())
    }

    pub fn mult(&self, inputs: &[&[f64]; K], output: &mut [f64], which: Option<usize>) -> eyre::Result<()> {
        for (k, (input, field)) in inputs.iter().zip(&self.fields).enumerate() {
            let expected = self.num_elements * field.trial_dofs_per_element;
            ensure!(
                input.len() == expected,
                "Input for trial field {k} has length {}, expected {expected}",
                input.len()
            );
        }
        self.ensure_output_len(output.len())?;
        match which {
            None => (self.evaluation)(inputs, output),
            Some(which) => (self.field(which)?.evaluation_with_derivatives)(inputs, output),
        }
        Ok(())
    }

    pub fn gradient_mult(&self, direction: &[f64], output: &mut [f64], which: usize) -> eyre::Result<()> {
        let field = self.field(which)?;
        let expected = self.num_elements * field.trial_dofs_per_element;
        ensure!(
            direction.len() == expected,
            "Direction has length {}, expected {expected}",
            direction.len()
        );
        self.ensure_output_len(output.len())?;
        (field.action_of_gradient)(direction, output);
        Ok(())
    }

    pub fn compute_element_gradients(&self, gradients: &mut ElementGradients, which: usize) -> eyre::Result<()> {
        let field = self.field(which)?;
        gradients.ensure_dimensions(
            self.num_elements,
            self.test_dofs_per_element,
            field.trial_dofs_per_element,
        )?;
        (field.element_gradient)(gradients);
        Ok(())
    }

    fn field(&self, which: usize) -> eyre::Result<&FieldKernels<K>> {
        ensure!(which < K, "Trial field index {which} out of bounds for integral with {K} trial fields");
        Ok(&self.fields[which])
    }

    fn ensure_output_len(&self, len: usize) -> eyre::Result<()> {
        ensure!(
            len == self.num_elements * self.test_dofs_per_element,
            "Output has length {len}, expected {}",
            self.num_elements * self.test_dofs_per_element
        );
        Ok(())
    }
}

fn warn_if_unpopulated<T>(cache: &DerivativeCache<T>, which: usize) {
    if !cache.is_populated() {
        warn!(
            "Derivatives with respect to trial field {which} are used before any derivative \
             evaluation. Results are computed from zero derivatives."
        );
    }
}

/// Calls `f(e, chunk)` for each element `e` and its chunk of `output`.
pub(crate) fn for_each_element<T, F>(options: &IntegralOptions, output: &mut [T], chunk_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    match options.execution_space {
        ExecutionSpace::Cpu => output
            .par_chunks_mut(chunk_len)
            .with_min_len(options.min_elements_per_task)
            .enumerate()
            .for_each(|(e, chunk)| f(e, chunk)),
        _ => output
            .chunks_mut(chunk_len)
            .enumerate()
            .for_each(|(e, chunk)| f(e, chunk)),
    }
}

/// Like [`for_each_element`], with an additional per-element chunk of `extra`.
pub(crate) fn for_each_element_with<T, U, F>(
    options: &IntegralOptions,
    output: &mut [T],
    chunk_len: usize,
    extra: &mut [U],
    extra_chunk_len: usize,
    f: F,
) where
    T: Send,
    U: Send,
    F: Fn(usize, &mut [T], &mut [U]) + Send + Sync,
{
    match options.execution_space {
        ExecutionSpace::Cpu => output
            .par_chunks_mut(chunk_len)
            .zip(extra.par_chunks_mut(extra_chunk_len))
            .with_min_len(options.min_elements_per_task)
            .enumerate()
            .for_each(|(e, (chunk, extra))| f(e, chunk, extra)),
        _ => output
            .chunks_mut(chunk_len)
            .zip(extra.chunks_mut(extra_chunk_len))
            .enumerate()
            .for_each(|(e, (chunk, extra))| f(e, chunk, extra)),
    }
}

/// The physical gradient `J^-T ∇ξ φ` of a shape function.
pub(crate) fn physical_gradient<const D: usize>(
    reference: &[f64],
    jacobian_inv: &Tensor2<f64, D, D>,
) -> Tensor<f64, D> {
    Tensor::from_fn(|j| (0..D).map(|i| reference[i] * jacobian_inv[i][j]).sum())
}

/// Interpolates values and physical gradients of a field with the given number of components.
///
/// The result holds the component values followed by the gradient, row by row.
pub(crate) fn interpolate_field<A: Shape, const D: usize>(
    table: &ShapeTable,
    q: usize,
    jacobian_inv: &Tensor2<f64, D, D>,
    components: usize,
    dofs: &[f64],
) -> A {
    let mut arg = A::default();
    interpolate_field_into(&mut arg, 0, table, q, jacobian_inv, components, dofs);
    arg
}

/// Like [`interpolate_field`], adding into the flat entries of `args` starting at `offset`.
pub(crate) fn interpolate_field_into<A: Shape, const D: usize>(
    args: &mut A,
    offset: usize,
    table: &ShapeTable,
    q: usize,
    jacobian_inv: &Tensor2<f64, D, D>,
    components: usize,
    dofs: &[f64],
) {
    for (a, phi) in table.values(q).iter().enumerate() {
        let grad = physical_gradient(table.gradient(q, a), jacobian_inv);
        for (c, u) in dofs[a * components..(a + 1) * components].iter().enumerate() {
            *args.flat_mut(offset + c) += phi * u;
            for j in 0..D {
                *args.flat_mut(offset + components + c * D + j) += grad[j] * u;
            }
        }
    }
}

/// The field obtained from a unit coefficient for component `c` of node `a`.
pub(crate) fn basis_field<A: Shape, const D: usize>(
    table: &ShapeTable,
    q: usize,
    jacobian_inv: &Tensor2<f64, D, D>,
    components: usize,
    a: usize,
    c: usize,
) -> A {
    let mut arg = A::default();
    let grad = physical_gradient(table.gradient(q, a), jacobian_inv);
    *arg.flat_mut(c) = table.values(q)[a];
    for j in 0..D {
        *arg.flat_mut(components + c * D + j) = grad[j];
    }
    arg
}

/// Adds `weight * (source · φ + flux : ∇φ)` for every test function `φ` to `output`.
pub(crate) fn integrate_field<O: Shape, const D: usize>(
    table: &ShapeTable,
    q: usize,
    jacobian_inv: &Tensor2<f64, D, D>,
    components: usize,
    weight: f64,
    integrand: &O,
    output: &mut [f64],
) {
    for (a, phi) in table.values(q).iter().enumerate() {
        let grad = physical_gradient(table.gradient(q, a), jacobian_inv);
        for (c, out) in output[a * components..(a + 1) * components]
            .iter_mut()
            .enumerate()
        {
            let mut contribution = integrand.flat(c) * phi;
            for j in 0..D {
                contribution += integrand.flat(components + c * D + j) * grad[j];
            }
            *out += weight * contribution;
        }
    }
}

/// Interpolates the values of a field with the given number of components into the flat entries
/// of `args` starting at `offset`.
pub(crate) fn interpolate_values_into<A: Shape>(
    args: &mut A,
    offset: usize,
    table: &ShapeTable,
    q: usize,
    components: usize,
    dofs: &[f64],
) {
    for (a, phi) in table.values(q).iter().enumerate() {
        for (c, u) in dofs[a * components..(a + 1) * components].iter().enumerate() {
            *args.flat_mut(offset + c) += phi * u;
        }
    }
}

/// Adds `weight * source · φ` for every test function `φ` to `output`.
pub(crate) fn integrate_values<O: Shape>(
    table: &ShapeTable,
    q: usize,
    components: usize,
    weight: f64,
    integrand: &O,
    output: &mut [f64],
) {
    for (a, phi) in table.values(q).iter().enumerate() {
        for (c, out) in output[a * components..(a + 1) * components]
            .iter_mut()
            .enumerate()
        {
            *out += weight * integrand.flat(c) * phi;
        }
    }
}
