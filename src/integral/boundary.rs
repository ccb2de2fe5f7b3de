use crate::dual::{apply_gradient, collapse_gradient, collapse_value, Dual};
use crate::geometry::BoundaryFactors;
use crate::integral::kernels::{
    for_each_element, for_each_element_with, integrate_values, interpolate_values_into, ElementKernel,
    IntegralKernels,
};
use crate::integral::{
    seed_field, BoundaryQFunction, ElementGradients, FieldArg, IntegralOptions, TrialArgs, TrialSpaces,
};
use crate::space::{quadrature_points_per_dim, FunctionSpace, Geometry, ShapeTable};
use crate::tensor::{Lift, Lifted, Shape};
use eyre::ensure;
use itertools::{iproduct, izip};
use log::debug;
use nalgebra::{DVectorView, DVectorViewMut};

struct BoundaryKernel<Q, const D: usize, const K: usize> {
    qf: Q,
    geometry: BoundaryFactors<D>,
    weights: Vec<f64>,
    test: ShapeTable,
    test_components: usize,
    trials: Vec<ShapeTable>,
    trial_components: [usize; K],
    options: IntegralOptions,
}

impl<Q, const D: usize, const K: usize> BoundaryKernel<Q, D, K>
where
    Q: BoundaryQFunction<D>,
    Q::Args: TrialArgs<K>,
{
    fn field_args(&self, e: usize, q: usize, inputs: &[&[f64]; K]) -> Q::Args {
        let mut args = Q::Args::default();
        let mut offset = 0;
        for (k, (table, &components)) in self.trials.iter().zip(&self.trial_components).enumerate() {
            let n = table.num_nodes() * components;
            interpolate_values_into(&mut args, offset, table, q, components, &inputs[k][e * n..(e + 1) * n]);
            offset += components;
        }
        args
    }

    fn integrate(&self, e: usize, q: usize, integrand: &Q::Output, output: &mut [f64]) {
        let weight = self.weights[e * self.points_per_element() + q];
        integrate_values(&self.test, q, self.test_components, weight, integrand, output);
    }
}

impl<Q, const D: usize, const K: usize> ElementKernel<K> for BoundaryKernel<Q, D, K>
where
    Q: BoundaryQFunction<D>,
    Q::Args: TrialArgs<K>,
{
    type Args = Q::Args;
    type Output = Q::Output;

    fn num_elements(&self) -> usize {
        self.geometry.num_elements()
    }

    fn points_per_element(&self) -> usize {
        self.geometry.points_per_element()
    }

    fn test_dofs_per_element(&self) -> usize {
        self.test.num_nodes() * self.test_components
    }

    fn trial_dofs_per_element(&self, field: usize) -> usize {
        self.trials[field].num_nodes() * self.trial_components[field]
    }

    fn evaluate(&self, inputs: &[&[f64]; K], output: &mut [f64]) {
        for_each_element(&self.options, output, self.test_dofs_per_element(), |e, output| {
            let positions = self.geometry.element_positions(e);
            let normals = self.geometry.element_normals(e);
            for (q, (x, n)) in izip!(positions, normals).enumerate() {
                let args = self.field_args(e, q, inputs).lift::<f64>();
                let result = self.qf.evaluate::<f64>(x, n, &args);
                let integrand = <Q::Output as Lift>::collapse(&result, &|value: &f64| *value);
                self.integrate(e, q, &integrand, output);
            }
        });
    }

    fn evaluate_with_derivatives<A: FieldArg>(
        &self,
        offset: usize,
        inputs: &[&[f64]; K],
        output: &mut [f64],
        derivatives: &mut [Lifted<Q::Output, A>],
    ) {
        for_each_element_with(
            &self.options,
            output,
            self.test_dofs_per_element(),
            derivatives,
            self.points_per_element(),
            |e, output, derivatives| {
                let positions = self.geometry.element_positions(e);
                let normals = self.geometry.element_normals(e);
                for (q, (x, n, derivative)) in izip!(positions, normals, derivatives).enumerate() {
                    let args = seed_field::<Q::Args, A>(&self.field_args(e, q, inputs), offset);
                    let result = self.qf.evaluate::<Dual<A>>(x, n, &args);
                    *derivative = collapse_gradient::<Q::Output, A>(&result);
                    let integrand = collapse_value::<Q::Output, A>(&result);
                    self.integrate(e, q, &integrand, output);
                }
            },
        );
    }

    fn action_of_gradient<A: FieldArg>(
        &self,
        field: usize,
        derivatives: &[Lifted<Q::Output, A>],
        direction: &[f64],
        output: &mut [f64],
    ) {
        let table = &self.trials[field];
        let components = self.trial_components[field];
        let n = self.trial_dofs_per_element(field);
        let nq = self.points_per_element();
        for_each_element(&self.options, output, self.test_dofs_per_element(), |e, output| {
            let direction = &direction[e * n..(e + 1) * n];
            for q in 0..nq {
                let mut d_arg = A::default();
                interpolate_values_into(&mut d_arg, 0, table, q, components, direction);
                let d_integrand = apply_gradient::<Q::Output, A>(&derivatives[e * nq + q], &d_arg);
                self.integrate(e, q, &d_integrand, output);
            }
        });
    }

    fn element_gradient<A: FieldArg>(
        &self,
        field: usize,
        derivatives: &[Lifted<Q::Output, A>],
        gradients: &mut ElementGradients,
    ) {
        let table = &self.trials[field];
        let components = self.trial_components[field];
        let rows = self.test_dofs_per_element();
        let cols = self.trial_dofs_per_element(field);
        let nq = self.points_per_element();
        for_each_element(&self.options, gradients.as_mut_slice(), rows * cols, |e, block| {
            for q in 0..nq {
                let phi = table.values(q);
                for (a, c) in iproduct!(0..table.num_nodes(), 0..components) {
                    let d_arg = A::unit(c) * phi[a];
                    let d_integrand = apply_gradient::<Q::Output, A>(&derivatives[e * nq + q], &d_arg);
                    let col = a * components + c;
                    self.integrate(e, q, &d_integrand, &mut block[col * rows..(col + 1) * rows]);
                }
            }
        });
    }
}

/// The integral `∫_Γ f(x, n, u_1, ..., u_K) · φ ds` over all boundary elements, for every test
/// function `φ`, where `f` is the output of a [`BoundaryQFunction`].
///
/// Vectors follow the same element-local layout as for
/// [`DomainIntegral`](crate::integral::DomainIntegral), with the boundary elements taking the
/// place of the volumetric ones. All operations accumulate into their output.
pub struct BoundaryIntegral<const K: usize> {
    kernels: IntegralKernels<K>,
}

impl<const K: usize> BoundaryIntegral<K> {
    /// Sets up the kernels of a boundary integral.
    ///
    /// `trial` is a tuple holding the space of each of the `K` trial fields. The boundary factors
    /// must be given at the `n^(D - 1)` Gauss points of each boundary element, where `n` is one
    /// more than the highest order among the test and trial spaces.
    pub fn new<Test, Trial, Q, const D: usize>(
        test: Test,
        trial: Trial,
        geometry: BoundaryFactors<D>,
        qf: Q,
        options: IntegralOptions,
    ) -> eyre::Result<Self>
    where
        Test: FunctionSpace,
        Trial: TrialSpaces<K>,
        Q: BoundaryQFunction<D>,
        Q::Args: TrialArgs<K>,
    {
        options.validate()?;
        let element_geometry = Geometry::boundary(D)?;
        let reference_dim = element_geometry.reference_dim();
        let trial_orders = trial.orders();
        let trial_components = trial.components();
        ensure!(
            test.components() > 0 && trial_components.iter().all(|&c| c > 0),
            "Function spaces must have at least one component"
        );
        for (k, (&size, &components)) in <Q::Args as TrialArgs<K>>::SIZES
            .iter()
            .zip(&trial_components)
            .enumerate()
        {
            ensure!(
                size == components,
                "Boundary q-function argument for trial field {k} has {size} entries, but its trial space \
                 has {components} components"
            );
        }
        ensure!(
            <Q::Output as Shape>::SIZE == test.components(),
            "Boundary q-function output has {} entries, but the test space has {} components",
            <Q::Output as Shape>::SIZE,
            test.components()
        );

        let points_per_dim = quadrature_points_per_dim(test.order(), trial.max_order());
        let expected_points = points_per_dim.pow(reference_dim as u32);
        ensure!(
            geometry.points_per_element() == expected_points,
            "Boundary factors given at {} points per element, but integrals with test order {} and \
             trial orders {trial_orders:?} on a {element_geometry} use {expected_points} points",
            geometry.points_per_element(),
            test.order()
        );

        let test_table = ShapeTable::new(reference_dim, test.order(), points_per_dim)?;
        let trial_tables = trial_orders
            .iter()
            .map(|&order| ShapeTable::new(reference_dim, order, points_per_dim))
            .collect::<eyre::Result<Vec<_>>>()?;
        let weights = (0..geometry.num_elements())
            .flat_map(|e| {
                geometry
                    .element_determinants(e)
                    .iter()
                    .zip(test_table.weights())
                    .map(|(det, w)| w * det)
            })
            .collect();

        debug!(
            "Boundary integral on {} {element_geometry} elements with {expected_points} quadrature points \
             each, {K} trial field(s), {} execution",
            geometry.num_elements(),
            options.execution_space
        );

        let kernel = BoundaryKernel::<Q, D, K> {
            qf,
            geometry,
            weights,
            test: test_table,
            test_components: test.components(),
            trials: trial_tables,
            trial_components,
            options,
        };
        Ok(Self {
            kernels: IntegralKernels::new(kernel),
        })
    }

    pub fn num_elements(&self) -> usize {
        self.kernels.num_elements()
    }

    pub fn test_dofs_per_element(&self) -> usize {
        self.kernels.test_dofs_per_element()
    }

    /// The number of element-local degrees of freedom of each trial field.
    pub fn trial_dofs_per_element(&self) -> [usize; K] {
        self.kernels.trial_dofs_per_element()
    }

    /// Whether the most recent derivative evaluation with respect to trial field `which` ran to
    /// completion.
    pub fn has_derivatives(&self, which: usize) -> bool {
        self.kernels.has_derivatives(which)
    }

    /// Accumulates the integral for the given trial fields into `output`, optionally computing
    /// the derivative with respect to trial field `which` alongside.
    pub fn mult<'a>(
        &self,
        inputs: [DVectorView<'a, f64>; K],
        output: impl Into<DVectorViewMut<'a, f64>>,
        which: Option<usize>,
    ) -> eyre::Result<()> {
        let inputs: [&[f64]; K] = std::array::from_fn(|k| inputs[k].as_slice());
        let mut output = output.into();
        self.kernels.mult(&inputs, output.as_mut_slice(), which)
    }

    pub fn gradient_mult<'a>(
        &self,
        direction: impl Into<DVectorView<'a, f64>>,
        output: impl Into<DVectorViewMut<'a, f64>>,
        which: usize,
    ) -> eyre::Result<()> {
        let direction = direction.into();
        let mut output = output.into();
        self.kernels
            .gradient_mult(direction.as_slice(), output.as_mut_slice(), which)
    }

    pub fn compute_element_gradients(&self, gradients: &mut ElementGradients, which: usize) -> eyre::Result<()> {
        self.kernels.compute_element_gradients(gradients, which)
    }

    pub fn element_gradients(&self, which: usize) -> eyre::Result<ElementGradients> {
        let mut gradients = ElementGradients::zeros(
            self.num_elements(),
            self.test_dofs_per_element(),
            self.kernels.trial_dofs(which)?,
        );
        self.compute_element_gradients(&mut gradients, which)?;
        Ok(gradients)
    }
}
