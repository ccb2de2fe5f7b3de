use crate::dual::{apply_gradient, collapse_gradient, collapse_value, Dual};
use crate::geometry::GeometricFactors;
use crate::integral::kernels::{
    basis_field, for_each_element, for_each_element_with, integrate_field, interpolate_field,
    interpolate_field_into, ElementKernel, IntegralKernels,
};
use crate::integral::{
    seed_field, DomainQFunction, ElementGradients, FieldArg, IntegralOptions, TrialArgs, TrialSpaces,
};
use crate::space::{quadrature_points_per_dim, FunctionSpace, Geometry, ShapeTable};
use crate::tensor::{det, inv, Lift, Lifted, Shape, Tensor2};
use eyre::ensure;
use itertools::iproduct;
use log::debug;
use nalgebra::{DVectorView, DVectorViewMut};

/// Kernels of a domain integral for a concrete q-function and spatial dimension.
struct DomainKernel<Q, const D: usize, const K: usize> {
    qf: Q,
    geometry: GeometricFactors<D>,
    jacobian_inverses: Vec<Tensor2<f64, D, D>>,
    // Quadrature weight times |det J|
    weights: Vec<f64>,
    test: ShapeTable,
    test_components: usize,
    trials: Vec<ShapeTable>,
    trial_components: [usize; K],
    options: IntegralOptions,
}

impl<Q, const D: usize, const K: usize> DomainKernel<Q, D, K>
where
    Q: DomainQFunction<D>,
    Q::Args: TrialArgs<K>,
{
    fn field_args(&self, e: usize, q: usize, inputs: &[&[f64]; K]) -> Q::Args {
        let i = e * self.points_per_element() + q;
        let mut args = Q::Args::default();
        let mut offset = 0;
        for (k, (table, &components)) in self.trials.iter().zip(&self.trial_components).enumerate() {
            let n = table.num_nodes() * components;
            interpolate_field_into(
                &mut args,
                offset,
                table,
                q,
                &self.jacobian_inverses[i],
                components,
                &inputs[k][e * n..(e + 1) * n],
            );
            offset += components * (D + 1);
        }
        args
    }

    fn integrate(&self, e: usize, q: usize, integrand: &Q::Output, output: &mut [f64]) {
        let i = e * self.points_per_element() + q;
        integrate_field(
            &self.test,
            q,
            &self.jacobian_inverses[i],
            self.test_components,
            self.weights[i],
            integrand,
            output,
        );
    }
}

impl<Q, const D: usize, const K: usize> ElementKernel<K> for DomainKernel<Q, D, K>
where
    Q: DomainQFunction<D>,
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
            for (q, x) in positions.iter().enumerate() {
                let args = self.field_args(e, q, inputs).lift::<f64>();
                let result = self.qf.evaluate::<f64>(x, &args);
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
                for (q, (x, derivative)) in positions.iter().zip(derivatives).enumerate() {
                    let args = seed_field::<Q::Args, A>(&self.field_args(e, q, inputs), offset);
                    let result = self.qf.evaluate::<Dual<A>>(x, &args);
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
                let i = e * nq + q;
                let d_arg: A = interpolate_field(table, q, &self.jacobian_inverses[i], components, direction);
                let d_integrand = apply_gradient::<Q::Output, A>(&derivatives[i], &d_arg);
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
                let i = e * nq + q;
                for (a, c) in iproduct!(0..table.num_nodes(), 0..components) {
                    let d_arg: A = basis_field(table, q, &self.jacobian_inverses[i], components, a, c);
                    let d_integrand = apply_gradient::<Q::Output, A>(&derivatives[i], &d_arg);
                    let col = a * components + c;
                    self.integrate(e, q, &d_integrand, &mut block[col * rows..(col + 1) * rows]);
                }
            }
        });
    }
}

/// The integral `∫_Ω f(x, u_1, ..., u_K) · φ + F(x, u_1, ..., u_K) : ∇φ dx` over all elements
/// of a mesh, for every test function `φ`, where `(f, F)` is the output of a
/// [`DomainQFunction`].
///
/// All vectors passed to and returned from an integral are element-local: they hold the degrees
/// of freedom of each element in a contiguous block, with the `C` components of node `a` at
/// positions `a * C..(a + 1) * C` of the block. Each trial field has the element-local layout of
/// its own space. All operations accumulate into their output.
pub struct DomainIntegral<const K: usize> {
    kernels: IntegralKernels<K>,
}

impl<const K: usize> DomainIntegral<K> {
    /// Sets up the kernels of a domain integral.
    ///
    /// `trial` is a tuple holding the space of each of the `K` trial fields. The geometric
    /// factors must be given at the `n^D` Gauss points of each element, where `n` is one more
    /// than the highest order among the test and trial spaces.
    pub fn new<Test, Trial, Q, const D: usize>(
        test: Test,
        trial: Trial,
        geometry: GeometricFactors<D>,
        qf: Q,
        options: IntegralOptions,
    ) -> eyre::Result<Self>
    where
        Test: FunctionSpace,
        Trial: TrialSpaces<K>,
        Q: DomainQFunction<D>,
        Q::Args: TrialArgs<K>,
    {
        options.validate()?;
        let element_geometry = Geometry::domain(D)?;
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
                size == components * (D + 1),
                "Q-function argument for trial field {k} has {size} entries, but a trial field with \
                 {components} components in {D} dimensions has {} value and gradient entries",
                components * (D + 1)
            );
        }
        ensure!(
            <Q::Output as Shape>::SIZE == test.components() * (D + 1),
            "Q-function output has {} entries, but a test space with {} components in {D} dimensions \
             requires {} source and flux entries",
            <Q::Output as Shape>::SIZE,
            test.components(),
            test.components() * (D + 1)
        );

        let points_per_dim = quadrature_points_per_dim(test.order(), trial.max_order());
        let expected_points = points_per_dim.pow(D as u32);
        ensure!(
            geometry.points_per_element() == expected_points,
            "Geometric factors given at {} points per element, but integrals with test order {} and \
             trial orders {trial_orders:?} on a {element_geometry} use {expected_points} points",
            geometry.points_per_element(),
            test.order()
        );

        let test_table = ShapeTable::new(D, test.order(), points_per_dim)?;
        let trial_tables = trial_orders
            .iter()
            .map(|&order| ShapeTable::new(D, order, points_per_dim))
            .collect::<eyre::Result<Vec<_>>>()?;
        let jacobian_inverses: Vec<_> = geometry.jacobians().iter().map(inv).collect();
        let weights = geometry
            .jacobians()
            .chunks_exact(expected_points)
            .flat_map(|jacobians| {
                jacobians
                    .iter()
                    .zip(test_table.weights())
                    .map(|(j, w)| w * det(j).abs())
            })
            .collect();

        debug!(
            "Domain integral on {} {element_geometry} elements with {expected_points} quadrature points each, \
             {K} trial field(s), {} execution",
            geometry.num_elements(),
            options.execution_space
        );

        let kernel = DomainKernel::<Q, D, K> {
            qf,
            geometry,
            jacobian_inverses,
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

    /// Accumulates the integral for the given trial fields into `output`.
    ///
    /// With `which = Some(k)`, the derivative with respect to trial field `k` is computed
    /// alongside and stored for subsequent calls to [`gradient_mult`](Self::gradient_mult) and
    /// [`compute_element_gradients`](Self::compute_element_gradients).
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

    /// Accumulates the derivative with respect to trial field `which` applied to `direction`.
    ///
    /// Uses the derivatives of the most recent call to [`mult`](Self::mult) with
    /// `Some(which)`.
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

    /// Accumulates the dense element Jacobians with respect to trial field `which`.
    pub fn compute_element_gradients(&self, gradients: &mut ElementGradients, which: usize) -> eyre::Result<()> {
        self.kernels.compute_element_gradients(gradients, which)
    }

    /// Allocates and computes the dense element Jacobians with respect to trial field `which`.
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
