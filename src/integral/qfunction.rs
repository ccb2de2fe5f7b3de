use crate::scalar::Scalar;
use crate::tensor::{Lift, Lifted, Tensor};

/// The integrand of a domain integral, evaluated at a single quadrature point.
///
/// A q-function receives the physical position of the point and the interpolated value and
/// gradient of each trial field. It returns the source and flux terms that are tested against
/// the values and gradients of the test functions.
///
/// The method is generic over the [`Scalar`] type so that the same implementation is evaluated
/// with plain values (for residuals) and with dual numbers (for derivatives). Only operations
/// available on [`Scalar`] and [`Tensor`] may be used.
///
/// # Layout
///
/// `Args` is a tuple with one entry per trial field (see
/// [`TrialArgs`](crate::integral::TrialArgs)). In flat layout (see
/// [`Shape`](crate::tensor::Shape)), entry `k` holds the `C_k` component values of trial field
/// `k` followed by its `C_k x D` gradient, where `C_k` is the number of components of the
/// space of field `k`. `Output` holds the `C` components of the source followed by the `C x D`
/// flux, where `C` is the number of components of the test space.
/// [`FieldValue`](crate::field::FieldValue) and [`Integrand`](crate::field::Integrand) have
/// exactly this layout, for example `FieldValue<f64, Tensor<f64, D>>` for a scalar field or
/// `FieldValue<Tensor<f64, C>, Tensor2<f64, C, D>>` for a vector field.
pub trait DomainQFunction<const D: usize>: Send + Sync + 'static {
    type Args: Lift;
    type Output: Lift;

    fn evaluate<S: Scalar>(&self, x: &Tensor<f64, D>, fields: &Lifted<Self::Args, S>) -> Lifted<Self::Output, S>;
}

/// The integrand of a boundary integral, evaluated at a single quadrature point.
///
/// In addition to the position, boundary q-functions receive the unit outward normal. Only the
/// values of the trial fields are available, and the output is tested against the values of
/// the test functions. Accordingly, the flat size of entry `k` of `Args` equals the number of
/// components of trial field `k` and that of `Output` the number of test components.
pub trait BoundaryQFunction<const D: usize>: Send + Sync + 'static {
    type Args: Lift;
    type Output: Lift;

    fn evaluate<S: Scalar>(
        &self,
        x: &Tensor<f64, D>,
        normal: &Tensor<f64, D>,
        fields: &Lifted<Self::Args, S>,
    ) -> Lifted<Self::Output, S>;
}
