use crate::dual::{ChainRule, Dual};
use crate::scalar::Tangent;
use crate::space::FunctionSpace;
use crate::tensor::{Lift, Lifted, Shape};

/// The trial spaces of an integral with `K` trial fields, given as a tuple of function spaces.
///
/// Each trial field has its own space, so that for example a vector-valued displacement
/// `H1<1, 2>` may be coupled with a scalar temperature `H1<2, 1>` through `(H1<1, 2>, H1<2, 1>)`.
pub trait TrialSpaces<const K: usize>: Copy + Send + Sync + 'static {
    fn orders(&self) -> [usize; K];

    fn components(&self) -> [usize; K];

    /// The highest polynomial order among the trial spaces.
    fn max_order(&self) -> usize {
        self.orders().into_iter().max().unwrap_or(0)
    }
}

/// The argument of a q-function for a single trial field.
///
/// A field argument is its own derivative type: the derivative of a q-function with respect to
/// a field has the layout of the q-function output with every entry replaced by the field
/// argument type, and applying it to a perturbation contracts each entry with the perturbation.
pub trait FieldArg: Lift + Tangent + ChainRule<Self, Output = f64> {}

impl<A> FieldArg for A where A: Lift + Tangent + ChainRule<A, Output = f64> {}

/// Receives the argument type of each trial field in turn.
pub trait FieldVisitor {
    type Output;

    fn visit<A: FieldArg>(&mut self, field: usize, offset: usize) -> Self::Output;
}

/// The arguments of a q-function for `K` trial fields, given as a tuple with one
/// [`FieldArg`] per field.
pub trait TrialArgs<const K: usize>: Lift {
    /// The flat sizes of the field arguments.
    const SIZES: [usize; K];

    /// Calls the visitor with the argument type, index and flat offset of every field.
    fn visit_fields<V: FieldVisitor>(visitor: &mut V) -> [V::Output; K];
}

/// Lifts `args` to dual numbers that carry the derivative with respect to the field argument
/// `A` stored at flat offset `offset`.
pub fn seed_field<Args: Lift, A: FieldArg>(args: &Args, offset: usize) -> Lifted<Args, Dual<A>> {
    args.lift_with(0, &|i, value| {
        if (offset..offset + A::SIZE).contains(&i) {
            Dual::new(value, A::unit(i - offset))
        } else {
            Dual::constant(value)
        }
    })
}

macro_rules! impl_trial_tuple {
    ($k:literal; $($t:ident $i:tt),+) => {
        impl<$($t: FunctionSpace),+> TrialSpaces<$k> for ($($t,)+) {
            fn orders(&self) -> [usize; $k] {
                [$(self.$i.order()),+]
            }

            fn components(&self) -> [usize; $k] {
                [$(self.$i.components()),+]
            }
        }

        impl<$($t: FieldArg),+> TrialArgs<$k> for ($($t,)+) {
            const SIZES: [usize; $k] = [$($t::SIZE),+];

            #[allow(unused_assignments)]
            fn visit_fields<V: FieldVisitor>(visitor: &mut V) -> [V::Output; $k] {
                let mut offset = 0;
                [$(
                    {
                        let output = visitor.visit::<$t>($i, offset);
                        offset += $t::SIZE;
                        output
                    }
                ),+]
            }
        }
    };
}

impl_trial_tuple!(1; A 0);
impl_trial_tuple!(2; A 0, B 1);
impl_trial_tuple!(3; A 0, B 1, C 2);
impl_trial_tuple!(4; A 0, B 1, C 2, E 3);
