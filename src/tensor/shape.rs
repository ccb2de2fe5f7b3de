use crate::scalar::Leaf;
use crate::tensor::Tensor;

/// A fixed-size collection of `f64` values with a flat, row-major layout.
///
/// The flat layout is what connects the nested representation of tensors to element-local
/// degree-of-freedom arrays and to derivative seeding.
pub trait Shape: Leaf {
    /// Total number of scalar entries.
    const SIZE: usize;

    fn flat(&self, index: usize) -> f64;

    fn flat_mut(&mut self, index: usize) -> &mut f64;

    /// The value with a single one at the given flat index and zeros elsewhere.
    fn unit(index: usize) -> Self {
        let mut x = Self::default();
        *x.flat_mut(index) = 1.0;
        x
    }

    /// Full contraction `sum_i a_i b_i` over the flat entries.
    fn flat_inner(&self, other: &Self) -> f64 {
        (0..Self::SIZE).map(|i| self.flat(i) * other.flat(i)).sum()
    }
}

impl Shape for f64 {
    const SIZE: usize = 1;

    fn flat(&self, _: usize) -> f64 {
        *self
    }

    fn flat_mut(&mut self, _: usize) -> &mut f64 {
        self
    }
}

impl<T: Shape, const N: usize> Shape for Tensor<T, N> {
    const SIZE: usize = N * T::SIZE;

    fn flat(&self, index: usize) -> f64 {
        self[index / T::SIZE].flat(index % T::SIZE)
    }

    fn flat_mut(&mut self, index: usize) -> &mut f64 {
        self[index / T::SIZE].flat_mut(index % T::SIZE)
    }
}

/// Shorthand for the type obtained by replacing every `f64` in `T` by `S`.
pub type Lifted<T, S> = <T as Lift>::Output<S>;

/// Structural replacement of the `f64` entries of a [`Shape`] by another leaf type.
///
/// `Tensor<Tensor<f64, 2>, 3>` lifts to `Tensor<Tensor<S, 2>, 3>`. Lifting with dual numbers
/// turns a value into the argument of a derivative computation, lifting with derivative types
/// gives the layout of the computed derivatives.
pub trait Lift: Shape {
    type Output<S: Leaf>: Leaf;

    /// Replaces the entry at flat index `i` (counted from `offset`) by `f(i, value)`.
    fn lift_with<S: Leaf, F: Fn(usize, f64) -> S>(&self, offset: usize, f: &F) -> Self::Output<S>;

    fn map_leaves<S: Leaf, R: Leaf, F: Fn(&S) -> R>(lifted: &Self::Output<S>, f: &F) -> Self::Output<R>;

    /// Maps every leaf back to `f64`.
    fn collapse<S: Leaf, F: Fn(&S) -> f64>(lifted: &Self::Output<S>, f: &F) -> Self;

    /// Lifts without changing any value.
    fn lift<S: Leaf + From<f64>>(&self) -> Self::Output<S> {
        self.lift_with(0, &|_, x| S::from(x))
    }
}

impl Lift for f64 {
    type Output<S: Leaf> = S;

    fn lift_with<S: Leaf, F: Fn(usize, f64) -> S>(&self, offset: usize, f: &F) -> S {
        f(offset, *self)
    }

    fn map_leaves<S: Leaf, R: Leaf, F: Fn(&S) -> R>(lifted: &S, f: &F) -> R {
        f(lifted)
    }

    fn collapse<S: Leaf, F: Fn(&S) -> f64>(lifted: &S, f: &F) -> Self {
        f(lifted)
    }
}

impl<T: Lift, const N: usize> Lift for Tensor<T, N> {
    type Output<S: Leaf> = Tensor<T::Output<S>, N>;

    fn lift_with<S: Leaf, F: Fn(usize, f64) -> S>(&self, offset: usize, f: &F) -> Self::Output<S> {
        Tensor::from_fn(|i| self[i].lift_with(offset + i * T::SIZE, f))
    }

    fn map_leaves<S: Leaf, R: Leaf, F: Fn(&S) -> R>(lifted: &Self::Output<S>, f: &F) -> Self::Output<R> {
        Tensor::from_fn(|i| T::map_leaves(&lifted[i], f))
    }

    fn collapse<S: Leaf, F: Fn(&S) -> f64>(lifted: &Self::Output<S>, f: &F) -> Self {
        Tensor::from_fn(|i| T::collapse(&lifted[i], f))
    }
}

/// Tuples are laid out entry by entry, so that `(a, b)` has the flat entries of `a` followed by
/// those of `b`.
macro_rules! impl_tuple_shape {
    ($($t:ident $i:tt),+) => {
        impl<$($t: Shape),+> Shape for ($($t,)+) {
            const SIZE: usize = 0 $(+ $t::SIZE)+;

            fn flat(&self, index: usize) -> f64 {
                let mut local = index;
                $(
                    if local < $t::SIZE {
                        return self.$i.flat(local);
                    }
                    local -= $t::SIZE;
                )+
                panic!("Flat index {index} out of bounds for tuple with {} entries", Self::SIZE)
            }

            fn flat_mut(&mut self, index: usize) -> &mut f64 {
                let mut local = index;
                $(
                    if local < $t::SIZE {
                        return self.$i.flat_mut(local);
                    }
                    local -= $t::SIZE;
                )+
                panic!("Flat index {index} out of bounds for tuple with {} entries", Self::SIZE)
            }
        }

        impl<$($t: Lift),+> Lift for ($($t,)+) {
            type Output<S: Leaf> = ($($t::Output<S>,)+);

            #[allow(unused_assignments)]
            fn lift_with<S: Leaf, F: Fn(usize, f64) -> S>(&self, offset: usize, f: &F) -> Self::Output<S> {
                let mut offset = offset;
                ($(
                    {
                        let lifted = self.$i.lift_with(offset, f);
                        offset += $t::SIZE;
                        lifted
                    },
                )+)
            }

            fn map_leaves<S: Leaf, R: Leaf, F: Fn(&S) -> R>(lifted: &Self::Output<S>, f: &F) -> Self::Output<R> {
                ($($t::map_leaves(&lifted.$i, f),)+)
            }

            fn collapse<S: Leaf, F: Fn(&S) -> f64>(lifted: &Self::Output<S>, f: &F) -> Self {
                ($($t::collapse(&lifted.$i, f),)+)
            }
        }
    };
}

impl_tuple_shape!(A 0);
impl_tuple_shape!(A 0, B 1);
impl_tuple_shape!(A 0, B 1, C 2);
impl_tuple_shape!(A 0, B 1, C 2, E 3);
