use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicBool, Ordering};

/// Derivatives of a q-function at all quadrature points of all elements.
///
/// Entries are indexed by `(element, point)` and stored element by element. The cache is
/// written by a single derivative evaluation pass and read by any number of subsequent gradient
/// kernel invocations. It is shared by the kernels of an integral through an `Arc`.
#[derive(Debug)]
pub struct DerivativeCache<T> {
    num_elements: usize,
    points_per_element: usize,
    data: RwLock<Vec<T>>,
    populated: AtomicBool,
}

impl<T: Copy + Default> DerivativeCache<T> {
    /// A zero-initialized cache.
    pub fn new(num_elements: usize, points_per_element: usize) -> Self {
        Self {
            num_elements,
            points_per_element,
            data: RwLock::new(vec![T::default(); num_elements * points_per_element]),
            populated: AtomicBool::new(false),
        }
    }
}

impl<T> DerivativeCache<T> {
    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    pub fn points_per_element(&self) -> usize {
        self.points_per_element
    }

    /// Whether the most recent derivative evaluation pass has completed.
    pub fn is_populated(&self) -> bool {
        self.populated.load(Ordering::Acquire)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.data.read()
    }

    /// Exclusive access for a derivative evaluation pass.
    ///
    /// The cache counts as unpopulated until [`mark_populated`](Self::mark_populated) is called
    /// after the pass has written every entry.
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        let guard = self.data.write();
        self.populated.store(false, Ordering::Release);
        guard
    }

    /// Records that a derivative evaluation pass has written every entry.
    pub fn mark_populated(&self) {
        self.populated.store(true, Ordering::Release);
    }
}
