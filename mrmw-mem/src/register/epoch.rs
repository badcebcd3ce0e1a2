use std::fmt;
use std::sync::atomic::Ordering;

use crossbeam_epoch::{self as epoch, Atomic, Owned};

use super::Register;

/// A lock-free shared-memory register that can hold values of any size.
///
/// The contents of the register live in a heap allocation behind an atomic
/// pointer. A write publishes a new allocation with a single atomic swap, so
/// readers observe either the old value or the new one in its entirety, and
/// never a mix of the two.
///
/// # Memory Reclamation
///
/// A reader may still be cloning the old value when a writer swaps it out.
/// Replaced allocations are therefore retired through
/// [`crossbeam_epoch`](https://docs.rs/crossbeam-epoch): each read pins the
/// current epoch for as long as it holds a reference into the register, and a
/// retired allocation is freed only after every thread that could have loaded
/// it has unpinned.
///
/// # Atomics and Memory Ordering
///
/// All loads and swaps use [`Ordering::SeqCst`], so operations on different
/// registers appear in a single total order that is consistent with the
/// program order of every thread.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use mrmw_mem::register::{EpochRegister, Register};
///
/// let register: Arc<EpochRegister<Vec<u32>>> = Arc::new(EpochRegister::new());
///
/// let handles: Vec<_> = (0..4)
///     .map(|i| {
///         let register = register.clone();
///         thread::spawn(move || register.write(vec![i; 16]))
///     })
///     .collect();
///
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// // Whichever write came last, it was published in its entirety.
/// let contents = register.read();
/// assert!(contents.iter().all(|&x| x == contents[0]));
/// ```
pub struct EpochRegister<T> {
    atomic: Atomic<T>,
}

impl<T: Clone + Default> Register for EpochRegister<T> {
    type Value = T;

    /// Creates a new register containing the default value of `T`.
    fn new() -> Self {
        Self {
            atomic: Atomic::new(T::default()),
        }
    }

    /// Returns a clone of the value currently contained in the register.
    fn read(&self) -> T {
        let guard = epoch::pin();
        let current = self.atomic.load(Ordering::SeqCst, &guard);
        // SAFETY: The pointer is never null, since it is initialized in `new`
        // and only ever replaced by `write`. The allocation it points to is
        // retired through `guard.defer_destroy`, so it cannot be freed while
        // `guard` is alive.
        unsafe { current.deref() }.clone()
    }

    /// Sets contents of the register to the specified value.
    fn write(&self, value: T) {
        let guard = epoch::pin();
        let previous = self.atomic.swap(Owned::new(value), Ordering::SeqCst, &guard);
        // SAFETY: `previous` has just been unlinked from the register, so no
        // thread that pins after this point can load it.
        unsafe { guard.defer_destroy(previous) };
    }
}

impl<T> Drop for EpochRegister<T> {
    fn drop(&mut self) {
        // SAFETY: Having `&mut self` means no other thread holds a reference
        // to the register, so the current allocation can be freed immediately.
        unsafe {
            let current = self.atomic.load(Ordering::Relaxed, epoch::unprotected());
            if !current.is_null() {
                drop(current.into_owned());
            }
        }
    }
}

impl<T: Clone + Default + fmt::Debug> fmt::Debug for EpochRegister<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EpochRegister")
            .field("value", &self.read())
            .finish()
    }
}
