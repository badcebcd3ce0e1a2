use std::sync::PoisonError;

use crate::sync::Mutex;

use super::Register;

/// A shared-memory register, backed by a [`Mutex`].
///
/// This object uses a mutex to protect against concurrent memory
/// access. It is linearizable, but **not** lock-free.
///
/// When the `shuttle` feature is enabled the mutex is provided by
/// [`shuttle`](https://docs.rs/shuttle), which lets snapshot objects built
/// from this register be model-checked under a controlled scheduler.
///
/// # Examples
///
/// ```
/// use mrmw_mem::register::{MutexRegister, Register};
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// enum Reading {
///     #[default]
///     Missing,
///     Samples(Vec<f64>),
/// }
///
/// let register: MutexRegister<Reading> = MutexRegister::new();
/// assert_eq!(register.read(), Reading::Missing);
///
/// let samples = Reading::Samples(vec![0.5, 1.5, 2.5]);
/// register.write(samples.clone());
/// assert_eq!(register.read(), samples);
/// ```
#[derive(Debug)]
pub struct MutexRegister<T: Clone + Default> {
    mutex: Mutex<T>,
}

impl<T: Clone + Default> Default for MutexRegister<T> {
    fn default() -> Self {
        MutexRegister::<T>::new()
    }
}

impl<T: Clone + Default> Register for MutexRegister<T> {
    type Value = T;

    /// Creates a new register containing the default value of `T`.
    fn new() -> Self {
        Self {
            mutex: Mutex::new(T::default()),
        }
    }

    /// Returns the value currently contained in the register.
    fn read(&self) -> Self::Value {
        // Writes replace the value wholesale, so a poisoned lock still guards
        // a complete value.
        self.mutex
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sets contents of the register to the specified value.
    fn write(&self, value: Self::Value) {
        *self.mutex.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }
}
