use crate::register::Register;

use super::{Error, StampedValue};

/// The shared array of a snapshot object: one register per location, each
/// holding a [`StampedValue`].
pub(crate) struct Slots<R> {
    registers: Box<[R]>,
}

impl<T, R> Slots<R>
where
    R: Register<Value = StampedValue<T>>,
{
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub(crate) fn new(size: usize) -> Self {
        assert!(size > 0, "a snapshot must have at least one location");
        Self {
            registers: (0..size).map(|_| R::new()).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.registers.len()
    }

    pub(crate) fn check(&self, location: usize) -> Result<(), Error> {
        if location >= self.len() {
            return Err(Error::InvalidLocation {
                location,
                size: self.len(),
            });
        }
        Ok(())
    }

    /// Replaces the contents of a location.
    ///
    /// # Panics
    ///
    /// Panics if `location` is out of range. Callers check it first.
    pub(crate) fn publish(&self, location: usize, value: StampedValue<T>) {
        self.registers[location].write(value)
    }

    /// Reads every location once, in index order.
    pub(crate) fn collect(&self) -> Vec<StampedValue<T>> {
        self.registers.iter().map(|register| register.read()).collect()
    }
}
