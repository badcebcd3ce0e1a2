//! Shared read/write registers.
//!
//! A register holds a single value that can be read and replaced atomically.
//! Every slot of a snapshot object is a register, and so are the help records
//! of [`WaitFreeSnapshot`](crate::snapshot::WaitFreeSnapshot).
//!
//! See [`EpochRegister`] and [`MutexRegister`].
mod epoch;
pub use self::epoch::EpochRegister;
mod mutex;
pub use self::mutex::MutexRegister;

/// A shared-memory register.
pub trait Register {
    type Value;

    /// Creates a new register containing a default value.
    fn new() -> Self;

    /// Returns the value currently contained in the register.
    fn read(&self) -> Self::Value;

    /// Replaces the contents of the register with the specified value.
    fn write(&self, value: Self::Value);
}
