use tracing::trace;

use crate::register::{EpochRegister, MutexRegister, Register};

use super::slots::Slots;
use super::writer::Writers;
use super::{Error, Outcome, Scan, Snapshot, StampedValue, Writer};

/// A wait-free snapshot object, backed by [`EpochRegister`] objects.
pub type WaitFreeEpochSnapshot<T> =
    WaitFreeSnapshot<EpochRegister<StampedValue<T>>, EpochRegister<Vec<T>>>;

/// A snapshot object backed by [`MutexRegister`] objects.
///
/// This snapshot is linearizable but **not** lock-free.
pub type WaitFreeMutexSnapshot<T> =
    WaitFreeSnapshot<MutexRegister<StampedValue<T>>, MutexRegister<Vec<T>>>;

/// A wait-free multi-reader multi-writer snapshot object, backed by register
/// objects of type `R` for its locations and `H` for its help records.
///
/// This is the multi-writer variant of the _unbounded_ snapshot described in
/// Section 3 of [[AAD+93]](https://dl.acm.org/doi/10.1145/153724.153741), with
/// each update stamped by its writer's identifier and sequence number.
///
/// # Helping
///
/// After publishing a new value, every update scans the object and stores
/// the result as the _help record_ of its writer. A scan repeatedly performs
/// double collects, and whenever two collects differ it notes which writers
/// produced the differing values. If the same writer is seen to move twice,
/// that writer must have completed an entire update, including its own scan,
/// since this scan began. Its help record is then a valid result, and is
/// returned in place of retrying.
///
/// With `n` registered writers, each failed double collect either returns a
/// help record or sees some writer move for the first time, so every scan
/// finishes after at most `n + 2` collects. Since updates perform a scan,
/// they are wait-free as well.
///
/// If `R` and `H` are linearizable, then so is [`WaitFreeSnapshot<R, H>`].
///
/// # Examples
///
/// ```
/// use mrmw_mem::snapshot::{Outcome, Snapshot, WaitFreeEpochSnapshot};
///
/// let snapshot: WaitFreeEpochSnapshot<&str> = Snapshot::new(2, 2);
/// let mut alice = snapshot.register().unwrap();
/// let mut bob = snapshot.register().unwrap();
///
/// snapshot.update(&mut alice, 0, "hello");
/// snapshot.update(&mut bob, 1, "world");
///
/// let scan = snapshot.scan_detailed();
/// assert_eq!(scan.view, vec!["hello", "world"]);
/// assert_eq!(scan.outcome, Outcome::Clean);
/// ```
pub struct WaitFreeSnapshot<R, H> {
    slots: Slots<R>,
    helps: Box<[H]>,
    writers: Writers,
}

impl<T, R, H> WaitFreeSnapshot<R, H>
where
    T: Clone + PartialEq,
    R: Register<Value = StampedValue<T>>,
    H: Register<Value = Vec<T>>,
{
    /// Returns a scan of the object, along with the number of collects it
    /// took and whether it borrowed the help record of a writer.
    pub fn scan_detailed(&self) -> Scan<T> {
        self.scan_with(|_| {})
    }

    /// Performs double collects until one succeeds, or until some writer is
    /// seen to move twice.
    ///
    /// The function `between` is called with the number of collects
    /// performed so far, after each collect that is followed by another.
    fn scan_with<F>(&self, mut between: F) -> Scan<T>
    where
        F: FnMut(usize),
    {
        // Writer identifiers are dense, so the writers that have moved
        // can be tracked by index.
        let mut moved = vec![false; self.writers.capacity()];
        let mut old = self.slots.collect();
        let mut collects = 1;
        loop {
            between(collects);
            let new = self.slots.collect();
            collects += 1;
            let mut clean = true;
            for (before, after) in old.iter().zip(&new) {
                if before == after {
                    continue;
                }
                clean = false;
                // A location only changes when a registered writer updates
                // it, so the identifier is within capacity.
                let writer = after.writer();
                if moved[writer] {
                    trace!(writer, collects, "scan adopted help record");
                    return Scan {
                        view: self.helps[writer].read(),
                        collects,
                        outcome: Outcome::Helped(writer),
                    };
                }
                moved[writer] = true;
            }
            if clean {
                return Scan {
                    view: new.into_iter().map(StampedValue::into_value).collect(),
                    collects,
                    outcome: Outcome::Clean,
                };
            }
            old = new;
        }
    }
}

impl<T, R, H> Snapshot for WaitFreeSnapshot<R, H>
where
    T: Clone + PartialEq,
    R: Register<Value = StampedValue<T>>,
    H: Register<Value = Vec<T>>,
{
    type Value = T;

    fn new(size: usize, writers: usize) -> Self {
        Self {
            slots: Slots::new(size),
            helps: (0..writers).map(|_| H::new()).collect(),
            writers: Writers::new(writers),
        }
    }

    fn size(&self) -> usize {
        self.slots.len()
    }

    fn register(&self) -> Result<Writer, Error> {
        self.writers.register()
    }

    fn collect(&self) -> Vec<StampedValue<T>> {
        self.slots.collect()
    }

    fn scan(&self) -> Vec<T> {
        self.scan_detailed().view
    }

    fn try_update(&self, writer: &mut Writer, location: usize, value: T) -> Result<(), Error> {
        self.slots.check(location)?;
        self.writers.check(writer)?;
        let stamped = writer.stamp(value)?;
        self.slots.publish(location, stamped);
        // Publish a view that includes this update, for any scan that
        // sees this writer move twice.
        self.helps[writer.id()].write(self.scan());
        Ok(())
    }
}
