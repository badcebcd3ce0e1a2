use crate::register::{EpochRegister, MutexRegister, Register};

use super::slots::Slots;
use super::writer::Writers;
use super::{Error, Outcome, Scan, Snapshot, StampedValue, Writer};

/// An obstruction-free snapshot object, backed by [`EpochRegister`] objects.
pub type ObstructionFreeEpochSnapshot<T> = ObstructionFreeSnapshot<EpochRegister<StampedValue<T>>>;

/// A snapshot object backed by [`MutexRegister`] objects.
///
/// This snapshot is linearizable but **not** lock-free.
pub type ObstructionFreeMutexSnapshot<T> = ObstructionFreeSnapshot<MutexRegister<StampedValue<T>>>;

/// An obstruction-free multi-reader multi-writer snapshot object, backed by
/// register objects of type `R`.
///
/// A scan repeatedly collects the contents of every location until two
/// successive collects are identical. Since every update publishes a value
/// stamped with a fresh sequence number, identical collects mean that no
/// location changed in between, and so the second collect is a view of the
/// object at the instant it began.
///
/// Updates never wait. A scan, however, finishes only once it manages to
/// perform two collects without being overtaken by an update. Under
/// continuous contention a scan may retry forever; use
/// [`try_scan`](ObstructionFreeSnapshot::try_scan) to bound the number of
/// attempts, or [`WaitFreeSnapshot`](super::WaitFreeSnapshot) for a scan that
/// always finishes.
///
/// # Examples
///
/// ```
/// use mrmw_mem::snapshot::{ObstructionFreeEpochSnapshot, Snapshot};
///
/// let snapshot: ObstructionFreeEpochSnapshot<u32> = Snapshot::new(4, 1);
/// let mut writer = snapshot.register().unwrap();
///
/// assert_eq!(snapshot.scan(), vec![0, 0, 0, 0]);
/// snapshot.update(&mut writer, 2, 42);
/// assert_eq!(snapshot.scan(), vec![0, 0, 42, 0]);
/// ```
pub struct ObstructionFreeSnapshot<R> {
    slots: Slots<R>,
    writers: Writers,
}

impl<T, R> ObstructionFreeSnapshot<R>
where
    T: Clone + PartialEq,
    R: Register<Value = StampedValue<T>>,
{
    /// Returns a scan of the object, along with the number of collects it took.
    pub fn scan_detailed(&self) -> Scan<T> {
        match self.scan_with(None, |_| {}) {
            Some(scan) => scan,
            None => unreachable!("an unbounded scan only returns once it succeeds"),
        }
    }

    /// Scans the object, giving up after `max_collects` collects.
    ///
    /// A successful scan takes at least two collects, so this returns `None`
    /// whenever `max_collects` is less than two.
    pub fn try_scan(&self, max_collects: usize) -> Option<Vec<T>> {
        self.scan_with(Some(max_collects), |_| {})
            .map(|scan| scan.view)
    }

    /// Performs double collects until one succeeds, or until `max_collects`
    /// collects have been performed.
    ///
    /// The function `between` is called with the number of collects
    /// performed so far, after each collect that is followed by another.
    fn scan_with<F>(&self, max_collects: Option<usize>, mut between: F) -> Option<Scan<T>>
    where
        F: FnMut(usize),
    {
        let mut old = self.slots.collect();
        let mut collects = 1;
        loop {
            if max_collects.is_some_and(|max| collects >= max) {
                return None;
            }
            between(collects);
            let new = self.slots.collect();
            collects += 1;
            // If both collects are identical, then their values are a valid scan.
            if old == new {
                return Some(Scan {
                    view: new.into_iter().map(StampedValue::into_value).collect(),
                    collects,
                    outcome: Outcome::Clean,
                });
            }
            old = new;
        }
    }
}

impl<T, R> Snapshot for ObstructionFreeSnapshot<R>
where
    T: Clone + PartialEq,
    R: Register<Value = StampedValue<T>>,
{
    type Value = T;

    fn new(size: usize, writers: usize) -> Self {
        Self {
            slots: Slots::new(size),
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
        Ok(())
    }
}
