use std::sync::atomic::{self, AtomicUsize as GlobalCounter};

use tracing::debug;

use crate::sync::{AtomicUsize, Ordering};

use super::{Error, StampedValue};

/// An identifier for a writer.
pub type WriterId = usize;

// Tags every registry, so writers of different objects never share an identity.
static NEXT_OBJECT: GlobalCounter = GlobalCounter::new(0);

/// The context of a thread that updates a snapshot object.
///
/// A writer carries its identifier and the sequence number of its most
/// recent update. Updates take the writer by `&mut`, so the updates made on
/// behalf of one writer are always sequential.
#[derive(Debug)]
pub struct Writer {
    id: WriterId,
    sequence: u64,
    object: usize,
}

impl Writer {
    fn new(id: WriterId, object: usize) -> Self {
        Self {
            id,
            sequence: 0,
            object,
        }
    }

    pub fn id(&self) -> WriterId {
        self.id
    }

    /// Returns the sequence number of this writer's most recent update, or
    /// `0` if it has not updated anything yet.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Stamps a value with the next sequence number of this writer.
    pub(crate) fn stamp<T>(&mut self, value: T) -> Result<StampedValue<T>, Error> {
        self.sequence = self
            .sequence
            .checked_add(1)
            .ok_or(Error::SequenceOverflow { writer: self.id })?;
        Ok(StampedValue::new(value, self.sequence, self.id))
    }

    /// Uses up every sequence number, so the next update overflows.
    #[cfg(all(test, not(feature = "shuttle")))]
    pub(crate) fn exhaust(&mut self) {
        self.sequence = u64::MAX;
    }
}

/// Hands out dense writer identifiers `0..capacity`.
pub(crate) struct Writers {
    capacity: usize,
    next: AtomicUsize,
    object: usize,
}

impl Writers {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next: AtomicUsize::new(0),
            object: NEXT_OBJECT.fetch_add(1, atomic::Ordering::Relaxed),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn register(&self) -> Result<Writer, Error> {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        if id >= self.capacity {
            return Err(Error::WriterLimitReached {
                capacity: self.capacity,
            });
        }
        debug!(writer = id, capacity = self.capacity, "registered writer");
        Ok(Writer::new(id, self.object))
    }

    /// Returns an error if `writer` was not registered here.
    pub(crate) fn check(&self, writer: &Writer) -> Result<(), Error> {
        if writer.object != self.object || writer.id >= self.capacity {
            return Err(Error::UnknownWriter {
                writer: writer.id,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
