use super::WriterId;

/// A value, stamped with the identity of the writer that produced it and
/// that writer's sequence number for the update.
///
/// Stamped values are the unit of publication of a snapshot object: each
/// location holds exactly one, and an update replaces it atomically. Two
/// stamped values are equal only if all three fields are equal, which, since
/// writers never reuse a sequence number, means they were produced by the
/// same update.
///
/// The default stamped value, with sequence number `0`, is the initial
/// contents of every location. Writers begin numbering their updates at `1`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StampedValue<T> {
    value: T,
    sequence: u64,
    writer: WriterId,
}

impl<T> StampedValue<T> {
    pub fn new(value: T, sequence: u64, writer: WriterId) -> Self {
        Self {
            value,
            sequence,
            writer,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn writer(&self) -> WriterId {
        self.writer
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
