//! Shared multi-reader multi-writer snapshot objects.
//!
//! A snapshot object is an array of `M` locations. Any thread may update any
//! location, and any thread may [`scan`](Snapshot::scan) the object to obtain
//! the contents of every location as they were at a single instant.
//!
//! Both implementations in this module are built from the _double collect_:
//! read every location twice in a row and, if nothing changed in between, the
//! values form a consistent view. They differ in what a scan does when the two
//! reads disagree.
//!
//! - [`ObstructionFreeSnapshot`] simply tries again. A scan that keeps being
//!   overtaken by writers may never finish.
//! - [`WaitFreeSnapshot`] has every writer scan the object after each update and
//!   publish the result. A scan that sees the same writer move twice borrows
//!   that writer's published view, so every scan finishes after at most
//!   `n + 2` collects, where `n` is the number of writers.
//!
//! # Writers
//!
//! Every update is made on behalf of a [`Writer`], obtained from
//! [`Snapshot::register`]. Writers receive dense identifiers `0..n` and stamp
//! each of their updates with a private, strictly increasing sequence number,
//! so two different updates can never be mistaken for one another.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use mrmw_mem::snapshot::{Snapshot, WaitFreeEpochSnapshot};
//!
//! const M: usize = 4;
//! const WRITERS: usize = 3;
//!
//! let snapshot: Arc<WaitFreeEpochSnapshot<u64>> = Arc::new(Snapshot::new(M, WRITERS));
//!
//! let mut handles = Vec::new();
//! for i in 0..WRITERS {
//!     let snapshot = snapshot.clone();
//!     let mut writer = snapshot.register().unwrap();
//!     handles.push(thread::spawn(move || {
//!         for j in 0..100 {
//!             snapshot.update(&mut writer, (i + j) % M, j as u64);
//!         }
//!     }));
//! }
//!
//! // Scans may run concurrently with the writers and always
//! // return one value per location.
//! let view = snapshot.scan();
//! assert_eq!(view.len(), M);
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! ```
use std::error;
use std::fmt;

mod obstruction_free;
pub use obstruction_free::{
    ObstructionFreeEpochSnapshot, ObstructionFreeMutexSnapshot, ObstructionFreeSnapshot,
};

mod slots;

mod stamped;
pub use stamped::StampedValue;

mod wait_free;
pub use wait_free::{WaitFreeEpochSnapshot, WaitFreeMutexSnapshot, WaitFreeSnapshot};

mod writer;
pub use writer::{Writer, WriterId};

/// An `M`-location multi-reader multi-writer snapshot object.
pub trait Snapshot {
    type Value: Clone;

    /// Creates a snapshot object with `size` locations, which can be updated
    /// by at most `writers` registered writers.
    ///
    /// Every location initially contains the default value.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    fn new(size: usize, writers: usize) -> Self;

    /// Returns the number of locations in the object.
    fn size(&self) -> usize;

    /// Registers a new writer.
    ///
    /// Returns [`Error::WriterLimitReached`] once as many writers have been
    /// registered as the object was created for.
    fn register(&self) -> Result<Writer, Error>;

    /// Reads every location once, in index order.
    ///
    /// Locations are read at different instants, so the result is not
    /// necessarily a consistent view of the object.
    fn collect(&self) -> Vec<StampedValue<Self::Value>>;

    /// Returns the value of every location at a single instant between the
    /// call and its return.
    fn scan(&self) -> Vec<Self::Value>;

    /// Sets the value at `location`, on behalf of `writer`.
    fn try_update(
        &self,
        writer: &mut Writer,
        location: usize,
        value: Self::Value,
    ) -> Result<(), Error>;

    /// Sets the value at `location`, on behalf of `writer`.
    ///
    /// # Panics
    ///
    /// Panics if `location` is out of range, or on any other error returned
    /// by [`try_update`](Snapshot::try_update).
    fn update(&self, writer: &mut Writer, location: usize, value: Self::Value) {
        if let Err(error) = self.try_update(writer, location, value) {
            panic!("{error}");
        }
    }
}

/// How a scan obtained its view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Two successive collects were identical.
    Clean,
    /// The given writer was seen to move twice, and the view is the one it
    /// published during its most recent update.
    Helped(WriterId),
}

/// The result of a scan, along with how it was obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scan<T> {
    /// The value of every location.
    pub view: Vec<T>,
    /// The number of collects that were performed.
    pub collects: usize,
    /// Whether the view came from a clean double collect or a help record.
    pub outcome: Outcome,
}

/// Errors returned by operations on a snapshot object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// An update targeted a location outside of `0..size`.
    InvalidLocation { location: usize, size: usize },
    /// A writer has used every available sequence number.
    SequenceOverflow { writer: WriterId },
    /// Every writer identifier has already been handed out.
    WriterLimitReached { capacity: usize },
    /// The writer was not registered with this object.
    UnknownWriter { writer: WriterId, capacity: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLocation { location, size } => write!(
                f,
                "location {location} is out of range for a snapshot of size {size}"
            ),
            Error::SequenceOverflow { writer } => {
                write!(f, "writer {writer} has exhausted its sequence numbers")
            }
            Error::WriterLimitReached { capacity } => {
                write!(f, "all {capacity} writers have already been registered")
            }
            Error::UnknownWriter { writer, capacity } => write!(
                f,
                "writer {writer} was not registered with this snapshot (capacity {capacity})"
            ),
        }
    }
}

impl error::Error for Error {}
