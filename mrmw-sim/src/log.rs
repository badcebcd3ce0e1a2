use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The kind of thread that performed an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Writer,
    Snapshot,
}

/// A completed operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Update { location: usize, value: u32 },
    /// The `round`-th scan of a snapshot thread, counting from one.
    Scan { round: usize, view: Vec<u32> },
}

/// A timestamped record of one operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub completed_at: SystemTime,
    pub role: Role,
    pub thread: usize,
    pub operation: Operation,
    pub duration: Duration,
}

impl Event {
    /// Nanoseconds between the epoch and the completion of this event.
    fn timestamp(&self) -> u128 {
        self.completed_at
            .duration_since(UNIX_EPOCH)
            .map_or(0, |since| since.as_nanos())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timestamp = self.timestamp();
        write!(
            f,
            "[{}.{:09}] ",
            timestamp / 1_000_000_000,
            timestamp % 1_000_000_000
        )?;
        match &self.operation {
            Operation::Update { location, value } => write!(
                f,
                "Writer thread {}: location[{location}] = {value}",
                self.thread
            )?,
            Operation::Scan { round, view } => {
                write!(f, "Snapshot thread {}: collect {round} {{", self.thread)?;
                for (location, value) in view.iter().enumerate() {
                    let separator = if location + 1 == view.len() { "" } else { "," };
                    write!(f, " {location}: {value}{separator}")?;
                }
                write!(f, " }}")?;
            }
        }
        write!(f, " in {} ns.", self.duration.as_nanos())
    }
}

/// Sorts events by completion time and writes one per line.
pub fn write_events(path: &Path, events: &mut [Event]) -> io::Result<()> {
    events.sort_by_key(Event::timestamp);
    let mut out = BufWriter::new(File::create(path)?);
    for event in events.iter() {
        writeln!(out, "{event}")?;
    }
    out.flush()
}

/// Latency statistics of the operations of one role.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Latency {
    pub count: usize,
    pub average: Duration,
    pub worst: Duration,
}

impl Latency {
    pub fn of(events: &[Event], role: Role) -> Self {
        let durations: Vec<Duration> = events
            .iter()
            .filter(|event| event.role == role)
            .map(|event| event.duration)
            .collect();
        let count = durations.len();
        if count == 0 {
            return Self::default();
        }
        let total: Duration = durations.iter().sum();
        Self {
            count,
            average: Duration::from_nanos((total.as_nanos() / count as u128) as u64),
            worst: durations.into_iter().max().unwrap_or_default(),
        }
    }
}
