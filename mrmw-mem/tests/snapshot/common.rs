use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use mrmw_mem::snapshot::{Snapshot, Writer};
use mrmw_utils::linearizability::history::ProcessId;
use mrmw_utils::specifications::snapshot::{SnapshotOperation, SnapshotSpecification};
use mrmw_utils::{Action, History, WGLChecker};
use rand::distributions::{Distribution, Standard};
use rand::Rng;

#[cfg(feature = "shuttle")]
pub const NUM_ITERATIONS: usize = 100;
pub const NUM_LOCATIONS: usize = 3;
pub const NUM_OPERATIONS: usize = 20;
#[cfg(feature = "shuttle")]
pub const NUM_PREEMPTIONS: usize = 3;
pub const NUM_THREADS: usize = 3;

type Operation<T> = SnapshotOperation<T, NUM_LOCATIONS>;

/// Asserts that the sequence of actions corresponds to a linearizable
/// history of snapshot operations.
///
/// # Panics
///
/// Panics if the history of snapshot actions is not linearizable.
pub fn assert_linearizable<T>(actions: Vec<(ProcessId, Action<Operation<T>>)>)
where
    T: Clone + Debug + Default + Eq + Hash,
{
    let history = History::from_actions(actions.clone());
    assert!(
        WGLChecker::<SnapshotSpecification<T, NUM_LOCATIONS>>::is_linearizable(history),
        "history is not linearizable: {actions:?}"
    );
}

/// A snapshot that records the operations performed on it.
///
/// A call is recorded before its operation begins and the response after it
/// returns, each under its own acquisition of the lock, so the recorded order
/// of actions is consistent with real time.
pub struct RecordingSnapshot<S: Snapshot> {
    actions: Mutex<Vec<(ProcessId, Action<Operation<S::Value>>)>>,
    snapshot: S,
}

impl<S: Snapshot> RecordingSnapshot<S>
where
    S::Value: Debug,
{
    pub fn new(writers: usize) -> Self {
        Self {
            actions: Mutex::new(vec![]),
            snapshot: S::new(NUM_LOCATIONS, writers),
        }
    }

    pub fn register(&self) -> Writer {
        self.snapshot.register().unwrap()
    }

    /// Performs an update with probability `p`, and a scan otherwise.
    pub fn perform_random_operation<R: Rng>(
        &self,
        i: ProcessId,
        writer: &mut Writer,
        p: f64,
        rng: &mut R,
    ) where
        Standard: Distribution<S::Value>,
    {
        if rng.gen_bool(p) {
            let location = rng.gen_range(0..NUM_LOCATIONS);
            let value = rng.gen::<S::Value>();
            self.update(i, writer, location, value);
        } else {
            self.scan(i);
        }
    }

    fn record(&self, i: ProcessId, action: Action<Operation<S::Value>>) {
        self.actions.lock().unwrap().push((i, action));
    }

    pub fn scan(&self, i: ProcessId) {
        self.record(i, Action::Call(SnapshotOperation::Scan(None)));
        let view: [S::Value; NUM_LOCATIONS] = self.snapshot.scan().try_into().unwrap();
        self.record(i, Action::Response(SnapshotOperation::Scan(Some(view))));
    }

    pub fn update(&self, i: ProcessId, writer: &mut Writer, location: usize, value: S::Value) {
        let operation = SnapshotOperation::Update(location, value.clone());
        self.record(i, Action::Call(operation.clone()));
        self.snapshot.update(writer, location, value);
        self.record(i, Action::Response(operation));
    }

    pub fn actions(&self) -> Vec<(ProcessId, Action<Operation<S::Value>>)> {
        self.actions.lock().unwrap().clone()
    }
}

/// Assert that a history consisting of a random sequence of snapshot
/// operations, performed by real threads, is linearizable.
///
/// # Panics
///
/// Panics if the history of random snapshot operations is not linearizable.
#[cfg(not(feature = "shuttle"))]
pub fn assert_concurrent_operations_are_linearizable<S>()
where
    S: Snapshot + Send + Sync + 'static,
    Standard: Distribution<S::Value>,
    S::Value: Debug + Default + Eq + Hash + Send + 'static,
{
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::thread;

    const UPDATE_PROBABILITY: f64 = 1.0 / 2.0;

    let snapshot: Arc<RecordingSnapshot<S>> = Arc::new(RecordingSnapshot::new(NUM_THREADS));
    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|i| {
            let snapshot = snapshot.clone();
            let mut writer = snapshot.register();
            thread::spawn(move || {
                let mut rng = SmallRng::seed_from_u64(i as u64);
                for _ in 0..NUM_OPERATIONS {
                    snapshot.perform_random_operation(i, &mut writer, UPDATE_PROBABILITY, &mut rng);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_linearizable(snapshot.actions());
}

/// Assert that a history consisting of a random sequence of snapshot
/// operations, scheduled by shuttle, is linearizable.
///
/// # Panics
///
/// Panics if the history of random snapshot operations is not linearizable.
#[cfg(feature = "shuttle")]
pub fn assert_random_operations_are_linearizable<S>()
where
    S: Snapshot + Send + Sync + 'static,
    Standard: Distribution<S::Value>,
    S::Value: Debug + Default + Eq + Hash + Send + 'static,
{
    use shuttle::rand::thread_rng;
    use shuttle::thread;

    const UPDATE_PROBABILITY: f64 = 1.0 / 2.0;

    let snapshot: Arc<RecordingSnapshot<S>> = Arc::new(RecordingSnapshot::new(NUM_THREADS));
    let mut handles = Vec::new();
    for i in 0..NUM_THREADS {
        let snapshot = snapshot.clone();
        let mut writer = snapshot.register();
        handles.push(thread::spawn(move || {
            let mut rng = thread_rng();
            for _ in 0..NUM_OPERATIONS {
                snapshot.perform_random_operation(i, &mut writer, UPDATE_PROBABILITY, &mut rng);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_linearizable(snapshot.actions());
}
