// Shuttle primitives can only be used inside a shuttle execution.
#![cfg(not(feature = "shuttle"))]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use mrmw_mem::snapshot::{
    Error, ObstructionFreeEpochSnapshot, ObstructionFreeMutexSnapshot, Outcome, Snapshot,
    WaitFreeEpochSnapshot, WaitFreeMutexSnapshot,
};

use super::common::{NUM_OPERATIONS, NUM_THREADS};

macro_rules! snapshot_tests {
    ($($name:ident: $snapshot:ty,)*) => {
    $(
        mod $name {
            use super::*;

            type S = $snapshot;

            #[test]
            fn scan_sees_completed_update() {
                let snapshot = S::new(3, 1);
                let mut writer = snapshot.register().unwrap();
                assert_eq!(snapshot.scan(), vec![0, 0, 0]);
                snapshot.update(&mut writer, 1, 5);
                assert_eq!(snapshot.scan(), vec![0, 5, 0]);
            }

            #[test]
            fn later_update_to_a_location_wins() {
                let snapshot = S::new(2, 2);
                let mut first = snapshot.register().unwrap();
                let mut second = snapshot.register().unwrap();
                snapshot.update(&mut first, 0, 1);
                snapshot.update(&mut second, 0, 2);
                assert_eq!(snapshot.scan(), vec![2, 0]);
            }

            #[test]
            fn size_is_fixed_at_creation() {
                let snapshot = S::new(7, 1);
                assert_eq!(snapshot.size(), 7);
                assert_eq!(snapshot.scan().len(), 7);
            }

            #[test]
            fn register_is_limited_by_capacity() {
                let snapshot = S::new(1, 2);
                snapshot.register().unwrap();
                snapshot.register().unwrap();
                assert_eq!(
                    snapshot.register().unwrap_err(),
                    Error::WriterLimitReached { capacity: 2 }
                );
            }

            #[test]
            fn writers_read_their_own_writes() {
                let snapshot = Arc::new(S::new(NUM_THREADS, NUM_THREADS));
                let handles: Vec<_> = (0..NUM_THREADS)
                    .map(|i| {
                        let snapshot = snapshot.clone();
                        let mut writer = snapshot.register().unwrap();
                        thread::spawn(move || {
                            for value in 1..=NUM_OPERATIONS as u32 {
                                snapshot.update(&mut writer, i, value);
                                assert_eq!(snapshot.scan()[i], value);
                            }
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.join().unwrap();
                }
            }

            #[test]
            fn successive_scans_never_go_back_in_time() {
                let snapshot = Arc::new(S::new(NUM_THREADS, NUM_THREADS));
                let handles: Vec<_> = (0..NUM_THREADS)
                    .map(|i| {
                        let snapshot = snapshot.clone();
                        let mut writer = snapshot.register().unwrap();
                        thread::spawn(move || {
                            for value in 1..=NUM_OPERATIONS as u32 {
                                snapshot.update(&mut writer, i, value);
                            }
                        })
                    })
                    .collect();

                // Every writer only increases its own location, so the
                // views of a single reader increase componentwise.
                let mut previous = snapshot.scan();
                for _ in 0..NUM_OPERATIONS {
                    let current = snapshot.scan();
                    assert!(previous.iter().zip(&current).all(|(p, c)| p <= c));
                    previous = current;
                }

                for handle in handles {
                    handle.join().unwrap();
                }
                assert_eq!(snapshot.scan(), vec![NUM_OPERATIONS as u32; NUM_THREADS]);
            }
        }
    )*
    }
}

snapshot_tests! {
    obstruction_free_epoch_snapshot: ObstructionFreeEpochSnapshot<u32>,
    obstruction_free_mutex_snapshot: ObstructionFreeMutexSnapshot<u32>,
    wait_free_epoch_snapshot: WaitFreeEpochSnapshot<u32>,
    wait_free_mutex_snapshot: WaitFreeMutexSnapshot<u32>,
}

/// Spawns one thread per registered writer, each updating its own location
/// until `stop` is set.
fn spawn_busy_writers<S>(snapshot: &Arc<S>, stop: &Arc<AtomicBool>) -> Vec<thread::JoinHandle<()>>
where
    S: Snapshot<Value = u32> + Send + Sync + 'static,
{
    (0..NUM_THREADS)
        .map(|i| {
            let snapshot = snapshot.clone();
            let stop = stop.clone();
            let mut writer = snapshot.register().unwrap();
            thread::spawn(move || {
                let mut value = 0;
                while !stop.load(Ordering::Relaxed) {
                    value += 1;
                    snapshot.update(&mut writer, i, value);
                }
            })
        })
        .collect()
}

mod wait_free {
    use super::*;

    #[test]
    fn scans_finish_within_bound_under_contention() {
        let snapshot = Arc::new(WaitFreeEpochSnapshot::<u32>::new(NUM_THREADS, NUM_THREADS));
        let stop = Arc::new(AtomicBool::new(false));
        let handles = spawn_busy_writers(&snapshot, &stop);

        for _ in 0..1000 {
            let scan = snapshot.scan_detailed();
            assert!(scan.collects <= NUM_THREADS + 2);
            if let Outcome::Helped(writer) = scan.outcome {
                assert!(writer < NUM_THREADS);
            }
        }

        stop.store(true, Ordering::Relaxed);
        for handle in handles {
            handle.join().unwrap();
        }
    }
}

mod obstruction_free {
    use super::*;

    #[test]
    fn scan_finishes_with_one_writer_and_one_reader() {
        let snapshot = Arc::new(ObstructionFreeEpochSnapshot::<u32>::new(1, 1));
        let mut writer = snapshot.register().unwrap();
        let handle = {
            let snapshot = snapshot.clone();
            thread::spawn(move || {
                for value in 1..=1000 {
                    snapshot.update(&mut writer, 0, value);
                }
            })
        };

        for _ in 0..NUM_OPERATIONS {
            let scan = snapshot.scan_detailed();
            assert!(scan.collects >= 2);
            assert_eq!(scan.outcome, Outcome::Clean);
        }

        handle.join().unwrap();
        assert_eq!(snapshot.scan(), vec![1000]);
    }

    #[test]
    fn bounded_scan_may_give_up_under_contention() {
        let snapshot = Arc::new(ObstructionFreeEpochSnapshot::<u32>::new(
            NUM_THREADS,
            NUM_THREADS,
        ));
        let stop = Arc::new(AtomicBool::new(false));
        let handles = spawn_busy_writers(&snapshot, &stop);

        // A scan that starves is allowed here, so only the shape of a
        // successful result is checked.
        for _ in 0..100 {
            if let Some(view) = snapshot.try_scan(4) {
                assert_eq!(view.len(), NUM_THREADS);
            }
        }

        stop.store(true, Ordering::Relaxed);
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(snapshot.try_scan(2).is_some());
    }
}
