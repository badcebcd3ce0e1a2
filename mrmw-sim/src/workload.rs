use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use mrmw_mem::snapshot::{Snapshot, Writer};
use rand::Rng;
use rand_distr::{Distribution, Exp};
use tracing::{debug, info};

use crate::config::Params;
use crate::log::{Event, Operation, Role};
use crate::GenericError;

/// Runs the workload described by `params` against a fresh snapshot object
/// of type `S`, and returns every event that occurred.
///
/// Writer threads keep updating random locations until every snapshot
/// thread has taken its `k` scans.
pub fn run<S>(params: &Params) -> Result<Vec<Event>, GenericError>
where
    S: Snapshot<Value = u32> + Sync,
{
    let writer_sleep = Exp::new(params.lambda_w)?;
    let snapshot_sleep = Exp::new(params.lambda_s)?;
    let snapshot = S::new(params.m, params.nw);
    let writers = (0..params.nw)
        .map(|_| snapshot.register())
        .collect::<Result<Vec<Writer>, _>>()?;
    let done = AtomicBool::new(false);

    info!(
        writers = params.nw,
        readers = params.ns,
        locations = params.m,
        "starting workload"
    );
    let events = thread::scope(|s| {
        let (snapshot, done) = (&snapshot, &done);
        let (writer_sleep, snapshot_sleep) = (&writer_sleep, &snapshot_sleep);
        let writers: Vec<_> = writers
            .into_iter()
            .enumerate()
            .map(|(i, writer)| {
                s.spawn(move || write_until_done(i, writer, snapshot, writer_sleep, done))
            })
            .collect();
        let readers: Vec<_> = (0..params.ns)
            .map(|i| s.spawn(move || scan_repeatedly(i, params.k, snapshot, snapshot_sleep)))
            .collect();

        let scans: Vec<_> = readers.into_iter().map(|reader| reader.join()).collect();
        // Writers only stop once told to, even if a reader panicked.
        done.store(true, Ordering::SeqCst);
        let updates: Vec<_> = writers.into_iter().map(|writer| writer.join()).collect();

        let mut events = Vec::new();
        for result in scans {
            events.extend(result.map_err(|_| "snapshot thread panicked")?);
        }
        for result in updates {
            events.extend(result.map_err(|_| "writer thread panicked")?);
        }
        Ok::<_, GenericError>(events)
    })?;
    debug!(events = events.len(), "workload finished");
    Ok(events)
}

fn sleep_for<R: Rng>(rng: &mut R, distribution: &Exp<f64>) {
    let millis: f64 = distribution.sample(rng);
    thread::sleep(Duration::from_secs_f64(millis / 1000.0));
}

fn write_until_done<S>(
    i: usize,
    mut writer: Writer,
    snapshot: &S,
    sleep: &Exp<f64>,
    done: &AtomicBool,
) -> Vec<Event>
where
    S: Snapshot<Value = u32>,
{
    let mut rng = rand::thread_rng();
    let mut events = Vec::new();
    while !done.load(Ordering::SeqCst) {
        let location = rng.gen_range(0..snapshot.size());
        let value: u32 = rng.gen();
        let start = Instant::now();
        snapshot.update(&mut writer, location, value);
        let duration = start.elapsed();
        events.push(Event {
            completed_at: SystemTime::now(),
            role: Role::Writer,
            thread: i,
            operation: Operation::Update { location, value },
            duration,
        });
        sleep_for(&mut rng, sleep);
    }
    events
}

fn scan_repeatedly<S>(i: usize, k: usize, snapshot: &S, sleep: &Exp<f64>) -> Vec<Event>
where
    S: Snapshot<Value = u32>,
{
    let mut rng = rand::thread_rng();
    let mut events = Vec::with_capacity(k);
    for round in 1..=k {
        let start = Instant::now();
        let view = snapshot.scan();
        let duration = start.elapsed();
        events.push(Event {
            completed_at: SystemTime::now(),
            role: Role::Snapshot,
            thread: i,
            operation: Operation::Scan { round, view },
            duration,
        });
        sleep_for(&mut rng, sleep);
    }
    events
}
