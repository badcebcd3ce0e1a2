//! Runs a simulated workload against a snapshot object and logs every
//! operation, as configured by [`Config::from_env`].
use mrmw_mem::snapshot::{ObstructionFreeEpochSnapshot, WaitFreeEpochSnapshot};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Algorithm, Config, Params};
use crate::log::{Latency, Role};

mod config;
mod log;
mod workload;

type GenericError = Box<dyn std::error::Error + Send + Sync>;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = simulate() {
        error!("{e}");
        std::process::exit(1);
    }
}

fn simulate() -> Result<(), GenericError> {
    let config = Config::from_env()?;
    let params = Params::load(&config.params)?;
    info!(algorithm = %config.algorithm, params = ?params, "loaded configuration");

    let mut events = match config.algorithm {
        Algorithm::ObstructionFree => workload::run::<ObstructionFreeEpochSnapshot<u32>>(&params)?,
        Algorithm::WaitFree => workload::run::<WaitFreeEpochSnapshot<u32>>(&params)?,
    };
    log::write_events(&config.output, &mut events)
        .map_err(|e| format!("could not write {}: {e}", config.output.display()))?;

    for (role, name) in [(Role::Writer, "update"), (Role::Snapshot, "scan")] {
        let latency = Latency::of(&events, role);
        info!(
            operation = name,
            count = latency.count,
            average_ns = latency.average.as_nanos() as u64,
            worst_ns = latency.worst.as_nanos() as u64,
            "latency"
        );
    }
    info!(output = %config.output.display(), "wrote {} events", events.len());
    Ok(())
}
