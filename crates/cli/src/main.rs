//! skewcheck: drive isolation-anomaly scenarios from the command line.
//!
//! `skewcheck [flags] SCENARIO` runs one scenario against the in-memory
//! reference store until the iteration limit or the first fatal error. An
//! invariant violation exits with status 1.
//!
//! The reference store lives only as long as the process, so `bulk-read-skew`
//! loads its dataset on every run and `load` only measures the loader.

mod commands;
mod parse;

use std::process;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use skewcheck_core::Store;
use skewcheck_engine::{MemorySession, MemoryStore};
use skewcheck_harness::scenario::KIND_READ_SKEW;
use skewcheck_harness::{
    BulkLoader, BulkReadSkew, Driver, DriverReport, HarnessConfig, HarnessError, HarnessResult,
    ReadSkew, RepeatableRead, Scenario, ScenarioRunner, WriteSkew,
};

use commands::build_cli;
use parse::{matches_to_invocation, CliAction, ScenarioKind};

fn main() {
    let cli = build_cli();
    let matches = cli.get_matches();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let invocation = match matches_to_invocation(&matches) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("(error) {}", e);
            process::exit(1);
        }
    };

    let config = invocation.config;
    tracing::info!(
        project_id = %config.project_id,
        namespace = %config.namespace,
        isolation = %config.isolation,
        iterations = ?config.iterations,
        "starting"
    );

    let store = MemoryStore::with_read_latency(config.isolation, config.read_latency());
    let result = match invocation.action {
        CliAction::Load => load(&store, &config).map(|_| ()),
        CliAction::Run(kind) => run(&store, &config, kind).map(|report| {
            println!(
                "{} iterations: {} passed, {} aborted, {} failed",
                report.iterations, report.passed, report.aborted, report.failed
            );
        }),
    };

    if let Err(e) = result {
        eprintln!("(error) {}", e);
        process::exit(1);
    }
}

fn load(store: &MemoryStore, config: &HarnessConfig) -> HarnessResult<()> {
    let session = store.connect()?;
    let started = Instant::now();
    let report = BulkLoader::new(&session, &config.namespace(), KIND_READ_SKEW)
        .load(config.dataset_size)?;
    println!(
        "loaded {} records in {} batches in {:.2?}",
        report.records,
        report.batches,
        started.elapsed()
    );
    Ok(())
}

fn run(
    store: &MemoryStore,
    config: &HarnessConfig,
    kind: ScenarioKind,
) -> HarnessResult<DriverReport> {
    let namespace = config.namespace();
    let workers = match kind {
        ScenarioKind::WriteSkew => config.write_skew_workers,
        _ => 2,
    };
    let sessions = (0..workers)
        .map(|_| store.connect())
        .collect::<Result<Vec<MemorySession>, _>>()?;

    match kind {
        ScenarioKind::RepeatableRead => {
            drive(&sessions, config, &mut RepeatableRead::new(&namespace))
        }
        ScenarioKind::ReadSkew => {
            let mut scenario = ReadSkew::new(&namespace).with_reader_delay(config.reader_delay());
            drive(&sessions, config, &mut scenario)
        }
        ScenarioKind::BulkReadSkew => {
            let mut scenario = BulkReadSkew::new(&namespace, config.dataset_size)?;
            scenario.load(&sessions[0])?;
            drive(&sessions, config, &mut scenario)
        }
        ScenarioKind::WriteSkew => {
            let seed = config.seed.unwrap_or_else(rand::random);
            tracing::info!(seed, workers, "write-skew roles");
            let mut scenario = WriteSkew::new(&namespace, workers, StdRng::seed_from_u64(seed));
            drive(&sessions, config, &mut scenario)
        }
    }
}

fn drive<Sc>(
    sessions: &[MemorySession],
    config: &HarnessConfig,
    scenario: &mut Sc,
) -> HarnessResult<DriverReport>
where
    Sc: Scenario<MemorySession>,
{
    let runner = ScenarioRunner::new(sessions)?;
    let driver = Driver::new(runner, config.iterations.into());
    match driver.run(scenario) {
        Err(e @ HarnessError::InvariantViolation { .. }) => {
            tracing::error!(scenario = scenario.name(), "isolation anomaly detected");
            Err(e)
        }
        other => other,
    }
}
