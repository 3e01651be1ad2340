//! ArgMatches → configuration and action.
//!
//! Layers the process configuration the way the binary documents it:
//! defaults, then the `--config` file, then the environment, then flags.

use std::path::Path;
use std::str::FromStr;

use clap::ArgMatches;
use skewcheck_core::IsolationLevel;
use skewcheck_harness::HarnessConfig;

/// Scenario selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    RepeatableRead,
    ReadSkew,
    BulkReadSkew,
    WriteSkew,
}

/// What the process does once configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliAction {
    /// Drive a scenario until the iteration limit or a fatal error.
    Run(ScenarioKind),
    /// Bulk-load a fresh reference store and exit.
    Load,
}

/// Fully resolved command line.
#[derive(Debug)]
pub struct Invocation {
    pub config: HarnessConfig,
    pub action: CliAction,
}

/// Convert clap ArgMatches into an Invocation, reading the real environment.
pub fn matches_to_invocation(matches: &ArgMatches) -> Result<Invocation, String> {
    resolve(matches, |name| std::env::var(name).ok())
}

fn resolve<F>(matches: &ArgMatches, lookup: F) -> Result<Invocation, String>
where
    F: Fn(&str) -> Option<String>,
{
    let (sub_name, sub) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    let mut config = match sub.get_one::<String>("config") {
        Some(path) => HarnessConfig::from_file(Path::new(path)).map_err(|e| e.to_string())?,
        None => HarnessConfig::default(),
    };
    config.apply_vars(lookup);
    apply_global_flags(sub, &mut config)?;

    let action = match sub_name {
        "repeatable-read" => CliAction::Run(ScenarioKind::RepeatableRead),
        "read-skew" => {
            if let Some(delay) = sub.get_one::<u64>("reader-delay-ms") {
                config.reader_delay_ms = *delay;
            }
            CliAction::Run(ScenarioKind::ReadSkew)
        }
        "bulk-read-skew" => {
            apply_dataset_size(sub, &mut config);
            CliAction::Run(ScenarioKind::BulkReadSkew)
        }
        "write-skew" => {
            if let Some(workers) = sub.get_one::<usize>("workers") {
                config.write_skew_workers = *workers;
            }
            if let Some(seed) = sub.get_one::<u64>("seed") {
                config.seed = Some(*seed);
            }
            CliAction::Run(ScenarioKind::WriteSkew)
        }
        "load" => {
            apply_dataset_size(sub, &mut config);
            CliAction::Load
        }
        other => return Err(format!("Unknown command: {}", other)),
    };

    config.validate().map_err(|e| e.to_string())?;
    Ok(Invocation { config, action })
}

fn apply_global_flags(matches: &ArgMatches, config: &mut HarnessConfig) -> Result<(), String> {
    if let Some(project_id) = matches.get_one::<String>("project-id") {
        config.project_id = project_id.clone();
    }
    if let Some(namespace) = matches.get_one::<String>("namespace") {
        config.namespace = namespace.clone();
    }
    if let Some(isolation) = matches.get_one::<String>("isolation") {
        config.isolation = IsolationLevel::from_str(isolation)?;
    }
    if let Some(iterations) = matches.get_one::<u64>("iterations") {
        config.iterations = Some(*iterations);
    }
    if let Some(latency) = matches.get_one::<u64>("read-latency-ms") {
        config.read_latency_ms = *latency;
    }
    Ok(())
}

fn apply_dataset_size(matches: &ArgMatches, config: &mut HarnessConfig) {
    if let Some(size) = matches.get_one::<u64>("dataset-size") {
        config.dataset_size = *size;
    }
}
