//! Clap command tree definition.

use clap::{value_parser, Arg, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("skewcheck")
        .about("Drive isolation-anomaly scenarios against a transactional store")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML config file (flags and environment override it)")
                .global(true),
        )
        .arg(
            Arg::new("project-id")
                .long("project-id")
                .help("Target project id (default: $DATASTORE_PROJECT_ID)")
                .global(true),
        )
        .arg(
            Arg::new("namespace")
                .long("namespace")
                .help("Namespace of every scenario key (default: $DATASTORE_NAMESPACE)")
                .global(true),
        )
        .arg(
            Arg::new("isolation")
                .long("isolation")
                .help("Isolation level of the reference store: read-committed, snapshot, serializable")
                .global(true),
        )
        .arg(
            Arg::new("iterations")
                .long("iterations")
                .short('n')
                .help("Stop after this many iterations (default: run until a violation)")
                .value_parser(value_parser!(u64))
                .global(true),
        )
        .arg(
            Arg::new("read-latency-ms")
                .long("read-latency-ms")
                .help("Artificial latency of every transactional read")
                .value_parser(value_parser!(u64))
                .global(true),
        )
        .subcommand(
            Command::new("repeatable-read")
                .about("Reader reads x twice around a concurrent increment"),
        )
        .subcommand(
            Command::new("read-skew")
                .about("Reader reads x and y around a concurrent transfer")
                .arg(
                    Arg::new("reader-delay-ms")
                        .long("reader-delay-ms")
                        .help("Reader pause around the handshake (default: 3000)")
                        .value_parser(value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("bulk-read-skew")
                .about("Load a dataset, then read skew between its first and last ids")
                .arg(dataset_size_arg()),
        )
        .subcommand(
            Command::new("write-skew")
                .about("N workers race guarded increments of two counters")
                .arg(
                    Arg::new("workers")
                        .long("workers")
                        .short('w')
                        .help("Concurrent workers (default: 10)")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed of the role assignment (default: random)")
                        .value_parser(value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("load")
                .about("Time a bulk load into a fresh reference store, then exit")
                .arg(dataset_size_arg()),
        )
}

fn dataset_size_arg() -> Arg {
    Arg::new("dataset-size")
        .long("dataset-size")
        .help("Records in the dataset (default: 1048576)")
        .value_parser(value_parser!(u64))
}
