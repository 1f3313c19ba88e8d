//! MetaBuilder CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use metabuilder_cli::{Args, error_adapter::Reportable};

fn main() {
    // Panics are rendered by miette too
    miette::set_panic_hook();

    let args = Args::parse();

    // Fall back to warn on an unrecognised level name
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting MetaBuilder");
    debug!(args:?; "Parsed arguments");

    // Replay the scene and write the report
    if let Err(err) = metabuilder_cli::run(&args) {
        // Scene errors carry their source, so the report can point into it
        let reporter = miette::GraphicalReportHandler::new();
        let mut writer = String::new();
        reporter
            .render_report(&mut writer, &Reportable::new(&err))
            .expect("Writing to String buffer is infallible");
        error!("Scene replay failed\n{writer}");

        process::exit(1);
    }

    info!("Completed successfully");
}
