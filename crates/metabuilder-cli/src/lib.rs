//! CLI logic for the MetaBuilder class diagram engine.
//!
//! Loads a scene, replays it through the diagram builder and writes a
//! layout report.

pub mod error_adapter;
pub mod report;
pub mod scene;

mod args;
mod config;

pub use args::Args;

use std::{fs, io::Write};

use log::info;

use metabuilder::{MetabuilderError, builder::DiagramBuilder};

use crate::scene::Scene;

/// Run the MetaBuilder CLI application
///
/// # Errors
///
/// Returns `MetabuilderError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed scenes
/// - Elements or relationships the builder refuses
pub fn run(args: &Args) -> Result<(), MetabuilderError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Processing scene"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let source = fs::read_to_string(&args.input)?;

    let builder = DiagramBuilder::from_config(&app_config);
    let scene = Scene::parse(&source)?;
    let replay = scene::replay(&scene, &builder)?;
    let report = report::write_report(&replay, builder.metrics())
        .map_err(|err| MetabuilderError::Io(std::io::Error::other(err)))?;

    match &args.output {
        Some(output) => {
            fs::write(output, report)?;
            info!(output_file = output; "Report written");
        }
        None => std::io::stdout().write_all(report.as_bytes())?,
    }

    Ok(())
}
