//! Command-line argument definitions for the MetaBuilder CLI.

use clap::Parser;

/// Replays a class diagram scene and reports the resulting layout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the scene file (TOML)
    #[arg(help = "Path to the scene file")]
    pub input: String,

    /// Path to the report file; the report goes to stdout when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
