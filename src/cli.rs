//! Command-line interface definition.
//!
//! Uses [clap] derive macros to parse arguments. This module is only used by
//! the binary crate (`src/main.rs`) — the library's entry point is
//! [`flare::assess::assess`].

use std::path::PathBuf;

use clap::Parser;
use flare::output::OutputFormat;

/// Local risk assessment for a shell command.
#[derive(Parser)]
#[command(name = "flare", version, about = "Local risk assessment for shell commands")]
pub struct Cli {
    /// The shell command to assess.
    pub command: String,

    /// Directory the command would run from (defaults to the current directory).
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Path to a custom flare.toml configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format (pretty or json).
    #[arg(long, short, default_value = "pretty", value_enum)]
    pub format: OutputFormat,
}
