//! snipeprobe CLI library
//!
//! Argument parsing, configuration layering and terminal output for the
//! `snipeprobe` binary.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
mod output;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ConfigSource, RunArgs};
pub use config::{load_config, load_config_with, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{detail_lines, Reporter};
