//! CLI module for tableschema
//!
//! Provides command-line interface for:
//! - infer: Build a schema from a table sample
//! - validate: Check a table against a schema document
//! - convert: Rewrite a table with columns reordered by name

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, SourceArgs};
pub use commands::{convert, infer, run, run_command, validate};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
