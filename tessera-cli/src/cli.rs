//! Command-line interface orchestration for the tessera clustering driver.
//!
//! The CLI offers a `run` command that loads a CSV coordinate table,
//! executes the clustering pipeline on the selected backend, and optionally
//! exports the clustered table.

mod commands;

pub use commands::{
    BackendArg, Cli, CliError, Command, CsvArgs, ExecutionSummary, RunCommand, RunSource,
    render_summary, run_cli,
};
