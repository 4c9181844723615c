//! CLI entry point for playlist-sync.

use std::process::ExitCode;

use clap::Parser;

mod app;
mod cli;

use cli::Args;

/// Process outcome, mapped to the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// The run completed, whatever happened to individual tracks.
    Success,
    /// Setup failed before any track was processed.
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => Self::SUCCESS,
            ProcessExit::Failure => Self::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse before tracing so --help and usage errors print without logs.
    let args = Args::parse();

    match app::runtime::run_sync(args).await {
        Ok(exit) => exit.into(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ProcessExit::Failure.into()
        }
    }
}
