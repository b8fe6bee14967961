//! ## tracestat-cli
//! **Command-line front-end**
//!
//! `tracestat analyze <trace>` computes traffic statistics of a capture and
//! `tracestat replay <trace>` puts it back on a network interface.

use std::process::ExitCode;

use clap::Parser;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match commands::run_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
