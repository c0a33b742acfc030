// src/bin/repodeck.rs

use clap::Parser;
use colored::*;
use repodeck::{
    cli::{Cli, dispatcher},
    state::AppState,
};

/// The main entry point of the `repodeck` application.
/// It sets up logging, parses arguments, dispatches to the correct handler,
/// and performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // clap errors (including --help inside a handler) know how to print themselves.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);
    let mut state = AppState::from_user_config()?;
    dispatcher::dispatch(cli.args, &mut state)
}
