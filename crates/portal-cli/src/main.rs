//! portal - CLI for the developer portal API.
//!
//! A thin wrapper over the portal session stack: log in with a custom token,
//! then issue authenticated requests. The identity token is persisted in the
//! data directory between invocations.

mod cli;
mod commands;
mod config;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let result = match cli.command {
        Commands::Login(args) => commands::login::run(&cli.config, args).await,
        Commands::Logout(args) => commands::logout::run(&cli.config, args).await,
        Commands::Status(args) => commands::status::run(&cli.config, args).await,
        Commands::Request(args) => commands::request::run(&cli.config, args).await,
        Commands::Apps(cmd) => commands::apps::handle(&cli.config, cmd).await,
        Commands::Notifications(cmd) => commands::notifications::handle(&cli.config, cmd).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            if e
                .downcast_ref::<portal_core::Error>()
                .is_some_and(portal_core::Error::requires_login)
            {
                output::hint("Run 'portal login --custom-token <TOKEN>' to sign in again.");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
