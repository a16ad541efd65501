//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{apps, login, logout, notifications, request, status};
use crate::config::Config;

/// Developer portal CLI.
#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(author, version = env!("PORTAL_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Exchange a login custom token and store the session
    Login(login::LoginArgs),

    /// Sign out and clear the stored session
    Logout(logout::LogoutArgs),

    /// Show the stored session
    Status(status::StatusArgs),

    /// Send an authenticated request to any API path
    Request(request::RequestArgs),

    /// Manage third-party applications
    Apps(apps::AppsCommand),

    /// Read developer notifications
    Notifications(notifications::NotificationsCommand),
}
