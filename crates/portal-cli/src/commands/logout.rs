//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(config: &Config, _args: LogoutArgs) -> Result<()> {
    let session = config.session()?;
    session.logout().await.context("Failed to clear session")?;

    output::success("Logged out");
    Ok(())
}
