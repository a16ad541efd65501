//! Login command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use portal_core::CustomToken;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Login custom token issued by the platform
    #[arg(long, env = "PORTAL_CUSTOM_TOKEN", hide_env_values = true)]
    pub custom_token: String,
}

pub async fn run(config: &Config, args: LoginArgs) -> Result<()> {
    if config.identity_url.is_none() {
        bail!("no identity URL configured; pass --identity-url or set PORTAL_IDENTITY_URL");
    }

    let session = config.session()?;
    let token = session
        .login(CustomToken::new(args.custom_token))
        .await
        .context("Login failed")?;

    output::success("Logged in");
    output::field("Issued", &token.issued_at().to_rfc3339());

    Ok(())
}
