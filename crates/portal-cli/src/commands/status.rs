//! Status command implementation.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(config: &Config, args: StatusArgs) -> Result<()> {
    let data_dir = config.data_dir()?;
    let token = config.session()?.token();

    if args.json {
        return output::json(
            &json!({
                "authenticated": token.is_some(),
                "issuedAt": token.as_ref().map(|t| t.issued_at().to_rfc3339()),
                "dataDir": data_dir.display().to_string(),
            }),
            true,
        );
    }

    match token {
        Some(token) => {
            output::field("Status", "logged in");
            output::field("Issued", &token.issued_at().to_rfc3339());
        }
        None => output::field("Status", "not logged in"),
    }
    output::field("Data dir", &data_dir.display().to_string());

    Ok(())
}
