//! Raw request command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;

use portal_http::ApiRequest;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT or DELETE)
    pub method: String,

    /// Path relative to the API base URL (e.g. /apps)
    pub path: String,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "query", value_name = "KEY=VALUE")]
    pub queries: Vec<String>,

    /// Extra header as name:value (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// JSON request body
    #[arg(short, long)]
    pub body: Option<String>,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,
}

pub async fn run(config: &Config, args: RequestArgs) -> Result<()> {
    let mut request = match args.method.to_ascii_uppercase().as_str() {
        "GET" => ApiRequest::get(&args.path),
        "POST" => ApiRequest::post(&args.path),
        "PUT" => ApiRequest::put(&args.path),
        "DELETE" => ApiRequest::delete(&args.path),
        other => bail!("unsupported method '{}'", other),
    };

    for pair in &args.queries {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("query '{}' must be KEY=VALUE", pair))?;
        request = request.query(key, value);
    }

    for pair in &args.headers {
        let (name, value) = pair
            .split_once(':')
            .with_context(|| format!("header '{}' must be NAME:VALUE", pair))?;
        request = request.header(name.trim(), value.trim());
    }

    if let Some(body) = &args.body {
        let body: Value = serde_json::from_str(body).context("body is not valid JSON")?;
        request = request.json(&body)?;
    }

    let client = config.client()?;

    if request.method().as_str() == "DELETE" {
        client.send_unit(request).await?;
        output::success("Deleted");
        return Ok(());
    }

    let data: Value = client.send(request).await?;
    output::json(&data, args.compact)
}
