//! Connection settings shared by every command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use directories::ProjectDirs;
use tracing::debug;

use portal_core::{ApiUrl, SessionManager, SignedOutGateway, TokenGateway};
use portal_file::FileTokenStore;
use portal_http::{ApiClient, ClientConfig, HttpTokenGateway};

/// Global connection flags.
#[derive(Args, Debug)]
pub struct Config {
    /// Platform API base URL
    #[arg(long, env = "PORTAL_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Identity backend base URL (needed to log in and refresh tokens)
    #[arg(long, env = "PORTAL_IDENTITY_URL", global = true)]
    pub identity_url: Option<String>,

    /// Value of the Language header
    #[arg(long, env = "PORTAL_LANGUAGE", default_value = "en", global = true)]
    pub language: String,

    /// Request timeout in seconds
    #[arg(long, env = "PORTAL_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Directory holding the session storage file
    #[arg(long, env = "PORTAL_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Resolve the data directory, falling back to the platform default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let dirs = ProjectDirs::from("", "", "portal")
            .context("could not determine a data directory; pass --data-dir")?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Build the session manager over the file store and the configured gateway.
    ///
    /// Without an identity URL the session can still read the stored token,
    /// but cannot log in or refresh.
    pub fn session(&self) -> Result<SessionManager> {
        let data_dir = self.data_dir()?;
        debug!(data_dir = %data_dir.display(), "Opening session storage");
        let store = Arc::new(FileTokenStore::new(data_dir));

        let gateway: Arc<dyn TokenGateway> = match &self.identity_url {
            Some(url) => {
                let base = ApiUrl::new(url).context("invalid identity URL")?;
                Arc::new(HttpTokenGateway::new(base)?)
            }
            None => Arc::new(SignedOutGateway),
        };

        Ok(SessionManager::new(gateway, store))
    }

    /// Build an API client bound to a fresh session.
    pub fn client(&self) -> Result<ApiClient> {
        let Some(url) = &self.api_url else {
            bail!("no API URL configured; pass --api-url or set PORTAL_API_URL");
        };
        let base = ApiUrl::new(url).context("invalid API URL")?;

        let config = ClientConfig {
            language: self.language.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
            ..ClientConfig::default()
        };

        Ok(ApiClient::with_config(base, self.session()?, config)?)
    }
}
