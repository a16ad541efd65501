//! Apps subcommand implementations.

use anyhow::Result;
use clap::{Args, Subcommand};

use portal_http::services::{AppUpdate, AppsService, NewApp};

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct AppsCommand {
    #[command(subcommand)]
    pub command: AppsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AppsSubcommand {
    /// List registered applications
    List {
        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Filter by name
        #[arg(long)]
        search: Option<String>,
    },

    /// Fetch a single application
    Get {
        /// Application ID
        id: String,
    },

    /// Register a new application
    Create {
        /// Application name
        #[arg(long)]
        name: String,

        /// Short description
        #[arg(long)]
        description: Option<String>,
    },

    /// Rename or re-describe an application
    Update {
        /// Application ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete an application
    Delete {
        /// Application ID
        id: String,
    },
}

pub async fn handle(config: &Config, cmd: AppsCommand) -> Result<()> {
    let apps = AppsService::new(config.client()?);

    match cmd.command {
        AppsSubcommand::List { page, search } => {
            for app in apps.list(page, search.as_deref()).await? {
                output::json(&app, true)?;
            }
        }
        AppsSubcommand::Get { id } => {
            output::json(&apps.get(&id).await?, false)?;
        }
        AppsSubcommand::Create { name, description } => {
            let app = apps.create(&NewApp { name, description }).await?;
            output::success(&format!("Created app {}", app.id));
        }
        AppsSubcommand::Update {
            id,
            name,
            description,
        } => {
            let app = apps.update(&id, &AppUpdate { name, description }).await?;
            output::success(&format!("Updated app {}", app.id));
        }
        AppsSubcommand::Delete { id } => {
            apps.delete(&id).await?;
            output::success(&format!("Deleted app {}", id));
        }
    }

    Ok(())
}
