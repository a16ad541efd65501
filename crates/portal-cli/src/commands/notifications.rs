//! Notifications subcommand implementations.

use anyhow::Result;
use clap::{Args, Subcommand};

use portal_http::services::NotificationsService;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct NotificationsCommand {
    #[command(subcommand)]
    pub command: NotificationsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum NotificationsSubcommand {
    /// List notifications, one JSON object per line
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },

    /// Mark a notification as read
    Read {
        /// Notification ID
        id: String,
    },
}

pub async fn handle(config: &Config, cmd: NotificationsCommand) -> Result<()> {
    let notifications = NotificationsService::new(config.client()?);

    match cmd.command {
        NotificationsSubcommand::List { unread } => {
            for notification in notifications.list(unread).await? {
                output::json(&notification, true)?;
            }
        }
        NotificationsSubcommand::Read { id } => {
            notifications.mark_read(&id).await?;
            output::success(&format!("Marked {} as read", id));
        }
    }

    Ok(())
}
