//! Resource services.
//!
//! Each service is a thin caller of [`ApiClient`](crate::ApiClient): it names
//! endpoints and payload types and never touches tokens.

mod apps;
mod notifications;

pub use apps::{App, AppUpdate, AppsService, NewApp};
pub use notifications::{Notification, NotificationsService};

use portal_core::Result;
use portal_core::error::InvalidInputError;

/// Validate an identifier used as a single path segment.
fn segment(id: &str) -> Result<&str> {
    // URL parsing treats `\` as `/` and decodes `%2e` to `.`.
    if id.is_empty()
        || id.contains(['/', '\\', '%', '?', '#'])
        || id.chars().any(char::is_control)
        || id == "."
        || id == ".."
    {
        return Err(InvalidInputError::Path {
            value: id.to_string(),
            reason: "identifier must be a single path segment".to_string(),
        }
        .into());
    }
    Ok(id)
}
