//! Developer notifications.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use portal_core::Result;

use super::segment;
use crate::client::ApiClient;
use crate::request::ApiRequest;

/// A notification addressed to the signed-in developer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Read access to `/notifications`.
#[derive(Debug, Clone)]
pub struct NotificationsService {
    client: ApiClient,
}

impl NotificationsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, unread_only: bool) -> Result<Vec<Notification>> {
        let request =
            ApiRequest::get("/notifications").query_opt("unread", unread_only.then_some(true));
        self.client.send(request).await
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: &str) -> Result<()> {
        let request = ApiRequest::put(format!("/notifications/{}/read", segment(id)?));
        self.client.send_unit(request).await
    }
}
