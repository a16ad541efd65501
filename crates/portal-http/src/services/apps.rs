//! Third-party application management.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use portal_core::Result;

use super::segment;
use crate::client::ApiClient;
use crate::request::ApiRequest;

/// A registered third-party application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// Request body for registering an application.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApp {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update of an application.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// CRUD over `/apps`.
#[derive(Debug, Clone)]
pub struct AppsService {
    client: ApiClient,
}

impl AppsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List applications, optionally paged and filtered by a search term.
    #[instrument(skip(self))]
    pub async fn list(&self, page: Option<u32>, search: Option<&str>) -> Result<Vec<App>> {
        debug!("Listing apps");
        let request = ApiRequest::get("/apps")
            .query_opt("page", page)
            .query_opt("search", search);
        self.client.send(request).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<App> {
        self.client.get(&format!("/apps/{}", segment(id)?)).await
    }

    #[instrument(skip(self, app), fields(name = %app.name))]
    pub async fn create(&self, app: &NewApp) -> Result<App> {
        debug!("Creating app");
        self.client.post("/apps", app).await
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, id: &str, update: &AppUpdate) -> Result<App> {
        self.client
            .put(&format!("/apps/{}", segment(id)?), update)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        debug!("Deleting app");
        self.client.delete(&format!("/apps/{}", segment(id)?)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_decodes_with_optional_fields_missing() {
        let app: App = serde_json::from_value(serde_json::json!({
            "id": "app_1",
            "name": "Weather"
        }))
        .unwrap();
        assert_eq!(app.name, "Weather");
        assert!(app.icon_url.is_none());
    }

    #[test]
    fn update_omits_unset_fields() {
        let update = AppUpdate {
            description: Some("Forecasts".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"description": "Forecasts"}));
    }
}
