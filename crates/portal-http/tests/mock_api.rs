//! Mock API tests for the authenticated request pipeline.
//!
//! These tests use wiremock to simulate the platform API and check how each
//! response class is surfaced and what it does to the session.

use std::sync::Arc;

use portal_core::error::AuthError;
use portal_core::{ApiUrl, Error, IdentityToken, MemoryTokenStore, SessionManager, SignedOutGateway};
use portal_http::services::{AppUpdate, AppsService, NewApp, NotificationsService};
use portal_http::{ApiClient, ApiRequest, ClientConfig};
use serde_json::{Value, json};
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create an API URL from a mock server.
fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

/// Session with no identity provider, optionally holding a persisted token.
fn session(token: Option<&str>) -> SessionManager {
    let store = match token {
        Some(t) => MemoryTokenStore::with_token(IdentityToken::new(t)),
        None => MemoryTokenStore::new(),
    };
    SessionManager::new(Arc::new(SignedOutGateway), Arc::new(store))
}

fn client(server: &MockServer, session: SessionManager) -> ApiClient {
    ApiClient::new(mock_api_url(server), session).unwrap()
}

// ============================================================================
// Token acquisition
// ============================================================================

#[tokio::test]
async fn test_no_token_never_dispatches() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let api = client(&server, session(None));
    let err = api.get::<Vec<Value>>("/apps").await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::Unauthenticated)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bearer_and_fixed_headers_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apps"))
        .and(header("authorization", "Bearer id_123"))
        .and(header("content-type", "application/json"))
        .and(header("language", "de"))
        .and(header("client", "developer-portal"))
        .and(header("x-request-id", "req-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig {
        language: "de".to_string(),
        ..ClientConfig::default()
    };
    let api = ApiClient::with_config(mock_api_url(&server), session(Some("id_123")), config)
        .unwrap();

    let request = ApiRequest::get("/apps").header("X-Request-Id", "req-7");
    let apps: Vec<Value> = api.send(request).await.unwrap();
    assert!(apps.is_empty());
}

#[tokio::test]
async fn test_custom_authorization_header_cannot_override_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apps"))
        .and(header("authorization", "Bearer id_123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, session(Some("id_123")));
    let request = ApiRequest::get("/apps").header("Authorization", "Bearer forged");
    let _: Vec<Value> = api.send(request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let auth: Vec<_> = received[0].headers.get_all("authorization").iter().collect();
    assert_eq!(auth.len(), 1);
    assert_eq!(auth[0], "Bearer id_123");
}

// ============================================================================
// Response classification
// ============================================================================

#[tokio::test]
async fn test_success_returns_data_only() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "app_1", "name": "Weather"}, {"id": "app_2", "name": "Maps"}],
            "message": "ok"
        })))
        .mount(&server)
        .await;

    let api = client(&server, session(Some("id_123")));
    let data: Value = api.get("/apps").await.unwrap();

    assert_eq!(
        data,
        json!([{"id": "app_1", "name": "Weather"}, {"id": "app_2", "name": "Maps"}])
    );
}

#[tokio::test]
async fn test_401_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apps"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "token expired"
        })))
        .mount(&server)
        .await;

    let session = session(Some("id_123"));
    let api = client(&server, session.clone());
    let err = api.get::<Value>("/apps").await.unwrap_err();

    assert!(err.is_auth_failure());
    assert!(session.token().is_none());
}

#[tokio::test]
async fn test_request_after_401_fails_locally() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apps"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, session(Some("id_123")));
    assert!(api.get::<Value>("/apps").await.unwrap_err().is_auth_failure());
    assert!(api.get::<Value>("/apps").await.unwrap_err().is_unauthenticated());
}

#[tokio::test]
async fn test_403_carries_message_and_keeps_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wallet"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "Missing scope"
        })))
        .mount(&server)
        .await;

    let session = session(Some("id_123"));
    let api = client(&server, session.clone());
    let err = api.get::<Value>("/wallet").await.unwrap_err();

    match err {
        Error::PermissionDenied { message } => assert_eq!(message, "Missing scope"),
        other => panic!("expected PermissionDenied, got {other:?}"),
    }
    assert_eq!(session.token().unwrap().as_str(), "id_123");
}

#[tokio::test]
async fn test_403_without_message_uses_reason_phrase() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wallet"))
        .respond_with(ResponseTemplate::new(403).set_body_string("nope"))
        .mount(&server)
        .await;

    let api = client(&server, session(Some("id_123")));
    let err = api.get::<Value>("/wallet").await.unwrap_err();

    assert!(matches!(err, Error::PermissionDenied { ref message } if message == "Forbidden"));
}

#[tokio::test]
async fn test_other_status_carries_status_and_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let session = session(Some("id_123"));
    let api = client(&server, session.clone());
    let request = ApiRequest::get("/reviews").query("page", 3);
    let err = api.send::<Value>(request).await.unwrap_err();

    match err {
        Error::Http { status, url } => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/reviews?page=3"), "unexpected url {url}");
        }
        other => panic!("expected Http, got {other:?}"),
    }
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_html_success_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apps"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Gateway login</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let session = session(Some("id_123"));
    let api = client(&server, session.clone());
    let err = api.get::<Option<Value>>("/apps").await.unwrap_err();

    assert!(matches!(err, Error::Protocol(_)));
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_empty_success_body_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api = client(&server, session(Some("id_123")));
    let err = api.get::<Value>("/settings").await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
}

#[tokio::test]
async fn test_envelope_without_data_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    let api = client(&server, session(Some("id_123")));
    let err = api.get::<Vec<Value>>("/settings").await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
}

#[tokio::test]
async fn test_unreachable_api_is_transport_error() {
    let server = MockServer::start().await;
    let url = mock_api_url(&server);
    drop(server);

    let session = session(Some("id_123"));
    let api = ApiClient::new(url, session.clone()).unwrap();
    let err = api.get::<Value>("/apps").await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert!(session.is_authenticated());
}

// ============================================================================
// Resource services
// ============================================================================

#[tokio::test]
async fn test_apps_list_filters_missing_query_values() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apps"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "app_1", "name": "Weather", "status": "live"}],
            "message": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let apps = AppsService::new(client(&server, session(Some("id_123"))));
    let list = apps.list(Some(2), None).await.unwrap();

    assert_eq!(list.len(), 1);
    assert_eq!(list[0].status.as_deref(), Some("live"));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].url.query(), Some("page=2"));
}

#[tokio::test]
async fn test_apps_create_update_delete() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/apps"))
        .and(body_json(json!({"name": "Weather"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "app_1", "name": "Weather"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/apps/app_1"))
        .and(body_json(json!({"description": "Forecasts"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "app_1", "name": "Weather", "description": "Forecasts"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/apps/app_1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let apps = AppsService::new(client(&server, session(Some("id_123"))));

    let created = apps
        .create(&NewApp {
            name: "Weather".to_string(),
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(created.id, "app_1");

    let updated = apps
        .update(
            "app_1",
            &AppUpdate {
                description: Some("Forecasts".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("Forecasts"));

    apps.delete("app_1").await.unwrap();
}

#[tokio::test]
async fn test_notifications_mark_read_requires_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/notifications"))
        .and(query_param("unread", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "n1", "title": "Review approved"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/notifications/n1/read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "message": "marked"
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/notifications/n2/read"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let notifications = NotificationsService::new(client(&server, session(Some("id_123"))));

    let unread = notifications.list(true).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert!(!unread[0].read);

    notifications.mark_read("n1").await.unwrap();
    let err = notifications.mark_read("n2").await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
}

#[tokio::test]
async fn test_ids_that_escape_their_segment_are_never_sent() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "leaked"})))
        .expect(0)
        .mount(&server)
        .await;

    let apps = AppsService::new(client(&server, session(Some("id_123"))));

    for id in ["42\\secrets", "%2e%2e", "..", "42/secrets"] {
        let err = apps.get(id).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "{id}: {err:?}");
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}
