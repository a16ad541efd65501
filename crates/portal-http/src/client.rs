//! Authenticated request pipeline.
//!
//! Every call runs BUILD, TOKEN_ACQUIRE, DISPATCH, and CLASSIFY in order:
//!
//! | Outcome | Session | Error |
//! |---|---|---|
//! | no token locally | untouched, nothing sent | [`AuthError::Unauthenticated`] |
//! | 401 | cleared | [`AuthError::AuthenticationFailed`] |
//! | 403 | untouched | [`Error::PermissionDenied`] |
//! | other non-2xx | untouched | [`Error::Http`] |
//! | 2xx, bad envelope | untouched | [`Error::Protocol`] |

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace, warn};
use url::Url;

use portal_core::error::{AuthError, InvalidInputError, ProtocolError};
use portal_core::{ApiUrl, Error, IdentityToken, Result, SessionManager};

use crate::endpoints::{Envelope, MessageResponse, UnitEnvelope};
use crate::request::ApiRequest;
use crate::transport::{USER_AGENT, build_client, transport_error};

/// Fixed per-client request settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Sent as the `Language` header.
    pub language: String,
    /// Sent as the `Client` marker header.
    pub client: String,
    /// HTTP user agent.
    pub user_agent: String,
    /// Overall request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            client: "developer-portal".to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

/// HTTP client for the platform API.
///
/// Attaches the session's bearer token to every request and classifies the
/// response. This is the only component that clears the session as a side
/// effect of a request. It never navigates or retries.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: ApiUrl,
    session: SessionManager,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a client with the default [`ClientConfig`].
    pub fn new(base: ApiUrl, session: SessionManager) -> Result<Self> {
        Self::with_config(base, session, ClientConfig::default())
    }

    /// Create a client with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be constructed.
    pub fn with_config(base: ApiUrl, session: SessionManager, config: ClientConfig) -> Result<Self> {
        let http = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            http,
            base,
            session,
            config,
        })
    }

    /// Returns the API base URL.
    pub fn base(&self) -> &ApiUrl {
        &self.base
    }

    /// Returns the session this client authenticates with.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Returns the client settings.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET `path` and return the envelope's `data`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::get(path)).await
    }

    /// POST a JSON body to `path` and return the envelope's `data`.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    /// PUT a JSON body to `path` and return the envelope's `data`.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    /// DELETE `path`, ignoring any payload.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send_unit(ApiRequest::delete(path)).await
    }

    /// Run a request through the pipeline and decode the envelope's `data`.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let (url, response) = self.dispatch(&request).await?;
        let response = self.classify(&url, response).await?;

        let body = response.bytes().await.map_err(transport_error)?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)
            .map_err(|e| ProtocolError::new(url.as_str(), e.to_string()))?;

        if let Some(message) = envelope.message {
            debug!(server_message = %message, "API response message");
        }
        Ok(envelope.data)
    }

    /// Run a request through the pipeline when no payload is expected.
    ///
    /// A `204 No Content` succeeds; any other 2xx must still carry a JSON
    /// envelope.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn send_unit(&self, request: ApiRequest) -> Result<()> {
        let (url, response) = self.dispatch(&request).await?;
        let response = self.classify(&url, response).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let envelope: UnitEnvelope = serde_json::from_slice(&body)
            .map_err(|e| ProtocolError::new(url.as_str(), e.to_string()))?;

        if let Some(message) = envelope.message {
            debug!(server_message = %message, "API response message");
        }
        Ok(())
    }

    /// BUILD, TOKEN_ACQUIRE, and DISPATCH.
    async fn dispatch(&self, request: &ApiRequest) -> Result<(Url, reqwest::Response)> {
        let built = request.build(&self.base, &self.config)?;

        let Some(token) = self.session.current_token().await else {
            debug!("No token available, request not sent");
            return Err(AuthError::Unauthenticated.into());
        };

        let mut headers = built.headers;
        headers.insert(AUTHORIZATION, bearer(&token)?);

        debug!(url = %built.url, "Dispatching API request");

        let mut builder = self
            .http
            .request(built.method, built.url.clone())
            .headers(headers);
        if let Some(body) = built.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        Ok((built.url, response))
    }

    /// CLASSIFY: pass 2xx responses through, map everything else.
    async fn classify(&self, url: &Url, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        trace!(%status, "API response");

        match status {
            StatusCode::UNAUTHORIZED => {
                if let Err(e) = self.session.clear_session() {
                    warn!(error = %e, "Failed to clear session after 401");
                }
                warn!(%url, "API rejected token, session cleared");
                Err(AuthError::AuthenticationFailed.into())
            }
            StatusCode::FORBIDDEN => {
                let message = forbidden_message(response).await;
                debug!(%url, server_message = %message, "Permission denied");
                Err(Error::PermissionDenied { message })
            }
            s if !s.is_success() => Err(Error::Http {
                status: s.as_u16(),
                url: url.to_string(),
            }),
            _ => Ok(response),
        }
    }
}

fn bearer(token: &IdentityToken) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str())).map_err(|e| {
        InvalidInputError::Header {
            name: AUTHORIZATION.to_string(),
            reason: e.to_string(),
        }
    })?;
    value.set_sensitive(true);
    Ok(value)
}

async fn forbidden_message(response: reqwest::Response) -> String {
    let fallback = StatusCode::FORBIDDEN
        .canonical_reason()
        .unwrap_or("Forbidden")
        .to_string();

    match response.json::<MessageResponse>().await {
        Ok(MessageResponse {
            message: Some(message),
        }) => message,
        _ => fallback,
    }
}
