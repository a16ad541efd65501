//! Token exchange gateway backed by an HTTP identity service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, instrument, trace, warn};

use portal_core::error::AuthError;
use portal_core::{ApiUrl, AuthState, CustomToken, IdentityToken, Result, TokenGateway};

use crate::endpoints::{
    ExchangeRequest, ExchangeResponse, IdentityErrorResponse, REFRESH_TOKEN, RefreshRequest,
    RefreshResponse, SIGN_IN_WITH_CUSTOM_TOKEN, SIGN_OUT,
};
use crate::transport::{USER_AGENT, build_client, transport_error};

/// Cached identity tokens are reused until this close to expiry.
const REFRESH_SKEW_SECS: i64 = 300;

/// [`TokenGateway`] talking to an identity backend over HTTP.
///
/// Holds the signed-in principal in memory for the lifetime of the value.
/// Clones share the principal. Observers can follow sign-in and sign-out via
/// [`subscribe`](Self::subscribe).
#[derive(Clone)]
pub struct HttpTokenGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    client: reqwest::Client,
    base: ApiUrl,
    principal: RwLock<Option<Principal>>,
    state: watch::Sender<AuthState>,
}

/// The live principal: current identity token plus what is needed to renew it.
struct Principal {
    id_token: IdentityToken,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl Principal {
    fn new(id_token: String, refresh_token: String, expires_in: &str) -> Option<Self> {
        let seconds: i64 = expires_in.trim().parse().ok()?;
        if seconds < 0 {
            return None;
        }
        let issued_at = Utc::now();
        let expires_at = issued_at.checked_add_signed(Duration::try_seconds(seconds)?)?;
        Some(Self {
            id_token: IdentityToken::with_issued_at(id_token, issued_at),
            refresh_token,
            expires_at,
        })
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_SKEW_SECS) < self.expires_at
    }
}

impl HttpTokenGateway {
    /// Create a gateway for the identity backend at `base`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be constructed.
    pub fn new(base: ApiUrl) -> Result<Self> {
        let client = build_client(USER_AGENT, None)?;
        let (state, _) = watch::channel(AuthState::SignedOut);

        Ok(Self {
            inner: Arc::new(GatewayInner {
                client,
                base,
                principal: RwLock::new(None),
                state,
            }),
        })
    }

    /// Returns the identity backend URL.
    pub fn base(&self) -> &ApiUrl {
        &self.inner.base
    }

    /// Subscribe to auth state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Returns the current auth state.
    pub fn auth_state(&self) -> AuthState {
        *self.inner.state.borrow()
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> std::result::Result<R, String>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.inner.base.endpoint(endpoint);
        debug!(endpoint, "Identity backend request");

        let response = self
            .inner
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e).to_string())?;

        let status = response.status();
        trace!(%status, "Identity backend response");

        if status.is_success() {
            response
                .json::<R>()
                .await
                .map_err(|e| format!("malformed response: {}", e))
        } else {
            Err(error_reason(status, response).await)
        }
    }

    fn publish(&self, state: AuthState) {
        self.inner.state.send_if_modified(|current| {
            let changed = *current != state;
            *current = state;
            changed
        });
    }
}

async fn error_reason(status: StatusCode, response: reqwest::Response) -> String {
    match response.json::<IdentityErrorResponse>().await {
        Ok(IdentityErrorResponse { error: detail }) => detail
            .message
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        Err(_) => format!("HTTP {}", status.as_u16()),
    }
}

#[async_trait]
impl TokenGateway for HttpTokenGateway {
    #[instrument(skip(self, custom_token), fields(identity = %self.inner.base))]
    async fn exchange(&self, custom_token: CustomToken) -> Result<IdentityToken> {
        info!("Exchanging custom token");

        let request = ExchangeRequest {
            token: custom_token.as_str(),
            return_secure_token: true,
        };

        let response: ExchangeResponse = self
            .post(SIGN_IN_WITH_CUSTOM_TOKEN, &request)
            .await
            .map_err(|reason| AuthError::ExchangeFailed { reason })?;

        let principal = Principal::new(
            response.id_token,
            response.refresh_token,
            &response.expires_in,
        )
        .ok_or_else(|| AuthError::ExchangeFailed {
            reason: format!("invalid expiresIn '{}'", response.expires_in),
        })?;

        let token = principal.id_token.clone();
        *self.inner.principal.write().await = Some(principal);
        self.publish(AuthState::SignedIn);

        debug!("Principal signed in");
        Ok(token)
    }

    #[instrument(skip(self), fields(identity = %self.inner.base))]
    async fn refresh(&self, force_refresh: bool) -> Result<Option<IdentityToken>> {
        let refresh_token = {
            let principal = self.inner.principal.read().await;
            match principal.as_ref() {
                None => return Ok(None),
                Some(p) if !force_refresh && p.is_fresh(Utc::now()) => {
                    trace!("Using cached identity token");
                    return Ok(Some(p.id_token.clone()));
                }
                Some(p) => p.refresh_token.clone(),
            }
        };

        debug!("Minting fresh identity token");

        let request = RefreshRequest {
            grant_type: "refresh_token",
            refresh_token: &refresh_token,
        };

        let response: RefreshResponse = self
            .post(REFRESH_TOKEN, &request)
            .await
            .map_err(|reason| AuthError::RefreshFailed { reason })?;

        let minted = Principal::new(
            response.id_token,
            response.refresh_token,
            &response.expires_in,
        )
        .ok_or_else(|| AuthError::RefreshFailed {
            reason: format!("invalid expires_in '{}'", response.expires_in),
        })?;

        let mut principal = self.inner.principal.write().await;
        match principal.as_mut() {
            None => {
                debug!("Signed out during refresh, discarding token");
                Ok(None)
            }
            Some(current)
                if current.refresh_token != refresh_token
                    || current.id_token.is_newer_than(&minted.id_token) =>
            {
                debug!("Principal changed during refresh, keeping current token");
                Ok(Some(current.id_token.clone()))
            }
            Some(current) => {
                let token = minted.id_token.clone();
                *current = minted;
                Ok(Some(token))
            }
        }
    }

    #[instrument(skip(self), fields(identity = %self.inner.base))]
    async fn sign_out(&self) {
        let Some(principal) = self.inner.principal.write().await.take() else {
            debug!("No principal to sign out");
            return;
        };
        self.publish(AuthState::SignedOut);
        info!("Principal signed out");

        let url = self.inner.base.endpoint(SIGN_OUT);
        let result = self
            .inner
            .client
            .post(&url)
            .bearer_auth(principal.id_token.as_str())
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!("Identity backend notified of sign-out")
            }
            Ok(response) => {
                warn!(status = %response.status(), "Sign-out notification rejected")
            }
            Err(e) => warn!(error = %transport_error(e), "Sign-out notification failed"),
        }
    }
}

impl std::fmt::Debug for HttpTokenGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTokenGateway")
            .field("base", &self.inner.base)
            .field("state", &self.auth_state())
            .finish()
    }
}
