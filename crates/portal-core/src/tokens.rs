//! Token types for the portal session lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A one-time token issued by the identity backend at login.
///
/// A custom token is valid only for the initial exchange, so
/// [`TokenGateway::exchange`](crate::TokenGateway::exchange) takes it by value.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Never persisted
pub struct CustomToken(String);

impl CustomToken {
    /// Wrap a custom token received from the login flow.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in the exchange request.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CustomToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomToken").field(&"[REDACTED]").finish()
    }
}

/// A signed, time-limited bearer credential for API requests.
///
/// The token is opaque: its expiry is tracked by the gateway that minted it,
/// never decoded here. `issued_at` orders tokens so a slower writer cannot
/// replace a newer persisted token with an older one.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityToken {
    #[serde(rename = "token")]
    value: String,
    issued_at: DateTime<Utc>,
}

impl IdentityToken {
    /// Create a token minted now.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_issued_at(token, Utc::now())
    }

    /// Create a token with an explicit issuance time.
    pub fn with_issued_at(token: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            value: token.into(),
            issued_at,
        }
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers or persisting.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// When the identity provider minted this token.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// True if `self` was issued strictly after `other`.
    pub fn is_newer_than(&self, other: &IdentityToken) -> bool {
        self.issued_at > other.issued_at
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityToken")
            .field("value", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Whether the identity provider currently has a live principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// A principal is signed in and can mint identity tokens.
    SignedIn,
    /// No live principal.
    SignedOut,
}
