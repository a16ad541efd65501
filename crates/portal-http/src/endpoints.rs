//! Endpoint paths, header names, and wire types.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

// ============================================================================
// Identity backend
// ============================================================================

/// Exchanges a custom token for an identity token and refresh token.
pub const SIGN_IN_WITH_CUSTOM_TOKEN: &str = "v1/accounts:signInWithCustomToken";

/// Mints a fresh identity token from a refresh token.
pub const REFRESH_TOKEN: &str = "v1/token";

/// Best-effort sign-out notification.
pub const SIGN_OUT: &str = "v1/accounts:signOut";

/// Request body for signInWithCustomToken.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest<'a> {
    pub token: &'a str,
    pub return_secure_token: bool,
}

/// Response from signInWithCustomToken.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeResponse {
    pub id_token: String,
    pub refresh_token: String,
    /// Lifetime in seconds, sent as a decimal string.
    pub expires_in: String,
}

/// Request body for the token refresh endpoint.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub grant_type: &'a str,
    pub refresh_token: &'a str,
}

/// Response from the token refresh endpoint.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
}

/// Identity backend error format: `{"error": {"code": 400, "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct IdentityErrorResponse {
    pub error: IdentityErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct IdentityErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Platform API
// ============================================================================

/// Locale header sent with every API request.
pub const LANGUAGE_HEADER: &str = "language";

/// Client marker header sent with every API request.
pub const CLIENT_HEADER: &str = "client";

/// Success envelope: `{"data": <payload>, "message": "..."}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// Success envelope whose payload is ignored.
#[derive(Debug, Deserialize)]
pub struct UnitEnvelope {
    #[serde(default)]
    #[allow(dead_code)]
    pub data: Option<IgnoredAny>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body carrying a server message, as sent with 403 responses.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}
