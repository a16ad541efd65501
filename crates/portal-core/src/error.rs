//! Error types for the portal client.
//!
//! This module provides a unified error type with explicit variants for every
//! way a token operation or an authenticated request can end. Request
//! outcomes are a closed set: callers pattern-match on [`Error`] rather than
//! inspecting status codes.

use std::fmt;
use thiserror::Error;

/// The unified error type for portal operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Token exchange, refresh, or authentication errors.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The server accepted the token but refused access to the resource.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// Any other non-2xx response.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// A 2xx response whose body did not match the expected envelope.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (invalid URL, path, header).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Token persistence errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// True when the server rejected the token (HTTP 401). The session has
    /// already been cleared by the time this error reaches the caller.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Auth(AuthError::AuthenticationFailed))
    }

    /// True when no token was available locally and nothing was dispatched.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Auth(AuthError::Unauthenticated))
    }

    /// True for any error that should send the user back to a login prompt.
    pub fn requires_login(&self) -> bool {
        self.is_auth_failure() || self.is_unauthenticated()
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP client error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The custom token could not be exchanged for an identity token.
    #[error("token exchange failed: {reason}")]
    ExchangeFailed { reason: String },

    /// The identity provider could not mint a fresh identity token.
    #[error("token refresh failed: {reason}")]
    RefreshFailed { reason: String },

    /// No identity token is available locally; nothing was sent.
    #[error("not authenticated")]
    Unauthenticated,

    /// The API rejected the identity token.
    #[error("authentication failed")]
    AuthenticationFailed,
}

/// A successful response whose body could not be decoded.
#[derive(Debug)]
pub struct ProtocolError {
    /// The URL that produced the response.
    pub url: String,
    /// Why decoding failed.
    pub reason: String,
}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed response from {}: {}", self.url, self.reason)
    }
}

impl std::error::Error for ProtocolError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid base URL.
    #[error("invalid URL '{value}': {reason}")]
    Url { value: String, reason: String },

    /// Invalid request path.
    #[error("invalid path '{value}': {reason}")]
    Path { value: String, reason: String },

    /// Header name or value that cannot be sent.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Request body that cannot be serialized.
    #[error("invalid body: {reason}")]
    Body { reason: String },
}

/// Token persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store could not be read or written.
    #[error("IO error: {message}")]
    Io { message: String },

    /// The persisted value is not a valid token record.
    #[error("corrupt entry '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_predicates() {
        let failed = Error::from(AuthError::AuthenticationFailed);
        assert!(failed.is_auth_failure());
        assert!(!failed.is_unauthenticated());
        assert!(failed.requires_login());

        let local = Error::from(AuthError::Unauthenticated);
        assert!(local.is_unauthenticated());
        assert!(local.requires_login());

        let denied = Error::PermissionDenied {
            message: "Missing scope".to_string(),
        };
        assert!(!denied.requires_login());
    }

    #[test]
    fn http_error_carries_status_and_url() {
        let err = Error::Http {
            status: 502,
            url: "https://api.example.com/apps".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("https://api.example.com/apps"));
    }
}
