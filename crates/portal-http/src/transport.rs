//! Mapping of reqwest failures onto the portal error taxonomy.

use portal_core::error::TransportError;

/// Classify a reqwest error as a transport failure.
pub(crate) fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}

/// Build a reqwest client with the crate's user agent.
pub(crate) fn build_client(
    user_agent: &str,
    timeout: Option<std::time::Duration>,
) -> Result<reqwest::Client, TransportError> {
    let mut builder = reqwest::Client::builder().user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(transport_error)
}

/// Default user agent for portal HTTP clients.
pub(crate) const USER_AGENT: &str = concat!("portal/", env!("CARGO_PKG_VERSION"));
