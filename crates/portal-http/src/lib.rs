//! portal-http - HTTP implementations of the portal session stack.
//!
//! - [`HttpTokenGateway`]: exchanges login custom tokens with the identity
//!   backend and keeps the live principal's identity token fresh
//! - [`ApiClient`]: the authenticated request pipeline every resource
//!   service goes through
//! - [`services`]: thin resource services built on [`ApiClient`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use portal_core::{ApiUrl, CustomToken, MemoryTokenStore, SessionManager};
//! use portal_http::{ApiClient, HttpTokenGateway};
//! use portal_http::services::AppsService;
//!
//! # async fn example() -> Result<(), portal_core::Error> {
//! let gateway = HttpTokenGateway::new(ApiUrl::new("https://identity.example.com")?)?;
//! let session = SessionManager::new(Arc::new(gateway), Arc::new(MemoryTokenStore::new()));
//! session.login(CustomToken::new("ct_abc")).await?;
//!
//! let client = ApiClient::new(ApiUrl::new("https://api.example.com")?, session)?;
//! for app in AppsService::new(client).list(None, None).await? {
//!     println!("{}: {}", app.id, app.name);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod endpoints;
mod gateway;
mod request;
pub mod services;
mod transport;

pub use client::{ApiClient, ClientConfig};
pub use endpoints::{CLIENT_HEADER, LANGUAGE_HEADER};
pub use gateway::HttpTokenGateway;
pub use request::{ApiRequest, BuiltRequest};
