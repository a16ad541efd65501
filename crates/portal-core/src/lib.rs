//! portal-core - Session and token lifecycle primitives.
//!
//! This crate owns everything about "which bearer token should the next API
//! request carry" that does not depend on a transport:
//!
//! - [`TokenGateway`]: capability interface over the identity provider
//! - [`TokenStore`]: the single persisted token slot
//! - [`SessionManager`]: the injectable session context tying the two together
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use portal_core::{IdentityToken, MemoryTokenStore, SessionManager, SignedOutGateway};
//!
//! let session = SessionManager::new(Arc::new(SignedOutGateway), Arc::new(MemoryTokenStore::new()));
//! session.set_token(IdentityToken::new("id_123")).unwrap();
//! assert_eq!(session.token().unwrap().as_str(), "id_123");
//! ```

pub mod error;
pub mod session;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

pub use error::Error;
pub use session::SessionManager;
pub use store::MemoryTokenStore;
pub use tokens::{AuthState, CustomToken, IdentityToken};
pub use traits::{SignedOutGateway, TokenGateway, TokenStore};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
