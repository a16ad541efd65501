//! Persisted token slot trait.

use crate::{IdentityToken, Result};

/// Storage key under which the current identity token is persisted.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// The single durable slot holding the current identity token.
///
/// Only [`SessionManager`](crate::SessionManager) writes through this trait.
/// Operations are synchronous; implementations must make `save_if_newer`
/// atomic with respect to other writers on the same store.
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any.
    fn load(&self) -> Result<Option<IdentityToken>>;

    /// Overwrite the persisted token unconditionally.
    fn save(&self, token: &IdentityToken) -> Result<()>;

    /// Persist `token` unless the stored token is the same one or was issued
    /// after it.
    ///
    /// Returns `true` if the token was written.
    fn save_if_newer(&self, token: &IdentityToken) -> Result<bool>;

    /// Remove the persisted token. Clearing an empty slot is a no-op.
    fn clear(&self) -> Result<()>;
}
