//! Session management: the single source of truth for which token outgoing
//! requests use.

use std::sync::Arc;

use tracing::{debug, info, instrument, trace, warn};

use crate::traits::{TokenGateway, TokenStore};
use crate::{CustomToken, IdentityToken, Result};

/// The session context for one logical user session.
///
/// A `SessionManager` owns the persisted token slot and decides, per call,
/// whether a freshly minted token or the persisted one should be used. It is
/// constructed explicitly and passed to whatever issues requests; clones share
/// the same state.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use portal_core::{IdentityToken, MemoryTokenStore, SessionManager, SignedOutGateway};
///
/// let session = SessionManager::new(Arc::new(SignedOutGateway), Arc::new(MemoryTokenStore::new()));
/// session.set_token(IdentityToken::new("id_123")).unwrap();
/// assert!(session.is_authenticated());
///
/// session.clear_session().unwrap();
/// assert!(session.token().is_none());
/// ```
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    gateway: Arc<dyn TokenGateway>,
    store: Arc<dyn TokenStore>,
}

impl SessionManager {
    /// Create a session context over a gateway and a token store.
    pub fn new(gateway: Arc<dyn TokenGateway>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner { gateway, store }),
        }
    }

    /// Returns the gateway this session refreshes through.
    pub fn gateway(&self) -> &Arc<dyn TokenGateway> {
        &self.inner.gateway
    }

    /// Get a usable token right now.
    ///
    /// Asks the gateway for the live principal's token (cached when still
    /// valid) and persists it. When there is no live principal, or the
    /// refresh fails, falls back to the persisted token. Returns `None` only
    /// if nothing is persisted either.
    ///
    /// A transient refresh failure never logs the user out; only an explicit
    /// rejection from the API does.
    #[instrument(skip(self))]
    pub async fn current_token(&self) -> Option<IdentityToken> {
        match self.inner.gateway.refresh(false).await {
            Ok(Some(token)) => {
                self.persist(&token);
                return Some(token);
            }
            Ok(None) => debug!("No live principal, using persisted token"),
            Err(e) => warn!(error = %e, "Token refresh failed, falling back to persisted token"),
        }

        self.token()
    }

    /// Force the gateway to revalidate and persist the result.
    ///
    /// Unlike [`current_token`](Self::current_token) this surfaces refresh
    /// failures. Returns `Ok(None)` when no principal is signed in.
    #[instrument(skip(self))]
    pub async fn refresh_now(&self) -> Result<Option<IdentityToken>> {
        let token = self.inner.gateway.refresh(true).await?;
        if let Some(ref token) = token {
            self.persist(token);
        }
        Ok(token)
    }

    /// Read the persisted token without refreshing.
    pub fn token(&self) -> Option<IdentityToken> {
        match self.inner.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                None
            }
        }
    }

    /// Returns true if a token is persisted.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Overwrite the persisted token.
    pub fn set_token(&self, token: IdentityToken) -> Result<()> {
        self.inner.store.save(&token)?;
        debug!(issued_at = %token.issued_at(), "Token persisted");
        Ok(())
    }

    /// Remove the persisted token. Clearing an empty session is a no-op.
    pub fn clear_session(&self) -> Result<()> {
        self.inner.store.clear()?;
        info!("Session cleared");
        Ok(())
    }

    /// Exchange a login custom token and persist the resulting identity token.
    ///
    /// # Errors
    ///
    /// Returns the gateway's `ExchangeFailed` unchanged, or a storage error
    /// if the token could not be persisted.
    #[instrument(skip(self, custom_token))]
    pub async fn login(&self, custom_token: CustomToken) -> Result<IdentityToken> {
        info!("Exchanging custom token");

        let token = self.inner.gateway.exchange(custom_token).await?;
        self.set_token(token.clone())?;

        info!("Session established");
        Ok(token)
    }

    /// Sign the principal out and clear the persisted token.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.inner.gateway.sign_out().await;
        self.clear_session()
    }

    fn persist(&self, token: &IdentityToken) {
        match self.inner.store.save_if_newer(token) {
            Ok(true) => debug!(issued_at = %token.issued_at(), "Refreshed token persisted"),
            Ok(false) => trace!("Persisted token is current"),
            Err(e) => warn!(error = %e, "Failed to persist refreshed token"),
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
