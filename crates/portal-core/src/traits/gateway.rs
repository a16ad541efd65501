//! Token exchange gateway trait.

use async_trait::async_trait;

use crate::error::AuthError;
use crate::{CustomToken, IdentityToken, Result};

/// Narrow capability interface over an identity provider.
///
/// Implementations hold the provider's live principal (if any) in memory;
/// nothing here is persisted. `refresh` is expected to be safe to call
/// concurrently.
#[async_trait]
pub trait TokenGateway: Send + Sync {
    /// Exchange a one-time custom token for an identity token, establishing a
    /// signed-in principal.
    ///
    /// Fails with [`AuthError::ExchangeFailed`] if the custom token is
    /// rejected or the identity backend is unreachable. Never retried.
    async fn exchange(&self, custom_token: CustomToken) -> Result<IdentityToken>;

    /// Get the live principal's current identity token.
    ///
    /// Returns `Ok(None)` when no principal is signed in. With `force_refresh`
    /// false the provider may answer from its cache; with `true` it always
    /// revalidates. Fails with [`AuthError::RefreshFailed`] only on a
    /// transport or provider error.
    async fn refresh(&self, force_refresh: bool) -> Result<Option<IdentityToken>>;

    /// Terminate the live principal. Backend notification is best effort and
    /// never fails the caller.
    async fn sign_out(&self);
}

/// A gateway with no identity provider behind it.
///
/// Every refresh reports "no live principal", so a session built on it runs
/// entirely from the persisted token.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignedOutGateway;

#[async_trait]
impl TokenGateway for SignedOutGateway {
    async fn exchange(&self, _custom_token: CustomToken) -> Result<IdentityToken> {
        Err(AuthError::ExchangeFailed {
            reason: "no identity provider configured".to_string(),
        }
        .into())
    }

    async fn refresh(&self, _force_refresh: bool) -> Result<Option<IdentityToken>> {
        Ok(None)
    }

    async fn sign_out(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[tokio::test]
    async fn signed_out_gateway_never_has_a_principal() {
        let gateway = SignedOutGateway;
        assert!(gateway.refresh(false).await.unwrap().is_none());
        assert!(gateway.refresh(true).await.unwrap().is_none());

        let err = gateway
            .exchange(CustomToken::new("ct_abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::ExchangeFailed { .. })));
    }
}
