//! In-memory token store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::traits::TokenStore;
use crate::{IdentityToken, Result};

/// A [`TokenStore`] that keeps the token in process memory.
///
/// Useful for embedders that manage persistence themselves, and for tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<IdentityToken>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `token`.
    pub fn with_token(token: IdentityToken) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<IdentityToken>> {
        // The slot holds plain data, so a poisoned lock is still consistent.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<IdentityToken>> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &IdentityToken) -> Result<()> {
        *self.slot() = Some(token.clone());
        Ok(())
    }

    fn save_if_newer(&self, token: &IdentityToken) -> Result<bool> {
        let mut slot = self.slot();
        match slot.as_ref() {
            Some(stored) if stored == token || stored.is_newer_than(token) => Ok(false),
            _ => {
                *slot = Some(token.clone());
                Ok(true)
            }
        }
    }

    fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn save_then_load() {
        let store = MemoryTokenStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&IdentityToken::new("id_123")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().as_str(), "id_123");
    }

    #[test]
    fn save_if_newer_keeps_newer_token() {
        let now = Utc::now();
        let newer = IdentityToken::with_issued_at("newer", now);
        let older = IdentityToken::with_issued_at("older", now - Duration::minutes(5));

        let store = MemoryTokenStore::with_token(newer);
        assert!(!store.save_if_newer(&older).unwrap());
        assert_eq!(store.load().unwrap().unwrap().as_str(), "newer");
    }

    #[test]
    fn save_if_newer_writes_into_empty_slot() {
        let store = MemoryTokenStore::new();
        assert!(store.save_if_newer(&IdentityToken::new("first")).unwrap());
        assert_eq!(store.load().unwrap().unwrap().as_str(), "first");
    }

    #[test]
    fn save_if_newer_skips_identical_token() {
        let token = IdentityToken::new("id_123");
        let store = MemoryTokenStore::with_token(token.clone());
        assert!(!store.save_if_newer(&token).unwrap());
    }

    #[test]
    fn save_overwrites_regardless_of_age() {
        let now = Utc::now();
        let store = MemoryTokenStore::with_token(IdentityToken::with_issued_at("newer", now));
        store
            .save(&IdentityToken::with_issued_at(
                "older",
                now - Duration::minutes(5),
            ))
            .unwrap();
        assert_eq!(store.load().unwrap().unwrap().as_str(), "older");
    }

    #[test]
    fn clear_is_idempotent() {
        let store = MemoryTokenStore::with_token(IdentityToken::new("id_123"));
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
