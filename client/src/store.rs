use std::sync::{Arc, Mutex};

use aurum_token::{ClaimsCache, TokenPair};
use tracing::{debug, warn};

use crate::storage::DurableStorage;

/// Fixed durable-storage keys; both must be present to reconstruct a pair.
pub const LOGIN_TOKEN_KEY: &str = "LOGIN_TOKEN";
pub const REFRESH_TOKEN_KEY: &str = "REFRESH_TOKEN";

/// Exclusive owner of the current token pair, mirrored into durable
/// storage. Storage failures degrade to memory-only operation; they are
/// logged, never surfaced.
pub struct TokenStore {
    storage: Arc<dyn DurableStorage>,
    pair: Mutex<Option<TokenPair>>,
    login_claims: ClaimsCache,
    refresh_claims: ClaimsCache,
}

impl TokenStore {
    /// Hydrates from durable storage exactly once, at construction.
    /// Absence of either key means "logged out".
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        let pair = Self::hydrate(storage.as_ref());
        if pair.is_some() {
            debug!("restored token pair from durable storage");
        }

        Self {
            storage,
            pair: Mutex::new(pair),
            login_claims: ClaimsCache::new(),
            refresh_claims: ClaimsCache::new(),
        }
    }

    fn hydrate(storage: &dyn DurableStorage) -> Option<TokenPair> {
        let read = |key: &str| match storage.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, key, "durable storage unavailable during hydration");
                None
            }
        };

        let login = read(LOGIN_TOKEN_KEY)?;
        let refresh = read(REFRESH_TOKEN_KEY)?;
        Some(TokenPair::new(login, refresh))
    }

    pub fn get(&self) -> Option<TokenPair> {
        self.pair.lock().expect("lock poisoned").clone()
    }

    /// Replaces the pair in memory first, then persists. The in-memory
    /// value always reflects the latest `set`, whatever storage does.
    pub fn set(&self, pair: TokenPair) {
        *self.pair.lock().expect("lock poisoned") = Some(pair.clone());

        let persisted = self
            .storage
            .set_item(LOGIN_TOKEN_KEY, &pair.login_token)
            .and_then(|()| self.storage.set_item(REFRESH_TOKEN_KEY, &pair.refresh_token));
        if let Err(err) = persisted {
            warn!(%err, "token write rejected by durable storage, continuing in memory only");
        }
    }

    pub fn clear(&self) {
        *self.pair.lock().expect("lock poisoned") = None;

        let removed = self
            .storage
            .remove_item(LOGIN_TOKEN_KEY)
            .and_then(|()| self.storage.remove_item(REFRESH_TOKEN_KEY));
        if let Err(err) = removed {
            warn!(%err, "token removal rejected by durable storage");
        }
    }

    pub fn is_login_valid(&self) -> bool {
        self.get()
            .map(|pair| self.login_claims.is_valid(&pair.login_token))
            .unwrap_or(false)
    }

    pub fn is_refresh_valid(&self) -> bool {
        self.get()
            .map(|pair| self.refresh_claims.is_valid(&pair.refresh_token))
            .unwrap_or(false)
    }
}
