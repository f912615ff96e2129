use std::future::Future;
use std::sync::{Arc, RwLock};

use aurum_token::TokenPair;
use tracing::debug;

use crate::error::AurumError;
use crate::store::TokenStore;
use crate::transport::AuthTransport;

type Handler = Box<dyn Fn(Option<&AurumError>) + Send + Sync>;

/// Observers of session loss. They receive the terminal error when a
/// session stops being salvageable, and `None` on explicit logout.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Arc<RwLock<Vec<Handler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&self, handler: F)
    where
        F: Fn(Option<&AurumError>) + Send + Sync + 'static,
    {
        self.handlers.write().expect("lock poisoned").push(Box::new(handler));
    }

    pub fn notify(&self, err: Option<&AurumError>) {
        for handler in self.handlers.read().expect("lock poisoned").iter() {
            handler(err);
        }
    }
}

/// Runs token-authenticated operations under the
/// "call, refresh on Unauthorized, retry once" protocol.
///
/// Per invocation: at most one refresh, at most two runs of the operation,
/// and observers fire only when the second run also comes back
/// Unauthorized.
pub struct Retrier {
    store: Arc<TokenStore>,
    transport: Arc<dyn AuthTransport>,
    handlers: HandlerRegistry,
}

impl Retrier {
    pub fn new(
        store: Arc<TokenStore>,
        transport: Arc<dyn AuthTransport>,
        handlers: HandlerRegistry,
    ) -> Self {
        Self {
            store,
            transport,
            handlers,
        }
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// The operation is a plain closure over the token pair; any extra
    /// arguments it needs travel inside its own captures.
    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T, AurumError>
    where
        F: Fn(TokenPair) -> Fut,
        Fut: Future<Output = Result<T, AurumError>>,
    {
        let Some(pair) = self.store.get() else {
            return Err(AurumError::unauthorized("No token stored"));
        };

        let first = op(pair.clone()).await;
        match &first {
            Err(err) if err.is_unauthorized() => {}
            _ => return first,
        }

        match self.transport.refresh(&pair).await {
            Ok(refreshed) => {
                debug!("refreshed login token after unauthorized response");
                self.store.set(pair.merged_with(refreshed));
            }
            // A failed refresh leaves the stored pair untouched; the retry
            // below decides whether the session survives.
            Err(err) => debug!(code = ?err.code, "token refresh failed"),
        }

        let current = self.store.get().unwrap_or(pair);
        let second = op(current).await;

        if let Err(err) = &second {
            if err.is_unauthorized() {
                debug!("session no longer salvageable, notifying observers");
                self.handlers.notify(Some(err));
            }
        }

        second
    }
}
