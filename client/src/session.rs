use std::sync::{Arc, RwLock};

use tracing::info;

use crate::config::ClientConfig;
use crate::error::AurumError;
use crate::models::{ApplicationWithRole, User};
use crate::retry::{HandlerRegistry, Retrier};
use crate::storage::{DurableStorage, MemoryStorage};
use crate::store::TokenStore;
use crate::transport::{AuthTransport, HttpTransport};

/// Public entry point for a single user session: composes the transport,
/// token store and retrier. Constructed explicitly and passed down;
/// there is no shared module-level instance.
pub struct SessionClient {
    transport: Arc<dyn AuthTransport>,
    store: Arc<TokenStore>,
    retrier: Retrier,
    handlers: HandlerRegistry,
    user: RwLock<Option<User>>,
    public_key: RwLock<Option<String>>,
}

impl SessionClient {
    /// HTTP transport plus process-local token storage. Use
    /// [`SessionClient::with_storage`] to persist tokens across restarts.
    pub fn new(config: &ClientConfig) -> Result<Self, AurumError> {
        Self::with_storage(config, Arc::new(MemoryStorage::new()))
    }

    pub fn with_storage(
        config: &ClientConfig,
        storage: Arc<dyn DurableStorage>,
    ) -> Result<Self, AurumError> {
        Ok(Self::with_parts(
            Arc::new(HttpTransport::new(config)?),
            storage,
        ))
    }

    /// Fully injected collaborators; the other constructors are sugar.
    pub fn with_parts(
        transport: Arc<dyn AuthTransport>,
        storage: Arc<dyn DurableStorage>,
    ) -> Self {
        let store = Arc::new(TokenStore::new(storage));
        let handlers = HandlerRegistry::new();
        let retrier = Retrier::new(
            Arc::clone(&store),
            Arc::clone(&transport),
            handlers.clone(),
        );

        Self {
            transport,
            store,
            retrier,
            handlers,
            user: RwLock::new(None),
            public_key: RwLock::new(None),
        }
    }

    /// Registers an observer invoked with the terminal error on forced
    /// logout, and with `None` on explicit logout.
    pub fn add_unauthorized_handler<F>(&self, handler: F)
    where
        F: Fn(Option<&AurumError>) + Send + Sync + 'static,
    {
        self.handlers.add(handler);
    }

    pub async fn login(&self, user: &User) -> Result<(), AurumError> {
        let pair = self.transport.login(user).await?;
        self.store.set(pair);
        info!(username = %user.username, "logged in");
        Ok(())
    }

    /// Signup followed by login; a signup failure is returned untouched
    /// and no login is attempted.
    pub async fn register(&self, user: &User) -> Result<(), AurumError> {
        self.transport.signup(user).await?;
        self.login(user).await
    }

    /// Read-through cache over `GET /user`; invalidated by
    /// [`SessionClient::update_user`] and [`SessionClient::logout`].
    pub async fn get_user_info(&self) -> Result<User, AurumError> {
        if let Some(user) = self.user.read().expect("lock poisoned").clone() {
            return Ok(user);
        }

        let transport = Arc::clone(&self.transport);
        let user = self
            .retrier
            .execute(move |pair| {
                let transport = Arc::clone(&transport);
                async move { transport.get_user_info(&pair).await }
            })
            .await?;

        *self.user.write().expect("lock poisoned") = Some(user.scrubbed());
        Ok(user)
    }

    pub async fn update_user(&self, user: &User) -> Result<User, AurumError> {
        let transport = Arc::clone(&self.transport);
        let payload = user.clone();
        let updated = self
            .retrier
            .execute(move |pair| {
                let transport = Arc::clone(&transport);
                let payload = payload.clone();
                async move { transport.update_user(&pair, &payload).await }
            })
            .await?;

        *self.user.write().expect("lock poisoned") = Some(updated.scrubbed());
        Ok(updated)
    }

    /// Applications for `user`, defaulting to the current (cached or
    /// freshly fetched) user.
    pub async fn applications_for_user(
        &self,
        user: Option<&User>,
    ) -> Result<Vec<ApplicationWithRole>, AurumError> {
        let username = match user {
            Some(user) => user.username.clone(),
            None => self.get_user_info().await?.username,
        };

        let transport = Arc::clone(&self.transport);
        self.retrier
            .execute(move |pair| {
                let transport = Arc::clone(&transport);
                let username = username.clone();
                async move { transport.applications_for_user(&pair, &username).await }
            })
            .await
    }

    /// The server's PEM-encoded public key, fetched once and memoized.
    /// Signature verification itself is the caller's concern.
    pub async fn server_public_key(&self) -> Result<String, AurumError> {
        if let Some(pem) = self.public_key.read().expect("lock poisoned").clone() {
            return Ok(pem);
        }

        let pem = self.transport.public_key().await?;
        *self.public_key.write().expect("lock poisoned") = Some(pem.clone());
        Ok(pem)
    }

    /// Clears tokens and the cached user, then tells observers the
    /// session ended deliberately (`None`, as opposed to a forced logout).
    pub fn logout(&self) {
        self.store.clear();
        *self.user.write().expect("lock poisoned") = None;
        info!("logged out");
        self.handlers.notify(None);
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.get().is_some()
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }
}
