pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod session;
pub mod storage;
pub mod store;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

pub use aurum_token::{Claims, ClaimsCache, Role, TokenPair};
pub use config::ClientConfig;
pub use error::{AurumError, ErrorCode};
pub use models::{Application, ApplicationWithRole, User};
pub use retry::{HandlerRegistry, Retrier};
pub use session::SessionClient;
pub use storage::{DurableStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{TokenStore, LOGIN_TOKEN_KEY, REFRESH_TOKEN_KEY};
pub use transport::{AuthTransport, HttpTransport};
