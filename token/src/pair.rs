use serde::{Deserialize, Serialize};

use crate::claims::is_jwt_valid;

/// The login/refresh token pair issued by the server.
///
/// Either the whole pair is absent (logged out) or `login_token` is
/// non-empty; `refresh_token` may be empty when the server issues none.
/// The server omits empty fields on the wire, hence the serde defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub login_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(login_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            login_token: login_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    pub fn is_login_valid(&self) -> bool {
        is_jwt_valid(&self.login_token)
    }

    pub fn is_refresh_valid(&self) -> bool {
        is_jwt_valid(&self.refresh_token)
    }

    /// Combines a refresh response with this pair. The server normally
    /// returns only a new login token; the existing refresh token is kept
    /// unless the response explicitly carries a replacement.
    pub fn merged_with(&self, refreshed: TokenPair) -> TokenPair {
        let refresh_token = if refreshed.refresh_token.is_empty() {
            self.refresh_token.clone()
        } else {
            refreshed.refresh_token
        };

        TokenPair {
            login_token: refreshed.login_token,
            refresh_token,
        }
    }
}
