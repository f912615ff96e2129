use aurum_token::Role;
use serde::{Deserialize, Serialize};

/// Account record as the server exchanges it. `password` is only ever
/// populated on the way out (login/signup/update); responses leave it
/// empty and cached copies are scrubbed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub blocked: bool,
}

impl User {
    /// A bare credentials carrier for login/signup requests.
    pub fn credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: String::new(),
            role: Role::default(),
            blocked: false,
        }
    }

    /// Copy with the password cleared so it can never leak from a cache.
    pub fn scrubbed(&self) -> Self {
        Self {
            password: String::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    #[serde(default)]
    pub allow_registration: bool,
}

/// An application plus the role the queried user holds within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationWithRole {
    #[serde(flatten)]
    pub application: Application,
    pub role: Role,
}
