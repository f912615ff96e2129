use async_trait::async_trait;
use aurum_token::TokenPair;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{AurumError, ErrorCode};
use crate::models::{ApplicationWithRole, User};

/// The narrow server interface the lifecycle core consumes. The core never
/// inspects HTTP response shapes itself; implementations translate them
/// into `AurumError` values.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    async fn login(&self, user: &User) -> Result<TokenPair, AurumError>;
    async fn signup(&self, user: &User) -> Result<(), AurumError>;
    async fn refresh(&self, pair: &TokenPair) -> Result<TokenPair, AurumError>;
    async fn get_user_info(&self, pair: &TokenPair) -> Result<User, AurumError>;
    async fn update_user(&self, pair: &TokenPair, user: &User) -> Result<User, AurumError>;
    async fn applications_for_user(
        &self,
        pair: &TokenPair,
        username: &str,
    ) -> Result<Vec<ApplicationWithRole>, AurumError>;
    async fn public_key(&self) -> Result<String, AurumError>;
}

#[derive(Debug, Deserialize)]
struct PublicKeyResponse {
    public_key: String,
}

/// reqwest-backed transport speaking the server's JSON API.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, AurumError> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|err| {
                AurumError::new(
                    format!("failed to build http client: {err}"),
                    ErrorCode::InvalidRequest,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Prefer the server's own error body; fall back to the status code.
    async fn error_from(response: Response) -> AurumError {
        let status = response.status();
        match response.json::<AurumError>().await {
            Ok(err) => err,
            Err(_) => AurumError::new(status.to_string(), code_for_status(status)),
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, AurumError> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        response
            .json()
            .await
            .map_err(|err| AurumError::server(format!("invalid response body: {err}")))
    }
}

fn code_for_status(status: StatusCode) -> ErrorCode {
    if status.is_server_error() {
        return ErrorCode::ServerError;
    }
    match status {
        StatusCode::UNAUTHORIZED => ErrorCode::Unauthorized,
        StatusCode::CONFLICT => ErrorCode::Duplicate,
        StatusCode::UNPROCESSABLE_ENTITY => ErrorCode::WeakPassword,
        _ => ErrorCode::InvalidRequest,
    }
}

/// The refresh endpoint has its own mapping: a 404 means the session the
/// refresh token belongs to is gone, which callers treat as Unauthorized.
fn refresh_code_for_status(status: StatusCode) -> ErrorCode {
    if status.is_server_error() {
        ErrorCode::ServerError
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND {
        ErrorCode::Unauthorized
    } else {
        ErrorCode::InvalidRequest
    }
}

fn transport_error(err: reqwest::Error) -> AurumError {
    AurumError::server(format!("request failed: {err}"))
}

#[async_trait]
impl AuthTransport for HttpTransport {
    async fn login(&self, user: &User) -> Result<TokenPair, AurumError> {
        debug!(username = %user.username, "requesting login token pair");
        let response = self
            .client
            .post(self.url("/login"))
            .json(user)
            .send()
            .await
            .map_err(transport_error)?;
        Self::decode(response).await
    }

    async fn signup(&self, user: &User) -> Result<(), AurumError> {
        debug!(username = %user.username, "signing up");
        let response = self
            .client
            .post(self.url("/signup"))
            .json(user)
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }

    async fn refresh(&self, pair: &TokenPair) -> Result<TokenPair, AurumError> {
        debug!("exchanging refresh token for a new login token");
        let response = self
            .client
            .post(self.url("/refresh"))
            .json(pair)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AurumError::new(
                status.to_string(),
                refresh_code_for_status(status),
            ));
        }
        response
            .json()
            .await
            .map_err(|err| AurumError::server(format!("invalid refresh response: {err}")))
    }

    async fn get_user_info(&self, pair: &TokenPair) -> Result<User, AurumError> {
        let response = self
            .client
            .get(self.url("/user"))
            .bearer_auth(&pair.login_token)
            .send()
            .await
            .map_err(transport_error)?;
        Self::decode(response).await
    }

    async fn update_user(&self, pair: &TokenPair, user: &User) -> Result<User, AurumError> {
        let response = self
            .client
            .post(self.url("/user"))
            .bearer_auth(&pair.login_token)
            .json(user)
            .send()
            .await
            .map_err(transport_error)?;
        Self::decode(response).await
    }

    async fn applications_for_user(
        &self,
        pair: &TokenPair,
        username: &str,
    ) -> Result<Vec<ApplicationWithRole>, AurumError> {
        let response = self
            .client
            .get(self.url(&format!("/application/{username}")))
            .bearer_auth(&pair.login_token)
            .send()
            .await
            .map_err(transport_error)?;
        Self::decode(response).await
    }

    async fn public_key(&self) -> Result<String, AurumError> {
        let response = self
            .client
            .get(self.url("/pk"))
            .send()
            .await
            .map_err(transport_error)?;
        let body: PublicKeyResponse = Self::decode(response).await?;
        Ok(body.public_key)
    }
}
