//! Scripted collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use aurum_token::TokenPair;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde_json::json;

use crate::error::{AurumError, ErrorCode};
use crate::models::{ApplicationWithRole, User};
use crate::transport::AuthTransport;

/// Builds an unsigned but well-formed JWT whose validity window is
/// `now + nbf_offset_secs .. now + exp_offset_secs`.
pub(crate) fn forge_token(
    username: &str,
    refresh: bool,
    nbf_offset_secs: i64,
    exp_offset_secs: i64,
) -> String {
    let now = Utc::now();
    let payload = json!({
        "username": username,
        "role": 0,
        "refresh": refresh,
        "exp": (now + Duration::seconds(exp_offset_secs)).timestamp(),
        "iat": (now + Duration::seconds(nbf_offset_secs)).timestamp(),
        "nbf": (now + Duration::seconds(nbf_offset_secs)).timestamp(),
    });

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"EdDSA","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

fn unscripted(endpoint: &str) -> AurumError {
    AurumError::new(
        format!("unscripted call to {endpoint}"),
        ErrorCode::ServerError,
    )
}

type Script<T> = Mutex<VecDeque<Result<T, AurumError>>>;

fn pop<T>(script: &Script<T>, endpoint: &str) -> Result<T, AurumError> {
    script
        .lock()
        .expect("lock poisoned")
        .pop_front()
        .unwrap_or_else(|| Err(unscripted(endpoint)))
}

/// Transport double replaying pre-scripted responses and counting calls.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    login: Script<TokenPair>,
    signup: Script<()>,
    refresh: Script<TokenPair>,
    user_info: Script<User>,
    update: Script<User>,
    applications: Script<Vec<ApplicationWithRole>>,
    public_key: Script<String>,

    login_count: AtomicUsize,
    signup_count: AtomicUsize,
    refresh_count: AtomicUsize,
    user_info_count: AtomicUsize,
    update_count: AtomicUsize,
    applications_count: AtomicUsize,
    public_key_count: AtomicUsize,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script_login(&self, result: Result<TokenPair, AurumError>) {
        self.login.lock().expect("lock poisoned").push_back(result);
    }

    pub(crate) fn script_signup(&self, result: Result<(), AurumError>) {
        self.signup.lock().expect("lock poisoned").push_back(result);
    }

    pub(crate) fn script_refresh(&self, result: Result<TokenPair, AurumError>) {
        self.refresh.lock().expect("lock poisoned").push_back(result);
    }

    pub(crate) fn script_user_info(&self, result: Result<User, AurumError>) {
        self.user_info.lock().expect("lock poisoned").push_back(result);
    }

    pub(crate) fn script_update(&self, result: Result<User, AurumError>) {
        self.update.lock().expect("lock poisoned").push_back(result);
    }

    pub(crate) fn script_applications(
        &self,
        result: Result<Vec<ApplicationWithRole>, AurumError>,
    ) {
        self.applications
            .lock()
            .expect("lock poisoned")
            .push_back(result);
    }

    pub(crate) fn script_public_key(&self, result: Result<String, AurumError>) {
        self.public_key
            .lock()
            .expect("lock poisoned")
            .push_back(result);
    }

    pub(crate) fn login_calls(&self) -> usize {
        self.login_count.load(Ordering::SeqCst)
    }

    pub(crate) fn refresh_calls(&self) -> usize {
        self.refresh_count.load(Ordering::SeqCst)
    }

    pub(crate) fn user_info_calls(&self) -> usize {
        self.user_info_count.load(Ordering::SeqCst)
    }

    pub(crate) fn public_key_calls(&self) -> usize {
        self.public_key_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthTransport for ScriptedTransport {
    async fn login(&self, _user: &User) -> Result<TokenPair, AurumError> {
        self.login_count.fetch_add(1, Ordering::SeqCst);
        pop(&self.login, "/login")
    }

    async fn signup(&self, _user: &User) -> Result<(), AurumError> {
        self.signup_count.fetch_add(1, Ordering::SeqCst);
        pop(&self.signup, "/signup")
    }

    async fn refresh(&self, _pair: &TokenPair) -> Result<TokenPair, AurumError> {
        self.refresh_count.fetch_add(1, Ordering::SeqCst);
        pop(&self.refresh, "/refresh")
    }

    async fn get_user_info(&self, _pair: &TokenPair) -> Result<User, AurumError> {
        self.user_info_count.fetch_add(1, Ordering::SeqCst);
        pop(&self.user_info, "/user")
    }

    async fn update_user(&self, _pair: &TokenPair, _user: &User) -> Result<User, AurumError> {
        self.update_count.fetch_add(1, Ordering::SeqCst);
        pop(&self.update, "/user")
    }

    async fn applications_for_user(
        &self,
        _pair: &TokenPair,
        _username: &str,
    ) -> Result<Vec<ApplicationWithRole>, AurumError> {
        self.applications_count.fetch_add(1, Ordering::SeqCst);
        pop(&self.applications, "/application")
    }

    async fn public_key(&self) -> Result<String, AurumError> {
        self.public_key_count.fetch_add(1, Ordering::SeqCst);
        pop(&self.public_key, "/pk")
    }
}
