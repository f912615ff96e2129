#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde_json::json;

use aurum_client::{ClientConfig, SessionClient, User};

/// Builds an unsigned but well-formed JWT whose validity window is
/// `now + nbf_offset_secs .. now + exp_offset_secs`.
pub fn forge_token(username: &str, refresh: bool, nbf_offset_secs: i64, exp_offset_secs: i64) -> String {
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

pub fn session_for(server: &httpmock::MockServer) -> SessionClient {
    SessionClient::new(&ClientConfig::new(server.base_url())).expect("build session client")
}

pub fn test_user() -> User {
    User::credentials("victor", "hunter2")
}
