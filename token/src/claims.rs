use std::sync::Mutex;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::{TokenError, TokenResult};

/// Roles a user can hold, encoded as integers on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum Role {
    #[default]
    User = 0,
    Admin = 1,
}

/// Application-focused representation of a JWT payload.
///
/// Decoding only checks well-formedness; the signature is the server's
/// concern and is deliberately not inspected here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub username: String,
    pub role: Role,
    pub refresh: bool,
    pub expires_at: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
    pub not_before: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ClaimsRepr {
    #[serde(default)]
    username: String,
    #[serde(default)]
    role: Role,
    #[serde(default)]
    refresh: bool,
    exp: i64,
    #[serde(default)]
    iat: i64,
    #[serde(default)]
    nbf: i64,
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = TokenError;

    fn try_from(value: ClaimsRepr) -> TokenResult<Self> {
        let expires_at = timestamp("exp", value.exp)?;
        let issued_at = timestamp("iat", value.iat)?;
        let not_before = timestamp("nbf", value.nbf)?;

        Ok(Self {
            username: value.username,
            role: value.role,
            refresh: value.refresh,
            expires_at,
            issued_at,
            not_before,
        })
    }
}

fn timestamp(claim: &'static str, seconds: i64) -> TokenResult<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or(TokenError::TimestampRange(claim, seconds))
}

impl Claims {
    /// Decodes the payload segment of `token` without verifying anything
    /// beyond shape: three dot-separated segments, base64url JSON payload.
    pub fn parse(token: &str) -> TokenResult<Self> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(TokenError::SegmentCount(segments.len()));
        }

        let payload = URL_SAFE_NO_PAD
            .decode(segments[1].trim_end_matches('='))
            .map_err(|err| TokenError::PayloadEncoding(err.to_string()))?;

        let repr: ClaimsRepr = serde_json::from_slice(&payload)
            .map_err(|err| TokenError::PayloadJson(err.to_string()))?;

        Claims::try_from(repr)
    }

    /// True iff `now` falls strictly inside the token's validity window.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at && now > self.not_before
    }
}

/// Validity predicate used by everything that only needs a boolean: decode
/// failures are caught at this boundary and reported as "not valid".
pub fn is_jwt_valid(token: &str) -> bool {
    match Claims::parse(token) {
        Ok(claims) => claims.is_valid_at(Utc::now()),
        Err(_) => false,
    }
}

/// Single-entry memoization of the last parsed token. Parsing a different
/// token string discards the entry wholesale; this is not an LRU.
#[derive(Debug, Default)]
pub struct ClaimsCache {
    entry: Mutex<Option<(String, Claims)>>,
}

impl ClaimsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&self, token: &str) -> TokenResult<Claims> {
        let mut entry = self.entry.lock().expect("lock poisoned");

        if let Some((cached, claims)) = entry.as_ref() {
            if cached == token {
                return Ok(claims.clone());
            }
        }

        match Claims::parse(token) {
            Ok(claims) => {
                *entry = Some((token.to_owned(), claims.clone()));
                Ok(claims)
            }
            Err(err) => {
                *entry = None;
                Err(err)
            }
        }
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.parse(token)
            .map(|claims| claims.is_valid_at(Utc::now()))
            .unwrap_or(false)
    }

    /// True when the cache currently memoizes exactly this token string.
    pub fn holds(&self, token: &str) -> bool {
        let entry = self.entry.lock().expect("lock poisoned");
        matches!(entry.as_ref(), Some((cached, _)) if cached == token)
    }
}
