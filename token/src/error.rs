use thiserror::Error;

pub type TokenResult<T> = Result<T, TokenError>;

/// Decode failures are kept distinct from genuine invalidity: a malformed
/// token is reported as one of these variants, an expired one is not.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token has {0} segments, expected 3")]
    SegmentCount(usize),
    #[error("payload segment is not valid base64url: {0}")]
    PayloadEncoding(String),
    #[error("payload segment is not valid claims JSON: {0}")]
    PayloadJson(String),
    #[error("claim '{0}' holds out-of-range timestamp {1}")]
    TimestampRange(&'static str, i64),
}
