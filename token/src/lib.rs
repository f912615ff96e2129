pub mod claims;
pub mod error;
pub mod pair;

pub use claims::{is_jwt_valid, Claims, ClaimsCache, Role};
pub use error::{TokenError, TokenResult};
pub use pair::TokenPair;
