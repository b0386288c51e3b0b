//! Token encoding, decoding and claims.

pub mod claims;
pub mod decoder;
pub mod encoder;
pub mod service;

pub use claims::{Claims, RefreshClaims, TokenPair, TokenType};
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;
pub use service::TokenService;
