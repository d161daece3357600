pub mod claims;
pub mod jwt;

pub use claims::TokenClaims;
pub use jwt::TokenDecoder;
