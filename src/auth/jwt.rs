use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    auth::claims::TokenClaims,
    errors::{AppError, AppResult},
};

/// Reads claims from a bearer token without verifying its signature. The
/// result is for personalising the UI and for skipping requests with a token
/// that has visibly expired.
#[derive(Clone)]
pub struct TokenDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl Default for TokenDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenDecoder {
    pub fn new() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            key: DecodingKey::from_secret(&[]),
            validation,
        }
    }

    pub fn decode(&self, token: &SecretString) -> AppResult<TokenClaims> {
        decode::<TokenClaims>(token.expose_secret(), &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::AuthenticationFailure(format!("Unreadable token: {}", e)))
    }

    /// Decodes and rejects a token whose `exp` is already in the past.
    pub fn decode_unexpired(
        &self,
        token: &SecretString,
        now: DateTime<Utc>,
    ) -> AppResult<TokenClaims> {
        let claims = self.decode(token)?;
        if claims.is_expired_at(now) {
            return Err(AppError::AuthenticationFailure(
                "Session has expired".to_string(),
            ));
        }
        Ok(claims)
    }
}
