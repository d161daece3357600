use std::sync::Arc;

use secrecy::SecretString;

use crate::{errors::AppResult, repositories::KeyValueStore};

/// Legacy key names the bearer token has been stored under, in lookup order.
pub const TOKEN_KEYS: [&str; 2] = ["token", "access_token"];

#[derive(Clone)]
pub struct CredentialRepository {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// First non-empty token among [`TOKEN_KEYS`].
    pub async fn bearer_token(&self) -> AppResult<Option<SecretString>> {
        for key in TOKEN_KEYS {
            if let Some(token) = self.store.get(key).await? {
                let token = token.trim();
                if !token.is_empty() {
                    return Ok(Some(SecretString::from(token.to_string())));
                }
            }
        }
        Ok(None)
    }

    pub async fn store_token(&self, token: &str) -> AppResult<()> {
        self.store.set(TOKEN_KEYS[0], token.to_string()).await
    }

    /// Removes the token under every legacy key.
    pub async fn clear(&self) -> AppResult<()> {
        for key in TOKEN_KEYS {
            self.store.remove(key).await?;
        }
        log::info!("Cleared stored credentials");
        Ok(())
    }
}
