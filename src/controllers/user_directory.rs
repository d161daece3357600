use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::RwLock;

use crate::{
    auth::TokenDecoder,
    errors::{AppError, AppResult, ErrorMessage},
    models::{
        domain::{Account, AccountRole},
        dto::{AccountQuery, RoleCounts},
    },
    repositories::CredentialRepository,
    services::account_api::AccountApi,
};

/// Where the host sends the operator after an authentication failure.
pub const LOGIN_ENTRY_POINT: &str = "/login";

pub const LOAD_ACCOUNTS: &str = "load_accounts";
pub const REMOVE_ACCOUNT: &str = "remove_account";

/// Interactive yes/no prompt shown before destructive actions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

type LoadingFlags = Arc<Mutex<HashMap<&'static str, bool>>>;

/// Sets a loading flag on creation and clears it on drop, whatever the
/// outcome of the operation.
struct LoadingGuard {
    flags: LoadingFlags,
    operation: &'static str,
}

impl LoadingGuard {
    fn begin(flags: &LoadingFlags, operation: &'static str) -> Self {
        flags
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(operation, true);
        Self {
            flags: Arc::clone(flags),
            operation,
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flags
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(self.operation, false);
    }
}

/// Account list behind the user-management dashboard.
///
/// Concurrent loads are neither coalesced nor cancelled: whichever response
/// arrives last replaces the list, even if it answers an older request. Each
/// call clears its operation's loading flag when it finishes, so an earlier
/// call completing can clear the flag while a later one is still in flight.
pub struct UserDirectoryController {
    api: Arc<dyn AccountApi>,
    credentials: CredentialRepository,
    decoder: TokenDecoder,
    confirmation: Arc<dyn Confirmation>,
    accounts: RwLock<Vec<Account>>,
    loading: LoadingFlags,
    last_error: RwLock<Option<ErrorMessage>>,
}

impl UserDirectoryController {
    pub fn new(
        api: Arc<dyn AccountApi>,
        credentials: CredentialRepository,
        confirmation: Arc<dyn Confirmation>,
    ) -> Self {
        Self {
            api,
            credentials,
            decoder: TokenDecoder::new(),
            confirmation,
            accounts: RwLock::new(Vec::new()),
            loading: Arc::new(Mutex::new(HashMap::new())),
            last_error: RwLock::new(None),
        }
    }

    pub fn is_loading(&self, operation: &str) -> bool {
        self.loading
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(operation)
            .copied()
            .unwrap_or(false)
    }

    pub async fn accounts(&self) -> Vec<Account> {
        self.accounts.read().await.clone()
    }

    /// Message for the most recent failed operation, cleared on success.
    pub async fn error_message(&self) -> Option<ErrorMessage> {
        self.last_error.read().await.clone()
    }

    /// Stored token, rejected up front when missing, unreadable or visibly
    /// expired. Rejection clears the stored credentials.
    async fn authorize(&self) -> AppResult<SecretString> {
        let outcome = match self.credentials.bearer_token().await? {
            None => Err(AppError::AuthenticationFailure("Not signed in".to_string())),
            Some(token) => self
                .decoder
                .decode_unexpired(&token, Utc::now())
                .map(|_| token),
        };

        if let Err(err) = &outcome {
            log::warn!("Rejecting stored credentials: {}", err);
            self.credentials.clear().await?;
        }
        outcome
    }

    async fn record_failure(&self, operation: &str, err: &AppError) {
        if matches!(err, AppError::AuthenticationFailure(_)) {
            if let Err(clear_err) = self.credentials.clear().await {
                log::error!("Failed to clear credentials: {}", clear_err);
            }
            log::info!("Session ended, sign in again at {}", LOGIN_ENTRY_POINT);
        }
        log::warn!("{} failed: {}", operation, err);
        if err.is_user_visible() {
            *self.last_error.write().await = Some(ErrorMessage::from(err));
        }
    }

    /// Fetches all accounts, or those of one role, and replaces the working
    /// list. An unreadable body yields an empty list rather than an error;
    /// any other failure empties the list and is returned.
    pub async fn load_accounts(&self, role_filter: Option<AccountRole>) -> AppResult<Vec<Account>> {
        let _loading = LoadingGuard::begin(&self.loading, LOAD_ACCOUNTS);

        let query = AccountQuery { role: role_filter };
        let result = match self.authorize().await {
            Ok(token) => self.api.list_accounts(&token, query).await,
            Err(err) => Err(err),
        };

        let accounts = match result {
            Ok(accounts) => accounts,
            Err(AppError::DataShapeMismatch(detail)) => {
                log::warn!("Account list had an unexpected shape: {}", detail);
                Vec::new()
            }
            Err(err) => {
                self.accounts.write().await.clear();
                self.record_failure(LOAD_ACCOUNTS, &err).await;
                return Err(err);
            }
        };

        log::info!("Loaded {} accounts", accounts.len());
        *self.accounts.write().await = accounts.clone();
        *self.last_error.write().await = None;
        Ok(accounts)
    }

    /// Deletes an account after the operator confirms. Returns `Ok(false)`
    /// when the prompt is declined. On success the account is dropped from
    /// the working list without a re-fetch; on failure the list is untouched.
    pub async fn remove_account(&self, id: &str, display_name: &str) -> AppResult<bool> {
        let prompt = format!(
            "Are you sure you want to delete {}? This action cannot be undone.",
            display_name
        );
        if !self.confirmation.confirm(&prompt).await {
            log::debug!("Deletion of account {} cancelled", id);
            return Ok(false);
        }

        let _loading = LoadingGuard::begin(&self.loading, REMOVE_ACCOUNT);

        let result = match self.authorize().await {
            Ok(token) => self.api.delete_account(&token, id).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                self.accounts.write().await.retain(|account| account.id != id);
                *self.last_error.write().await = None;
                log::info!("Deleted account {} ({})", id, display_name);
                Ok(true)
            }
            Err(err) => {
                let err = match err {
                    AppError::RequestFailure { status: 404, .. } => AppError::NotImplemented(
                        "Deleting users is not supported by the server yet".to_string(),
                    ),
                    other => other,
                };
                self.record_failure(REMOVE_ACCOUNT, &err).await;
                Err(err)
            }
        }
    }

    /// Label for the signed-in operator: from the token when it carries one,
    /// otherwise from `GET /user/profile`.
    pub async fn current_identity(&self) -> AppResult<String> {
        let token = self.authorize().await?;
        if let Some(identity) = self.decoder.decode(&token)?.display_identity() {
            return Ok(identity);
        }

        match self.api.fetch_profile(&token).await {
            Ok(profile) => Ok(profile.display_name().unwrap_or_else(|| "Admin".to_string())),
            Err(err) => {
                self.record_failure("current_identity", &err).await;
                Err(err)
            }
        }
    }

    /// Loaded accounts whose name or email contains `search`, ignoring case.
    pub async fn visible_accounts(&self, search: &str) -> Vec<Account> {
        let needle = search.trim().to_lowercase();
        self.accounts
            .read()
            .await
            .iter()
            .filter(|account| needle.is_empty() || account.matches(&needle))
            .cloned()
            .collect()
    }

    pub async fn role_counts(&self) -> RoleCounts {
        RoleCounts::tally(self.accounts.read().await.iter())
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.accounts.write().await.clear();
        self.credentials.clear().await
    }
}
