use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::Account,
        dto::{response::accounts_from_body, AccountQuery, ProfileResponse},
    },
    services::http_helpers::{bearer_header, error_from_response},
};

/// The admin endpoints of the platform API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// `GET /admin/users`. A body of an unexpected shape is a
    /// `DataShapeMismatch`.
    async fn list_accounts(&self, token: &SecretString, query: AccountQuery) -> AppResult<Vec<Account>>;
    /// `DELETE /admin/users/{id}`.
    async fn delete_account(&self, token: &SecretString, id: &str) -> AppResult<()>;
    /// `GET /user/profile`.
    async fn fetch_profile(&self, token: &SecretString) -> AppResult<ProfileResponse>;
}

pub struct HttpAccountApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAccountApi {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AccountApi for HttpAccountApi {
    async fn list_accounts(&self, token: &SecretString, query: AccountQuery) -> AppResult<Vec<Account>> {
        log::debug!("GET /admin/users {:?}", query.role);

        let response = self
            .client
            .get(self.url("/admin/users"))
            .header(reqwest::header::AUTHORIZATION, bearer_header(token))
            .query(&query.query_pairs())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| AppError::DataShapeMismatch(format!("account list is not JSON: {}", e)))?;
        accounts_from_body(body)
    }

    async fn delete_account(&self, token: &SecretString, id: &str) -> AppResult<()> {
        log::debug!("DELETE /admin/users/{}", id);

        let response = self
            .client
            .delete(self.url(&format!("/admin/users/{}", id)))
            .header(reqwest::header::AUTHORIZATION, bearer_header(token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    async fn fetch_profile(&self, token: &SecretString) -> AppResult<ProfileResponse> {
        let response = self
            .client
            .get(self.url("/user/profile"))
            .header(reqwest::header::AUTHORIZATION, bearer_header(token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json::<ProfileResponse>()
            .await
            .map_err(|e| AppError::DataShapeMismatch(format!("profile is not readable: {}", e)))
    }
}
