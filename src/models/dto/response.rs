use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Account, AccountRole},
};

#[derive(Debug, Deserialize)]
struct UsersEnvelope {
    users: Vec<Value>,
}

/// The three shapes `GET /admin/users` has been seen to return. Elements stay
/// raw so one unreadable account does not cost the rest.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AccountListResponse {
    Envelope { data: UsersEnvelope },
    Data { data: Vec<Value> },
    Bare(Vec<Value>),
}

impl From<AccountListResponse> for Vec<Value> {
    fn from(response: AccountListResponse) -> Self {
        match response {
            AccountListResponse::Envelope { data } => data.users,
            AccountListResponse::Data { data } => data,
            AccountListResponse::Bare(users) => users,
        }
    }
}

/// Normalizes an account list body to an ordered list of accounts. Entries
/// that cannot be read as an account are skipped with a warning; only a body
/// of the wrong overall shape is a `DataShapeMismatch`.
pub fn accounts_from_body(body: Value) -> AppResult<Vec<Account>> {
    let entries: Vec<Value> = serde_json::from_value::<AccountListResponse>(body)
        .map(Vec::from)
        .map_err(|_| {
            AppError::DataShapeMismatch(
                "expected data.users, data or a bare array of accounts".to_string(),
            )
        })?;

    let mut accounts = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Account>(entry) {
            Ok(account) => accounts.push(account),
            Err(err) => log::warn!("Skipping unreadable account #{}: {}", index, err),
        }
    }
    Ok(accounts)
}

/// Error body returned by the API. `detail` wins over `message`.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn into_message(self) -> Option<String> {
        let detail = match self.detail {
            Some(Value::String(detail)) => Some(detail),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        detail
            .filter(|d| !d.is_empty())
            .or(self.message.filter(|m| !m.is_empty()))
    }
}

/// Current identity from `GET /user/profile`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProfileResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl ProfileResponse {
    pub fn display_name(&self) -> Option<String> {
        self.full_name
            .clone()
            .or_else(|| self.username.clone())
            .or_else(|| self.email.clone())
            .filter(|n| !n.trim().is_empty())
    }
}

/// Aggregates over the currently filtered results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResultStatistics {
    pub total: usize,
    pub average: i64,
    pub highest: f64,
    pub lowest: f64,
    pub excellent: usize,
    pub good: usize,
    pub average_count: usize,
    pub poor: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Teacher and student totals for the directory header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub teachers: usize,
    pub students: usize,
    pub total: usize,
}

impl RoleCounts {
    pub fn tally<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> Self {
        accounts
            .into_iter()
            .fold(RoleCounts::default(), |mut counts, account| {
                match account.role {
                    AccountRole::Teacher => counts.teachers += 1,
                    AccountRole::Student => counts.students += 1,
                    AccountRole::Unknown => {}
                }
                counts.total += 1;
                counts
            })
    }
}
