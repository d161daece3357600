use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parse_timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Teacher,
    Student,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Teacher => "teacher",
            AccountRole::Student => "student",
            AccountRole::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const MISSING_FIELD_PLACEHOLDER: &str = "N/A";

/// An account as served by the admin API, with display defaults filled in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAccount")]
pub struct Account {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub role: AccountRole,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Wire form. The backend has shipped several field spellings over time.
#[derive(Debug, Deserialize)]
struct RawAccount {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<AccountRole>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    created_at: Option<String>,
}

impl TryFrom<RawAccount> for Account {
    type Error = String;

    fn try_from(raw: RawAccount) -> Result<Self, Self::Error> {
        let id = match raw.id.or(raw.user_id) {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => return Err(format!("unsupported account id: {}", other)),
            None => return Err("account is missing an id".to_string()),
        };

        let state = raw
            .state
            .or(raw.status)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                raw.is_active
                    .map(|active| if active { "active" } else { "inactive" }.to_string())
            })
            .unwrap_or_else(|| "active".to_string());

        Ok(Account {
            id,
            display_name: [raw.display_name, raw.name, raw.full_name, raw.username]
                .into_iter()
                .flatten()
                .find(|n| !n.trim().is_empty())
                .unwrap_or_else(|| MISSING_FIELD_PLACEHOLDER.to_string()),
            email: raw
                .email
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| MISSING_FIELD_PLACEHOLDER.to_string()),
            role: raw.role.unwrap_or_default(),
            state,
            created_at: raw.created_at.as_deref().and_then(parse_timestamp),
        })
    }
}

impl Account {
    pub fn new(id: &str, display_name: &str, email: &str, role: AccountRole) -> Self {
        Account {
            id: id.to_string(),
            display_name: display_name.to_string(),
            email: email.to_string(),
            role,
            state: "active".to_string(),
            created_at: None,
        }
    }

    /// Case-insensitive substring match on display name or email.
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.display_name.to_lowercase().contains(needle_lowercase)
            || self.email.to_lowercase().contains(needle_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account_deserializes_numeric_id() {
        let account: Account = serde_json::from_value(json!({
            "id": 7,
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "role": "teacher",
            "is_active": true,
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(account.id, "7");
        assert_eq!(account.display_name, "Ada Lovelace");
        assert_eq!(account.role, AccountRole::Teacher);
        assert_eq!(account.state, "active");
        assert!(account.created_at.is_some());
    }

    #[test]
    fn test_account_fills_display_defaults() {
        let account: Account = serde_json::from_value(json!({ "id": "abc" })).unwrap();

        assert_eq!(account.display_name, "N/A");
        assert_eq!(account.email, "N/A");
        assert_eq!(account.role, AccountRole::Unknown);
        assert_eq!(account.state, "active");
        assert!(account.created_at.is_none());
    }

    #[test]
    fn test_account_unknown_role_and_status_alias() {
        let account: Account = serde_json::from_value(json!({
            "id": "x",
            "role": "admin",
            "status": "suspended"
        }))
        .unwrap();

        assert_eq!(account.role, AccountRole::Unknown);
        assert_eq!(account.state, "suspended");
    }

    #[test]
    fn test_account_tolerates_naive_timestamp() {
        let account: Account = serde_json::from_value(json!({
            "id": 3,
            "created_at": "2024-05-01T10:00:00.123456"
        }))
        .unwrap();
        assert!(account.created_at.is_some());

        let garbled: Account =
            serde_json::from_value(json!({ "id": 4, "created_at": "yesterday" })).unwrap();
        assert!(garbled.created_at.is_none());
    }

    #[test]
    fn test_account_without_id_is_rejected() {
        let result: Result<Account, _> = serde_json::from_value(json!({ "name": "No Id" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_new_account_has_no_invented_creation_time() {
        let first = Account::new("1", "Ada", "ada@school.test", AccountRole::Teacher);
        let second = Account::new("1", "Ada", "ada@school.test", AccountRole::Teacher);
        assert!(first.created_at.is_none());
        assert_eq!(first, second);
    }

    #[test]
    fn test_account_matches_name_or_email() {
        let account = Account::new("1", "Grace Hopper", "grace@navy.mil", AccountRole::Teacher);
        assert!(account.matches("hopper"));
        assert!(account.matches("navy"));
        assert!(!account.matches("lovelace"));
    }
}
