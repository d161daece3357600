use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Claims read out of the stored bearer token. Display-only: nothing here is
/// trusted for authorization, the API's own 401/403 decides that.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<Value>, // Subject (user id or username)
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>, // Expiration time (as UTC timestamp)
    #[serde(default)]
    pub iat: Option<i64>, // Issued at (as UTC timestamp)
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }

    /// Best label for the signed-in operator: name, username, email, subject.
    pub fn display_identity(&self) -> Option<String> {
        let subject = match &self.sub {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        [
            self.name.clone(),
            self.username.clone(),
            self.email.clone(),
            subject,
        ]
        .into_iter()
        .flatten()
        .find(|label| !label.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_display_identity_preference() {
        let claims = TokenClaims {
            sub: Some(json!(12)),
            username: Some("opsadmin".to_string()),
            email: Some("ops@example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(claims.display_identity().as_deref(), Some("opsadmin"));

        let subject_only = TokenClaims {
            sub: Some(json!(12)),
            ..Default::default()
        };
        assert_eq!(subject_only.display_identity().as_deref(), Some("12"));

        assert!(TokenClaims::default().display_identity().is_none());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let expired = TokenClaims {
            exp: Some((now - Duration::minutes(1)).timestamp()),
            ..Default::default()
        };
        let valid = TokenClaims {
            exp: Some((now + Duration::hours(1)).timestamp()),
            ..Default::default()
        };

        assert!(expired.is_expired_at(now));
        assert!(!valid.is_expired_at(now));
        assert!(!TokenClaims::default().is_expired_at(now));
    }
}
