use serde::Deserialize;
use validator::Validate;

use crate::models::domain::AccountRole;

/// Query for `GET /admin/users`. `None` lists every role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountQuery {
    pub role: Option<AccountRole>,
}

impl AccountQuery {
    pub fn all() -> Self {
        Self { role: None }
    }

    pub fn role(role: AccountRole) -> Self {
        Self { role: Some(role) }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        match self.role {
            Some(AccountRole::Unknown) | None => vec![],
            Some(role) => vec![("role", role.as_str())],
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Validate, PartialEq, Eq)]
pub struct PageRequest {
    #[validate(range(min = 1, message = "Page numbers start at 1"))]
    pub page: usize,

    #[validate(range(min = 1, max = 100))]
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    pub fn first(page_size: usize) -> Self {
        Self::new(1, page_size)
    }
}
