//! Explicit caller identity
//!
//! Authentication is handled outside this service; callers state who they
//! are on each request and that name drives "assign to me" and the `mine`
//! list filter.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

const MAX_IDENTITY_LENGTH: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::validation("Caller identity cannot be empty"));
        }

        if trimmed.len() > MAX_IDENTITY_LENGTH {
            return Err(DomainError::validation(format!(
                "Caller identity exceeds maximum length of {} characters",
                MAX_IDENTITY_LENGTH
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CallerIdentity {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CallerIdentity> for String {
    fn from(id: CallerIdentity) -> Self {
        id.0
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
