//! Email address value object.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A normalized (trimmed, lower-cased) email address.
///
/// Equality is by value, so two spellings that differ only in case compare
/// equal once parsed. Uniqueness of accounts is enforced on this form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();

        // Basic shape check: one '@', non-empty local part, dotted domain.
        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(DomainError::validation("invalid email format"));
        };
        if local.is_empty()
            || domain.contains('@')
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
            || normalized.chars().any(char::is_whitespace)
        {
            return Err(DomainError::validation("invalid email format"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let email = Email::parse("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
        assert_eq!(email, Email::parse("alice@example.com").unwrap());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for raw in ["", "alice", "@example.com", "alice@example", "a@b@c.com", "al ice@example.com", "alice@.com"] {
            assert!(Email::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }
}
