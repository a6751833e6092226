use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role used for RBAC decisions.
///
/// Closed set: an account is either a reporting citizen or an authority
/// that triages reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Authorities,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::User, Role::Authorities];

    /// Role assumed when neither the store nor the token names one.
    pub const DEFAULT: Role = Role::User;

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Authorities => "authorities",
        }
    }

    /// Display label ("User", "Authorities").
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Authorities => "Authorities",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
