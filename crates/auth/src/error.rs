//! Guard-chain failure taxonomy.

use thiserror::Error;

use fixit_core::StoreError;

use crate::Role;

/// Per-request rejection produced by one stage of the guard chain.
///
/// Every variant is terminal for the request; nothing here is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("token has expired")]
    ExpiredToken,

    #[error("token is malformed or its signature is invalid")]
    MalformedOrInvalidSignature,

    #[error("token carries no subject identifier")]
    MissingSubject,

    #[error("subject identifier is not a valid user id")]
    InvalidIdentifierFormat,

    #[error("no user exists for the token subject")]
    IdentityNotFound,

    #[error("access denied. Allowed roles: {}", join_roles(.permitted))]
    Forbidden { permitted: Vec<Role> },

    /// The identity lookup could not be performed.
    #[error("identity store failure: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Stable, machine-readable reason code (used for logs and metrics labels).
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::ExpiredToken => "expired_token",
            AuthError::MalformedOrInvalidSignature => "malformed_or_invalid_signature",
            AuthError::MissingSubject => "missing_subject",
            AuthError::InvalidIdentifierFormat => "invalid_identifier_format",
            AuthError::IdentityNotFound => "identity_not_found",
            AuthError::Forbidden { .. } => "forbidden",
            AuthError::Store(_) => "store_failure",
        }
    }

    /// Whether the failure concerns the caller's identity (401-class) rather
    /// than its permissions or the infrastructure.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::ExpiredToken
                | AuthError::MalformedOrInvalidSignature
                | AuthError::MissingSubject
                | AuthError::InvalidIdentifierFormat
                | AuthError::IdentityNotFound
        )
    }
}

fn join_roles(roles: &[Role]) -> String {
    roles.iter().map(Role::as_str).collect::<Vec<_>>().join(", ")
}

/// Fatal process-configuration failure (never a per-request condition).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT signing secret is not configured")]
    MissingSecret,

    #[error("unsupported JWT algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),

    #[error("invalid configuration value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
