//! Identity resolution: verified claims → persisted account.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fixit_core::{Email, StoreError, UserId};

use crate::{AuthError, Claims, Role};

/// Account as held by the backing store.
///
/// `role` is optional because records written before roles existed carry
/// none; [`effective_role`] decides what such accounts are treated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
}

/// Resolved caller identity, bound into the request once the chain admits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    /// Role used for every authorization decision on this request.
    pub role: Role,
}

/// Read-only lookup the resolver needs from the account store.
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;
}

/// Reconcile the role between store and token.
///
/// Precedence: persisted role, then the token's claim (if it names a known
/// role), then [`Role::DEFAULT`]. The store always wins so that a role change
/// takes effect even for tokens minted before it.
pub fn effective_role(persisted: Option<Role>, claimed: Option<&str>) -> Role {
    persisted
        .or_else(|| claimed.and_then(|c| c.parse().ok()))
        .unwrap_or(Role::DEFAULT)
}

/// Second stage of the guard chain.
///
/// Performs exactly one store read.
pub async fn resolve<S>(store: &S, claims: &Claims) -> Result<Identity, AuthError>
where
    S: IdentityStore + ?Sized,
{
    let id: UserId = claims
        .subject_id
        .parse()
        .map_err(|_| AuthError::InvalidIdentifierFormat)?;

    let record = store
        .find_by_id(id)
        .await?
        .ok_or(AuthError::IdentityNotFound)?;

    let role = effective_role(record.role, claims.role.as_deref());
    if record.role.is_none() {
        tracing::debug!(user_id = %record.id, %role, "account has no persisted role; using fallback");
    }

    Ok(Identity {
        id: record.id,
        username: record.username,
        email: record.email,
        role,
    })
}

impl From<UserRecord> for Identity {
    /// Identity of a freshly loaded record, without a token to reconcile against.
    fn from(record: UserRecord) -> Self {
        Self {
            role: effective_role(record.role, None),
            id: record.id,
            username: record.username,
            email: record.email,
        }
    }
}
