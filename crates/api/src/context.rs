use fixit_auth::{Identity, Role};
use fixit_core::UserId;

/// Caller identity for a request that passed the guard chain.
///
/// Inserted into request extensions by the auth middleware; gated handlers
/// extract it instead of resolving the token again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    identity: Identity,
}

impl CurrentUser {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn id(&self) -> UserId {
        self.identity.id
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}
