//! Composed guard chain: verify → resolve → authorize.

use std::sync::Arc;

use crate::{resolve, AuthError, Identity, IdentityStore, RoleGate, TokenVerifier};

/// The full guard chain, shared by every gated route.
///
/// Holds only read-only handles (key material and the store), so one
/// instance serves all concurrent requests.
#[derive(Clone)]
pub struct GuardChain {
    verifier: Arc<dyn TokenVerifier>,
    store: Arc<dyn IdentityStore>,
}

impl GuardChain {
    pub fn new(verifier: Arc<dyn TokenVerifier>, store: Arc<dyn IdentityStore>) -> Self {
        Self { verifier, store }
    }

    /// Verify the token and resolve its subject, without a role check.
    pub async fn authenticate(&self, raw_token: &str) -> Result<Identity, AuthError> {
        let claims = self.verifier.verify(raw_token).inspect_err(log_rejection)?;
        resolve(self.store.as_ref(), &claims)
            .await
            .inspect_err(log_rejection)
    }

    /// Run the whole chain for an endpoint declaring `gate`.
    pub async fn admit(&self, raw_token: &str, gate: RoleGate) -> Result<Identity, AuthError> {
        let identity = self.authenticate(raw_token).await?;
        let user_id = identity.id;
        gate.check(identity).inspect_err(|e| {
            tracing::warn!(%user_id, reason = e.reason(), "role gate denied request");
        })
    }
}

fn log_rejection(err: &AuthError) {
    match err {
        AuthError::Store(e) => tracing::error!(reason = err.reason(), error = %e, "guard chain could not reach identity store"),
        AuthError::InvalidIdentifierFormat | AuthError::IdentityNotFound => {
            tracing::warn!(reason = err.reason(), "token subject did not resolve to an account")
        }
        _ => tracing::debug!(reason = err.reason(), "bearer token rejected"),
    }
}
