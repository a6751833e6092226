//! Route-level role gating.
//!
//! Each gated endpoint declares its permitted roles when the router is
//! built; the declaration cannot change afterwards.

use axum::routing::MethodRouter;

use fixit_auth::{GuardChain, RoleGate};

use crate::middleware::{auth_middleware, AuthState};

/// Wrap `route` so it only runs for callers admitted by `gate`.
pub fn gated(route: MethodRouter, guard: &GuardChain, gate: RoleGate) -> MethodRouter {
    let state = AuthState {
        guard: guard.clone(),
        gate,
    };
    route.route_layer(axum::middleware::from_fn_with_state(state, auth_middleware))
}
