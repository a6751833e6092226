use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use fixit_auth::{GuardChain, RoleGate};

use crate::authz::gated;

pub mod issues;
pub mod system;
pub mod users;

/// Largest accepted multipart body for issue reports (flyer included).
pub const MAX_REPORT_BYTES: usize = 10 * 1024 * 1024;

/// All routes. Gated handlers declare their permitted roles here.
pub fn router(guard: &GuardChain) -> Router {
    Router::new()
        .route("/", get(system::home))
        .route("/health", get(system::health))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/me", gated(get(users::me), guard, RoleGate::ANY))
        .route(
            "/issues",
            get(issues::list_issues).merge(gated(
                post(issues::create_issue).layer(DefaultBodyLimit::max(MAX_REPORT_BYTES)),
                guard,
                RoleGate::USER,
            )),
        )
        .route(
            "/issues/:id",
            get(issues::get_issue).merge(gated(
                put(issues::update_issue_status),
                guard,
                RoleGate::AUTHORITIES,
            )),
        )
        .route("/my-issues", gated(get(issues::my_issues), guard, RoleGate::USER))
}
