use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use fixit_auth::{AuthError, PasswordError};
use fixit_core::{DomainError, StoreError};

/// Everything a handler or the auth middleware can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing bearer token")]
    MissingToken,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::InvalidId(msg) => ApiError::InvalidId(msg),
            DomainError::NotFound => ApiError::NotFound("not found".to_string()),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort => ApiError::Validation(err.to_string()),
            PasswordError::Hashing(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation(rejection.body_text()),
            _ => ApiError::BadRequest(rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingToken => unauthorized("missing_token", "Authorization token is missing"),
            ApiError::Auth(err) => auth_error_to_response(err),
            ApiError::InvalidCredentials => {
                json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "Invalid email or password")
            }
            ApiError::Validation(msg) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg),
            ApiError::InvalidId(msg) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_id", msg),
            ApiError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
            ApiError::Store(err) => store_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
            }
        }
    }
}

/// Map a guard-chain rejection to its wire form.
///
/// Identifier-format and not-found failures share one response so callers
/// cannot probe which accounts exist; the distinction only reaches the logs.
pub fn auth_error_to_response(err: AuthError) -> Response {
    match err {
        AuthError::ExpiredToken => unauthorized("token_expired", "Token has expired"),
        AuthError::MalformedOrInvalidSignature => {
            unauthorized("invalid_token", "Invalid authentication token")
        }
        AuthError::MissingSubject => unauthorized("invalid_token", "Invalid token: user ID missing"),
        AuthError::InvalidIdentifierFormat | AuthError::IdentityNotFound => {
            unauthorized("unauthorized", "unauthorized")
        }
        AuthError::Forbidden { permitted } => {
            let roles = permitted.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(", ");
            json_error(
                StatusCode::FORBIDDEN,
                "forbidden",
                format!("Access denied. Allowed roles: {roles}"),
            )
        }
        AuthError::Store(err) => store_error_to_response(err),
    }
}

fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Unavailable(msg) => {
            tracing::error!(error = %msg, "store unavailable");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "storage is temporarily unavailable",
            )
        }
        StoreError::Corrupt(msg) => {
            tracing::error!(error = %msg, "corrupt record");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
        }
    }
}

fn unauthorized(code: &'static str, message: &'static str) -> Response {
    let mut res = json_error(StatusCode::UNAUTHORIZED, code, message);
    res.headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    res
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
