use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Extension},
    http::StatusCode,
    Form, Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use fixit_auth::{effective_role, hash_password, verify_password, Identity, UserRecord};
use fixit_core::{Email, StoreError, UserId};

use crate::app::dto::{LoginForm, RegisterForm};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Form(form) = form?;
    let (username, email, role) = form.validate()?;

    if services.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("User already exists"));
    }

    let password = form.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(format!("password hashing task failed: {e}")))??;

    let record = UserRecord {
        id: UserId::new(),
        username,
        email,
        password_hash,
        role: Some(role),
        created_at: Utc::now(),
    };
    let id = record.id;

    services.users.insert(record).await.map_err(|e| match e {
        StoreError::Conflict(_) => ApiError::conflict("User already exists"),
        other => other.into(),
    })?;

    tracing::info!(user_id = %id, role = %role, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("{} registered successfully", role.label()),
            "id": id.to_string(),
        })),
    ))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<Value>, ApiError> {
    let Form(form) = form?;
    let email = Email::parse(&form.email).map_err(|_| ApiError::InvalidCredentials)?;

    let record = services
        .users
        .find_by_email(&email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let hash = record.password_hash.clone();
    let password = form.password;
    let valid = tokio::task::spawn_blocking(move || verify_password(&hash, &password))
        .await
        .map_err(|e| ApiError::internal(format!("password verification task failed: {e}")))?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let role = effective_role(record.role, None);
    let token = services
        .issuer
        .issue(record.id, role, Utc::now())
        .map_err(|e| ApiError::internal(format!("token signing failed: {e}")))?;

    tracing::info!(user_id = %record.id, "user logged in");

    Ok(Json(json!({
        "message": format!("{} logged in successfully", role.label()),
        "access_token": token,
        "role": role,
    })))
}

pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<Identity> {
    Json(user.identity().clone())
}
