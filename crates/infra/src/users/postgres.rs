//! Postgres-backed account store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use fixit_auth::{IdentityStore, Role, UserRecord};
use fixit_core::{Email, StoreError, UserId};

use super::UserStore;
use crate::db::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

const SELECT_USER: &str = r#"
    SELECT id, username, email, password_hash, role, created_at
    FROM users
"#;

#[async_trait::async_trait]
impl IdentityStore for PostgresUserStore {
    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_id", e))?;

        row.as_ref().map(decode_user).transpose()
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, record), fields(user_id = %record.id), err)]
    async fn insert(&self, record: UserRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.username)
        .bind(record.email.as_str())
        .bind(&record.password_hash)
        .bind(record.role.map(|r| r.as_str()))
        .bind(record.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        Ok(())
    }

    #[instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.as_ref().map(decode_user).transpose()
    }
}

fn decode_user(row: &sqlx::postgres::PgRow) -> Result<UserRecord, StoreError> {
    let get_err = |e: sqlx::Error| map_sqlx_error("decode_user", e);

    let id: uuid::Uuid = row.try_get("id").map_err(get_err)?;
    let email: String = row.try_get("email").map_err(get_err)?;
    let role: Option<String> = row.try_get("role").map_err(get_err)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(get_err)?;

    // A stored role outside the closed set is a data error, never a grant.
    let role = role
        .map(|r| r.parse::<Role>())
        .transpose()
        .map_err(|e| StoreError::corrupt(format!("user {id}: {e}")))?;
    let email = Email::parse(&email).map_err(|e| StoreError::corrupt(format!("user {id}: {e}")))?;

    Ok(UserRecord {
        id: UserId::from_uuid(id),
        username: row.try_get("username").map_err(get_err)?,
        email,
        password_hash: row.try_get("password_hash").map_err(get_err)?,
        role,
        created_at,
    })
}
