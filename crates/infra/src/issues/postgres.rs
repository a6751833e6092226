//! Postgres-backed issue store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use fixit_core::{Issue, IssueId, IssueStatus, StoreError, UserId};

use super::{IssueFilter, IssueStore, Page};
use crate::db::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PostgresIssueStore {
    pool: Arc<PgPool>,
}

impl PostgresIssueStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

const ISSUE_COLUMNS: &str =
    "id, title, description, region, gps_location, category, flyer_url, owner_id, status, created_at";

#[async_trait::async_trait]
impl IssueStore for PostgresIssueStore {
    #[instrument(skip(self, issue), fields(issue_id = %issue.id), err)]
    async fn insert(&self, issue: Issue) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO issues
                (id, title, description, region, gps_location, category, flyer_url, owner_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(issue.id.as_uuid())
        .bind(&issue.title)
        .bind(&issue.description)
        .bind(&issue.region)
        .bind(&issue.gps_location)
        .bind(&issue.category)
        .bind(&issue.flyer_url)
        .bind(issue.owner.as_uuid())
        .bind(issue.status.as_str())
        .bind(issue.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_issue", e))?;

        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: IssueId) -> Result<Option<Issue>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_issue", e))?;

        row.as_ref().map(decode_issue).transpose()
    }

    #[instrument(skip(self), err)]
    async fn search(&self, filter: &IssueFilter, page: Page) -> Result<Vec<Issue>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE TRUE"));

        let terms = filter.text_terms();
        if !terms.is_empty() {
            qb.push(" AND (");
            for (n, (field, needle)) in terms.into_iter().enumerate() {
                if n > 0 {
                    qb.push(" OR ");
                }
                // `field` comes from a fixed whitelist, never from the caller.
                qb.push(field)
                    .push(" ILIKE ")
                    .push_bind(format!("%{}%", escape_like(needle)));
            }
            qb.push(")");
        }

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }

        qb.push(" ORDER BY created_at ASC, id ASC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(page.skip));

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("search_issues", e))?;

        rows.iter().map(decode_issue).collect()
    }

    #[instrument(skip(self), err)]
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Issue>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE owner_id = $1 ORDER BY created_at ASC"
        ))
        .bind(owner.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_issues_by_owner", e))?;

        rows.iter().map(decode_issue).collect()
    }

    #[instrument(skip(self), err)]
    async fn exists_for_owner(&self, owner: UserId, title: &str) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM issues WHERE owner_id = $1 AND title = $2) AS present",
        )
        .bind(owner.as_uuid())
        .bind(title)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("issue_exists_for_owner", e))?;

        row.try_get("present")
            .map_err(|e| map_sqlx_error("issue_exists_for_owner", e))
    }

    #[instrument(skip(self), err)]
    async fn update_status(&self, id: IssueId, status: IssueStatus) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE issues SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_issue_status", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn decode_issue(row: &sqlx::postgres::PgRow) -> Result<Issue, StoreError> {
    let get_err = |e: sqlx::Error| map_sqlx_error("decode_issue", e);

    let id: uuid::Uuid = row.try_get("id").map_err(get_err)?;
    let owner: uuid::Uuid = row.try_get("owner_id").map_err(get_err)?;
    let status: String = row.try_get("status").map_err(get_err)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(get_err)?;
    let status = status
        .parse::<IssueStatus>()
        .map_err(|e| StoreError::corrupt(format!("issue {id}: {e}")))?;

    Ok(Issue {
        id: IssueId::from_uuid(id),
        title: row.try_get("title").map_err(get_err)?,
        description: row.try_get("description").map_err(get_err)?,
        region: row.try_get("region").map_err(get_err)?,
        gps_location: row.try_get("gps_location").map_err(get_err)?,
        category: row.try_get("category").map_err(get_err)?,
        flyer_url: row.try_get("flyer_url").map_err(get_err)?,
        owner: UserId::from_uuid(owner),
        status,
        created_at,
    })
}
