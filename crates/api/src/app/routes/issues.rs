use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{FormRejection, QueryRejection},
        Extension, Multipart, Path, Query,
    },
    http::StatusCode,
    Form, Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use fixit_core::{IssueId, NewIssue, StoreError};
use fixit_infra::MediaUpload;

use crate::app::dto::{parse_status, ListIssuesQuery, UpdateStatusForm};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

pub async fn list_issues(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListIssuesQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let (filter, page) = query.into_parts()?;
    let issues = services.issues.search(&filter, page).await?;
    Ok(Json(json!({ "data": issues })))
}

pub async fn get_issue(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_issue_id(&id)?;
    let issue = services
        .issues
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Issue not found"))?;
    Ok(Json(json!({ "data": issue })))
}

pub async fn my_issues(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    let issues = services.issues.list_by_owner(user.id()).await?;
    if issues.is_empty() {
        return Err(ApiError::not_found("You have not reported any issues yet."));
    }
    Ok(Json(json!({ "data": issues })))
}

pub async fn create_issue(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let report = IssueReport::read(multipart?).await?;
    let new_issue = report.fields.validate()?;

    if services
        .issues
        .exists_for_owner(user.id(), &new_issue.title)
        .await?
    {
        return Err(duplicate_title(&new_issue.title));
    }

    let flyer_url = services.media.upload(report.flyer).await?;
    let issue = new_issue.into_issue(user.id(), flyer_url.clone(), Utc::now());
    let id = issue.id;
    let title = issue.title.clone();

    if let Err(err) = services.issues.insert(issue).await {
        discard_flyer(&services, &flyer_url).await;
        return Err(match err {
            StoreError::Conflict(_) => duplicate_title(&title),
            other => other.into(),
        });
    }

    tracing::info!(issue_id = %id, owner = %user.id(), "issue reported");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Issue reported successfully",
            "id": id.to_string(),
        })),
    ))
}

pub async fn update_issue_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    form: Result<Form<UpdateStatusForm>, FormRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_issue_id(&id)?;
    let Form(form) = form?;
    let status = parse_status(&form.status_value)?;

    let mut issue = services
        .issues
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Issue not found"))?;

    if issue.status == status {
        return Err(ApiError::bad_request("No changes made to the issue"));
    }

    if !services.issues.update_status(id, status).await? {
        return Err(ApiError::not_found("Issue not found"));
    }
    issue.status = status;

    tracing::info!(issue_id = %id, status = status.as_str(), by = %user.id(), "issue status updated");

    Ok(Json(json!({
        "message": format!("Issue updated successfully: status set to '{}'", status.as_str()),
        "updated_data": issue,
    })))
}

fn parse_issue_id(raw: &str) -> Result<IssueId, ApiError> {
    raw.parse::<IssueId>()
        .map_err(|_| ApiError::InvalidId("Invalid issue ID".to_string()))
}

/// Remove a flyer whose issue was never persisted.
async fn discard_flyer(services: &AppServices, url: &str) {
    if let Err(e) = services.media.delete(url).await {
        tracing::warn!(url, error = %e, "failed to remove orphaned flyer");
    }
}

fn duplicate_title(title: &str) -> ApiError {
    ApiError::conflict(format!("Issue with title '{title}' already exists for this user."))
}

/// Multipart issue report: five text fields plus the `flyer` file.
struct IssueReport {
    fields: NewIssue,
    flyer: MediaUpload,
}

impl IssueReport {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut fields = NewIssue {
            title: String::new(),
            description: String::new(),
            region: String::new(),
            gps_location: String::new(),
            category: String::new(),
        };
        let mut flyer = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let slot = match name.as_str() {
                "title" => &mut fields.title,
                "description" => &mut fields.description,
                "region" => &mut fields.region,
                "gps_location" => &mut fields.gps_location,
                "category" => &mut fields.category,
                "flyer" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(e.body_text()))?;
                    flyer = Some(MediaUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                    continue;
                }
                _ => continue,
            };
            *slot = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
        }

        let flyer = flyer
            .filter(|f| !f.bytes.is_empty())
            .ok_or_else(|| ApiError::validation("flyer is required"))?;

        Ok(Self { fields, flyer })
    }
}
