//! Request DTOs and their conversion into domain inputs.

use serde::Deserialize;

use fixit_auth::Role;
use fixit_core::{Email, IssueStatus};
use fixit_infra::{IssueFilter, Page};

use crate::app::errors::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl RegisterForm {
    /// Username, normalized email and requested role. A blank role falls
    /// back to the default.
    pub fn validate(&self) -> Result<(String, Email, Role), ApiError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(ApiError::validation("username cannot be empty"));
        }

        let email = Email::parse(&self.email)?;

        let role = match self.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            None => Role::DEFAULT,
            Some(raw) => raw.parse::<Role>().map_err(|e| ApiError::validation(e.to_string()))?,
        };

        Ok((username.to_string(), email, role))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListIssuesQuery {
    pub title: Option<String>,
    pub description: Option<String>,
    pub region: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

impl ListIssuesQuery {
    pub fn into_parts(self) -> Result<(IssueFilter, Page), ApiError> {
        let status = match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => Some(parse_status(raw)?),
        };

        let filter = IssueFilter {
            title: self.title,
            description: self.description,
            region: self.region,
            category: self.category,
            status,
        };

        Ok((filter, Page::new(self.limit, self.skip)))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusForm {
    pub status_value: String,
}

/// Parse a status, rejecting unknown values with the allowed list.
pub fn parse_status(raw: &str) -> Result<IssueStatus, ApiError> {
    raw.trim().parse::<IssueStatus>().map_err(|_| {
        let allowed = IssueStatus::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        ApiError::bad_request(format!("Invalid status. Allowed values: {allowed}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(role: Option<&str>) -> RegisterForm {
        RegisterForm {
            username: " ama ".to_string(),
            email: "Ama@Example.com".to_string(),
            password: "correct horse".to_string(),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn register_defaults_blank_role_to_user() {
        let (name, email, role) = register(Some("  ")).validate().unwrap();
        assert_eq!(name, "ama");
        assert_eq!(email.as_str(), "ama@example.com");
        assert_eq!(role, Role::User);
    }

    #[test]
    fn register_rejects_unknown_role() {
        assert!(matches!(
            register(Some("admin")).validate(),
            Err(ApiError::Validation(_))
        ));
        let (_, _, role) = register(Some("authorities")).validate().unwrap();
        assert_eq!(role, Role::Authorities);
    }

    #[test]
    fn blank_status_means_no_filter() {
        let query = ListIssuesQuery {
            status: Some(String::new()),
            ..Default::default()
        };
        let (filter, page) = query.into_parts().unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(page, Page::default());
    }

    #[test]
    fn unknown_status_lists_allowed_values() {
        match parse_status("done") {
            Err(ApiError::BadRequest(msg)) => {
                assert_eq!(msg, "Invalid status. Allowed values: pending, in-progress, completed, rejected")
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(parse_status(" completed ").unwrap(), IssueStatus::Completed);
    }
}
