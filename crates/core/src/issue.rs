//! Reported issue model.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, IssueId, UserId};

/// Triage status of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    Pending,
    InProgress,
    Completed,
    Rejected,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 4] = [
        IssueStatus::Pending,
        IssueStatus::InProgress,
        IssueStatus::Completed,
        IssueStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::InProgress => "in-progress",
            IssueStatus::Completed => "completed",
            IssueStatus::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(IssueStatus::as_str).collect();
                DomainError::validation(format!(
                    "invalid status '{s}'. Allowed values: {}",
                    allowed.join(", ")
                ))
            })
    }
}

/// A citizen-reported issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    pub region: String,
    pub gps_location: String,
    pub category: String,
    pub flyer_url: String,
    pub owner: UserId,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
}

/// Validated input for reporting a new issue.
///
/// The flyer is uploaded separately; only its public URL is recorded here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub region: String,
    pub gps_location: String,
    pub category: String,
}

impl NewIssue {
    /// Trim every field and reject blanks.
    pub fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: required("title", self.title)?,
            description: required("description", self.description)?,
            region: required("region", self.region)?,
            gps_location: required("gps_location", self.gps_location)?,
            category: required("category", self.category)?,
        })
    }

    /// Materialize the issue once the flyer has been stored.
    pub fn into_issue(self, owner: UserId, flyer_url: String, now: DateTime<Utc>) -> Issue {
        Issue {
            id: IssueId::new(),
            title: self.title,
            description: self.description,
            region: self.region,
            gps_location: self.gps_location,
            category: self.category,
            flyer_url,
            owner,
            status: IssueStatus::Pending,
            created_at: now,
        }
    }
}

fn required(field: &str, value: String) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}
