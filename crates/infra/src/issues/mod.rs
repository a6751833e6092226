//! Issue storage and search.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryIssueStore;
pub use postgres::PostgresIssueStore;

use fixit_core::{Issue, IssueId, IssueStatus, StoreError, UserId};

/// Search criteria for the public listing.
///
/// Non-empty text terms are ORed together, each a case-insensitive
/// substring match on its own field. `status` is an exact match ANDed with
/// the text clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub region: Option<String>,
    pub category: Option<String>,
    pub status: Option<IssueStatus>,
}

impl IssueFilter {
    /// Non-blank text terms as `(field, needle)` pairs.
    pub fn text_terms(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", &self.title),
            ("description", &self.description),
            ("region", &self.region),
            ("category", &self.category),
        ]
        .into_iter()
        .filter_map(|(field, term)| {
            term.as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| (field, t))
        })
        .collect()
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        if self.status.is_some_and(|s| s != issue.status) {
            return false;
        }

        let terms = self.text_terms();
        terms.is_empty()
            || terms.iter().any(|(field, needle)| {
                let haystack = match *field {
                    "title" => &issue.title,
                    "description" => &issue.description,
                    "region" => &issue.region,
                    _ => &issue.category,
                };
                haystack.to_lowercase().contains(&needle.to_lowercase())
            })
    }
}

/// Offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub skip: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    /// Clamp caller-provided values into range.
    pub fn new(limit: Option<u32>, skip: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
            skip: skip.unwrap_or(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[async_trait::async_trait]
pub trait IssueStore: Send + Sync {
    /// Persist a new issue. A duplicate `(owner, title)` is a
    /// `StoreError::Conflict`.
    async fn insert(&self, issue: Issue) -> Result<(), StoreError>;

    async fn get(&self, id: IssueId) -> Result<Option<Issue>, StoreError>;

    /// Filtered listing, oldest first.
    async fn search(&self, filter: &IssueFilter, page: Page) -> Result<Vec<Issue>, StoreError>;

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Issue>, StoreError>;

    async fn exists_for_owner(&self, owner: UserId, title: &str) -> Result<bool, StoreError>;

    /// Set the status. Returns `Ok(false)` when the issue does not exist.
    async fn update_status(&self, id: IssueId, status: IssueStatus) -> Result<bool, StoreError>;
}
