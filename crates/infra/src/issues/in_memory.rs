use std::sync::RwLock;

use fixit_core::{Issue, IssueId, IssueStatus, StoreError, UserId};

use super::{IssueFilter, IssueStore, Page};

/// In-memory issue store for tests/dev. Insertion order is creation order.
#[derive(Debug, Default)]
pub struct InMemoryIssueStore {
    issues: RwLock<Vec<Issue>>,
}

impl InMemoryIssueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::unavailable("issue store lock poisoned")
}

#[async_trait::async_trait]
impl IssueStore for InMemoryIssueStore {
    async fn insert(&self, issue: Issue) -> Result<(), StoreError> {
        let mut issues = self.issues.write().map_err(|_| poisoned())?;
        if issues
            .iter()
            .any(|i| i.owner == issue.owner && i.title == issue.title)
        {
            return Err(StoreError::Conflict(format!(
                "issue '{}' already exists for owner {}",
                issue.title, issue.owner
            )));
        }
        issues.push(issue);
        Ok(())
    }

    async fn get(&self, id: IssueId) -> Result<Option<Issue>, StoreError> {
        let issues = self.issues.read().map_err(|_| poisoned())?;
        Ok(issues.iter().find(|i| i.id == id).cloned())
    }

    async fn search(&self, filter: &IssueFilter, page: Page) -> Result<Vec<Issue>, StoreError> {
        let issues = self.issues.read().map_err(|_| poisoned())?;
        Ok(issues
            .iter()
            .filter(|i| filter.matches(i))
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Issue>, StoreError> {
        let issues = self.issues.read().map_err(|_| poisoned())?;
        Ok(issues.iter().filter(|i| i.owner == owner).cloned().collect())
    }

    async fn exists_for_owner(&self, owner: UserId, title: &str) -> Result<bool, StoreError> {
        let issues = self.issues.read().map_err(|_| poisoned())?;
        Ok(issues.iter().any(|i| i.owner == owner && i.title == title))
    }

    async fn update_status(&self, id: IssueId, status: IssueStatus) -> Result<bool, StoreError> {
        let mut issues = self.issues.write().map_err(|_| poisoned())?;
        match issues.iter_mut().find(|i| i.id == id) {
            Some(issue) => {
                issue.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn issue(owner: UserId, title: &str) -> Issue {
        Issue {
            id: IssueId::new(),
            title: title.to_string(),
            description: "Water main burst".to_string(),
            region: "Cape Coast".to_string(),
            gps_location: "5.1053,-1.2466".to_string(),
            category: "water".to_string(),
            flyer_url: "memory://flyer".to_string(),
            owner,
            status: IssueStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_title_is_per_owner() {
        let store = InMemoryIssueStore::new();
        let (a, b) = (UserId::new(), UserId::new());

        store.insert(issue(a, "Burst pipe")).await.unwrap();
        store.insert(issue(b, "Burst pipe")).await.unwrap();
        let err = store.insert(issue(a, "Burst pipe")).await.unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(store.exists_for_owner(a, "Burst pipe").await.unwrap());
        assert!(!store.exists_for_owner(a, "Other").await.unwrap());
    }

    #[tokio::test]
    async fn search_pages_in_insertion_order() {
        let store = InMemoryIssueStore::new();
        let owner = UserId::new();
        for n in 0..5 {
            store.insert(issue(owner, &format!("Issue {n}"))).await.unwrap();
        }

        let page = store
            .search(&IssueFilter::default(), Page::new(Some(2), Some(1)))
            .await
            .unwrap();
        let titles: Vec<_> = page.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Issue 1", "Issue 2"]);
    }

    #[tokio::test]
    async fn status_updates_and_owner_listing() {
        let store = InMemoryIssueStore::new();
        let owner = UserId::new();
        let mine = issue(owner, "Blocked drain");
        store.insert(mine.clone()).await.unwrap();
        store.insert(issue(UserId::new(), "Someone else's")).await.unwrap();

        assert!(store.update_status(mine.id, IssueStatus::InProgress).await.unwrap());
        assert!(!store.update_status(IssueId::new(), IssueStatus::Completed).await.unwrap());

        let listed = store.list_by_owner(owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, IssueStatus::InProgress);
    }
}
