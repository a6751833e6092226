use std::collections::HashMap;
use std::sync::RwLock;

use fixit_auth::{IdentityStore, Role, UserRecord};
use fixit_core::{Email, StoreError, UserId};

use super::UserStore;

/// In-memory account store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove an account (account deletion is not exposed over HTTP).
    pub fn remove(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        Ok(users.remove(&id))
    }

    /// Change an account's role out of band.
    pub fn set_role(&self, id: UserId, role: Option<Role>) -> Result<bool, StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        Ok(users.get_mut(&id).map(|r| r.role = role).is_some())
    }
}

fn poisoned() -> StoreError {
    StoreError::unavailable("user store lock poisoned")
}

#[async_trait::async_trait]
impl IdentityStore for InMemoryUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, record: UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.values().any(|u| u.email == record.email) {
            return Err(StoreError::Conflict(format!(
                "email {} already registered",
                record.email
            )));
        }
        users.insert(record.id, record);
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(email: &str) -> UserRecord {
        UserRecord {
            id: UserId::new(),
            username: "kofi".to_string(),
            email: Email::parse(email).unwrap(),
            password_hash: "$argon2id$stub".to_string(),
            role: Some(Role::User),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn email_is_unique_case_insensitively() {
        let store = InMemoryUserStore::new();
        store.insert(record("kofi@example.com")).await.unwrap();

        let err = store.insert(record("KOFI@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn lookups_by_id_and_email() {
        let store = InMemoryUserStore::new();
        let rec = record("esi@example.com");
        store.insert(rec.clone()).await.unwrap();

        assert_eq!(store.find_by_id(rec.id).await.unwrap(), Some(rec.clone()));
        assert_eq!(store.find_by_email(&rec.email).await.unwrap(), Some(rec.clone()));
        assert_eq!(store.find_by_id(UserId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn removal_and_role_change_are_visible_to_readers() {
        let store = InMemoryUserStore::new();
        let rec = record("yaw@example.com");
        store.insert(rec.clone()).await.unwrap();

        assert!(store.set_role(rec.id, Some(Role::Authorities)).unwrap());
        let reloaded = store.find_by_id(rec.id).await.unwrap().unwrap();
        assert_eq!(reloaded.role, Some(Role::Authorities));

        store.remove(rec.id).unwrap();
        assert_eq!(store.find_by_id(rec.id).await.unwrap(), None);
    }
}
