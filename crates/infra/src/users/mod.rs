//! Account storage.
//!
//! The guard chain only ever sees the read-only [`IdentityStore`] half of
//! this trait; registration and login use the rest.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;

use fixit_auth::{IdentityStore, UserRecord};
use fixit_core::{Email, StoreError};

#[async_trait::async_trait]
pub trait UserStore: IdentityStore {
    /// Persist a new account. A second account with the same email is a
    /// `StoreError::Conflict`.
    async fn insert(&self, record: UserRecord) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, StoreError>;
}
