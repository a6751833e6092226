//! Infrastructure layer: configuration, stores, media host.

pub mod config;
pub mod db;
pub mod issues;
pub mod media;
pub mod users;

pub use config::AppConfig;
pub use issues::{InMemoryIssueStore, IssueFilter, IssueStore, Page, PostgresIssueStore};
pub use media::{FsMediaStore, InMemoryMediaStore, MediaStore, MediaUpload};
pub use users::{InMemoryUserStore, PostgresUserStore, UserStore};
