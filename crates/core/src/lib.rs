//! `fixit-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod email;
pub mod error;
pub mod id;
pub mod issue;

pub use email::Email;
pub use error::{DomainError, DomainResult, StoreError};
pub use id::{IssueId, UserId};
pub use issue::{Issue, IssueStatus, NewIssue};
