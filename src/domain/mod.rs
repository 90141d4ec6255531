//! Domain types for casebridge
//!
//! - Case: incident record owned by the case source (severity, tags, status)
//! - Issue / NewIssue / RepoRef: work items in the issue sink

pub mod case;
pub mod issue;

pub use case::{Case, CaseStatus, Severity};
pub use issue::{Issue, NewIssue, RepoRef};
