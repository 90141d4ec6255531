//! Issue sink - Gitea
//!
//! This module provides:
//! - IssueSink trait for the reconciler
//! - GiteaClient, the live reqwest implementation
//! - MockIssueSink, an in-memory implementation with failure injection

pub mod client;
pub mod mock;
pub mod models;

use async_trait::async_trait;

use crate::domain::{Issue, NewIssue, RepoRef};
use crate::error::Result;

pub use client::GiteaClient;
pub use mock::MockIssueSink;

/// Write access to the issue tracker.
///
/// Implementations must not retry on their own; a failed create is reported
/// and the next polling cycle decides what happens.
#[async_trait]
pub trait IssueSink: Send + Sync {
    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue>;
}
