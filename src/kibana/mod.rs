//! Case source - Kibana Security Cases
//!
//! This module provides:
//! - CaseSource trait for the reconciler
//! - KibanaClient, the live reqwest implementation
//! - MockCaseSource, an in-memory implementation with failure injection

pub mod client;
pub mod mock;
pub mod models;

use async_trait::async_trait;

use crate::domain::{Case, CaseStatus};
use crate::error::Result;

pub use client::KibanaClient;
pub use mock::{CaseOp, MockCaseSource};

/// Read/write access to the case source.
///
/// No caching: every call hits the source of truth.
#[async_trait]
pub trait CaseSource: Send + Sync {
    /// Cases currently bearing `tag`, in the order the source returns them
    async fn find_tagged_cases(&self, tag: &str) -> Result<Vec<Case>>;

    /// Replace `remove_tag` with `add_tag` in a single update.
    ///
    /// Returns `NotFound` if the case no longer exists.
    async fn update_case_tags(&self, case_id: &str, remove_tag: &str, add_tag: &str) -> Result<Case>;

    async fn set_status(&self, case_id: &str, status: CaseStatus) -> Result<Case>;

    async fn add_comment(&self, case_id: &str, text: &str) -> Result<()>;

    /// Browser link back to the case, embedded in issue bodies
    fn case_url(&self, case_id: &str) -> String;
}
