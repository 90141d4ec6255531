//! Case record and related types
//!
//! A Case is a security incident record owned by the case source. The bridge
//! only ever reads cases and issues partial updates (tags, status, comments).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A case as seen by the reconciliation loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Case identifier assigned by the case source
    pub id: String,

    /// Optimistic-concurrency token; every PATCH must carry the latest one
    pub version: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub severity: Severity,

    /// Tags in server order. `search_tag` and `success_tag` live here.
    #[serde(default)]
    pub tags: Vec<String>,

    pub status: CaseStatus,
}

impl Case {
    /// Create an open case with no tags
    pub fn new(id: impl Into<String>, severity: Severity) -> Self {
        let id = id.into();
        Self {
            title: format!("Case {}", id),
            id,
            version: "1".to_string(),
            description: String::new(),
            severity,
            tags: Vec::new(),
            status: CaseStatus::Open,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if the case carries `tag` (exact match)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Compute the tag list after replacing `remove` with `add`.
    ///
    /// Order of the remaining tags is preserved and `add` is appended once,
    /// so a case that already carries `add` does not get it twice.
    pub fn tags_after_swap(&self, remove: &str, add: &str) -> Vec<String> {
        let mut tags: Vec<String> = self
            .tags
            .iter()
            .filter(|t| t.as_str() != remove)
            .cloned()
            .collect();
        if !tags.iter().any(|t| t == add) {
            tags.push(add.to_string());
        }
        tags
    }
}

/// Urgency level of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::Low, Severity::Medium, Severity::High, Severity::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow status of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseStatus {
    Open,
    InProgress,
    Closed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "open",
            CaseStatus::InProgress => "in-progress",
            CaseStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
