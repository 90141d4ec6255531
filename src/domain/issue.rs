//! Issue types for the issue sink

use serde::{Deserialize, Serialize};
use std::fmt;

/// An issue created in the issue sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    /// Sequential number within the repository
    pub number: u64,
    /// Browser URL of the issue, written back to the case
    pub url: String,
    pub title: String,
    pub body: String,
    pub labels: Vec<u64>,
}

/// Request payload for creating an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<u64>,
}

/// Target repository (`owner/name`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
