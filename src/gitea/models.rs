//! Gitea API request and response models.

use serde::{Deserialize, Serialize};

use crate::domain::{Issue, NewIssue};

/// Body of `POST /api/v1/repos/{owner}/{repo}/issues`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIssueRequest {
    pub title: String,
    pub body: String,
    /// Label ids; the labels must already exist in the repository
    pub labels: Vec<u64>,
}

impl From<&NewIssue> for CreateIssueRequest {
    fn from(issue: &NewIssue) -> Self {
        Self {
            title: issue.title.clone(),
            body: issue.body.clone(),
            labels: issue.labels.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiteaLabel {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// An issue returned by the Gitea API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiteaIssue {
    pub id: u64,
    pub number: u64,
    pub html_url: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<GiteaLabel>,
}

impl From<GiteaIssue> for Issue {
    fn from(gi: GiteaIssue) -> Self {
        Issue {
            id: gi.id,
            number: gi.number,
            url: gi.html_url,
            title: gi.title,
            body: gi.body.unwrap_or_default(),
            labels: gi.labels.into_iter().map(|l| l.id).collect(),
        }
    }
}
