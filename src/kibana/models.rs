//! Kibana Cases API request and response models.
//!
//! These map to the JSON payloads of `/api/cases`. They stay internal to the
//! kibana module; the rest of the crate sees only `domain::Case`.

use serde::{Deserialize, Serialize};

use crate::domain::{Case, CaseStatus, Severity};

/// A case as returned by the Cases API (unused fields are ignored)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KibanaCase {
    pub id: String,
    pub version: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: CaseStatus,
    #[serde(default)]
    pub owner: Option<String>,
}

impl KibanaCase {
    /// Cases without an owner field (older Kibana) are assumed to match
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner.as_deref().is_none_or(|o| o == owner)
    }
}

impl From<KibanaCase> for Case {
    fn from(kc: KibanaCase) -> Self {
        Case {
            id: kc.id,
            version: kc.version,
            title: kc.title,
            description: kc.description,
            severity: kc.severity,
            tags: kc.tags,
            status: kc.status,
        }
    }
}

/// Response of `GET /api/cases/_find`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindCasesResponse {
    #[serde(default)]
    pub cases: Vec<KibanaCase>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// One entry of a `PATCH /api/cases` request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CasePatch {
    pub id: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
}

/// Body of `PATCH /api/cases`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchCasesRequest {
    pub cases: Vec<CasePatch>,
}

/// Body of `POST /api/cases/{id}/comments`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCommentRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub comment: String,
    pub owner: String,
}

impl AddCommentRequest {
    pub fn user(comment: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            kind: "user".to_string(),
            comment: comment.into(),
            owner: owner.into(),
        }
    }
}
