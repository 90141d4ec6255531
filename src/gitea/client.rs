//! Gitea HTTP client
//!
//! Implements IssueSink against the Gitea v1 REST API.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::GiteaConfig;
use crate::domain::{Issue, NewIssue, RepoRef};
use crate::error::{BridgeError, Result};
use crate::gitea::IssueSink;
use crate::gitea::models::{CreateIssueRequest, GiteaIssue};

/// Gitea API client
#[derive(Clone)]
pub struct GiteaClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl GiteaClient {
    pub fn new(config: &GiteaConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| BridgeError::Configuration(format!("Failed to create Gitea HTTP client: {}", e)))?;

        if !config.verify_ssl {
            log::warn!("TLS certificate verification disabled for Gitea");
        }

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn issues_url(&self, repo: &RepoRef) -> String {
        format!("{}/api/v1/repos/{}/{}/issues", self.base_url, repo.owner, repo.name)
    }
}

#[async_trait]
impl IssueSink for GiteaClient {
    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue> {
        let url = self.issues_url(repo);
        log::debug!("POST issue to {} labels={:?}", repo, issue.labels);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("token {}", self.api_key))
            .json(&CreateIssueRequest::from(issue))
            .send()
            .await
            .map_err(|e| BridgeError::Remote(format!("Gitea create issue request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Remote(format!(
                "Gitea create issue in {} returned {}: {}",
                repo, status, body
            )));
        }

        let created: GiteaIssue = response
            .json()
            .await
            .map_err(|e| BridgeError::Remote(format!("Gitea create issue response parse failed: {}", e)))?;
        Ok(created.into())
    }
}

impl std::fmt::Debug for GiteaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiteaClient").field("base_url", &self.base_url).finish()
    }
}
