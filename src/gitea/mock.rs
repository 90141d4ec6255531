//! In-memory issue sink for tests

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Issue, NewIssue, RepoRef};
use crate::error::{BridgeError, Result};
use crate::gitea::IssueSink;

#[derive(Debug, Default)]
struct MockIssueState {
    created: Vec<(RepoRef, Issue)>,
    pending_failures: usize,
    attempts: usize,
}

/// IssueSink that records every created issue
#[derive(Debug, Default)]
pub struct MockIssueSink {
    state: Mutex<MockIssueState>,
}

impl MockIssueSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockIssueState> {
        self.state.lock().expect("mock issue state poisoned")
    }

    /// Fail the next `count` create calls
    pub fn fail_next(&self, count: usize) {
        self.lock().pending_failures += count;
    }

    pub fn created(&self) -> Vec<Issue> {
        self.lock().created.iter().map(|(_, issue)| issue.clone()).collect()
    }

    pub fn created_in(&self, repo: &RepoRef) -> Vec<Issue> {
        self.lock()
            .created
            .iter()
            .filter(|(r, _)| r == repo)
            .map(|(_, issue)| issue.clone())
            .collect()
    }

    /// Issues whose body links back to `case_url`
    pub fn created_for(&self, case_url: &str) -> Vec<Issue> {
        self.lock()
            .created
            .iter()
            .filter(|(_, issue)| issue.body.contains(case_url))
            .map(|(_, issue)| issue.clone())
            .collect()
    }

    /// Create calls including failed ones
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }
}

#[async_trait]
impl IssueSink for MockIssueSink {
    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue> {
        let mut state = self.lock();
        state.attempts += 1;
        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            return Err(BridgeError::Remote(format!("injected create failure in {}", repo)));
        }

        let number = state.created.len() as u64 + 1;
        let created = Issue {
            id: 1000 + number,
            number,
            url: format!("http://gitea.test/{}/{}/issues/{}", repo.owner, repo.name, number),
            title: issue.title.clone(),
            body: issue.body.clone(),
            labels: issue.labels.clone(),
        };
        state.created.push((repo.clone(), created.clone()));
        Ok(created)
    }
}
