//! In-memory case source for tests
//!
//! Holds cases and comments behind a mutex and lets tests inject one-shot
//! failures per operation.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Case, CaseStatus};
use crate::error::{BridgeError, Result};
use crate::kibana::CaseSource;

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOp {
    Find,
    SwapTags,
    SetStatus,
    AddComment,
}

#[derive(Debug)]
struct InjectedFailure {
    op: CaseOp,
    case_id: Option<String>,
}

#[derive(Debug, Default)]
struct MockCaseState {
    cases: Vec<Case>,
    comments: Vec<(String, String)>,
    failures: Vec<InjectedFailure>,
    calls: Vec<CaseOp>,
}

impl MockCaseState {
    /// Consume a matching injected failure, if any
    fn take_failure(&mut self, op: CaseOp, case_id: Option<&str>) -> Option<BridgeError> {
        let pos = self
            .failures
            .iter()
            .position(|f| f.op == op && (f.case_id.is_none() || f.case_id.as_deref() == case_id))?;
        self.failures.remove(pos);
        Some(BridgeError::Remote(format!(
            "injected {:?} failure for {}",
            op,
            case_id.unwrap_or("*")
        )))
    }

    fn case_mut(&mut self, case_id: &str) -> Result<&mut Case> {
        self.cases
            .iter_mut()
            .find(|c| c.id == case_id)
            .ok_or_else(|| BridgeError::NotFound(case_id.to_string()))
    }
}

/// CaseSource backed by a Vec
#[derive(Debug, Default)]
pub struct MockCaseSource {
    state: Mutex<MockCaseState>,
}

impl MockCaseSource {
    pub fn new(cases: Vec<Case>) -> Self {
        Self {
            state: Mutex::new(MockCaseState {
                cases,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockCaseState> {
        self.state.lock().expect("mock case state poisoned")
    }

    pub fn insert(&self, case: Case) {
        self.lock().cases.push(case);
    }

    /// Delete a case so later calls see NotFound
    pub fn remove(&self, case_id: &str) {
        self.lock().cases.retain(|c| c.id != case_id);
    }

    pub fn case(&self, case_id: &str) -> Option<Case> {
        self.lock().cases.iter().find(|c| c.id == case_id).cloned()
    }

    pub fn comments_for(&self, case_id: &str) -> Vec<String> {
        self.lock()
            .comments
            .iter()
            .filter(|(id, _)| id == case_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Every operation invoked so far, in order
    pub fn calls(&self) -> Vec<CaseOp> {
        self.lock().calls.clone()
    }

    /// Fail the next `op` on `case_id` once
    pub fn fail_next(&self, op: CaseOp, case_id: impl Into<String>) {
        self.lock().failures.push(InjectedFailure {
            op,
            case_id: Some(case_id.into()),
        });
    }

    /// Fail the next `op` on any case once
    pub fn fail_next_any(&self, op: CaseOp) {
        self.lock().failures.push(InjectedFailure { op, case_id: None });
    }
}

fn bump_version(case: &mut Case) {
    let next = case.version.parse::<u64>().map(|v| v + 1).unwrap_or(1);
    case.version = next.to_string();
}

#[async_trait]
impl CaseSource for MockCaseSource {
    async fn find_tagged_cases(&self, tag: &str) -> Result<Vec<Case>> {
        let mut state = self.lock();
        state.calls.push(CaseOp::Find);
        if let Some(err) = state.take_failure(CaseOp::Find, None) {
            return Err(err);
        }
        Ok(state.cases.iter().filter(|c| c.has_tag(tag)).cloned().collect())
    }

    async fn update_case_tags(&self, case_id: &str, remove_tag: &str, add_tag: &str) -> Result<Case> {
        let mut state = self.lock();
        state.calls.push(CaseOp::SwapTags);
        if let Some(err) = state.take_failure(CaseOp::SwapTags, Some(case_id)) {
            return Err(err);
        }
        let case = state.case_mut(case_id)?;
        case.tags = case.tags_after_swap(remove_tag, add_tag);
        bump_version(case);
        Ok(case.clone())
    }

    async fn set_status(&self, case_id: &str, status: CaseStatus) -> Result<Case> {
        let mut state = self.lock();
        state.calls.push(CaseOp::SetStatus);
        if let Some(err) = state.take_failure(CaseOp::SetStatus, Some(case_id)) {
            return Err(err);
        }
        let case = state.case_mut(case_id)?;
        case.status = status;
        bump_version(case);
        Ok(case.clone())
    }

    async fn add_comment(&self, case_id: &str, text: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(CaseOp::AddComment);
        if let Some(err) = state.take_failure(CaseOp::AddComment, Some(case_id)) {
            return Err(err);
        }
        state.case_mut(case_id)?;
        state.comments.push((case_id.to_string(), text.to_string()));
        Ok(())
    }

    fn case_url(&self, case_id: &str) -> String {
        format!("http://kibana.test/app/security/cases/{}", case_id)
    }
}
