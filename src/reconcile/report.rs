//! Per-cycle outcomes and cumulative run statistics

use std::fmt;

/// Step at which processing of a case failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    CreateIssue,
    SwapTags,
    SetStatus,
    AddComment,
}

impl FailureStage {
    /// True if the case still bears the search tag after failing here.
    ///
    /// Such a case is picked up again on the next poll; when the issue was
    /// already created this yields a duplicate (at-least-once delivery).
    pub fn leaves_case_pending(&self) -> bool {
        matches!(self, FailureStage::CreateIssue | FailureStage::SwapTags)
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureStage::CreateIssue => "create issue",
            FailureStage::SwapTags => "swap tags",
            FailureStage::SetStatus => "set status",
            FailureStage::AddComment => "add comment",
        };
        f.write_str(s)
    }
}

/// What happened to one case during a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    /// Issue created and case fully updated
    Processed { case_id: String, issue_url: String },
    /// Not attempted (e.g. unmapped severity); case left untouched
    Skipped { case_id: String, reason: String },
    /// Attempted and failed at `stage`
    Failed {
        case_id: String,
        stage: FailureStage,
        error: String,
        /// Set when the issue was created before the failure
        issue_url: Option<String>,
    },
}

impl CaseOutcome {
    pub fn case_id(&self) -> &str {
        match self {
            CaseOutcome::Processed { case_id, .. }
            | CaseOutcome::Skipped { case_id, .. }
            | CaseOutcome::Failed { case_id, .. } => case_id,
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, CaseOutcome::Processed { .. })
    }
}

/// Result of one polling cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Cases returned by the poll
    pub found: usize,
    pub outcomes: Vec<CaseOutcome>,
    /// Set when the poll itself failed and no case was looked at
    pub poll_error: Option<String>,
}

impl CycleReport {
    pub fn poll_failed(error: impl Into<String>) -> Self {
        Self {
            poll_error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn processed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_processed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CaseOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CaseOutcome::Failed { .. }))
            .count()
    }

    pub fn outcome_for(&self, case_id: &str) -> Option<&CaseOutcome> {
        self.outcomes.iter().find(|o| o.case_id() == case_id)
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(err) = &self.poll_error {
            return write!(f, "poll failed: {}", err);
        }
        write!(
            f,
            "found={} processed={} skipped={} failed={}",
            self.found,
            self.processed(),
            self.skipped(),
            self.failed()
        )
    }
}

/// Totals across cycles since startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub cycles: u64,
    pub poll_failures: u64,
    pub processed: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        if report.poll_error.is_some() {
            self.poll_failures += 1;
        }
        self.processed += report.processed() as u64;
        self.skipped += report.skipped() as u64;
        self.failed += report.failed() as u64;
    }
}
