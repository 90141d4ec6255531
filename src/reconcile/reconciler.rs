//! Reconciler - the polling loop
//!
//! Each cycle:
//! 1. Polls the case source for cases bearing the search tag
//! 2. For each case, in order: resolves the label, creates an issue, then
//!    swaps the tag, sets the status and posts a comment with the issue URL
//! 3. Sleeps for the configured interval
//!
//! Failures are isolated per case. A case that fails before its tag swap
//! keeps the search tag and is retried from the top on the next poll, so
//! delivery is at-least-once: if the issue was created but the swap failed,
//! the retry creates a second issue.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, DEFAULT_SEARCH_TAG, DEFAULT_SUCCESS_TAG};
use crate::domain::{Case, CaseStatus, NewIssue, RepoRef};
use crate::gitea::IssueSink;
use crate::kibana::CaseSource;
use crate::reconcile::report::{CaseOutcome, CycleReport, FailureStage, RunStats};
use crate::severity::SeverityLabels;

/// Immutable settings for the reconciler
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub search_tag: String,
    pub success_tag: String,
    /// Sleep between cycles
    pub interval: Duration,
    /// Repository issues are created in
    pub repo: RepoRef,
    pub labels: SeverityLabels,
}

impl ReconcilerConfig {
    pub fn new(repo: RepoRef, labels: SeverityLabels) -> Self {
        Self {
            search_tag: DEFAULT_SEARCH_TAG.to_string(),
            success_tag: DEFAULT_SUCCESS_TAG.to_string(),
            interval: Duration::from_secs(60),
            repo,
            labels,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            search_tag: config.search_tag.clone(),
            success_tag: config.success_tag.clone(),
            interval: config.interval(),
            repo: config.gitea.repo_ref(),
            labels: SeverityLabels::new(config.severity_labels.clone()),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_tags(mut self, search_tag: impl Into<String>, success_tag: impl Into<String>) -> Self {
        self.search_tag = search_tag.into();
        self.success_tag = success_tag.into();
        self
    }
}

/// Maps tagged cases to issues, one case at a time
pub struct Reconciler<C, I>
where
    C: CaseSource,
    I: IssueSink,
{
    cases: Arc<C>,
    issues: Arc<I>,
    config: ReconcilerConfig,
}

impl<C, I> Reconciler<C, I>
where
    C: CaseSource,
    I: IssueSink,
{
    pub fn new(cases: Arc<C>, issues: Arc<I>, config: ReconcilerConfig) -> Self {
        Self { cases, issues, config }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Run cycles forever
    pub async fn run(&self) -> RunStats {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run cycles until `shutdown` completes.
    ///
    /// Shutdown is only observed during the inter-cycle sleep; a cycle in
    /// progress always runs to the end.
    pub async fn run_until<F>(&self, shutdown: F) -> RunStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stats = RunStats::new();

        log::info!(
            "Polling for cases tagged {:?} every {}s, issues go to {}",
            self.config.search_tag,
            self.config.interval.as_secs(),
            self.config.repo
        );

        loop {
            let report = self.run_cycle().await;
            stats.record(&report);
            log::info!("Cycle {} complete: {}", stats.cycles, report);

            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Shutdown requested, stopping after {} cycles", stats.cycles);
                    break;
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        stats
    }

    /// One polling cycle. Never fails; problems are logged and reported.
    pub async fn run_cycle(&self) -> CycleReport {
        let cases = match self.cases.find_tagged_cases(&self.config.search_tag).await {
            Ok(cases) => cases,
            Err(e) => {
                log::error!("Failed to poll cases tagged {:?}: {}", self.config.search_tag, e);
                return CycleReport::poll_failed(e.to_string());
            }
        };

        let mut report = CycleReport {
            found: cases.len(),
            ..Default::default()
        };
        if !cases.is_empty() {
            log::info!("Found {} case(s) tagged {:?}", cases.len(), self.config.search_tag);
        }

        for case in &cases {
            let outcome = self.process_case(case).await;
            report.outcomes.push(outcome);
        }

        report
    }

    /// Take one case from PENDING to PROCESSED, or report where it stopped
    pub async fn process_case(&self, case: &Case) -> CaseOutcome {
        let label = match self.config.labels.label_for(case.severity) {
            Ok(label) => label,
            Err(e) => {
                log::error!("Skipping case {} ({}): {}", case.id, case.title, e);
                return CaseOutcome::Skipped {
                    case_id: case.id.clone(),
                    reason: e.to_string(),
                };
            }
        };

        let new_issue = self.build_issue(case, label);
        let issue = match self.issues.create_issue(&self.config.repo, &new_issue).await {
            Ok(issue) => issue,
            Err(e) => {
                log::error!("Case {}: failed to create issue in {}: {}", case.id, self.config.repo, e);
                return CaseOutcome::Failed {
                    case_id: case.id.clone(),
                    stage: FailureStage::CreateIssue,
                    error: e.to_string(),
                    issue_url: None,
                };
            }
        };
        log::info!("Case {}: created issue #{} {}", case.id, issue.number, issue.url);

        if let Err(e) = self
            .cases
            .update_case_tags(&case.id, &self.config.search_tag, &self.config.success_tag)
            .await
        {
            log::error!(
                "Case {}: issue {} created but tag update failed: {}; case stays tagged {:?} and the next cycle will create another issue",
                case.id,
                issue.url,
                e,
                self.config.search_tag
            );
            return CaseOutcome::Failed {
                case_id: case.id.clone(),
                stage: FailureStage::SwapTags,
                error: e.to_string(),
                issue_url: Some(issue.url),
            };
        }

        // Tags are swapped, so the case will not be polled again. Status and
        // comment are each attempted so the issue URL gets recorded if possible.
        let mut first_failure: Option<(FailureStage, String)> = None;

        if let Err(e) = self.cases.set_status(&case.id, CaseStatus::InProgress).await {
            log::error!("Case {}: failed to set status {}: {}", case.id, CaseStatus::InProgress, e);
            first_failure = Some((FailureStage::SetStatus, e.to_string()));
        }

        let comment = format!("Gitea issue created: {}", issue.url);
        if let Err(e) = self.cases.add_comment(&case.id, &comment).await {
            log::error!("Case {}: failed to add comment for {}: {}", case.id, issue.url, e);
            first_failure.get_or_insert((FailureStage::AddComment, e.to_string()));
        }

        match first_failure {
            Some((stage, error)) => CaseOutcome::Failed {
                case_id: case.id.clone(),
                stage,
                error,
                issue_url: Some(issue.url),
            },
            None => {
                log::info!("Case {}: processed into {}", case.id, issue.url);
                CaseOutcome::Processed {
                    case_id: case.id.clone(),
                    issue_url: issue.url,
                }
            }
        }
    }

    fn build_issue(&self, case: &Case, label: u64) -> NewIssue {
        let case_url = self.cases.case_url(&case.id);
        let mut body = String::new();
        let description = case.description.trim();
        if !description.is_empty() {
            body.push_str(description);
            body.push_str("\n\n---\n\n");
        }
        body.push_str(&format!("**Severity:** {}\n", case.severity));
        body.push_str(&format!("**Kibana case:** {}\n", case_url));

        NewIssue {
            title: case.title.clone(),
            body,
            labels: vec![label],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;
    use crate::gitea::MockIssueSink;
    use crate::kibana::{CaseOp, MockCaseSource};

    fn labels() -> SeverityLabels {
        [
            (Severity::Low, 9),
            (Severity::Medium, 10),
            (Severity::High, 11),
            (Severity::Critical, 12),
        ]
        .into_iter()
        .collect()
    }

    fn reconciler(cases: Vec<Case>) -> (Reconciler<MockCaseSource, MockIssueSink>, Arc<MockCaseSource>, Arc<MockIssueSink>) {
        let source = Arc::new(MockCaseSource::new(cases));
        let sink = Arc::new(MockIssueSink::new());
        let config = ReconcilerConfig::new(RepoRef::new("security", "incidents"), labels())
            .with_interval(Duration::from_millis(10));
        (Reconciler::new(source.clone(), sink.clone(), config), source, sink)
    }

    #[test]
    fn test_config_from_config() {
        let mut config = Config::default();
        config.gitea.owner = "sec".to_string();
        config.gitea.repo = "inc".to_string();
        config.search_interval = 5;
        config.severity_labels.insert(Severity::High, 11);

        let rc = ReconcilerConfig::from_config(&config);
        assert_eq!(rc.repo.to_string(), "sec/inc");
        assert_eq!(rc.interval, Duration::from_secs(5));
        assert_eq!(rc.labels.label_for(Severity::High).unwrap(), 11);
        assert_eq!(rc.search_tag, "search");
        assert_eq!(rc.success_tag, "Gitea ✓");
    }

    #[tokio::test]
    async fn test_build_issue_includes_description_and_link() {
        let case = Case::new("C1", Severity::High)
            .with_title("Suspicious login")
            .with_description("Impossible travel detected");
        let (r, _, _) = reconciler(vec![]);
        let issue = r.build_issue(&case, 11);
        assert_eq!(issue.title, "Suspicious login");
        assert_eq!(issue.labels, vec![11]);
        assert!(issue.body.starts_with("Impossible travel detected"));
        assert!(issue.body.contains("**Severity:** high"));
        assert!(issue.body.contains("http://kibana.test/app/security/cases/C1"));
    }

    #[tokio::test]
    async fn test_build_issue_without_description() {
        let case = Case::new("C1", Severity::Low);
        let (r, _, _) = reconciler(vec![]);
        let issue = r.build_issue(&case, 9);
        assert!(issue.body.starts_with("**Severity:** low"));
    }

    #[tokio::test]
    async fn test_process_case_happy_path() {
        let case = Case::new("C1", Severity::High).with_tags(["search"]);
        let (r, source, sink) = reconciler(vec![case.clone()]);

        let outcome = r.process_case(&case).await;
        assert!(outcome.is_processed());
        assert_eq!(sink.created().len(), 1);
        assert_eq!(
            source.calls(),
            vec![CaseOp::SwapTags, CaseOp::SetStatus, CaseOp::AddComment]
        );
    }

    #[tokio::test]
    async fn test_unmapped_severity_skips_without_side_effects() {
        let case = Case::new("C1", Severity::Critical).with_tags(["search"]);
        let source = Arc::new(MockCaseSource::new(vec![case.clone()]));
        let sink = Arc::new(MockIssueSink::new());
        let only_low: SeverityLabels = [(Severity::Low, 9)].into_iter().collect();
        let r = Reconciler::new(
            source.clone(),
            sink.clone(),
            ReconcilerConfig::new(RepoRef::new("o", "r"), only_low),
        );

        let report = r.run_cycle().await;
        assert_eq!(report.skipped(), 1);
        assert_eq!(sink.attempts(), 0);
        assert_eq!(source.case("C1").unwrap().tags, vec!["search"]);
        assert!(source.comments_for("C1").is_empty());
    }

    #[tokio::test]
    async fn test_poll_failure_reported() {
        let (r, source, sink) = reconciler(vec![Case::new("C1", Severity::Low).with_tags(["search"])]);
        source.fail_next_any(CaseOp::Find);

        let report = r.run_cycle().await;
        assert!(report.poll_error.is_some());
        assert_eq!(sink.attempts(), 0);

        let report = r.run_cycle().await;
        assert_eq!(report.processed(), 1);
    }

    #[tokio::test]
    async fn test_status_failure_still_comments() {
        let case = Case::new("C1", Severity::Medium).with_tags(["search"]);
        let (r, source, _) = reconciler(vec![case.clone()]);
        source.fail_next(CaseOp::SetStatus, "C1");

        let outcome = r.process_case(&case).await;
        match outcome {
            CaseOutcome::Failed { stage, issue_url, .. } => {
                assert_eq!(stage, FailureStage::SetStatus);
                assert!(issue_url.is_some());
            }
            other => panic!("Expected failure, got {:?}", other),
        }
        let stored = source.case("C1").unwrap();
        assert_eq!(stored.tags, vec!["Gitea ✓"]);
        assert_eq!(stored.status, CaseStatus::Open);
        assert_eq!(source.comments_for("C1").len(), 1);
    }

    #[tokio::test]
    async fn test_case_deleted_before_update() {
        let case = Case::new("C1", Severity::High).with_tags(["search"]);
        let (r, source, sink) = reconciler(vec![]);

        let outcome = r.process_case(&case).await;
        assert_eq!(sink.created().len(), 1);
        match outcome {
            CaseOutcome::Failed { stage, error, .. } => {
                assert_eq!(stage, FailureStage::SwapTags);
                assert!(error.contains("not found"));
            }
            other => panic!("Expected failure, got {:?}", other),
        }
        assert!(source.case("C1").is_none());
    }

    #[tokio::test]
    async fn test_run_until_immediate_shutdown_runs_one_cycle() {
        let (r, source, sink) = reconciler(vec![Case::new("C1", Severity::High).with_tags(["search"])]);

        let stats = r.run_until(async {}).await;
        assert_eq!(stats.cycles, 1);
        assert_eq!(stats.processed, 1);
        assert_eq!(sink.created().len(), 1);
        assert_eq!(source.case("C1").unwrap().status, CaseStatus::InProgress);
    }

    #[tokio::test]
    async fn test_run_until_repeats_without_duplicates() {
        let (r, _, sink) = reconciler(vec![Case::new("C1", Severity::High).with_tags(["search"])]);

        let stats = r.run_until(tokio::time::sleep(Duration::from_millis(50))).await;
        assert!(stats.cycles >= 2);
        assert_eq!(stats.processed, 1);
        assert_eq!(sink.created().len(), 1);
    }
}
