//! Reconciliation - maps tagged cases to issues on a fixed interval
//!
//! The reconciler is a single sequential task: one case finishes before the
//! next starts, one cycle finishes before the next starts.

pub mod reconciler;
pub mod report;

pub use reconciler::{Reconciler, ReconcilerConfig};
pub use report::{CaseOutcome, CycleReport, FailureStage, RunStats};
