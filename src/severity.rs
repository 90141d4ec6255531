//! Severity to issue-label lookup.
//!
//! Labels must already exist in the issue sink; they are never created here.
//! An unmapped severity is an error, never a silent default.

use std::collections::BTreeMap;

use crate::domain::Severity;
use crate::error::{BridgeError, Result};

/// Immutable severity -> label id table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityLabels {
    labels: BTreeMap<Severity, u64>,
}

impl SeverityLabels {
    pub fn new(labels: BTreeMap<Severity, u64>) -> Self {
        Self { labels }
    }

    /// Label id for `severity`, or `Configuration` if unmapped
    pub fn label_for(&self, severity: Severity) -> Result<u64> {
        self.labels.get(&severity).copied().ok_or_else(|| {
            BridgeError::Configuration(format!("no label configured for severity '{}'", severity))
        })
    }

    /// Severities with no configured label
    pub fn unmapped(&self) -> Vec<Severity> {
        Severity::ALL
            .iter()
            .copied()
            .filter(|s| !self.labels.contains_key(s))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Severity, u64)> + '_ {
        self.labels.iter().map(|(s, id)| (*s, *id))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<(Severity, u64)> for SeverityLabels {
    fn from_iter<T: IntoIterator<Item = (Severity, u64)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SeverityLabels {
        [
            (Severity::Low, 9),
            (Severity::Medium, 10),
            (Severity::High, 11),
            (Severity::Critical, 12),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_label_for_mapped() {
        let labels = table();
        assert_eq!(labels.label_for(Severity::Low).unwrap(), 9);
        assert_eq!(labels.label_for(Severity::High).unwrap(), 11);
        assert_eq!(labels.label_for(Severity::Critical).unwrap(), 12);
    }

    #[test]
    fn test_total_over_configured_table() {
        let labels = table();
        for severity in Severity::ALL {
            assert!(labels.label_for(severity).is_ok());
        }
        assert!(labels.unmapped().is_empty());
    }

    #[test]
    fn test_unmapped_fails_closed() {
        let labels: SeverityLabels = [(Severity::Low, 9)].into_iter().collect();
        let err = labels.label_for(Severity::Critical).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("critical"));
        assert_eq!(
            labels.unmapped(),
            vec![Severity::Medium, Severity::High, Severity::Critical]
        );
    }

    #[test]
    fn test_empty_table() {
        let labels = SeverityLabels::default();
        assert!(labels.is_empty());
        assert_eq!(labels.len(), 0);
        assert!(labels.label_for(Severity::Medium).is_err());
    }

    #[test]
    fn test_iter_is_ordered_by_severity() {
        let labels = table();
        let order: Vec<Severity> = labels.iter().map(|(s, _)| s).collect();
        assert_eq!(order, Severity::ALL.to_vec());
    }
}
