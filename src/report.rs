use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ScanMode;
use crate::rules::{Finding, Severity};

/// The aggregated result of one completed scan.
///
/// Assembled atomically when a scan finishes and immutable afterwards.
/// Field names are the stable contract any sink persists — they match the
/// `lint_reports` columns downstream consumers read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub institution_id: String,
    /// Findings in rule-registration order.
    pub findings: Vec<Finding>,
    pub total_findings: usize,
    pub critical_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub mode: ScanMode,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Assemble a report from the findings of one completed scan. Counts
    /// are derived here and nowhere else, so they always reconcile with
    /// `findings`.
    pub(crate) fn assemble(
        institution_id: &str,
        mode: ScanMode,
        findings: Vec<Finding>,
        duration_ms: u64,
    ) -> Self {
        let mut critical_count = 0;
        let mut warning_count = 0;
        let mut info_count = 0;
        for finding in &findings {
            match finding.severity {
                Severity::Critical => critical_count += 1,
                Severity::Warning => warning_count += 1,
                Severity::Info => info_count += 1,
            }
        }

        Self {
            id: Uuid::new_v4().to_string(),
            institution_id: institution_id.to_string(),
            total_findings: findings.len(),
            findings,
            critical_count,
            warning_count,
            info_count,
            mode,
            duration_ms,
            created_at: Utc::now(),
        }
    }

    pub fn count_for(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical_count,
            Severity::Warning => self.warning_count,
            Severity::Info => self.info_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn finding(severity: Severity) -> Finding {
        Finding {
            rule_id: "missing-provenance".into(),
            severity,
            affected_nodes: vec!["a".into()],
            message: "test".into(),
            suggested_fix: "fix".into(),
        }
    }

    #[test]
    fn counts_reconcile_with_findings() {
        let report = Report::assemble(
            "inst-1",
            ScanMode::Full,
            vec![
                finding(Severity::Critical),
                finding(Severity::Info),
                finding(Severity::Info),
            ],
            12,
        );

        assert_eq!(report.total_findings, 3);
        assert_eq!(report.critical_count, 1);
        assert_eq!(report.warning_count, 0);
        assert_eq!(report.info_count, 2);
        assert_eq!(report.findings.len(), report.total_findings);
    }

    #[test]
    fn empty_scan_is_a_healthy_report() {
        let report = Report::assemble("inst-1", ScanMode::Delta, vec![], 3);
        assert_eq!(report.total_findings, 0);
        assert_eq!(
            report.critical_count + report.warning_count + report.info_count,
            0
        );
    }

    #[test]
    fn serializes_with_contract_field_names() {
        let report = Report::assemble("inst-1", ScanMode::Full, vec![finding(Severity::Info)], 5);
        let json = serde_json::to_value(&report).unwrap();
        for key in [
            "id",
            "institution_id",
            "findings",
            "total_findings",
            "critical_count",
            "warning_count",
            "info_count",
            "mode",
            "duration_ms",
            "created_at",
        ] {
            assert!(json.get(key).is_some(), "missing field {key}");
        }
        assert_eq!(json["mode"], "full");
    }

    proptest! {
        #[test]
        fn count_columns_always_sum_to_total(
            severities in proptest::collection::vec(
                prop_oneof![
                    Just(Severity::Info),
                    Just(Severity::Warning),
                    Just(Severity::Critical),
                ],
                0..64,
            )
        ) {
            let findings: Vec<Finding> = severities.iter().copied().map(finding).collect();
            let report = Report::assemble("inst-1", ScanMode::Full, findings, 0);

            prop_assert_eq!(report.total_findings, report.findings.len());
            prop_assert_eq!(
                report.critical_count + report.warning_count + report.info_count,
                report.total_findings
            );
            for severity in [Severity::Info, Severity::Warning, Severity::Critical] {
                let filtered = report
                    .findings
                    .iter()
                    .filter(|f| f.severity == severity)
                    .count();
                prop_assert_eq!(report.count_for(severity), filtered);
            }
        }
    }
}
