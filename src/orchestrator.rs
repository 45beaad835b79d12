//! Scan orchestration: resolve the enabled rule set, fan out, aggregate.
//!
//! One scan is one logical task that fans out to N independent rule
//! executions and fans back in. Rules share only the read-only context, so
//! they run on scoped threads with no coordination beyond the join.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::config::ConfigStore;
use crate::context::{CancelToken, ScanContext, ScanMode};
use crate::error::{KaizenError, Result};
use crate::registry::RuleRegistry;
use crate::report::Report;
use crate::rules::{Finding, Rule};
use crate::store::GraphStore;

/// Runs scans against a fixed rule registry.
///
/// Each [`run_scan`](Self::run_scan) call is an independent execution that
/// moves idle -> running -> completed (or failed). The engine holds no
/// per-scan state; per-rule failures are absorbed, orchestration failures
/// (config read, unknown rule id) fail the scan with no report.
pub struct ScanEngine {
    registry: Arc<RuleRegistry>,
}

impl ScanEngine {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Run one scan for a tenant and return the completed report.
    pub fn run_scan(
        &self,
        store: Arc<dyn GraphStore>,
        configs: &dyn ConfigStore,
        institution_id: &str,
        mode: ScanMode,
        since: Option<DateTime<Utc>>,
    ) -> Result<Report> {
        self.run_scan_cancellable(store, configs, institution_id, mode, since, CancelToken::new())
    }

    /// Like [`run_scan`](Self::run_scan), but cooperatively cancellable.
    ///
    /// When `cancel` trips, in-flight rules wind down at their next poll and
    /// the scan returns [`KaizenError::Cancelled`] — a cancelled scan never
    /// emits a partial report.
    pub fn run_scan_cancellable(
        &self,
        store: Arc<dyn GraphStore>,
        configs: &dyn ConfigStore,
        institution_id: &str,
        mode: ScanMode,
        since: Option<DateTime<Utc>>,
        cancel: CancelToken,
    ) -> Result<Report> {
        tracing::debug!(institution = institution_id, %mode, "scan starting");

        let rows = configs.rule_configs(institution_id)?;
        let effective = self.registry.effective_config(&rows)?;

        let mut ctx = ScanContext::new(institution_id, mode, since, store);
        ctx.cancel = cancel;
        ctx.thresholds = effective
            .iter()
            .filter_map(|(id, cfg)| cfg.threshold.map(|t| (id.clone(), t)))
            .collect();

        // Enabled rules only, in registration order. Disabled rules are
        // never executed — no queries run on a tenant's behalf for checks
        // the tenant switched off.
        let enabled: Vec<&dyn Rule> = self
            .registry
            .rules()
            .filter(|rule| {
                effective
                    .get(&rule.metadata().id)
                    .is_none_or(|cfg| cfg.enabled)
            })
            .collect();

        if ctx.cancelled() {
            return Err(KaizenError::Cancelled);
        }

        // duration_ms covers first dispatch to last settle.
        let dispatched = Instant::now();
        let results: Vec<Vec<Finding>> = thread::scope(|scope| {
            let handles: Vec<_> = enabled
                .iter()
                .map(|&rule| {
                    let ctx = &ctx;
                    scope.spawn(move || rule.execute(ctx))
                })
                .collect();

            handles
                .into_iter()
                .zip(&enabled)
                .map(|(handle, rule)| match handle.join() {
                    Ok(findings) => findings,
                    Err(_) => {
                        tracing::error!(
                            rule = %rule.metadata().id,
                            institution = institution_id,
                            "rule panicked, contributing no findings"
                        );
                        Vec::new()
                    }
                })
                .collect()
        });
        let duration_ms = dispatched.elapsed().as_millis() as u64;

        if ctx.cancelled() {
            tracing::info!(institution = institution_id, "scan cancelled, discarding results");
            return Err(KaizenError::Cancelled);
        }

        // A finding's stored severity reflects the tenant's effective
        // severity, so overrides are applied before aggregation.
        let mut findings = Vec::new();
        for (rule, rule_findings) in enabled.iter().zip(results) {
            let severity_override = effective
                .get(&rule.metadata().id)
                .and_then(|cfg| cfg.severity_override);
            for mut finding in rule_findings {
                if let Some(severity) = severity_override {
                    finding.severity = severity;
                }
                findings.push(finding);
            }
        }

        let report = Report::assemble(institution_id, mode, findings, duration_ms);
        tracing::info!(
            institution = institution_id,
            report = %report.id,
            total = report.total_findings,
            duration_ms,
            "scan completed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryConfigStore, RuleConfig};
    use crate::rules::{RuleMetadata, Severity};
    use crate::store::memory::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Configurable test rule: emits canned findings, records execution,
    /// optionally panics or reports its configured threshold.
    struct ProbeRule {
        id: &'static str,
        severity: Severity,
        emit: usize,
        executed: Arc<AtomicBool>,
        panic_on_execute: bool,
        emit_threshold: bool,
    }

    impl ProbeRule {
        fn new(id: &'static str, severity: Severity, emit: usize) -> Self {
            Self {
                id,
                severity,
                emit,
                executed: Arc::new(AtomicBool::new(false)),
                panic_on_execute: false,
                emit_threshold: false,
            }
        }
    }

    impl Rule for ProbeRule {
        fn metadata(&self) -> RuleMetadata {
            RuleMetadata {
                id: self.id.into(),
                name: "Probe".into(),
                description: "probe".into(),
                default_severity: self.severity,
            }
        }

        fn execute(&self, ctx: &ScanContext) -> Vec<Finding> {
            self.executed.store(true, Ordering::Relaxed);
            if self.panic_on_execute {
                panic!("probe rule crashed");
            }
            (0..self.emit)
                .map(|i| Finding {
                    rule_id: self.id.into(),
                    severity: self.severity,
                    affected_nodes: vec![format!("{}-{i}", self.id)],
                    message: if self.emit_threshold {
                        format!("threshold={:?}", ctx.threshold(self.id))
                    } else {
                        format!("{} issue {i}", self.id)
                    },
                    suggested_fix: "fix".into(),
                })
                .collect()
        }
    }

    fn engine(rules: Vec<Box<dyn Rule>>) -> ScanEngine {
        let mut registry = RuleRegistry::new();
        for rule in rules {
            registry.register(rule).unwrap();
        }
        ScanEngine::new(Arc::new(registry))
    }

    fn mem_store() -> Arc<dyn GraphStore> {
        Arc::new(MemoryStore::new())
    }

    fn row(rule_id: &str) -> RuleConfig {
        RuleConfig {
            rule_id: rule_id.into(),
            enabled: true,
            severity_override: None,
            threshold: None,
        }
    }

    #[test]
    fn aggregates_findings_across_rules() {
        let engine = engine(vec![
            Box::new(ProbeRule::new("rule-1", Severity::Warning, 1)),
            Box::new(ProbeRule::new("rule-2", Severity::Critical, 1)),
        ]);

        let report = engine
            .run_scan(
                mem_store(),
                &MemoryConfigStore::new(),
                "inst-1",
                ScanMode::Full,
                None,
            )
            .unwrap();

        assert_eq!(report.institution_id, "inst-1");
        assert_eq!(report.mode, ScanMode::Full);
        assert_eq!(report.total_findings, 2);
        assert_eq!(report.critical_count, 1);
        assert_eq!(report.warning_count, 1);
        assert_eq!(report.info_count, 0);
    }

    #[test]
    fn findings_preserve_registration_order() {
        let engine = engine(vec![
            Box::new(ProbeRule::new("first", Severity::Info, 2)),
            Box::new(ProbeRule::new("second", Severity::Info, 1)),
            Box::new(ProbeRule::new("third", Severity::Info, 1)),
        ]);

        let report = engine
            .run_scan(
                mem_store(),
                &MemoryConfigStore::new(),
                "inst-1",
                ScanMode::Full,
                None,
            )
            .unwrap();

        let rule_ids: Vec<&str> = report.findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(rule_ids, vec!["first", "first", "second", "third"]);
    }

    #[test]
    fn disabled_rule_is_never_executed() {
        let disabled = ProbeRule::new("disabled-rule", Severity::Warning, 1);
        let executed = disabled.executed.clone();
        let engine = engine(vec![
            Box::new(ProbeRule::new("enabled-rule", Severity::Info, 1)),
            Box::new(disabled),
        ]);

        let mut configs = MemoryConfigStore::new();
        let mut config = row("disabled-rule");
        config.enabled = false;
        configs.upsert("inst-1", config);

        let report = engine
            .run_scan(mem_store(), &configs, "inst-1", ScanMode::Full, None)
            .unwrap();

        assert!(!executed.load(Ordering::Relaxed));
        assert_eq!(report.total_findings, 1);
        assert_eq!(report.findings[0].rule_id, "enabled-rule");
    }

    #[test]
    fn severity_override_rewrites_emitted_findings() {
        let engine = engine(vec![Box::new(ProbeRule::new(
            "override-rule",
            Severity::Info,
            1,
        ))]);

        let mut configs = MemoryConfigStore::new();
        let mut config = row("override-rule");
        config.severity_override = Some(Severity::Critical);
        configs.upsert("inst-1", config);

        let report = engine
            .run_scan(mem_store(), &configs, "inst-1", ScanMode::Full, None)
            .unwrap();

        assert_eq!(report.findings[0].severity, Severity::Critical);
        assert_eq!(report.critical_count, 1);
        assert_eq!(report.info_count, 0);
    }

    #[test]
    fn panicking_rule_is_absorbed() {
        let mut crasher = ProbeRule::new("crasher", Severity::Critical, 1);
        crasher.panic_on_execute = true;
        let engine = engine(vec![
            Box::new(crasher),
            Box::new(ProbeRule::new("survivor", Severity::Info, 1)),
        ]);

        let report = engine
            .run_scan(
                mem_store(),
                &MemoryConfigStore::new(),
                "inst-1",
                ScanMode::Full,
                None,
            )
            .unwrap();

        assert_eq!(report.total_findings, 1);
        assert_eq!(report.findings[0].rule_id, "survivor");
        assert_eq!(report.info_count, 1);
    }

    #[test]
    fn unknown_rule_id_in_config_fails_the_scan() {
        let engine = engine(vec![Box::new(ProbeRule::new("known", Severity::Info, 0))]);
        let mut configs = MemoryConfigStore::new();
        configs.upsert("inst-1", row("unknown-rule"));

        let err = engine
            .run_scan(mem_store(), &configs, "inst-1", ScanMode::Full, None)
            .unwrap_err();
        assert!(matches!(err, KaizenError::UnknownRule(id) if id == "unknown-rule"));
    }

    #[test]
    fn config_store_failure_fails_the_scan() {
        struct BrokenConfigStore;
        impl ConfigStore for BrokenConfigStore {
            fn rule_configs(&self, institution_id: &str) -> Result<Vec<RuleConfig>> {
                Err(KaizenError::ConfigStore {
                    institution_id: institution_id.into(),
                    message: "timeout".into(),
                })
            }
        }

        let engine = engine(vec![Box::new(ProbeRule::new("known", Severity::Info, 0))]);
        let err = engine
            .run_scan(
                mem_store(),
                &BrokenConfigStore,
                "inst-1",
                ScanMode::Full,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, KaizenError::ConfigStore { .. }));
    }

    #[test]
    fn pre_cancelled_scan_produces_no_report() {
        let probe = ProbeRule::new("probe", Severity::Info, 1);
        let executed = probe.executed.clone();
        let engine = engine(vec![Box::new(probe)]);

        let cancel = CancelToken::new();
        cancel.cancel();

        let err = engine
            .run_scan_cancellable(
                mem_store(),
                &MemoryConfigStore::new(),
                "inst-1",
                ScanMode::Full,
                None,
                cancel,
            )
            .unwrap_err();

        assert!(matches!(err, KaizenError::Cancelled));
        assert!(!executed.load(Ordering::Relaxed));
    }

    #[test]
    fn cancellation_during_execution_discards_results() {
        // A rule that cancels its own scan mid-flight stands in for an
        // external caller tripping the token while rules run.
        struct SelfCancellingRule;
        impl Rule for SelfCancellingRule {
            fn metadata(&self) -> RuleMetadata {
                RuleMetadata {
                    id: "self-cancel".into(),
                    name: "Self Cancel".into(),
                    description: "cancels mid-scan".into(),
                    default_severity: Severity::Info,
                }
            }

            fn execute(&self, ctx: &ScanContext) -> Vec<Finding> {
                ctx.cancel.cancel();
                vec![Finding {
                    rule_id: "self-cancel".into(),
                    severity: Severity::Info,
                    affected_nodes: vec!["x".into()],
                    message: "should be discarded".into(),
                    suggested_fix: "none".into(),
                }]
            }
        }

        let engine = engine(vec![Box::new(SelfCancellingRule)]);
        let err = engine
            .run_scan_cancellable(
                mem_store(),
                &MemoryConfigStore::new(),
                "inst-1",
                ScanMode::Full,
                None,
                CancelToken::new(),
            )
            .unwrap_err();
        assert!(matches!(err, KaizenError::Cancelled));
    }

    #[test]
    fn thresholds_reach_rules_through_context() {
        let mut probe = ProbeRule::new("threshold-rule", Severity::Info, 1);
        probe.emit_threshold = true;
        let engine = engine(vec![Box::new(probe)]);

        let mut configs = MemoryConfigStore::new();
        let mut config = row("threshold-rule");
        config.threshold = Some(0.75);
        configs.upsert("inst-1", config);

        let report = engine
            .run_scan(mem_store(), &configs, "inst-1", ScanMode::Full, None)
            .unwrap();
        assert_eq!(report.findings[0].message, "threshold=Some(0.75)");
    }

    #[test]
    fn each_scan_gets_a_fresh_report_identity() {
        let engine = engine(vec![Box::new(ProbeRule::new("probe", Severity::Info, 1))]);
        let configs = MemoryConfigStore::new();

        let first = engine
            .run_scan(mem_store(), &configs, "inst-1", ScanMode::Full, None)
            .unwrap();
        let second = engine
            .run_scan(mem_store(), &configs, "inst-1", ScanMode::Full, None)
            .unwrap();

        assert_ne!(first.id, second.id);
        // findings content is idempotent even though identity is not
        assert_eq!(first.findings, second.findings);
    }
}
