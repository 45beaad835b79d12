//! Per-scan execution context shared read-only by every rule.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::GraphStore;

/// Scan scope: everything, or only entities changed since a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Full,
    Delta,
}

impl ScanMode {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "full" => Some(Self::Full),
            "delta" => Some(Self::Delta),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Delta => write!(f, "delta"),
        }
    }
}

/// Cooperative cancellation flag for one scan.
///
/// Cloning shares the flag. Rules poll [`ScanContext::cancelled`] between
/// store calls; the orchestrator checks it once more before assembling a
/// report, so a cancelled scan never emits a partial one.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Everything a rule may read during one scan.
///
/// Built once per scan by the orchestrator, then shared by all enabled
/// rules. Rules hold no state of their own; anything they need is here or
/// behind the store handle.
#[derive(Clone)]
pub struct ScanContext {
    /// Tenant the scan runs for.
    pub institution_id: String,
    /// Full or delta scope.
    pub mode: ScanMode,
    /// Lower bound for delta scans. Meaningful only when `mode` is delta.
    pub since: Option<DateTime<Utc>>,
    /// Query capability over the knowledge graph / item bank.
    pub store: Arc<dyn GraphStore>,
    /// Effective per-rule numeric thresholds (tenant override or none).
    pub thresholds: HashMap<String, f64>,
    /// Cancellation flag for this scan.
    pub cancel: CancelToken,
}

impl ScanContext {
    pub fn new(
        institution_id: impl Into<String>,
        mode: ScanMode,
        since: Option<DateTime<Utc>>,
        store: Arc<dyn GraphStore>,
    ) -> Self {
        Self {
            institution_id: institution_id.into(),
            mode,
            since,
            store,
            thresholds: HashMap::new(),
            cancel: CancelToken::new(),
        }
    }

    /// The `since` bound rules should filter on, or `None` for full scope.
    ///
    /// Under full mode `since` is ignored; under delta mode with no `since`
    /// the rule falls back to full scope for this invocation.
    pub fn effective_since(&self) -> Option<DateTime<Utc>> {
        match self.mode {
            ScanMode::Delta => self.since,
            ScanMode::Full => None,
        }
    }

    /// Effective threshold for a rule, if the tenant configured one.
    pub fn threshold(&self, rule_id: &str) -> Option<f64> {
        self.thresholds.get(rule_id).copied()
    }

    pub fn cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl std::fmt::Debug for ScanContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanContext")
            .field("institution_id", &self.institution_id)
            .field("mode", &self.mode)
            .field("since", &self.since)
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}
