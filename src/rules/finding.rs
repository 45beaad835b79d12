use serde::{Deserialize, Serialize};

/// A data-quality finding produced by a lint rule.
///
/// One finding aggregates every entity a rule flagged in a single scan —
/// rules report a bounded preview of affected ids, not one finding per
/// entity, so report size stays independent of item-bank size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Identifier of the rule that produced this finding (e.g., "missing-provenance").
    pub rule_id: String,
    /// Severity level, after any per-tenant override has been applied.
    pub severity: Severity,
    /// Preview of implicated entity ids, deduped, at most [`MAX_AFFECTED_PREVIEW`](crate::rules::MAX_AFFECTED_PREVIEW).
    pub affected_nodes: Vec<String>,
    /// Human-readable summary; carries the true total count when the preview is truncated.
    pub message: String,
    /// Suggested remediation.
    pub suggested_fix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}
