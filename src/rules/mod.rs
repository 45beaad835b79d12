pub mod builtin;
pub mod finding;

use serde::{Deserialize, Serialize};

use crate::context::ScanContext;

pub use finding::{Finding, Severity};

/// Bound on the affected-id preview carried by one finding. Rules report the
/// true total in `message` and clamp `affected_nodes` to this many ids.
pub const MAX_AFFECTED_PREVIEW: usize = 100;

/// Metadata about a lint rule, used for catalog output and config merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// Globally unique, stable id — referenced by RuleConfig rows and used
    /// as the grouping key in reports.
    pub id: String,
    pub name: String,
    pub description: String,
    pub default_severity: Severity,
}

/// A rule checks the item bank / knowledge graph and produces findings.
///
/// Rules are stateless between invocations; everything they need is
/// re-derived from the [`ScanContext`] each execution. `execute` must be
/// safe to call concurrently with other rules' `execute` — the context is
/// the only shared state and it is read-only.
pub trait Rule: Send + Sync {
    /// Metadata about this rule (id, name, default severity).
    fn metadata(&self) -> RuleMetadata;

    /// Run the rule against one scan's context.
    ///
    /// "No issues found" is an empty vec, never an error. A failing store
    /// query is swallowed here — logged and reported as zero findings — so
    /// one broken query cannot abort the scan.
    fn execute(&self, ctx: &ScanContext) -> Vec<Finding>;
}
