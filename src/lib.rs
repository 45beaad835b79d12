//! Kaizen — data-quality lint engine for knowledge graphs and assessment
//! item banks.
//!
//! A scan runs every enabled rule for a tenant against a query layer over
//! the item store, aggregates their findings, and returns an immutable
//! [`Report`]. Rules are independent and side-effect-free, so they execute
//! concurrently; per-tenant configuration can disable rules, override their
//! severity, or tune rule-specific thresholds.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use kaizen::config::MemoryConfigStore;
//! use kaizen::store::memory::MemoryStore;
//! use kaizen::{RuleRegistry, ScanEngine, ScanMode};
//!
//! let engine = ScanEngine::new(Arc::new(RuleRegistry::with_builtin_rules()));
//! let report = engine
//!     .run_scan(
//!         Arc::new(MemoryStore::new()),
//!         &MemoryConfigStore::new(),
//!         "inst-1",
//!         ScanMode::Full,
//!         None,
//!     )
//!     .unwrap();
//! assert_eq!(report.total_findings, 0);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod registry;
pub mod report;
pub mod rules;
pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use context::{CancelToken, ScanContext, ScanMode};
pub use error::{KaizenError, Result};
pub use orchestrator::ScanEngine;
pub use registry::RuleRegistry;
pub use report::Report;
pub use rules::{Finding, Rule, Severity};

use config::ConfigStore;
use store::GraphStore;

/// Run one scan with the built-in rule set.
///
/// Convenience for one-shot callers; services that scan repeatedly should
/// build a [`RuleRegistry`] once and hold a [`ScanEngine`].
pub fn run_scan(
    store: Arc<dyn GraphStore>,
    configs: &dyn ConfigStore,
    institution_id: &str,
    mode: ScanMode,
    since: Option<DateTime<Utc>>,
) -> Result<Report> {
    let engine = ScanEngine::new(Arc::new(RuleRegistry::with_builtin_rules()));
    engine.run_scan(store, configs, institution_id, mode, since)
}
