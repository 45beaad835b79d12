use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rules::Severity;

/// Per-tenant override of one rule's behavior.
///
/// Mirrors one row of the tenant's rule-config table. A rule with no row is
/// enabled at its default severity with no threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub rule_id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_override: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

fn default_enabled() -> bool {
    true
}

/// Supplies stored [`RuleConfig`] rows per tenant.
///
/// An empty result is a common, valid state; defaults apply. A read failure
/// is an orchestration-level error — silently falling back to defaults could
/// execute rules the tenant disabled.
pub trait ConfigStore: Send + Sync {
    fn rule_configs(&self, institution_id: &str) -> Result<Vec<RuleConfig>>;
}

/// In-memory, per-tenant config store.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    by_institution: HashMap<String, Vec<RuleConfig>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the row for `(institution_id, config.rule_id)`.
    pub fn upsert(&mut self, institution_id: &str, config: RuleConfig) {
        let rows = self
            .by_institution
            .entry(institution_id.to_string())
            .or_default();
        match rows.iter_mut().find(|r| r.rule_id == config.rule_id) {
            Some(existing) => *existing = config,
            None => rows.push(config),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn rule_configs(&self, institution_id: &str) -> Result<Vec<RuleConfig>> {
        Ok(self
            .by_institution
            .get(institution_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Top-level configuration from `.kaizen.toml`.
///
/// A config file is single-tenant by construction, so its rows apply to
/// whichever institution the scan targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# Kaizen lint configuration
# One [[rules]] block per rule you want to override. Rules without a block
# run enabled at their default severity.

# [[rules]]
# rule_id = "missing-provenance"
# enabled = true
# severity_override = "critical"

# [[rules]]
# rule_id = "low-confidence-tags"
# threshold = 0.7
"#
    }
}

impl ConfigStore for Config {
    fn rule_configs(&self, _institution_id: &str) -> Result<Vec<RuleConfig>> {
        Ok(self.rules.clone())
    }
}
