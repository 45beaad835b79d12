//! Rule registry: the set of known rules plus per-tenant config merging.
//!
//! One registry is constructed at service start and shared read-only for the
//! process lifetime. There is no global instance; callers pass it where it
//! is needed.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::config::RuleConfig;
use crate::error::{KaizenError, Result};
use crate::rules::{builtin, Rule, RuleMetadata, Severity};

/// Merged per-tenant configuration for one rule.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub enabled: bool,
    /// Effective severity: tenant override if present, else the rule default.
    pub severity: Severity,
    /// The override itself, when configured. Findings keep their intrinsic
    /// severity unless this is set.
    pub severity_override: Option<Severity>,
    pub threshold: Option<f64>,
}

/// One row of the rule catalog: full rule list merged with a tenant's
/// stored config, the shape the config surface displays.
#[derive(Debug, Clone, Serialize)]
pub struct RuleCatalogEntry {
    pub rule_id: String,
    pub name: String,
    pub description: String,
    pub default_severity: Severity,
    pub enabled: bool,
    pub severity_override: Option<Severity>,
    pub threshold: Option<f64>,
}

/// Holds the known rules and answers config-merge queries.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    ids: HashSet<String>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Create a registry with all built-in rules registered.
    pub fn with_builtin_rules() -> Self {
        let mut registry = Self::new();
        for rule in builtin::all_rules() {
            registry
                .register(rule)
                .expect("built-in rule ids are unique");
        }
        registry
    }

    /// Add a rule. Fails if its id is already registered.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<()> {
        let id = rule.metadata().id;
        if !self.ids.insert(id.clone()) {
            return Err(KaizenError::DuplicateRule(id));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// All rules, in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(Box::as_ref)
    }

    pub fn contains(&self, rule_id: &str) -> bool {
        self.ids.contains(rule_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// List metadata for all registered rules.
    pub fn metadata(&self) -> Vec<RuleMetadata> {
        self.rules.iter().map(|r| r.metadata()).collect()
    }

    /// Merge a tenant's stored rows over the defaults.
    ///
    /// Pure with respect to storage: callers fetch the rows, this computes.
    /// A missing row means enabled at default severity. A row naming an
    /// unregistered rule id is a configuration error and fails the merge.
    pub fn effective_config(
        &self,
        configs: &[RuleConfig],
    ) -> Result<BTreeMap<String, EffectiveConfig>> {
        for row in configs {
            if !self.ids.contains(&row.rule_id) {
                return Err(KaizenError::UnknownRule(row.rule_id.clone()));
            }
        }

        let mut merged = BTreeMap::new();
        for rule in &self.rules {
            let meta = rule.metadata();
            let row = configs.iter().find(|c| c.rule_id == meta.id);
            let severity_override = row.and_then(|c| c.severity_override);
            merged.insert(
                meta.id.clone(),
                EffectiveConfig {
                    enabled: row.is_none_or(|c| c.enabled),
                    severity: severity_override.unwrap_or(meta.default_severity),
                    severity_override,
                    threshold: row.and_then(|c| c.threshold),
                },
            );
        }
        Ok(merged)
    }

    /// Full rule list merged with a tenant's stored rows, for display.
    ///
    /// Unlike [`effective_config`](Self::effective_config) this is lenient:
    /// rows for unknown rules are ignored rather than rejected, since the
    /// catalog is a read surface.
    pub fn catalog(&self, configs: &[RuleConfig]) -> Vec<RuleCatalogEntry> {
        self.rules
            .iter()
            .map(|rule| {
                let meta = rule.metadata();
                let row = configs.iter().find(|c| c.rule_id == meta.id);
                RuleCatalogEntry {
                    rule_id: meta.id,
                    name: meta.name,
                    description: meta.description,
                    default_severity: meta.default_severity,
                    enabled: row.is_none_or(|c| c.enabled),
                    severity_override: row.and_then(|c| c.severity_override),
                    threshold: row.and_then(|c| c.threshold),
                }
            })
            .collect()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtin_rules()
    }
}
