use crate::context::ScanContext;
use crate::rules::{Finding, Rule, RuleMetadata, Severity};

/// duplicate-mappings: items mapped to the same concept more than once.
///
/// Inert until the concept-mapping join table lands in the graph schema —
/// there is nothing to query yet, so the rule reports no findings. It is
/// still registered and configurable like any active rule, so activating it
/// later is a body swap, not an orchestration change.
pub struct DuplicateMappings;

impl Rule for DuplicateMappings {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "duplicate-mappings".into(),
            name: "Duplicate Mappings".into(),
            description: "Detects items mapped to the same concept more than once. Inactive \
                          until the concept_mappings join table exists in the graph schema."
                .into(),
            default_severity: Severity::Warning,
        }
    }

    fn execute(&self, _ctx: &ScanContext) -> Vec<Finding> {
        Vec::new()
    }
}
