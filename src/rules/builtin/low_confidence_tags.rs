use crate::context::ScanContext;
use crate::rules::{Finding, Rule, RuleMetadata, Severity};

/// low-confidence-tags: skill tags below the tenant's confidence cutoff.
///
/// Inert until the tagging pipeline writes per-tag confidence scores. Once
/// that column exists, the cutoff comes from `ctx.threshold("low-confidence-tags")`
/// with a sensible default when the tenant has not set one.
pub struct LowConfidenceTags;

impl Rule for LowConfidenceTags {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "low-confidence-tags".into(),
            name: "Low-Confidence Tags".into(),
            description: "Flags skill tags whose confidence falls below the configured \
                          threshold. Inactive until the tagging pipeline writes per-tag \
                          confidence scores."
                .into(),
            default_severity: Severity::Warning,
        }
    }

    fn execute(&self, _ctx: &ScanContext) -> Vec<Finding> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScanMode;
    use crate::store::memory::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn always_empty_even_with_threshold_configured() {
        let mut ctx = ScanContext::new(
            "inst-1",
            ScanMode::Full,
            None,
            Arc::new(MemoryStore::new()),
        );
        ctx.thresholds.insert("low-confidence-tags".into(), 0.9);
        assert!(LowConfidenceTags.execute(&ctx).is_empty());
    }
}
