use crate::context::ScanContext;
use crate::rules::{Finding, Rule, RuleMetadata, Severity};

/// embedding-drift: item embeddings diverging from their baseline.
///
/// Inert until a baseline embedding snapshot store exists to compare
/// against. Current-state embeddings alone cannot tell drift from intent.
pub struct EmbeddingDrift;

impl Rule for EmbeddingDrift {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "embedding-drift".into(),
            name: "Embedding Drift".into(),
            description: "Compares item embeddings against a baseline snapshot to detect \
                          semantic drift. Inactive until a baseline embedding store exists."
                .into(),
            default_severity: Severity::Info,
        }
    }

    fn execute(&self, _ctx: &ScanContext) -> Vec<Finding> {
        Vec::new()
    }
}
