mod duplicate_mappings;
mod embedding_drift;
mod low_confidence_tags;
mod missing_provenance;

use super::Rule;

pub use duplicate_mappings::DuplicateMappings;
pub use embedding_drift::EmbeddingDrift;
pub use low_confidence_tags::LowConfidenceTags;
pub use missing_provenance::MissingProvenance;

/// Returns all built-in rules, in registration order.
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(MissingProvenance),
        Box::new(DuplicateMappings),
        Box::new(LowConfidenceTags),
        Box::new(EmbeddingDrift),
    ]
}
