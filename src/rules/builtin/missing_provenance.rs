use std::collections::HashSet;

use crate::context::ScanContext;
use crate::rules::{Finding, Rule, RuleMetadata, Severity, MAX_AFFECTED_PREVIEW};
use crate::store::EntityFilter;

/// missing-provenance: assessment items with no generation lineage.
///
/// An item whose `batch_id` is null cannot be traced back to the pipeline
/// run that produced it. This rule is the template for store-backed rules:
/// one aggregated finding per invocation, id preview clamped, true total in
/// the message.
pub struct MissingProvenance;

const COLLECTION: &str = "assessment_items";
const PROVENANCE_FIELD: &str = "batch_id";

impl Rule for MissingProvenance {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "missing-provenance".into(),
            name: "Missing Provenance".into(),
            description: "Assessment items whose batch_id is null cannot be traced to the \
                          generation run that produced them"
                .into(),
            default_severity: Severity::Info,
        }
    }

    fn execute(&self, ctx: &ScanContext) -> Vec<Finding> {
        if ctx.cancelled() {
            return Vec::new();
        }

        let filter = EntityFilter {
            null_field: Some(PROVENANCE_FIELD.into()),
            updated_since: ctx.effective_since(),
            ..Default::default()
        };

        let ids = match ctx
            .store
            .select_ids(&ctx.institution_id, COLLECTION, &filter)
        {
            Ok(ids) => ids,
            Err(err) => {
                tracing::warn!(
                    rule = "missing-provenance",
                    institution = %ctx.institution_id,
                    error = %err,
                    "store query failed, reporting no findings"
                );
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let mut ids: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();

        if ids.is_empty() {
            return Vec::new();
        }

        let total = ids.len();
        let message = if total == 1 {
            "1 assessment item has no generation provenance (batch_id is null)".to_string()
        } else {
            format!("{total} assessment items have no generation provenance (batch_id is null)")
        };

        ids.truncate(MAX_AFFECTED_PREVIEW);

        vec![Finding {
            rule_id: "missing-provenance".into(),
            severity: Severity::Info,
            affected_nodes: ids,
            message,
            suggested_fix: "Regenerate the affected items through the generation pipeline so \
                            each carries the batch_id of the run that produced it."
                .into(),
        }]
    }
}
