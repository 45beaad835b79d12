//! In-memory [`GraphStore`] backed by schemaless records.
//!
//! Serves as the reference implementation for tests and as the CLI's input
//! path (`kaizen scan --items bank.json`). The JSON shape mirrors the rows a
//! hosted database would return: one object per entity, arbitrary columns
//! beyond the three the engine understands.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EntityFilter, GraphStore, StoreResult};

/// One row of a collection. `fields` carries every column the engine does
/// not model directly (e.g., `batch_id`, `confidence`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub institution_id: String,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl EntityRecord {
    /// Whether `field` is explicitly null or absent on this record.
    pub fn is_null(&self, field: &str) -> bool {
        matches!(self.fields.get(field), None | Some(Value::Null))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    collections: BTreeMap<String, Vec<EntityRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, collection: &str, record: EntityRecord) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    /// Parse collections from a JSON object: `{"<collection>": [record, ...]}`.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: &Path) -> crate::error::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_json_str(&content)?)
    }
}

impl GraphStore for MemoryStore {
    fn select_ids(
        &self,
        institution_id: &str,
        collection: &str,
        filter: &EntityFilter,
    ) -> StoreResult<Vec<String>> {
        let rows = self
            .collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        Ok(rows
            .iter()
            .filter(|r| r.institution_id == institution_id)
            .filter(|r| {
                filter
                    .ids
                    .as_ref()
                    .is_none_or(|ids| ids.iter().any(|id| *id == r.id))
            })
            .filter(|r| filter.null_field.as_deref().is_none_or(|f| r.is_null(f)))
            .filter(|r| {
                filter
                    .updated_since
                    .is_none_or(|since| r.updated_at >= since)
            })
            .map(|r| r.id.clone())
            .collect())
    }
}
