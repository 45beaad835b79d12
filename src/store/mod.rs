//! Data-access capability consumed by lint rules.
//!
//! Rules never talk to a concrete database. They see [`GraphStore`], which
//! answers id-set queries over named collections with a small fixed set of
//! predicates: id membership, null-field, and an `updated_at` lower bound.
//! Anything that can answer those queries can back a scan.

pub mod memory;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("query against {collection} failed: {message}")]
    Query { collection: String, message: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Filter predicates for an id-set query. All present predicates must match.
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    /// Restrict to these entity ids.
    pub ids: Option<Vec<String>>,
    /// Match entities where this field is null or absent.
    pub null_field: Option<String>,
    /// Match entities updated at or after this timestamp.
    pub updated_since: Option<DateTime<Utc>>,
}

/// Query layer over the knowledge graph / assessment-item store.
///
/// Implementations must be callable concurrently; every rule in a scan may
/// query at the same time. Each query is expected to see a consistent-enough
/// snapshot — the store does not coordinate transactions across rules.
pub trait GraphStore: Send + Sync {
    /// Ids of entities in `collection` belonging to `institution_id` that
    /// match every predicate in `filter`.
    fn select_ids(
        &self,
        institution_id: &str,
        collection: &str,
        filter: &EntityFilter,
    ) -> StoreResult<Vec<String>>;
}
