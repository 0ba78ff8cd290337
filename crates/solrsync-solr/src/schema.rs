//! Schema synchronization.
//!
//! Reconciles a table's desired field set against a core's live schema by
//! computing a minimal diff and applying it one field-level call at a time.
//!
//! The diff is computed fresh on every call and all type mappings are
//! resolved before the first remote mutation, so an unsupported native type
//! can never leave a schema half-modified. Application itself is fail-fast
//! with no rollback: a field-level failure aborts the synchronization and
//! fields already applied stay applied.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use solrsync_types::{is_default_field, Field, FieldType, IndexField};

use crate::client::{CoreConnection, SolrClient};
use crate::error::SolrSearchError;

/// The field mutations needed to reconcile desired against live.
///
/// Derived, never persisted. Default fields appear in no bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff {
    pub to_add: Vec<IndexField>,
    pub to_update: Vec<IndexField>,
    pub to_remove: Vec<String>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the diff between a live schema and a desired field set.
///
/// Classification per desired field: absent from live is an add (stored and
/// indexed, mapped type); present with a differing mapped type is an update
/// keeping the live field's flags; present and type-equal is a no-op. Live
/// non-default fields not in the desired set are removals. Desired fields
/// carrying a default name are engine-managed and never classified.
///
/// Fails with `UnsupportedType` before reporting any mutation when a desired
/// native type has no index mapping.
pub fn compute_diff(
    live: &[IndexField],
    desired: &[Field],
) -> Result<SchemaDiff, SolrSearchError> {
    let keyed_live: BTreeMap<&str, &IndexField> = live
        .iter()
        .filter(|f| !is_default_field(&f.name))
        .map(|f| (f.name.as_str(), f))
        .collect();

    let desired_ids: BTreeSet<&str> = desired
        .iter()
        .map(|f| f.id.as_str())
        .filter(|id| !is_default_field(id))
        .collect();

    let mut diff = SchemaDiff::default();
    for field in desired {
        if is_default_field(&field.id) {
            continue;
        }
        let mapped = FieldType::from_native(&field.type_)?;
        match keyed_live.get(field.id.as_str()) {
            None => diff.to_add.push(IndexField::stored_indexed(&field.id, mapped)),
            Some(live_field) if live_field.type_ != mapped.as_str() => {
                diff.to_update.push(live_field.retyped(mapped));
            }
            Some(_) => {}
        }
    }

    diff.to_remove = keyed_live
        .keys()
        .filter(|name| !desired_ids.contains(*name))
        .map(|name| name.to_string())
        .collect();

    Ok(diff)
}

/// Applies schema diffs against a connected core.
pub struct SchemaSynchronizer<'a> {
    client: &'a SolrClient,
}

impl<'a> SchemaSynchronizer<'a> {
    pub fn new(client: &'a SolrClient) -> Self {
        Self { client }
    }

    /// Reconcile `desired` against the core's live schema.
    ///
    /// Returns whether any change was applied; callers can use that to
    /// trigger downstream reindexing. Adds are applied before updates before
    /// removals, so a rename's add lands before the old name's removal.
    pub async fn synchronize(
        &self,
        conn: &CoreConnection,
        desired: &[Field],
    ) -> Result<bool, SolrSearchError> {
        let live = self.client.read_schema(conn).await?;
        let diff = compute_diff(&live, desired)?;

        if diff.is_empty() {
            debug!(core = conn.core(), "Schema already in sync");
            return Ok(false);
        }
        info!(
            core = conn.core(),
            add = diff.to_add.len(),
            update = diff.to_update.len(),
            remove = diff.to_remove.len(),
            "Applying schema diff"
        );

        for field in &diff.to_add {
            self.client.add_field(conn, field).await?;
        }
        for field in &diff.to_update {
            self.client.replace_field(conn, field).await?;
        }
        for name in &diff.to_remove {
            self.client.delete_field(conn, name).await?;
        }
        Ok(true)
    }
}
