//! Record deletion.
//!
//! Deletes records matching filters, or wipes and unloads the whole core
//! when no filters are given. Removal against a non-existent core is a
//! successful no-op.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::client::SolrClient;
use crate::error::SolrSearchError;

/// Deletes records by filter, or tears an entire core down.
pub struct RecordEraser<'a> {
    client: &'a SolrClient,
}

impl<'a> RecordEraser<'a> {
    pub fn new(client: &'a SolrClient) -> Self {
        Self { client }
    }

    /// Remove records from a table's core.
    ///
    /// Empty `filters` means the whole core: every document is deleted, the
    /// deletion committed, and the core unloaded. Non-empty `filters` issue
    /// one `key:value` deletion per pair in key order, fail-fast with no
    /// rollback, followed by a single deferred commit. A `BTreeMap` keeps
    /// the application order deterministic.
    pub async fn remove(
        &self,
        resource_id: &str,
        filters: &BTreeMap<String, String>,
    ) -> Result<(), SolrSearchError> {
        let core = self.client.config().core_name(resource_id);
        let Some(conn) = self.client.connect(&core).await? else {
            debug!(core = %core, "Core absent, nothing to remove");
            return Ok(());
        };

        if filters.is_empty() {
            info!(core = %core, "Wiping and unloading core");
            self.client.delete_by_query(&conn, "*:*", false).await?;
            self.client.commit(&conn, false).await?;
            self.client.unload_core(&core).await?;
            return Ok(());
        }

        for (key, value) in filters {
            self.client
                .delete_by_query(&conn, &format!("{key}:{value}"), false)
                .await?;
        }
        self.client.commit(&conn, false).await?;
        info!(core = %core, filters = filters.len(), "Removed records by filter");
        Ok(())
    }
}
