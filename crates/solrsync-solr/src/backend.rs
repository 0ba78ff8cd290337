//! Backend facade.
//!
//! Composes the client, synchronizer, lifecycle manager, indexer, and eraser
//! behind the four-operation surface the search-backend contract expects,
//! serializing mutating operations per core through [`CoreLocks`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use solrsync_types::{Field, Record};

use crate::client::SolrClient;
use crate::config::SolrConfig;
use crate::eraser::RecordEraser;
use crate::error::SolrSearchError;
use crate::indexer::{RecordIndexer, TableFieldSource};
use crate::lifecycle::{CoreLifecycleManager, CoreLocks};
use crate::schema::SchemaSynchronizer;

/// Search backend driving one Solr endpoint.
pub struct SolrBackend {
    client: SolrClient,
    source: Arc<dyn TableFieldSource>,
    locks: CoreLocks,
}

impl SolrBackend {
    pub fn new(
        config: SolrConfig,
        source: Arc<dyn TableFieldSource>,
    ) -> Result<Self, SolrSearchError> {
        Ok(Self {
            client: SolrClient::new(config)?,
            source,
            locks: CoreLocks::new(),
        })
    }

    pub fn config(&self) -> &SolrConfig {
        self.client.config()
    }

    /// Create a table's core if needed and reconcile its schema with
    /// `fields`.
    ///
    /// Returns whether the live schema changed, so callers can decide to
    /// reindex existing records. A freshly created core reports `false`:
    /// provisioning happens inside core creation and the core holds no
    /// records yet.
    pub async fn create(
        &self,
        resource_id: &str,
        fields: &[Field],
    ) -> Result<bool, SolrSearchError> {
        let _guard = self.lock_core(resource_id).await;
        let conn = CoreLifecycleManager::new(&self.client)
            .ensure_core(resource_id, fields)
            .await?;
        SchemaSynchronizer::new(&self.client)
            .synchronize(&conn, fields)
            .await
    }

    /// Index records into a table's core, provisioning it on demand from the
    /// data source's current fields.
    pub async fn upsert(
        &self,
        resource_id: &str,
        records: &[Record],
    ) -> Result<(), SolrSearchError> {
        let _guard = self.lock_core(resource_id).await;
        RecordIndexer::new(&self.client)
            .upsert(resource_id, records, self.source.as_ref())
            .await
    }

    /// Query a table's records. Not implemented by this backend.
    pub async fn search(
        &self,
        resource_id: &str,
        _query: &str,
    ) -> Result<serde_json::Value, SolrSearchError> {
        debug!(resource_id, "Search requested but not implemented");
        Err(SolrSearchError::SearchNotImplemented)
    }

    /// Remove records matching `filters`, or wipe and unload the whole core
    /// when `filters` is empty.
    pub async fn delete(
        &self,
        resource_id: &str,
        filters: &BTreeMap<String, String>,
    ) -> Result<(), SolrSearchError> {
        let _guard = self.lock_core(resource_id).await;
        RecordEraser::new(&self.client)
            .remove(resource_id, filters)
            .await
    }

    async fn lock_core(&self, resource_id: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let core = self.config().core_name(resource_id);
        self.locks.lock_for(&core).lock_owned().await
    }
}
