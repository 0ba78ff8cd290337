//! Core lifecycle: creation, provisioning, teardown, and per-core locking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use solrsync_types::Field;

use crate::client::{CoreConnection, SolrClient};
use crate::error::{ClientError, SolrSearchError};
use crate::schema::SchemaSynchronizer;

/// Registry of per-core async locks.
///
/// Two concurrent `ensure_core` calls for the same table would race to
/// create the same core, and interleaved synchronizations can apply a diff
/// inconsistently; the facade serializes mutating operations per core name
/// through this registry. In-process only.
#[derive(Default)]
pub struct CoreLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl CoreLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or create) the lock guarding one core.
    pub fn lock_for(&self, core: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(core.to_string()).or_default().clone()
    }
}

/// Creates cores on demand, provisions their schemas, and tears them down.
pub struct CoreLifecycleManager<'a> {
    client: &'a SolrClient,
}

impl<'a> CoreLifecycleManager<'a> {
    pub fn new(client: &'a SolrClient) -> Self {
        Self { client }
    }

    /// Core name for a table.
    pub fn core_name(&self, resource_id: &str) -> String {
        self.client.config().core_name(resource_id)
    }

    /// Connect to a table's core, creating and provisioning it if absent.
    ///
    /// A freshly created core carries only the config set's default fields,
    /// so provisioning is an add-only synchronization against `desired`.
    /// An existing core is returned as-is; evolving its schema is the
    /// caller's decision.
    pub async fn ensure_core(
        &self,
        resource_id: &str,
        desired: &[Field],
    ) -> Result<CoreConnection, SolrSearchError> {
        let core = self.core_name(resource_id);
        if let Some(conn) = self.client.connect(&core).await? {
            return Ok(conn);
        }

        info!(core = %core, "Core absent, creating");
        self.client.create_core(&core).await.map_err(|e| match e {
            ClientError::Admin { message } => SolrSearchError::CoreCreate {
                core: core.clone(),
                message,
            },
            other => SolrSearchError::from(other),
        })?;

        let conn = self
            .client
            .connect(&core)
            .await?
            .ok_or_else(|| SolrSearchError::CoreUnavailable { core: core.clone() })?;

        SchemaSynchronizer::new(self.client)
            .synchronize(&conn, desired)
            .await?;
        Ok(conn)
    }

    /// Destroy a table's core: wipe all documents, commit, unload.
    ///
    /// Dropping a core that does not exist is a success. Failure at either
    /// step aborts with that step's error; there is no compensating action,
    /// so a failed unload leaves an empty but loaded core.
    pub async fn drop_core(&self, resource_id: &str) -> Result<(), SolrSearchError> {
        let core = self.core_name(resource_id);
        let Some(conn) = self.client.connect(&core).await? else {
            debug!(core = %core, "Core already absent, nothing to drop");
            return Ok(());
        };

        info!(core = %core, "Dropping core");
        self.client.delete_by_query(&conn, "*:*", false).await?;
        self.client.commit(&conn, false).await?;
        self.client.unload_core(&core).await?;
        Ok(())
    }
}
