//! Record indexing.
//!
//! Upserts records into a table's core, lazily provisioning the core from
//! the data source's current column definitions when it does not exist yet.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use solrsync_types::{is_default_field, Field, Record};

use crate::client::{CoreConnection, SolrClient};
use crate::error::SolrSearchError;
use crate::lifecycle::CoreLifecycleManager;

/// The data-source read collaborator failed.
#[derive(Debug, Error)]
#[error("could not read fields for resource {resource_id}: {message}")]
pub struct SourceError {
    pub resource_id: String,
    pub message: String,
}

/// Read boundary to the tabular data source.
///
/// Used to fetch a table's current column definitions when a core has to be
/// provisioned lazily on first upsert.
#[async_trait]
pub trait TableFieldSource: Send + Sync {
    async fn table_fields(&self, resource_id: &str) -> Result<Vec<Field>, SourceError>;
}

/// Upserts records into an existing or lazily created core.
pub struct RecordIndexer<'a> {
    client: &'a SolrClient,
}

impl<'a> RecordIndexer<'a> {
    pub fn new(client: &'a SolrClient) -> Self {
        Self { client }
    }

    /// Index `records` into the table's core.
    ///
    /// Documents are added one call each with the commit deferred; the first
    /// failing document aborts the rest of the batch. On full success one
    /// deferred commit is issued, so new documents are not guaranteed to be
    /// visible to reads immediately after this returns.
    pub async fn upsert(
        &self,
        resource_id: &str,
        records: &[Record],
        source: &dyn TableFieldSource,
    ) -> Result<(), SolrSearchError> {
        let core = self.client.config().core_name(resource_id);
        let conn = match self.client.connect(&core).await? {
            Some(conn) => conn,
            None => self.provision(resource_id, &core, source).await?,
        };

        if records.is_empty() {
            debug!(core = conn.core(), "No records to index");
            return Ok(());
        }

        for record in records {
            self.client
                .add_documents(&conn, std::slice::from_ref(record), false)
                .await?;
        }
        self.client.commit(&conn, false).await?;
        info!(core = conn.core(), count = records.len(), "Indexed records");
        Ok(())
    }

    /// Create the core shaped after the table's current columns.
    async fn provision(
        &self,
        resource_id: &str,
        core: &str,
        source: &dyn TableFieldSource,
    ) -> Result<CoreConnection, SolrSearchError> {
        debug!(core, resource_id, "Core absent, provisioning from table fields");
        let fields: Vec<Field> = source
            .table_fields(resource_id)
            .await?
            .into_iter()
            .filter(|f| !is_default_field(&f.id))
            .collect();

        CoreLifecycleManager::new(self.client)
            .ensure_core(resource_id, &fields)
            .await
            .map_err(|e| match e {
                SolrSearchError::CoreUnavailable { core } => {
                    SolrSearchError::IndexUnavailable { core }
                }
                other => other,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolrConfig;
    use serde_json::json;
    use solrsync_types::record_from_pairs;
    use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FakeSource {
        fields: Vec<Field>,
    }

    #[async_trait]
    impl TableFieldSource for FakeSource {
        async fn table_fields(&self, _resource_id: &str) -> Result<Vec<Field>, SourceError> {
            Ok(self.fields.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TableFieldSource for FailingSource {
        async fn table_fields(&self, resource_id: &str) -> Result<Vec<Field>, SourceError> {
            Err(SourceError {
                resource_id: resource_id.to_string(),
                message: "datastore offline".to_string(),
            })
        }
    }

    fn client_for(server: &MockServer) -> SolrClient {
        SolrClient::new(SolrConfig::new(server.uri()).with_prefix("ds_")).unwrap()
    }

    fn ok_body() -> serde_json::Value {
        json!({"responseHeader": {"status": 0}})
    }

    async fn mock_ping_ok(server: &MockServer, core: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/solr/{core}/admin/ping")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_upsert_into_existing_core() {
        let server = MockServer::start().await;
        mock_ping_ok(&server, "ds_abc").await;
        // One deferred add per record, then a single deferred commit.
        Mock::given(method("POST"))
            .and(path("/solr/ds_abc/update"))
            .and(query_param("commit", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/solr/ds_abc/update"))
            .and(query_param("commit", "true"))
            .and(query_param("waitSearcher", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let records = vec![
            record_from_pairs([("_id", 1), ("age", 42)]),
            record_from_pairs([("_id", 2), ("age", 7)]),
        ];
        RecordIndexer::new(&client)
            .upsert("abc", &records, &FakeSource { fields: vec![] })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upsert_empty_records_issues_no_writes() {
        let server = MockServer::start().await;
        mock_ping_ok(&server, "ds_abc").await;
        Mock::given(method("POST"))
            .and(path("/solr/ds_abc/update"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        RecordIndexer::new(&client)
            .upsert("abc", &[], &FakeSource { fields: vec![] })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upsert_provisions_absent_core_from_table_fields() {
        let server = MockServer::start().await;
        // Absent for the upsert probe and the provisioning probe; healthy
        // once the core has been created.
        Mock::given(method("GET"))
            .and(path("/solr/ds_abc/admin/ping"))
            .respond_with(ResponseTemplate::new(404))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/solr/ds_abc/admin/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/cores"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/solr/ds_abc/schema/fields"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fields": [{"name": "_id", "type": "pint"}]
            })))
            .mount(&server)
            .await;
        // Only "age" is added; the source's "_id" column is engine-managed.
        Mock::given(method("POST"))
            .and(path("/solr/ds_abc/schema"))
            .and(body_partial_json(json!({"add-field": {"name": "age", "type": "int"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/solr/ds_abc/update"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let source = FakeSource {
            fields: vec![Field::new("_id", "integer"), Field::new("age", "integer")],
        };
        let records = vec![record_from_pairs([("_id", 1), ("age", 42)])];
        RecordIndexer::new(&client)
            .upsert("abc", &records, &source)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upsert_fails_fast_on_first_bad_document() {
        let server = MockServer::start().await;
        mock_ping_ok(&server, "ds_abc").await;
        let good = record_from_pairs([("_id", 1)]);
        let bad = record_from_pairs([("_id", 2)]);
        let never_sent = record_from_pairs([("_id", 3)]);
        Mock::given(method("POST"))
            .and(path("/solr/ds_abc/update"))
            .and(body_json(json!([good.clone()])))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/solr/ds_abc/update"))
            .and(body_json(json!([bad.clone()])))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/solr/ds_abc/update"))
            .and(body_json(json!([never_sent.clone()])))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(0)
            .mount(&server)
            .await;
        // No commit after a failed batch.
        Mock::given(method("POST"))
            .and(path("/solr/ds_abc/update"))
            .and(query_param("commit", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let records = vec![good, bad, never_sent];
        let err = RecordIndexer::new(&client)
            .upsert("abc", &records, &FakeSource { fields: vec![] })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SolrSearchError::Client(crate::error::ClientError::IndexWrite { .. })
        ));
    }

    #[tokio::test]
    async fn test_upsert_surfaces_source_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/solr/ds_abc/admin/ping"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let records = vec![record_from_pairs([("_id", 1)])];
        let err = RecordIndexer::new(&client)
            .upsert("abc", &records, &FailingSource)
            .await
            .unwrap_err();
        match err {
            SolrSearchError::Source(source) => {
                assert_eq!(source.resource_id, "abc");
                assert!(source.message.contains("offline"));
            }
            other => panic!("expected Source, got {other:?}"),
        }
    }
}
