//! Solr transport client.
//!
//! All network concerns for one endpoint live here: core health probes, the
//! core-scoped schema and update APIs, and the cluster-level core admin API.
//! Each method is a single remote call; nothing is batched or retried.

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use solrsync_types::{IndexField, Record};

use crate::config::SolrConfig;
use crate::error::{truncate_message, ClientError, FieldOp};

/// A verified connection to one core.
///
/// Produced by [`SolrClient::connect`] after a successful ping; required by
/// all core-scoped calls so they cannot run against an unprobed core name.
#[derive(Debug, Clone)]
pub struct CoreConnection {
    core: String,
}

impl CoreConnection {
    pub fn core(&self) -> &str {
        &self.core
    }
}

/// HTTP client for one Solr endpoint.
pub struct SolrClient {
    http: Client,
    config: SolrConfig,
}

impl SolrClient {
    /// Build a client; the configured timeout applies to every call.
    pub fn new(config: SolrConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SolrConfig {
        &self.config
    }

    fn core_url(&self, core: &str, path: &str) -> String {
        format!("{}/solr/{}/{}", self.config.url, core, path)
    }

    fn admin_url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.config.url, endpoint)
    }

    /// Probe a core's health.
    ///
    /// `Ok(true)` when the engine answers with ping status OK; `Ok(false)`
    /// when the engine answers but the core is missing or unhealthy. Only a
    /// transport-level failure is an `Err` - absence is an expected outcome
    /// that drives core creation, not an error.
    pub async fn ping(&self, core: &str) -> Result<bool, ClientError> {
        let url = self.core_url(core, "admin/ping?wt=json");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                url: url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            debug!(core, status = %response.status(), "Ping answered non-OK, treating core as absent");
            return Ok(false);
        }

        let body: Value = response.json().await.map_err(|e| ClientError::Protocol {
            url,
            message: e.to_string(),
        })?;
        Ok(body.get("status").and_then(Value::as_str) == Some("OK"))
    }

    /// Connect to a core; `None` when the core does not exist.
    pub async fn connect(&self, core: &str) -> Result<Option<CoreConnection>, ClientError> {
        if self.ping(core).await? {
            debug!(core, "Connected to core");
            Ok(Some(CoreConnection {
                core: core.to_string(),
            }))
        } else {
            Ok(None)
        }
    }

    /// Read a core's live schema fields.
    pub async fn read_schema(&self, conn: &CoreConnection) -> Result<Vec<IndexField>, ClientError> {
        let url = self.core_url(conn.core(), "schema/fields");
        let schema_err = |message: String| ClientError::SchemaRead {
            core: conn.core().to_string(),
            message: truncate_message(&message),
        };

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| schema_err(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(schema_err(format!("HTTP {status}: {body}")));
        }

        let body: Value = response.json().await.map_err(|e| schema_err(e.to_string()))?;
        let fields = body
            .get("fields")
            .cloned()
            .ok_or_else(|| schema_err("response has no 'fields' key".to_string()))?;
        serde_json::from_value(fields).map_err(|e| schema_err(e.to_string()))
    }

    /// Add a new field to a core's schema.
    pub async fn add_field(
        &self,
        conn: &CoreConnection,
        field: &IndexField,
    ) -> Result<(), ClientError> {
        debug!(core = conn.core(), field = %field.name, field_type = %field.type_, "Adding schema field");
        self.schema_post(conn, FieldOp::Add, &field.name, json!({ "add-field": field }))
            .await
    }

    /// Replace an existing field's definition.
    pub async fn replace_field(
        &self,
        conn: &CoreConnection,
        field: &IndexField,
    ) -> Result<(), ClientError> {
        debug!(core = conn.core(), field = %field.name, field_type = %field.type_, "Replacing schema field");
        self.schema_post(
            conn,
            FieldOp::Update,
            &field.name,
            json!({ "replace-field": field }),
        )
        .await
    }

    /// Delete a field from a core's schema.
    pub async fn delete_field(&self, conn: &CoreConnection, name: &str) -> Result<(), ClientError> {
        debug!(core = conn.core(), field = name, "Deleting schema field");
        self.schema_post(
            conn,
            FieldOp::Remove,
            name,
            json!({ "delete-field": { "name": name } }),
        )
        .await
    }

    /// One schema-mutation POST. Solr reports failures both as non-2xx
    /// statuses and as an `error` key inside a 200 response; both map to
    /// `SchemaWrite`.
    async fn schema_post(
        &self,
        conn: &CoreConnection,
        op: FieldOp,
        field: &str,
        body: Value,
    ) -> Result<(), ClientError> {
        let url = self.core_url(conn.core(), "schema");
        let write_err = |message: String| ClientError::SchemaWrite {
            core: conn.core().to_string(),
            field: field.to_string(),
            op,
            message: truncate_message(&message),
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| write_err(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(write_err(format!("HTTP {status}: {text}")));
        }
        if let Some(message) = error_message(&text) {
            return Err(write_err(message));
        }
        Ok(())
    }

    /// Add documents to a core. With `commit=false` the documents stay
    /// invisible until a later commit.
    pub async fn add_documents(
        &self,
        conn: &CoreConnection,
        records: &[Record],
        commit: bool,
    ) -> Result<(), ClientError> {
        debug!(core = conn.core(), count = records.len(), commit, "Adding documents");
        self.update_post(conn, &[("commit", commit.to_string())], json!(records))
            .await
    }

    /// Delete every document matching `query`.
    pub async fn delete_by_query(
        &self,
        conn: &CoreConnection,
        query: &str,
        commit: bool,
    ) -> Result<(), ClientError> {
        debug!(core = conn.core(), query, commit, "Deleting by query");
        self.update_post(
            conn,
            &[("commit", commit.to_string())],
            json!({ "delete": { "query": query } }),
        )
        .await
    }

    /// Commit pending document writes.
    ///
    /// With `wait_searcher=false` the call returns before a new searcher is
    /// open, so visibility of prior writes is deferred.
    pub async fn commit(&self, conn: &CoreConnection, wait_searcher: bool) -> Result<(), ClientError> {
        debug!(core = conn.core(), wait_searcher, "Committing");
        self.update_post(
            conn,
            &[
                ("commit", "true".to_string()),
                ("waitSearcher", wait_searcher.to_string()),
            ],
            json!({}),
        )
        .await
    }

    /// One update-API POST; failures map to `IndexWrite`.
    async fn update_post(
        &self,
        conn: &CoreConnection,
        params: &[(&str, String)],
        body: Value,
    ) -> Result<(), ClientError> {
        let url = self.core_url(conn.core(), "update");
        let write_err = |message: String| ClientError::IndexWrite {
            core: conn.core().to_string(),
            message: truncate_message(&message),
        };

        let response = self
            .http
            .post(&url)
            .query(params)
            .json(&body)
            .send()
            .await
            .map_err(|e| write_err(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(write_err(format!("HTTP {status}: {text}")));
        }
        if let Some(message) = error_message(&text) {
            return Err(write_err(message));
        }
        Ok(())
    }

    /// Create a core from the configured config set (cluster admin API).
    pub async fn create_core(&self, name: &str) -> Result<(), ClientError> {
        debug!(core = name, config_set = %self.config.config_set, "Creating core");
        let body = json!({
            "create": [{ "name": name, "configSet": self.config.config_set }]
        });
        self.admin_post("cores", Some(body)).await
    }

    /// Unload a core (cluster admin API). The core's name becomes unknown to
    /// the engine; its on-disk state is left to the engine's own policy.
    pub async fn unload_core(&self, name: &str) -> Result<(), ClientError> {
        warn!(core = name, "Unloading core");
        self.admin_post(&format!("cores/{name}/unload"), None).await
    }

    /// One admin-API POST; engine-reported and HTTP-level failures map to
    /// `Admin`.
    async fn admin_post(&self, endpoint: &str, body: Option<Value>) -> Result<(), ClientError> {
        let url = self.admin_url(endpoint);
        let mut request = self.http.post(&url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(|e| ClientError::Transport {
            url: url.clone(),
            source: e,
        })?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = error_message(&text).unwrap_or_else(|| format!("HTTP {status}: {text}"));
            return Err(ClientError::Admin {
                message: truncate_message(&message),
            });
        }
        if let Some(message) = error_message(&text) {
            return Err(ClientError::Admin { message });
        }
        Ok(())
    }
}

/// Extract the engine's `error.msg` from a response body, if present.
fn error_message(text: &str) -> Option<String> {
    let body: Value = serde_json::from_str(text).ok()?;
    let error = body.get("error")?;
    let message = error
        .get("msg")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());
    Some(truncate_message(&message))
}
