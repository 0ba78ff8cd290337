//! Engine configuration.
//!
//! One `SolrConfig` value is threaded explicitly through every component
//! constructor; nothing reads process-global state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Config set template used when creating cores.
const DEFAULT_CONFIG_SET: &str = "datastore_resource";

/// Default per-call transport timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for one Solr endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolrConfig {
    /// Base endpoint, e.g. `http://localhost:8983`.
    pub url: String,

    /// Core-name prefix; a table's core is named `{prefix}{resource_id}`.
    pub prefix: String,

    /// Transport timeout applied uniformly to every remote call.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,

    /// When enabled, raw backend error messages (truncated) are surfaced to
    /// users instead of generic operation-scoped messages.
    pub debug: bool,

    /// Named configuration template new cores are created from.
    pub config_set: String,
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8983".to_string(),
            prefix: "solrsync_".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            debug: false,
            config_set: DEFAULT_CONFIG_SET.to_string(),
        }
    }
}

impl SolrConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Core name for a data-source table.
    pub fn core_name(&self, resource_id: &str) -> String {
        format!("{}{}", self.prefix, resource_id)
    }
}

/// Serialize `Duration` as whole seconds in config files.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolrConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.config_set, "datastore_resource");
        assert!(!config.debug);
    }

    #[test]
    fn test_core_name() {
        let config = SolrConfig::new("http://solr:8983").with_prefix("ds_");
        assert_eq!(config.core_name("abc-123"), "ds_abc-123");
    }

    #[test]
    fn test_builder_setters() {
        let config = SolrConfig::new("http://solr:8983")
            .with_timeout(Duration::from_secs(3))
            .with_debug(true);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.debug);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = SolrConfig::new("http://solr:8983").with_timeout(Duration::from_secs(7));
        let json = serde_json::to_string(&config).unwrap();
        let decoded: SolrConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.url, config.url);
        assert_eq!(decoded.timeout, Duration::from_secs(7));
    }
}
