//! Error types for the Solr engine.
//!
//! Two layers: `ClientError` covers transport and wire-protocol failures of
//! individual remote calls; `SolrSearchError` is the operation-level taxonomy
//! surfaced by the engine components. Every variant keeps enough structured
//! context (core name, field name) for logging even when the user-facing
//! rendering is generic.

use thiserror::Error;

use solrsync_types::UnsupportedType;

use crate::indexer::SourceError;

/// Upper bound on raw backend error text surfaced in debug mode.
pub const MAX_ERR_LEN: usize = 1000;

/// Which schema mutation a write error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    Add,
    Update,
    Remove,
}

impl std::fmt::Display for FieldOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FieldOp::Add => "add",
            FieldOp::Update => "update",
            FieldOp::Remove => "remove",
        })
    }
}

/// Failures of individual remote calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed from the configuration.
    #[error("could not build HTTP client: {0}")]
    Config(String),

    /// The transport layer failed (connection, timeout, TLS).
    #[error("transport error calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The engine answered with something we could not interpret.
    #[error("unexpected response from {url}: {message}")]
    Protocol { url: String, message: String },

    /// Reading a core's live schema failed.
    #[error("could not read schema of core {core}: {message}")]
    SchemaRead { core: String, message: String },

    /// A single field-level schema mutation failed.
    #[error("could not {op} field {field} on schema of core {core}: {message}")]
    SchemaWrite {
        core: String,
        field: String,
        op: FieldOp,
        message: String,
    },

    /// A document add, delete, or commit failed.
    #[error("index write failed on core {core}: {message}")]
    IndexWrite { core: String, message: String },

    /// A cluster-level administrative call failed.
    #[error("core admin call failed: {message}")]
    Admin { message: String },
}

/// Operation-level errors surfaced by the engine components.
#[derive(Debug, Error)]
pub enum SolrSearchError {
    /// A desired field's native type has no index mapping. Raised before any
    /// remote mutation.
    #[error(transparent)]
    UnsupportedType(#[from] UnsupportedType),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// The administrative create call for a missing core failed.
    #[error("could not create core {core}: {message}")]
    CoreCreate { core: String, message: String },

    /// The core could not be reached even after a creation attempt.
    #[error("could not connect to core {core}")]
    CoreUnavailable { core: String },

    /// No usable connection for indexing records.
    #[error("failed to index records for core {core}")]
    IndexUnavailable { core: String },

    /// The data-source read collaborator failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// `search` is outside this engine's scope.
    #[error("search is not implemented by this backend")]
    SearchNotImplemented,
}

/// Truncate raw backend text to [`MAX_ERR_LEN`], on a char boundary.
pub(crate) fn truncate_message(message: &str) -> String {
    if message.len() <= MAX_ERR_LEN {
        return message.to_string();
    }
    let mut end = MAX_ERR_LEN;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message[..end].to_string()
}

impl SolrSearchError {
    /// Render this error for users.
    ///
    /// With `debug` enabled the raw backend message (truncated) is shown;
    /// otherwise a generic, operation-scoped message that hides backend
    /// internals. Structured context stays on the variant for logging.
    pub fn user_message(&self, debug: bool) -> String {
        if debug {
            return truncate_message(&self.to_string());
        }
        match self {
            SolrSearchError::UnsupportedType(err) => {
                format!("Unsupported field type '{}'", err.native)
            }
            SolrSearchError::Client(err) => match err {
                ClientError::SchemaRead { core, .. } => {
                    format!("Could not read search schema for core {core}")
                }
                ClientError::SchemaWrite {
                    core, field, op, ..
                } => format!("Could not {op} field {field} on search schema {core}"),
                ClientError::IndexWrite { core, .. } => {
                    format!("Could not update records in core {core}")
                }
                ClientError::Admin { .. }
                | ClientError::Transport { .. }
                | ClientError::Protocol { .. }
                | ClientError::Config(_) => "Search backend request failed".to_string(),
            },
            SolrSearchError::CoreCreate { core, .. } => {
                format!("Could not create core {core}")
            }
            SolrSearchError::CoreUnavailable { core } => {
                format!("Could not connect to core {core}")
            }
            SolrSearchError::IndexUnavailable { core } => {
                format!("Failed to index records for {core}")
            }
            SolrSearchError::Source(err) => {
                format!("Could not read fields for resource {}", err.resource_id)
            }
            SolrSearchError::SearchNotImplemented => {
                "Search is not available for this resource".to_string()
            }
        }
    }
}
