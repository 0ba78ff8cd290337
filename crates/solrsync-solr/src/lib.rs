//! # solrsync-solr
//!
//! Keeps one Solr core per data-source table synchronized with that table's
//! column definitions, and mediates record ingestion and deletion around the
//! synchronized schema.
//!
//! ## Components
//! - [`SolrClient`]: transport for one Solr endpoint (ping, schema, update,
//!   core admin)
//! - [`SchemaSynchronizer`]: computes and applies the minimal field diff
//!   between a table's desired fields and a core's live schema
//! - [`CoreLifecycleManager`]: creates, provisions, and tears down cores
//! - [`RecordIndexer`]: upserts records, lazily provisioning absent cores
//! - [`RecordEraser`]: deletes records by filter, or wipes and unloads a core
//! - [`SolrBackend`]: thin facade composing the above behind the
//!   create/upsert/search/delete surface
//!
//! Every remote failure aborts the current operation immediately; nothing is
//! retried and partial schema changes are not rolled back. See `synchronize`
//! for the exact semantics.

pub mod backend;
pub mod client;
pub mod config;
pub mod eraser;
pub mod error;
pub mod indexer;
pub mod lifecycle;
pub mod schema;

pub use backend::SolrBackend;
pub use client::{CoreConnection, SolrClient};
pub use config::SolrConfig;
pub use eraser::RecordEraser;
pub use error::{ClientError, FieldOp, SolrSearchError, MAX_ERR_LEN};
pub use indexer::{RecordIndexer, SourceError, TableFieldSource};
pub use lifecycle::{CoreLifecycleManager, CoreLocks};
pub use schema::{compute_diff, SchemaDiff, SchemaSynchronizer};
