//! redis2csv - Export a Redis keyspace to CSV in object storage
//!
//! Enumerates every key matching a pattern, fetches each value with one GET,
//! lays the entries out as a CSV table and writes the document as a single
//! object to S3 (or an S3-compatible endpoint, or a local directory).

pub mod config;
pub mod encode;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod store;

pub use config::ExportConfig;
pub use error::ExportError;
pub use pipeline::{ExportPipeline, ExportReport};
