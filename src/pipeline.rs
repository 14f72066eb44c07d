//! The export run: enumerate, fetch, encode, upload

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::config::{ExportConfig, Layout};
use crate::encode::encode_document;
use crate::error::ExportError;
use crate::model::{CsvDocument, KeyValueEntry};
use crate::source::{extract, KeyValueSource};
use crate::store::{ObjectStore, PutObject};

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportReport {
    pub keys: usize,
    pub missing_values: usize,
    pub columns: usize,
    pub rows: usize,
    pub bytes: usize,
    pub layout: Layout,
    pub location: String,
    pub elapsed_ms: u64,
}

/// One source, one store, one config
pub struct ExportPipeline<S, O> {
    config: ExportConfig,
    source: S,
    store: O,
}

impl<S: KeyValueSource, O: ObjectStore> ExportPipeline<S, O> {
    pub fn new(config: ExportConfig, source: S, store: O) -> Self {
        Self {
            config,
            source,
            store,
        }
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn store(&self) -> &O {
        &self.store
    }

    /// Enumerate and fetch every key
    pub fn extract(&mut self) -> Result<Vec<KeyValueEntry>, ExportError> {
        extract(&mut self.source, &self.config)
    }

    /// Write a document to the configured bucket and key
    pub fn upload(&mut self, document: &CsvDocument) -> Result<String, ExportError> {
        self.store.put_object(&PutObject {
            bucket: &self.config.bucket,
            key: &self.config.object_key,
            body: &document.bytes,
            content_type: &self.config.content_type,
        })?;
        Ok(self.store.location(&self.config.bucket, &self.config.object_key))
    }

    /// Run every stage. Nothing is uploaded unless all earlier stages succeed.
    pub fn run(&mut self) -> Result<ExportReport, ExportError> {
        self.config.validate()?;
        let started = Instant::now();

        let entries = self.extract()?;
        let document = encode_document(&entries, self.config.layout)?;
        let location = self.upload(&document)?;

        let report = ExportReport {
            keys: entries.len(),
            missing_values: entries.iter().filter(|e| e.is_missing()).count(),
            columns: document.columns,
            rows: document.rows,
            bytes: document.len(),
            layout: self.config.layout,
            location,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            keys = report.keys,
            missing = report.missing_values,
            bytes = report.bytes,
            location = %report.location,
            "Export finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingValuePolicy;
    use crate::source::MemorySource;
    use crate::store::MemoryStore;

    fn pipeline(source: MemorySource) -> ExportPipeline<MemorySource, MemoryStore> {
        ExportPipeline::new(ExportConfig::new("elasticache-exports"), source, MemoryStore::new())
    }

    fn uploaded(p: &ExportPipeline<MemorySource, MemoryStore>) -> String {
        let object = p.store().get("elasticache-exports", "redis_data").unwrap();
        assert_eq!(object.content_type, "text/csv");
        String::from_utf8(object.body.clone()).unwrap()
    }

    #[test]
    fn test_run_uploads_sparse_document() {
        let mut p = pipeline(MemorySource::new().with_entry("b", "2").with_entry("a", "1"));
        let report = p.run().unwrap();

        assert_eq!(uploaded(&p), "a,b\r\n1,\r\n,2\r\n");
        assert_eq!(report.keys, 2);
        assert_eq!(report.columns, 2);
        assert_eq!(report.rows, 2);
        assert_eq!(report.missing_values, 0);
        assert_eq!(report.location, "memory://elasticache-exports/redis_data");
    }

    #[test]
    fn test_empty_store() {
        let mut p = pipeline(MemorySource::new());
        let report = p.run().unwrap();
        assert_eq!(uploaded(&p), "\r\n");
        assert_eq!((report.columns, report.rows), (0, 0));
    }

    #[test]
    fn test_repeat_runs_are_byte_identical() {
        let source = MemorySource::new()
            .with_entry("z", "26")
            .with_entry("m", "13")
            .with_entry("a", "1");
        let mut p = pipeline(source);

        p.run().unwrap();
        let first = uploaded(&p);
        p.run().unwrap();
        assert_eq!(uploaded(&p), first);
        assert_eq!(p.store().puts(), 2);
    }

    #[test]
    fn test_rerun_overwrites_previous_object() {
        let mut p = pipeline(MemorySource::new().with_entry("a", "1").with_entry("b", "2"));
        p.run().unwrap();

        p.source_mut().remove("a");
        p.source_mut().insert("c", "3");
        p.run().unwrap();

        assert_eq!(uploaded(&p), "b,c\r\n2,\r\n,3\r\n");
        assert_eq!(p.store().len(), 1);
    }

    #[test]
    fn test_vanished_key_is_empty_cell() {
        let mut p = pipeline(
            MemorySource::new()
                .with_entry("a", "1")
                .with_entry("b", "2")
                .with_vanished("a"),
        );
        let report = p.run().unwrap();
        assert_eq!(uploaded(&p), "a,b\r\n,\r\n,2\r\n");
        assert_eq!(report.missing_values, 1);
    }

    #[test]
    fn test_vanished_key_aborts_without_upload() {
        let source = MemorySource::new().with_entry("a", "1").with_vanished("a");
        let config = ExportConfig::new("elasticache-exports").with_missing_values(MissingValuePolicy::Abort);
        let mut p = ExportPipeline::new(config, source, MemoryStore::new());

        assert!(matches!(p.run(), Err(ExportError::MissingValue { .. })));
        assert!(p.store().is_empty());
    }

    #[test]
    fn test_failed_fetch_uploads_nothing() {
        let mut p = pipeline(
            MemorySource::new()
                .with_entry("a", "1")
                .with_entry("b", "2")
                .with_failing("b"),
        );
        assert!(matches!(p.run(), Err(ExportError::Fetch { .. })));
        assert_eq!(p.store().puts(), 0);
    }

    #[test]
    fn test_key_value_layout_and_custom_destination() {
        let config = ExportConfig::new("bucket")
            .with_object_key("exports/redis.csv")
            .with_content_type("text/csv; charset=utf-8")
            .with_layout(Layout::KeyValue)
            .with_key_pattern("user:*");
        let source = MemorySource::new()
            .with_entry("user:1", "alice")
            .with_entry("cache:1", "ignored");
        let mut p = ExportPipeline::new(config, source, MemoryStore::new());
        p.run().unwrap();

        let object = p.store().get("bucket", "exports/redis.csv").unwrap();
        assert_eq!(object.body, b"key,value\r\nuser:1,alice\r\n");
        assert_eq!(object.content_type, "text/csv; charset=utf-8");
    }

    #[test]
    fn test_invalid_config_touches_nothing() {
        let mut p = ExportPipeline::new(
            ExportConfig::default(),
            MemorySource::new().with_entry("a", "1"),
            MemoryStore::new(),
        );
        assert!(matches!(p.run(), Err(ExportError::Config(_))));
        assert_eq!(p.source_mut().gets_issued(), 0);
    }
}
