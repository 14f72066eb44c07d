//! In-process key-value source

use globset::GlobBuilder;
use indexmap::{IndexMap, IndexSet};

use crate::error::ExportError;

use super::KeyValueSource;

/// Key-value source backed by an insertion-ordered map.
///
/// Keys can be marked as vanished (listed, but gone by the time of the GET)
/// or failing (the GET errors), to exercise the fetch paths.
#[derive(Debug, Default)]
pub struct MemorySource {
    entries: IndexMap<Vec<u8>, Vec<u8>>,
    vanished: IndexSet<String>,
    failing: IndexSet<String>,
    gets: usize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder form)
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add a key whose name is arbitrary bytes, with an empty value
    pub fn with_raw_key(mut self, key: Vec<u8>) -> Self {
        self.entries.insert(key, Vec::new());
        self
    }

    /// Keep the key in listings but answer its GET with nil
    pub fn with_vanished(mut self, key: impl Into<String>) -> Self {
        self.vanished.insert(key.into());
        self
    }

    /// Make the GET for this key fail
    pub fn with_failing(mut self, key: impl Into<String>) -> Self {
        self.failing.insert(key.into());
        self
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.insert(key.into().into_bytes(), value.into());
    }

    /// Delete an entry
    pub fn remove(&mut self, key: &str) -> Option<Vec<u8>> {
        self.entries.shift_remove(key.as_bytes())
    }

    /// Number of GETs served so far
    pub fn gets_issued(&self) -> usize {
        self.gets
    }
}

impl KeyValueSource for MemorySource {
    fn keys(&mut self, pattern: &str) -> Result<Vec<Vec<u8>>, ExportError> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .map_err(|e| ExportError::Config(format!("Invalid key pattern {:?}: {}", pattern, e)))?
            .compile_matcher();

        Ok(self
            .entries
            .keys()
            .filter(|k| matcher.is_match(&*String::from_utf8_lossy(k)))
            .cloned()
            .collect())
    }

    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, ExportError> {
        self.gets += 1;

        if self.failing.contains(key) {
            return Err(ExportError::Fetch {
                key: key.to_string(),
                source: redis::RedisError::from((
                    redis::ErrorKind::ResponseError,
                    "injected failure",
                )),
            });
        }
        if self.vanished.contains(key) {
            return Ok(None);
        }

        Ok(self.entries.get(key.as_bytes()).cloned())
    }
}
