//! In-process object store

use indexmap::IndexMap;

use crate::error::ExportError;

use super::{validate_object_key, ObjectStore, PutObject};

/// An object as it was last written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// Keeps objects in a map keyed by `(bucket, key)`
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: IndexMap<(String, String), StoredObject>,
    puts: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<&StoredObject> {
        self.objects.get(&(bucket.to_string(), key.to_string()))
    }

    /// Number of objects currently stored
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of puts accepted so far
    pub fn puts(&self) -> usize {
        self.puts
    }
}

impl ObjectStore for MemoryStore {
    fn put_object(&mut self, request: &PutObject<'_>) -> Result<(), ExportError> {
        validate_object_key(request.key)?;
        self.puts += 1;
        self.objects.insert(
            (request.bucket.to_string(), request.key.to_string()),
            StoredObject {
                body: request.body.to_vec(),
                content_type: request.content_type.to_string(),
            },
        );
        Ok(())
    }

    fn location(&self, bucket: &str, key: &str) -> String {
        format!("memory://{}/{}", bucket, key)
    }
}
