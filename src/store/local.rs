//! Local directory laid out as `{root}/{bucket}/{key}`, or `{root}/{key}`
//! for the root bucket

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::ExportError;

use super::{validate_object_key, ObjectStore, PutObject};

/// Writes objects under a root directory.
///
/// Each put goes to a temporary file next to the target and is renamed over
/// it, so readers never observe a half-written object.
#[derive(Debug, Clone)]
pub struct LocalFsStore {
    root: PathBuf,
}

impl LocalFsStore {
    /// Bucket name that maps to the root directory itself
    pub const ROOT_BUCKET: &'static str = ".";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of an object
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        let base = if bucket == Self::ROOT_BUCKET {
            self.root.clone()
        } else {
            self.root.join(bucket)
        };
        key.split('/').fold(base, |path, segment| path.join(segment))
    }
}

impl ObjectStore for LocalFsStore {
    fn put_object(&mut self, request: &PutObject<'_>) -> Result<(), ExportError> {
        validate_object_key(request.key)?;
        if request.bucket.is_empty() || request.bucket.contains(['/', '\\']) || request.bucket == ".." {
            return Err(ExportError::Config(format!("Invalid bucket name: {:?}", request.bucket)));
        }

        let path = self.object_path(request.bucket, request.key);
        let parent = path
            .parent()
            .ok_or_else(|| ExportError::InvalidObjectKey(request.key.to_string()))?;
        std::fs::create_dir_all(parent)?;

        let mut file = NamedTempFile::new_in(parent)?;
        file.write_all(request.body)?;
        file.persist(&path).map_err(|e| e.error)?;

        info!(path = %path.display(), bytes = request.body.len(), "Wrote object");
        Ok(())
    }

    fn location(&self, bucket: &str, key: &str) -> String {
        self.object_path(bucket, key).display().to_string()
    }
}
