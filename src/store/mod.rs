//! Object stores the encoded document is uploaded to

mod credentials;
mod local;
mod memory;
mod s3;
pub mod signer;

use crate::error::ExportError;

pub use credentials::{region_from_env, AwsCredentials, AWS_DEFAULT_REGION};
pub use local::LocalFsStore;
pub use memory::{MemoryStore, StoredObject};
pub use s3::S3Store;

/// A single whole-object write
#[derive(Debug, Clone, Copy)]
pub struct PutObject<'a> {
    pub bucket: &'a str,
    pub key: &'a str,
    pub body: &'a [u8],
    pub content_type: &'a str,
}

/// Trait for upload targets. A put replaces any object already at the path.
pub trait ObjectStore {
    /// Write the object in one request
    fn put_object(&mut self, request: &PutObject<'_>) -> Result<(), ExportError>;

    /// Human-readable location of an object, for reports
    fn location(&self, bucket: &str, key: &str) -> String;
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn put_object(&mut self, request: &PutObject<'_>) -> Result<(), ExportError> {
        (**self).put_object(request)
    }

    fn location(&self, bucket: &str, key: &str) -> String {
        (**self).location(bucket, key)
    }
}

/// Reject object keys that would be rewritten by path normalization
pub fn validate_object_key(key: &str) -> Result<(), ExportError> {
    if key.is_empty() {
        return Err(ExportError::InvalidObjectKey("key is empty".to_string()));
    }
    if key.starts_with('/') {
        return Err(ExportError::InvalidObjectKey(format!("{:?} is absolute", key)));
    }
    if key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err(ExportError::InvalidObjectKey(format!(
            "{:?} has an empty, '.' or '..' segment",
            key
        )));
    }
    Ok(())
}
