//! Key-value sources: enumerate keys, then fetch each value

mod memory;
mod redis;

use tracing::{debug, info, warn};

use crate::config::{ExportConfig, KeyOrder, MissingValuePolicy};
use crate::error::ExportError;
use crate::model::KeyValueEntry;

pub use self::memory::MemorySource;
pub use self::redis::RedisSource;

/// A store that can list its keys and read values one at a time
pub trait KeyValueSource {
    /// List every key matching a glob-style pattern, as raw bytes
    fn keys(&mut self, pattern: &str) -> Result<Vec<Vec<u8>>, ExportError>;

    /// Read one value. `Ok(None)` means the key no longer exists.
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, ExportError>;
}

impl<T: KeyValueSource + ?Sized> KeyValueSource for Box<T> {
    fn keys(&mut self, pattern: &str) -> Result<Vec<Vec<u8>>, ExportError> {
        (**self).keys(pattern)
    }

    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, ExportError> {
        (**self).get(key)
    }
}

/// List keys, decode them, and apply the configured ordering
pub fn enumerate_keys(
    source: &mut dyn KeyValueSource,
    pattern: &str,
    order: KeyOrder,
) -> Result<Vec<String>, ExportError> {
    let mut raw = source.keys(pattern)?;
    if order == KeyOrder::Sorted {
        raw.sort();
    }

    let keys = raw
        .into_iter()
        .map(|bytes| {
            String::from_utf8(bytes).map_err(|e| ExportError::InvalidKey {
                lossy: String::from_utf8_lossy(e.as_bytes()).into_owned(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(pattern, count = keys.len(), "Enumerated keys");
    Ok(keys)
}

/// Fetch every key in order, one GET at a time
pub fn fetch_all(
    source: &mut dyn KeyValueSource,
    keys: Vec<String>,
    policy: MissingValuePolicy,
) -> Result<Vec<KeyValueEntry>, ExportError> {
    let mut entries = Vec::with_capacity(keys.len());

    for key in keys {
        match source.get(&key)? {
            Some(value) => {
                debug!(key = %key, bytes = value.len(), "Fetched value");
                entries.push(KeyValueEntry {
                    key,
                    value: Some(value),
                });
            }
            None => match policy {
                MissingValuePolicy::EmptyCell => {
                    warn!(key = %key, "Key vanished before fetch, writing empty cell");
                    entries.push(KeyValueEntry::missing(key));
                }
                MissingValuePolicy::Abort => return Err(ExportError::MissingValue { key }),
            },
        }
    }

    Ok(entries)
}

/// Enumerate and fetch according to the config
pub fn extract(
    source: &mut dyn KeyValueSource,
    config: &ExportConfig,
) -> Result<Vec<KeyValueEntry>, ExportError> {
    let keys = enumerate_keys(source, &config.key_pattern, config.key_order)?;
    fetch_all(source, keys, config.missing_values)
}
