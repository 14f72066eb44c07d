//! Redis source over a single blocking connection

use tracing::info;

use crate::config::RedisConfig;
use crate::error::ExportError;

use super::KeyValueSource;

/// Reads keys with `KEYS` and values with `GET`, one command at a time
pub struct RedisSource {
    connection: redis::Connection,
}

impl RedisSource {
    /// Open the connection; held until the source is dropped
    pub fn connect(config: &RedisConfig) -> Result<Self, ExportError> {
        let address = config.address();
        let url = config
            .url()
            .map_err(|e| ExportError::Config(format!("Invalid Redis address {}: {}", address, e)))?;

        let client = redis::Client::open(url.as_str()).map_err(|source| ExportError::Connection {
            address: address.clone(),
            source,
        })?;
        let connection = client
            .get_connection()
            .map_err(|source| ExportError::Connection {
                address: address.clone(),
                source,
            })?;

        info!(address = %address, db = config.db, "Connected to Redis");
        Ok(Self { connection })
    }
}

impl KeyValueSource for RedisSource {
    fn keys(&mut self, pattern: &str) -> Result<Vec<Vec<u8>>, ExportError> {
        redis::cmd("KEYS")
            .arg(pattern)
            .query::<Vec<Vec<u8>>>(&mut self.connection)
            .map_err(|source| ExportError::Enumerate {
                pattern: pattern.to_string(),
                source,
            })
    }

    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, ExportError> {
        redis::cmd("GET")
            .arg(key)
            .query::<Option<Vec<u8>>>(&mut self.connection)
            .map_err(|source| ExportError::Fetch {
                key: key.to_string(),
                source,
            })
    }
}
