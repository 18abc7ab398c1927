//! Redis-backed version store.

use std::borrow::Cow;

use redis::aio::ConnectionManager;

use crate::errors::StorageError;

use super::VersionStore;

/// Default hash key holding per-module markers.
const VERSIONS_KEY: &str = "_groundwork:versions";

/// Stores markers in a single Redis hash: field = module id, value = the
/// last-applied version id. `HSET` is natively an upsert, which gives the
/// store contract's single-operation write.
pub struct RedisVersionStore {
    conn: ConnectionManager,
    key: String,
}

impl RedisVersionStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            key: VERSIONS_KEY.to_string(),
        }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self::new(conn))
    }

    /// Override the marker hash key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

impl VersionStore for RedisVersionStore {
    async fn initialize(&mut self) -> Result<(), StorageError> {
        let _: String = redis::cmd("PING").query_async(&mut self.conn).await?;

        // A leftover key of another type would make every HGET/HSET fail
        // with an opaque WRONGTYPE; surface it up front instead.
        let kind: String = redis::cmd("TYPE")
            .arg(&self.key)
            .query_async(&mut self.conn)
            .await?;
        if kind != "hash" && kind != "none" {
            return Err(StorageError::Other {
                message: Cow::Owned(format!(
                    "marker key `{}` holds a {kind} value, expected a hash",
                    self.key
                )),
            });
        }
        Ok(())
    }

    async fn current_version(&mut self, module_id: &str) -> Result<Option<String>, StorageError> {
        let version: Option<String> = redis::cmd("HGET")
            .arg(&self.key)
            .arg(module_id)
            .query_async(&mut self.conn)
            .await?;
        Ok(version)
    }

    async fn set_version(&mut self, module_id: &str, version: &str) -> Result<(), StorageError> {
        let _: i64 = redis::cmd("HSET")
            .arg(&self.key)
            .arg(module_id)
            .arg(version)
            .query_async(&mut self.conn)
            .await?;
        Ok(())
    }
}
