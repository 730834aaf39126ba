use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};

use super::KvBackend;
use crate::StoreError;

/// Backend over a shared multiplexed Redis connection.
///
/// `ConnectionManager` reconnects on failure and is cheap to clone; one
/// instance serves every request handler in the process.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Connect to the Redis instance at `url` (`redis://host:port/db`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let conn = client.get_connection_manager().await?;

        Ok(Self { conn })
    }
}

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError> {
        // PSETEX rather than SETEX keeps sub-second expiries exact.
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let mut conn = self.conn.clone();

        let () = conn.pset_ex(key, value, millis).await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();

        let () = conn.del(key).await?;

        Ok(())
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, StoreError> {
        // MGET with no keys is a protocol error.
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();

        Ok(conn.mget(keys).await?)
    }

    async fn scan_match(
        &self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>), StoreError> {
        let mut conn = self.conn.clone();

        let (next, keys) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await?;

        Ok((next, keys))
    }

    async fn set_add(&self, set: &str, member: &[u8]) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();

        Ok(conn.sadd(set, member).await?)
    }

    async fn set_card(&self, set: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();

        Ok(conn.scard(set).await?)
    }
}
