use std::time::Duration;

use async_trait::async_trait;

use crate::StoreError;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryBackend;
pub use self::redis::RedisBackend;

/// The key-value primitives the tracker needs from its backend, modelled
/// directly on the Redis command set: unconditional writes with expiry,
/// batched fetches, cursor scans and membership sets.
///
/// Implementations must be safe for concurrent use behind an `Arc`; every
/// method is a single backend round trip with no cross-key atomicity.
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
    /// Write `value` under `key`, overwriting any previous value and
    /// restarting the expiry window at `ttl` from now.
    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError>;

    /// Delete `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Fetch many keys in one round trip. The result is positionally
    /// aligned with `keys`; absent or expired keys yield `None`.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, StoreError>;

    /// One round of cursor iteration over keys matching the glob `pattern`.
    ///
    /// A cursor of 0 starts the scan and a returned cursor of 0 means
    /// exhaustion. `count` is a hint, not a bound, and the iteration is not
    /// a snapshot: keys written or expired mid-scan may be missed, and a
    /// nonzero cursor may legally return an empty batch.
    async fn scan_match(
        &self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>), StoreError>;

    /// Insert `member` into the set named `set`. True iff the member was
    /// not already present.
    async fn set_add(&self, set: &str, member: &[u8]) -> Result<bool, StoreError>;

    /// Cardinality of the set named `set`; 0 for an absent set.
    async fn set_card(&self, set: &str) -> Result<u64, StoreError>;
}
