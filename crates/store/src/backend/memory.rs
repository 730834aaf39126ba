use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::KvBackend;
use crate::StoreError;

/// In-memory backend for development and tests.
///
/// Expiry is lazy: dead entries are ignored by reads and scans and swept
/// on write. Scan cursors are offsets into the sorted live key set, which
/// reproduces the non-snapshot behavior of the real backend (keys added
/// or removed between rounds may be skipped or repeated).
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, Entry>>,
    sets: RwLock<BTreeMap<String, BTreeSet<Vec<u8>>>>,
}

#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    // None when the requested expiry overflows Instant.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(pattern: &str, key: &str) -> bool {
    // The keyspace only ever produces literal keys or a trailing `*`.
    pattern
        .strip_suffix('*')
        .map_or_else(|| pattern == key, |prefix| key.starts_with(prefix))
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write();

        entries.retain(|_, entry| !entry.is_expired(now));

        drop(entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_vec(),
                expires_at: now.checked_add(ttl),
            },
        ));

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        drop(self.entries.write().remove(key));

        Ok(())
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read();

        Ok(keys
            .iter()
            .map(|key| {
                entries
                    .get(key)
                    .filter(|entry| !entry.is_expired(now))
                    .map(|entry| entry.value.clone())
            })
            .collect())
    }

    async fn scan_match(
        &self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>), StoreError> {
        let now = Instant::now();
        let entries = self.entries.read();

        let live: Vec<&String> = entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired(now) && matches(pattern, key))
            .map(|(key, _)| key)
            .collect();

        let offset = usize::try_from(cursor).unwrap_or(usize::MAX);
        let keys: Vec<String> = live
            .iter()
            .skip(offset)
            .take(count)
            .map(|key| (*key).clone())
            .collect();

        let consumed = offset.saturating_add(keys.len());
        let next = if consumed < live.len() {
            u64::try_from(consumed).unwrap_or(u64::MAX)
        } else {
            0
        };

        Ok((next, keys))
    }

    async fn set_add(&self, set: &str, member: &[u8]) -> Result<bool, StoreError> {
        Ok(self
            .sets
            .write()
            .entry(set.to_owned())
            .or_default()
            .insert(member.to_vec()))
    }

    async fn set_card(&self, set: &str) -> Result<u64, StoreError> {
        Ok(self
            .sets
            .read()
            .get(set)
            .map_or(0, |members| u64::try_from(members.len()).unwrap_or(u64::MAX)))
    }
}
