use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use muster_primitives::community::CommunityId;
use muster_primitives::peer::{PeerId, PeerRecord};
use tracing::warn;

use crate::backend::KvBackend;
use crate::key::Keyspace;
use crate::StoreError;

/// The live peer directory: one TTL-bound record per (community, peer).
/// Existence of a key is the liveness signal; there is no other index.
#[derive(Clone)]
pub struct PeerRegistry {
    backend: Arc<dyn KvBackend>,
    keyspace: Keyspace,
}

impl PeerRegistry {
    #[must_use]
    pub fn new(backend: Arc<dyn KvBackend>, keyspace: Keyspace) -> Self {
        Self { backend, keyspace }
    }

    /// Register or refresh a peer's record. Unconditional overwrite; last
    /// writer wins and the expiry window restarts from now.
    pub async fn upsert(
        &self,
        community: &CommunityId,
        record: &PeerRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let key = self.keyspace.announce(community, &record.peer_id);
        let value = serde_json::to_vec(record)?;

        self.backend.put(&key, &value, ttl).await
    }

    /// Drop a peer's record. Removing an absent record succeeds.
    pub async fn remove(&self, community: &CommunityId, peer: &PeerId) -> Result<(), StoreError> {
        self.backend
            .delete(&self.keyspace.announce(community, peer))
            .await
    }

    /// Collect up to `limit` live records for `community`, excluding
    /// `exclude` (the acting peer, whose own key is guaranteed present).
    ///
    /// Each scan round asks for `limit + 1` keys so that filtering the
    /// caller out cannot under-fill an otherwise complete response. The
    /// scan is not a snapshot; the listing is best-effort and the subset
    /// returned for an oversized community is not stable across calls.
    /// Values that fail to decode are skipped, not surfaced.
    pub async fn list(
        &self,
        community: &CommunityId,
        exclude: &PeerId,
        limit: usize,
    ) -> Result<Vec<PeerRecord>, StoreError> {
        let pattern = self.keyspace.community_pattern(community);
        let mut peers = Vec::new();
        let mut seen = BTreeSet::new();
        let mut cursor = 0;

        loop {
            let (next, keys) = self
                .backend
                .scan_match(cursor, &pattern, limit.saturating_add(1))
                .await?;
            cursor = next;

            // A nonzero cursor may legally return an empty batch.
            if !keys.is_empty() {
                let values = self.backend.get_many(&keys).await?;

                for (key, value) in keys.iter().zip(values) {
                    // Expired between the scan round and the fetch.
                    let Some(value) = value else {
                        continue;
                    };

                    match serde_json::from_slice::<PeerRecord>(&value) {
                        Ok(record) if record.peer_id == *exclude => {}
                        Ok(record) => {
                            // The scan may repeat keys across rounds.
                            if seen.insert(record.peer_id.clone()) {
                                peers.push(record);
                            }
                        }
                        Err(err) => warn!(%err, %key, "skipping undecodable announce record"),
                    }
                }
            }

            if cursor == 0 || peers.len() >= limit {
                break;
            }
        }

        peers.truncate(limit);

        Ok(peers)
    }
}
