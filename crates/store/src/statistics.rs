use std::sync::Arc;

use muster_primitives::community::CommunityId;
use muster_primitives::peer::PeerId;

use crate::backend::KvBackend;
use crate::key::Keyspace;
use crate::StoreError;

/// Monotonic distinct-id statistics over backend membership sets.
///
/// A set insert is an idempotent "seen before" probe with no existence
/// check to race against; cardinality is re-read, never accumulated, so
/// redundant inserts cannot double count. The sets are never pruned when
/// announce records expire, so both counts only grow.
#[derive(Clone)]
pub struct Statistics {
    backend: Arc<dyn KvBackend>,
    keyspace: Keyspace,
}

impl Statistics {
    #[must_use]
    pub fn new(backend: Arc<dyn KvBackend>, keyspace: Keyspace) -> Self {
        Self { backend, keyspace }
    }

    /// Record `community` as observed. True iff this is its first
    /// appearance since the backend was provisioned.
    pub async fn record_community_seen(
        &self,
        community: &CommunityId,
    ) -> Result<bool, StoreError> {
        self.backend
            .set_add(&self.keyspace.unique_communities(), community.as_bytes())
            .await
    }

    /// Record `peer` as observed. True iff this is its first appearance.
    pub async fn record_peer_seen(&self, peer: &PeerId) -> Result<bool, StoreError> {
        self.backend
            .set_add(&self.keyspace.unique_peers(), peer.as_bytes())
            .await
    }

    pub async fn community_count(&self) -> Result<u64, StoreError> {
        self.backend
            .set_card(&self.keyspace.unique_communities())
            .await
    }

    pub async fn peer_count(&self) -> Result<u64, StoreError> {
        self.backend.set_card(&self.keyspace.unique_peers()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn statistics() -> Statistics {
        Statistics::new(Arc::new(MemoryBackend::new()), Keyspace::default())
    }

    #[tokio::test]
    async fn first_sighting_is_distinguished() {
        let statistics = statistics();
        let community: CommunityId = "ab12".parse().unwrap();

        assert!(statistics.record_community_seen(&community).await.unwrap());
        assert!(!statistics.record_community_seen(&community).await.unwrap());

        assert_eq!(statistics.community_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn counts_never_decrease() {
        let statistics = statistics();

        for id in ["aa", "bb", "cc"] {
            let peer: PeerId = id.parse().unwrap();
            assert!(statistics.record_peer_seen(&peer).await.unwrap());
        }

        let repeat: PeerId = "bb".parse().unwrap();
        assert!(!statistics.record_peer_seen(&repeat).await.unwrap());

        assert_eq!(statistics.peer_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn case_variants_count_once() {
        let statistics = statistics();

        let lower: CommunityId = "ab12".parse().unwrap();
        let upper: CommunityId = "AB12".parse().unwrap();

        assert!(statistics.record_community_seen(&lower).await.unwrap());
        assert!(!statistics.record_community_seen(&upper).await.unwrap());

        assert_eq!(statistics.community_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn communities_and_peers_are_counted_apart() {
        let statistics = statistics();

        let community: CommunityId = "ab12".parse().unwrap();
        let peer: PeerId = "ab12".parse().unwrap();

        assert!(statistics.record_community_seen(&community).await.unwrap());
        assert!(statistics.record_peer_seen(&peer).await.unwrap());

        assert_eq!(statistics.community_count().await.unwrap(), 1);
        assert_eq!(statistics.peer_count().await.unwrap(), 1);
    }
}
