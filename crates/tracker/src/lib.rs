//! The announce protocol: everything that happens when a peer checks in.

use std::net::IpAddr;
use std::num::NonZeroU16;
use std::sync::Arc;
use std::time::Duration;

use muster_primitives::addr::normalize_ip;
use muster_primitives::community::CommunityId;
use muster_primitives::peer::{Endpoint, PeerId, PeerRecord};
use muster_store::backend::KvBackend;
use muster_store::key::Keyspace;
use muster_store::registry::PeerRegistry;
use muster_store::statistics::Statistics;
use muster_store::StoreError;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_ANNOUNCE_TTL: Duration = Duration::from_secs(15);
pub const DEFAULT_PEER_LIMIT: usize = 50;

/// How announced endpoints are represented in peer listings.
#[derive(Clone, Debug)]
pub enum EndpointFormat {
    /// Bare observed address and port, the historic wire shape.
    Ip,
    /// A URL derived from the observed address, e.g. `https://host:port/`.
    Url { scheme: String },
}

#[derive(Clone, Debug)]
pub struct TrackerConfig {
    pub announce_ttl: Duration,
    pub peer_limit: usize,
    pub endpoint_format: EndpointFormat,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            announce_ttl: DEFAULT_ANNOUNCE_TTL,
            peer_limit: DEFAULT_PEER_LIMIT,
            endpoint_format: EndpointFormat::Ip,
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Only reachable with a misconfigured endpoint scheme.
    #[error("cannot derive endpoint url: {0}")]
    Endpoint(#[source] url::ParseError),
}

/// What an announcing peer is told.
#[derive(Clone, Debug)]
pub struct Announcement {
    /// Seconds until the fresh record expires unless refreshed.
    pub ttl: Duration,
    /// Live siblings in the community, the caller excluded.
    pub peers: Vec<PeerRecord>,
    pub stats: StatsUpdate,
}

/// Cardinalities refreshed by one announce. `None` means the identifier
/// had been seen before and the count was not re-read.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatsUpdate {
    pub unique_communities: Option<u64>,
    pub unique_peers: Option<u64>,
}

/// The rendezvous core, shared by every request handler.
#[derive(Clone)]
pub struct Tracker {
    registry: PeerRegistry,
    statistics: Statistics,
    config: TrackerConfig,
}

impl Tracker {
    #[must_use]
    pub fn new(backend: Arc<dyn KvBackend>, keyspace: Keyspace, config: TrackerConfig) -> Self {
        Self {
            registry: PeerRegistry::new(Arc::clone(&backend), keyspace.clone()),
            statistics: Statistics::new(backend, keyspace),
            config,
        }
    }

    /// Handle one announce: register or refresh the caller, list its
    /// siblings, refresh the first-seen statistics.
    ///
    /// The write lands before the listing, and the caller never sees
    /// itself. Any backend failure fails the whole announce; no partial
    /// response.
    pub async fn announce(
        &self,
        community: &CommunityId,
        peer: &PeerId,
        port: NonZeroU16,
        observed_addr: IpAddr,
    ) -> Result<Announcement, TrackerError> {
        let ip = normalize_ip(observed_addr);
        let record = PeerRecord {
            peer_id: peer.clone(),
            endpoint: self.endpoint(ip, port)?,
        };

        self.registry
            .upsert(community, &record, self.config.announce_ttl)
            .await?;

        let peers = self
            .registry
            .list(community, peer, self.config.peer_limit)
            .await?;

        let stats = self.refresh_statistics(community, peer).await?;

        debug!(%community, %peer, %ip, peers = peers.len(), "announce handled");

        Ok(Announcement {
            ttl: self.config.announce_ttl,
            peers,
            stats,
        })
    }

    /// Withdraw the caller's record ahead of its TTL. Idempotent. The
    /// statistics sets deliberately keep the identifiers.
    pub async fn deannounce(
        &self,
        community: &CommunityId,
        peer: &PeerId,
    ) -> Result<(), TrackerError> {
        self.registry.remove(community, peer).await?;

        debug!(%community, %peer, "deannounce handled");

        Ok(())
    }

    async fn refresh_statistics(
        &self,
        community: &CommunityId,
        peer: &PeerId,
    ) -> Result<StatsUpdate, StoreError> {
        let mut stats = StatsUpdate::default();

        if self.statistics.record_community_seen(community).await? {
            stats.unique_communities = Some(self.statistics.community_count().await?);
        }

        if self.statistics.record_peer_seen(peer).await? {
            stats.unique_peers = Some(self.statistics.peer_count().await?);
        }

        Ok(stats)
    }

    fn endpoint(&self, ip: IpAddr, port: NonZeroU16) -> Result<Endpoint, TrackerError> {
        match &self.config.endpoint_format {
            EndpointFormat::Ip => Ok(Endpoint::Socket { ip, port }),
            EndpointFormat::Url { scheme } => {
                let authority = match ip {
                    IpAddr::V4(v4) => format!("{v4}:{port}"),
                    IpAddr::V6(v6) => format!("[{v6}]:{port}"),
                };

                let url = Url::parse(&format!("{scheme}://{authority}/"))
                    .map_err(TrackerError::Endpoint)?;

                Ok(Endpoint::Url { url })
            }
        }
    }
}
