//! Wire types shared between the tracker server and its clients.

use std::num::NonZeroU16;

use muster_primitives::community::CommunityId;
use muster_primitives::peer::{PeerId, PeerRecord};
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/announce`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnnounceRequest {
    pub community_id: CommunityId,
    pub peer_id: PeerId,
    /// Port the peer listens on. The address part of the endpoint is
    /// always the transport-observed one, never client-supplied.
    pub port: NonZeroU16,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnnounceResponse {
    /// Seconds until the caller's fresh record expires unless refreshed.
    pub ttl: u64,
    /// Live siblings in the community, the caller excluded.
    pub peers: Vec<PeerRecord>,
}

/// Body of `POST /v1/deannounce`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeannounceRequest {
    pub community_id: CommunityId,
    pub peer_id: PeerId,
}

#[allow(
    clippy::empty_structs_with_brackets,
    reason = "serializes as an empty object, unlike a unit struct"
)]
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct DeannounceResponse {}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
}
