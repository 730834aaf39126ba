#[cfg(test)]
#[path = "tests/peer.rs"]
mod tests;

use std::fmt;
use std::net::IpAddr;
use std::num::NonZeroU16;
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::ident::{Ident, InvalidIdent};

/// Identifier of one announcing client instance. Self-reported, not
/// cryptographically verified.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PeerId(Ident);

impl PeerId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for PeerId {
    type Target = Ident;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct InvalidPeerId(InvalidIdent);

impl FromStr for PeerId {
    type Err = InvalidPeerId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse().map_err(InvalidPeerId)?))
    }
}

/// Where a peer can be reached.
///
/// The socket form serializes flat into the enclosing record as
/// `"ip"`/`"port"`, which is the historic wire and backend format; the url
/// form carries a fully derived endpoint instead. Both are always built
/// from the transport-observed address, never from client input.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Endpoint {
    Socket { ip: IpAddr, port: NonZeroU16 },
    Url { url: Url },
}

/// A peer's directory entry within one community, stored as JSON under the
/// announce key and returned verbatim in peer listings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PeerRecord {
    pub peer_id: PeerId,
    #[serde(flatten)]
    pub endpoint: Endpoint,
}
