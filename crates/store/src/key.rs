use muster_primitives::community::CommunityId;
use muster_primitives::peer::PeerId;

/// Default service prefix; deployments sharing a backend with an existing
/// keyspace override it.
pub const DEFAULT_PREFIX: &str = "muster1";

/// Key layout under the service prefix. Fixed, version-independent:
///
/// - `{prefix}:community:{community}:{peer}` - announce records
/// - `{prefix}:statistics:unique_communities` - seen community ids
/// - `{prefix}:statistics:unique_peers` - seen peer ids
///
/// Identifiers render as lowercase hex, so keys and scan patterns never
/// contain glob metacharacters.
#[derive(Clone, Debug)]
pub struct Keyspace {
    prefix: String,
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl Keyspace {
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
        }
    }

    #[must_use]
    pub fn announce(&self, community: &CommunityId, peer: &PeerId) -> String {
        format!("{}:community:{community}:{peer}", self.prefix)
    }

    #[must_use]
    pub fn community_pattern(&self, community: &CommunityId) -> String {
        format!("{}:community:{community}:*", self.prefix)
    }

    #[must_use]
    pub fn unique_communities(&self) -> String {
        format!("{}:statistics:unique_communities", self.prefix)
    }

    #[must_use]
    pub fn unique_peers(&self) -> String {
        format!("{}:statistics:unique_peers", self.prefix)
    }
}
