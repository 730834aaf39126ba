use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ident::{Ident, InvalidIdent};

/// Identifier of a community, the namespace peers rendezvous within.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct CommunityId(Ident);

impl CommunityId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for CommunityId {
    type Target = Ident;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct InvalidCommunityId(InvalidIdent);

impl FromStr for CommunityId {
    type Err = InvalidCommunityId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse().map_err(InvalidCommunityId)?))
    }
}
