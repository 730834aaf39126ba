#[cfg(test)]
#[path = "tests/ident.rs"]
mod tests;

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use hex::FromHexError;
use thiserror::Error;

/// Longest accepted identifier, in raw bytes.
pub const MAX_IDENT_BYTES: usize = 64;

/// An opaque identifier: a short byte string carried on the wire as hex.
///
/// Input is accepted in either case and canonicalized to lowercase, so two
/// spellings of the same identifier compare equal and derive the same
/// backend keys.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ident {
    bytes: Box<[u8]>,
    hex: Box<str>,
}

impl Ident {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.hex
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Deref for Ident {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.bytes
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ident").field(&self.as_str()).finish()
    }
}

#[derive(Clone, Debug, Error)]
pub enum InvalidIdent {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier is longer than {MAX_IDENT_BYTES} bytes")]
    TooLong,

    #[error("invalid hex")]
    DecodeError(#[from] FromHexError),
}

impl FromStr for Ident {
    type Err = InvalidIdent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(InvalidIdent::Empty);
        }

        if s.len() > MAX_IDENT_BYTES * 2 {
            return Err(InvalidIdent::TooLong);
        }

        let bytes = hex::decode(s)?;

        Ok(Self {
            hex: hex::encode(&bytes).into_boxed_str(),
            bytes: bytes.into_boxed_slice(),
        })
    }
}

impl serde::Serialize for Ident {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Ident {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdentVisitor;

        impl serde::de::Visitor<'_> for IdentVisitor {
            type Value = Ident;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a hex encoded identifier")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(IdentVisitor)
    }
}
