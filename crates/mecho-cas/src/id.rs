//! Canonical content identifiers.

use std::fmt;
use std::str::FromStr;

use md5::{Digest, Md5};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of hex characters in a canonical id (MD5, 16 bytes).
pub const ID_LEN: usize = 32;

/// Upper-case hex MD5 of a blob's full content.
///
/// Chat platforms name received images after the same digest, which is what lets
/// a stored blob be recognised again from an incoming image's filename alone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalId(String);

impl CanonicalId {
    /// Derive the id of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let digest = Md5::digest(data);
        Self(hex::encode_upper(digest))
    }

    /// Parse an id-shaped string (exactly 32 hex characters, any case).
    ///
    /// Surrounding whitespace is ignored. Returns `None` for anything else,
    /// which callers treat as "not a literal id".
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if !is_id_shaped(text) {
            return None;
        }
        Some(Self(text.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// True when `text` has exactly the id length and only hex digits.
pub fn is_id_shaped(text: &str) -> bool {
    text.len() == ID_LEN && text.bytes().all(|b| b.is_ascii_hexdigit())
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("not a canonical id: {0:?}")]
pub struct ParseIdError(pub String);

impl FromStr for CanonicalId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseIdError(s.to_string()))
    }
}

impl Serialize for CanonicalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CanonicalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
