use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a hex-encoded SHA-256 digest
pub const CONTENT_HASH_HEX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashParseError {
    #[error("Invalid content hash length: expected {CONTENT_HASH_HEX_LEN} hex characters, got {0}")]
    InvalidLength(usize),
    #[error("Invalid content hash: contains non-hex characters")]
    InvalidCharacters,
}

/// Hex-encoded SHA-256 digest of a blob's bytes, always lowercase.
///
/// This is both the catalog identity of a record and the object key of its blob.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Parse a caller-supplied hash, trimming whitespace and normalizing case
    pub fn parse(input: &str) -> Result<Self, HashParseError> {
        let trimmed = input.trim();
        if trimmed.len() != CONTENT_HASH_HEX_LEN {
            return Err(HashParseError::InvalidLength(trimmed.len()));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(HashParseError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentHash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = HashParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Incremental SHA-256 over a chunked payload.
/// Bytes must be fed in the same order they are written to the scratch buffer.
#[derive(Clone, Default)]
pub struct ContentHasher {
    inner: Sha256,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
    }

    pub fn finalize(self) -> ContentHash {
        ContentHash::from_digest(&self.inner.finalize())
    }
}

/// Compute the content hash of a complete byte sequence
pub fn content_hash(data: &[u8]) -> ContentHash {
    ContentHash::from_digest(&Sha256::digest(data))
}
