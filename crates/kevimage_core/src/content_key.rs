//! Content-derived storage keys.

use crate::OutputFormat;
use kevimage_error::{StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

const DIGEST_HEX_LEN: usize = 64;

/// Storage identifier derived from an artifact's bytes: `<sha256-hex>.<ext>`.
///
/// Identical bytes always derive the same key, so two source URLs that
/// compress to the same output share one stored object.
///
/// # Examples
///
/// ```
/// use kevimage_core::{ContentKey, OutputFormat};
///
/// let key = ContentKey::derive(b"hello", OutputFormat::Jpeg);
/// assert_eq!(
///     key.as_str(),
///     "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824.jpg"
/// );
/// assert_eq!(ContentKey::parse(key.as_str()).unwrap(), key);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentKey {
    value: String,
    split: usize,
}

impl ContentKey {
    /// Hash `bytes` with SHA-256 and attach the extension of `format`.
    pub fn derive(bytes: &[u8], format: OutputFormat) -> Self {
        Self::from_parts(&Self::digest_of(bytes), format.extension())
    }

    /// Lowercase hex SHA-256 digest of `bytes`.
    pub fn digest_of(bytes: &[u8]) -> String {
        format!("{:x}", Sha256::digest(bytes))
    }

    /// Validate and wrap an existing key string.
    ///
    /// # Errors
    ///
    /// Returns `StorageErrorKind::InvalidKey` unless the key is 64 lowercase hex
    /// characters, a dot, and a non-empty alphanumeric extension.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let invalid = || StorageError::new(StorageErrorKind::InvalidKey(raw.to_string()));

        let (digest, ext) = raw.split_once('.').ok_or_else(invalid)?;
        if digest.len() != DIGEST_HEX_LEN
            || !digest
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(invalid());
        }
        if ext.is_empty() || !ext.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(invalid());
        }

        Ok(Self::from_parts(digest, ext))
    }

    fn from_parts(digest: &str, ext: &str) -> Self {
        Self {
            value: format!("{}.{}", digest, ext),
            split: digest.len(),
        }
    }

    /// The full key, usable as a file name.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The hex digest part of the key.
    pub fn digest(&self) -> &str {
        &self.value[..self.split]
    }

    /// The extension part of the key, without the dot.
    pub fn extension(&self) -> &str {
        &self.value[self.split + 1..]
    }

    /// Whether `bytes` hash to this key's digest.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        Self::digest_of(bytes) == self.digest()
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for ContentKey {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentKey {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentKey> for String {
    fn from(key: ContentKey) -> Self {
        key.value
    }
}
