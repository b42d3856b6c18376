//! Content digests and the hash functions that produce them

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// A Content Addressable Storage (CAS) digest, consisting of a hex hash and size in bytes.
///
/// The hash algorithm is not carried by the digest itself; it is fixed by the
/// [`DigestFunction`] of the cache that produced it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest {
    /// Lowercase hex-encoded hash
    pub hash: String,
    /// Length of the hashed content
    pub size_bytes: i64,
}

impl Digest {
    /// Creates a new Digest from a hash string and size, without validation.
    pub fn new(hash: impl Into<String>, size_bytes: i64) -> Self {
        Self {
            hash: hash.into(),
            size_bytes,
        }
    }

    /// Parses a digest produced by `function`, normalizing the hash to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDigest`] if the hash is not hex, has the wrong
    /// length for `function`, or the size is negative.
    pub fn parse(function: DigestFunction, hash: &str, size_bytes: i64) -> Result<Self> {
        let digest = Self::checked(hash, size_bytes)?;
        if digest.hash.len() != function.hex_len() {
            return Err(Error::invalid_digest(format!(
                "{function} hash must be {} hex characters, got {}",
                function.hex_len(),
                digest.hash.len()
            )));
        }
        Ok(digest)
    }

    fn checked(hash: &str, size_bytes: i64) -> Result<Self> {
        if hash.is_empty() {
            return Err(Error::invalid_digest("hash is empty"));
        }
        if !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::invalid_digest(format!(
                "hash must contain only hex digits: {hash}"
            )));
        }
        if size_bytes < 0 {
            return Err(Error::invalid_digest(format!(
                "size must be non-negative, got {size_bytes}"
            )));
        }
        Ok(Self::new(hash.to_ascii_lowercase(), size_bytes))
    }

    /// Raw bytes of the hash.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDigest`] if the hash is not valid hex.
    pub fn hash_bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.hash).map_err(|e| Error::invalid_digest(format!("{}: {e}", self.hash)))
    }

    /// Whether this digest describes zero-length content.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size_bytes == 0
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.hash, self.size_bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.hash, self.size_bytes)
    }
}

impl FromStr for Digest {
    type Err = Error;

    /// Parses the `hash/size` form used by [`Display`](fmt::Display).
    fn from_str(s: &str) -> Result<Self> {
        let (hash, size) = s
            .split_once('/')
            .ok_or_else(|| Error::invalid_digest(format!("expected <hash>/<size>, got {s}")))?;
        let size_bytes = size
            .parse::<i64>()
            .map_err(|e| Error::invalid_digest(format!("bad size {size:?}: {e}")))?;
        Self::checked(hash, size_bytes)
    }
}

/// Hash algorithm used to fingerprint input content.
///
/// Names follow the Remote Execution API `DigestFunction` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestFunction {
    /// SHA-256 (the Remote Execution API default)
    #[default]
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl DigestFunction {
    /// Length of a hex-encoded hash produced by this function.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha384 => 96,
            Self::Sha512 => 128,
        }
    }

    /// Lowercase protocol name of the function.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Digest of in-memory content.
    #[must_use]
    pub fn digest_bytes(self, content: &[u8]) -> Digest {
        let hash = match self {
            Self::Sha256 => hex::encode(<Sha256 as sha2::Digest>::digest(content)),
            Self::Sha384 => hex::encode(<Sha384 as sha2::Digest>::digest(content)),
            Self::Sha512 => hex::encode(<Sha512 as sha2::Digest>::digest(content)),
        };
        Digest::new(hash, size_to_i64(content.len() as u64))
    }

    /// Digest of everything `reader` yields, streamed in 64 KiB chunks.
    ///
    /// # Errors
    ///
    /// Returns the first read error other than `Interrupted`.
    pub fn digest_reader(self, reader: impl Read) -> io::Result<Digest> {
        let (hash, total) = match self {
            Self::Sha256 => stream::<Sha256>(reader)?,
            Self::Sha384 => stream::<Sha384>(reader)?,
            Self::Sha512 => stream::<Sha512>(reader)?,
        };
        Ok(Digest::new(hash, size_to_i64(total)))
    }

    /// Digest of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened or read.
    pub fn digest_file(self, path: &Path) -> Result<Digest> {
        let _span = tracing::trace_span!("digest_file", path = %path.display(), function = %self)
            .entered();
        let file = fs::File::open(path).map_err(|e| Error::io(e, path, "open"))?;
        let digest = self
            .digest_reader(file)
            .map_err(|e| Error::io(e, path, "read"))?;
        tracing::trace!(path = %path.display(), size = digest.size_bytes, "Hashed file");
        Ok(digest)
    }

    /// Digest of zero-length content.
    #[must_use]
    pub fn empty_digest(self) -> Digest {
        self.digest_bytes(&[])
    }
}

impl fmt::Display for DigestFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            other => Err(Error::configuration(format!(
                "Unsupported digest function: {other}"
            ))),
        }
    }
}

fn stream<D: sha2::Digest>(mut reader: impl Read) -> io::Result<(String, u64)> {
    let mut hasher = D::new();
    let mut buf = [0u8; 1024 * 64];
    let mut total: u64 = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    Ok((hex::encode(hasher.finalize()), total))
}

// Content beyond i64::MAX bytes cannot exist on any supported filesystem.
fn size_to_i64(size: u64) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}
