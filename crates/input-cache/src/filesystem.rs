//! Filesystem-backed input cache used by real builds

use crate::cache::ActionInputFileCache;
use crate::config::CacheConfig;
use crate::digest::{Digest, DigestFunction};
use crate::error::{Error, Result};
use crate::input::ActionInput;
use crate::registry::DigestRegistry;
use crate::store::{BackingStore, LocalFileSystem};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Content to fingerprint with [`FileCache::compute_digest`].
#[derive(Debug, Clone, Copy)]
pub enum Content<'a> {
    /// In-memory bytes
    Bytes(&'a [u8]),
    /// A file named by its execution path
    ExecPath(&'a Path),
}

impl<'a> From<&'a [u8]> for Content<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Content<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a Path> for Content<'a> {
    fn from(path: &'a Path) -> Self {
        Self::ExecPath(path)
    }
}

/// Input cache over a real backing store.
///
/// Unknown inputs are hashed on first lookup (unless disabled in the config)
/// and recorded in a strict registry, so two distinct inputs can never share a
/// digest. Size and existence are read from the store on every call.
#[derive(Debug)]
pub struct FileCache<S = LocalFileSystem> {
    store: S,
    function: DigestFunction,
    compute_on_demand: bool,
    local_cas: Option<PathBuf>,
    registry: DigestRegistry,
}

impl FileCache<LocalFileSystem> {
    /// Create a cache for inputs under `exec_root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `config` is invalid.
    pub fn new(exec_root: impl Into<PathBuf>, config: &CacheConfig) -> Result<Self> {
        Self::with_store(LocalFileSystem::new(exec_root), config)
    }

    /// Absolute local path of `input`.
    #[must_use]
    pub fn resolved_path_of(&self, input: &ActionInput) -> PathBuf {
        self.store.resolve(input.exec_path())
    }
}

impl<S: BackingStore> FileCache<S> {
    /// Create a cache reading inputs from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `config` is invalid.
    pub fn with_store(store: S, config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            function: config.digest_function,
            compute_on_demand: config.compute_on_demand,
            local_cas: config.local_cas.clone(),
            registry: DigestRegistry::strict(),
        })
    }

    /// The hash algorithm used for every digest.
    #[must_use]
    pub const fn digest_function(&self) -> DigestFunction {
        self.function
    }

    /// The underlying input ↔ digest registry.
    #[must_use]
    pub const fn registry(&self) -> &DigestRegistry {
        &self.registry
    }

    /// Bind `input` to `digest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingDigest`] if `digest` already belongs to a
    /// different input.
    pub fn record(&self, input: &ActionInput, digest: Digest) -> Result<()> {
        self.registry.record(input, digest)
    }

    /// Fingerprint `content` without recording anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputUnavailable`] if an execution path cannot be read.
    pub fn compute_digest<'a>(&self, content: impl Into<Content<'a>>) -> Result<Digest> {
        match content.into() {
            Content::Bytes(bytes) => Ok(self.function.digest_bytes(bytes)),
            Content::ExecPath(path) => self.hash_exec_path(path),
        }
    }

    /// Digests of every input of an action, in order.
    ///
    /// # Errors
    ///
    /// Returns the first lookup failure.
    pub fn digest_all(&self, inputs: &[ActionInput]) -> Result<Vec<Digest>> {
        let _span = tracing::debug_span!("digest_all", count = inputs.len()).entered();
        inputs.iter().map(|input| self.digest_of(input)).collect()
    }

    fn hash_exec_path(&self, exec_path: &Path) -> Result<Digest> {
        let _span =
            tracing::trace_span!("hash_input", path = %exec_path.display(), function = %self.function)
                .entered();
        if !self.store.is_file(exec_path) {
            return Err(Error::input_unavailable(
                exec_path,
                io::Error::new(io::ErrorKind::NotFound, "not a regular file"),
            ));
        }
        let reader = self
            .store
            .open(exec_path)
            .map_err(|e| Error::input_unavailable(exec_path, e))?;
        self.function
            .digest_reader(reader)
            .map_err(|e| Error::io(e, exec_path, "read"))
    }

    fn local_blob_matches(&self, digest: &Digest) -> bool {
        let Some(root) = &self.local_cas else {
            return false;
        };
        // Only well-formed hex may become a path component under the store root.
        let Ok(blob_id) = Digest::parse(self.function, &digest.hash, digest.size_bytes) else {
            return false;
        };
        if blob_id.hash != digest.hash {
            return false;
        }
        let hash = blob_id.hash.as_str();
        let blob = root.join(&hash[0..2]).join(&hash[2..4]).join(hash);
        fs::metadata(&blob)
            .is_ok_and(|m| m.is_file() && i64::try_from(m.len()).ok() == Some(digest.size_bytes))
    }
}

impl<S: BackingStore> ActionInputFileCache for FileCache<S> {
    fn digest_of(&self, input: &ActionInput) -> Result<Digest> {
        if let Some(digest) = self.registry.digest_of(input) {
            return Ok(digest);
        }
        if !self.compute_on_demand {
            return Err(Error::unknown_input(input.exec_path()));
        }

        let digest = self.hash_exec_path(input.exec_path())?;
        debug!(input = %input, digest = %digest, "Computed digest on demand");
        self.registry.record(input, digest.clone())?;
        Ok(digest)
    }

    fn input_for(&self, digest: &Digest) -> Result<ActionInput> {
        self.registry
            .input_for(digest)
            .ok_or_else(|| Error::unknown_digest(digest))
    }

    fn is_regular_file(&self, input: &ActionInput) -> bool {
        self.store.is_file(input.exec_path())
    }

    fn size_in_bytes(&self, input: &ActionInput) -> Result<i64> {
        let size = self
            .store
            .file_size(input.exec_path())
            .map_err(|e| Error::input_unavailable(input.exec_path(), e))?;
        Ok(i64::try_from(size).unwrap_or(i64::MAX))
    }

    /// A digest is local when it is the empty digest, when the CAS directory
    /// holds a blob of matching size, or when its recorded input is a regular
    /// file of matching size. The recorded input is not re-hashed, so a file
    /// rewritten with different bytes of the same length still counts as local.
    fn is_available_locally(&self, digest: &Digest) -> Result<bool> {
        if digest.is_empty() && *digest == self.function.empty_digest() {
            return Ok(true);
        }
        if self.local_blob_matches(digest) {
            return Ok(true);
        }
        let Some(input) = self.registry.input_for(digest) else {
            return Ok(false);
        };
        let path = input.exec_path();
        Ok(self.store.is_file(path)
            && self
                .store
                .file_size(path)
                .is_ok_and(|size| i64::try_from(size).ok() == Some(digest.size_bytes)))
    }
}
