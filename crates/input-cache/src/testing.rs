//! In-memory test double for [`ActionInputFileCache`]
//!
//! [`FakeFileCache`] never hashes on lookup: every digest a test relies on
//! must be injected with [`FakeFileCache::set_digest`] or produced by
//! [`FakeFileCache::create_scratch_input`]. Digests may be rebound to new
//! inputs so one fake can be re-seeded across scenarios.

use crate::cache::ActionInputFileCache;
use crate::digest::{Digest, DigestFunction};
use crate::error::{Error, Result};
use crate::input::ActionInput;
use crate::registry::DigestRegistry;
use crate::store::{BackingStore, LocalFileSystem};
use std::fs;
use std::path::PathBuf;

/// Test double with pre-registered digests over a scratch execution root.
#[derive(Debug)]
pub struct FakeFileCache {
    store: LocalFileSystem,
    function: DigestFunction,
    registry: DigestRegistry,
}

impl FakeFileCache {
    /// Fake rooted at `exec_root`, hashing scratch inputs with SHA-256.
    #[must_use]
    pub fn new(exec_root: impl Into<PathBuf>) -> Self {
        Self::with_digest_function(exec_root, DigestFunction::default())
    }

    /// Fake rooted at `exec_root` using `function` for scratch inputs.
    #[must_use]
    pub fn with_digest_function(exec_root: impl Into<PathBuf>, function: DigestFunction) -> Self {
        Self {
            store: LocalFileSystem::new(exec_root),
            function,
            registry: DigestRegistry::relaxed(),
        }
    }

    /// Bind `input` to `digest`, moving the digest away from any previous input.
    pub fn set_digest(&self, input: &ActionInput, digest: Digest) {
        let recorded = self.registry.record(input, digest);
        debug_assert!(recorded.is_ok(), "relaxed registry rejected a binding");
    }

    /// Number of injected bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns true if no digest has been injected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Write `content` at the input's location, then register and return its real digest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file or its parent directories cannot be
    /// written or read back.
    pub fn create_scratch_input(
        &self,
        input: &ActionInput,
        content: impl AsRef<[u8]>,
    ) -> Result<Digest> {
        let path = self.store.resolve(input.exec_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(e, parent, "create_dir_all"))?;
        }
        fs::write(&path, content.as_ref()).map_err(|e| Error::io(e, &path, "write"))?;

        let digest = self.function.digest_file(&path)?;
        self.set_digest(input, digest.clone());
        Ok(digest)
    }
}

impl ActionInputFileCache for FakeFileCache {
    fn digest_of(&self, input: &ActionInput) -> Result<Digest> {
        self.registry
            .digest_of(input)
            .ok_or_else(|| Error::unknown_input(input.exec_path()))
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

    fn is_available_locally(&self, _digest: &Digest) -> Result<bool> {
        Err(Error::unsupported("is_available_locally"))
    }
}
