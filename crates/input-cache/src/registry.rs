//! Bidirectional input ↔ digest registry
//!
//! Both directions live in one [`BiIndex`] behind a single lock, so every
//! insertion updates the forward and inverse maps together and a reader can
//! never observe one direction without the other.

use crate::digest::Digest;
use crate::error::{Error, Result};
use crate::input::ActionInput;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// What to do when a digest is recorded against a second, different input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebindPolicy {
    /// Fail with [`Error::ConflictingDigest`], leaving the registry untouched
    Reject,
    /// Move the digest to the new input; the previous owner loses its digest
    Rebind,
}

#[derive(Debug, Default)]
struct BiIndex {
    forward: HashMap<ActionInput, Digest>,
    inverse: HashMap<Digest, ActionInput>,
}

impl BiIndex {
    /// Returns the input evicted by a rebind, if any.
    fn insert(
        &mut self,
        input: &ActionInput,
        digest: Digest,
        policy: RebindPolicy,
    ) -> Result<Option<ActionInput>> {
        let mut evicted = None;
        if let Some(owner) = self.inverse.get(&digest)
            && owner != input
        {
            match policy {
                RebindPolicy::Reject => {
                    return Err(Error::conflicting_digest(
                        &digest,
                        owner.exec_path(),
                        input.exec_path(),
                    ));
                }
                RebindPolicy::Rebind => {
                    let owner = owner.clone();
                    self.forward.remove(&owner);
                    evicted = Some(owner);
                }
            }
        }

        if let Some(previous) = self.forward.insert(input.clone(), digest.clone())
            && previous != digest
        {
            self.inverse.remove(&previous);
        }
        self.inverse.insert(digest, input.clone());

        debug_assert_eq!(self.forward.len(), self.inverse.len());
        Ok(evicted)
    }
}

/// Thread-safe one-to-one mapping between action inputs and their digests.
///
/// Entries are never removed individually; the registry lives as long as the
/// cache that owns it.
#[derive(Debug)]
pub struct DigestRegistry {
    index: RwLock<BiIndex>,
    policy: RebindPolicy,
}

impl DigestRegistry {
    /// Create an empty registry with the given rebind policy.
    #[must_use]
    pub fn new(policy: RebindPolicy) -> Self {
        Self {
            index: RwLock::new(BiIndex::default()),
            policy,
        }
    }

    /// Registry that faults on conflicting bindings.
    #[must_use]
    pub fn strict() -> Self {
        Self::new(RebindPolicy::Reject)
    }

    /// Registry that lets a digest move between inputs.
    #[must_use]
    pub fn relaxed() -> Self {
        Self::new(RebindPolicy::Rebind)
    }

    /// The policy applied to conflicting bindings.
    #[must_use]
    pub const fn policy(&self) -> RebindPolicy {
        self.policy
    }

    /// Digest recorded for `input`, if any.
    #[must_use]
    pub fn digest_of(&self, input: &ActionInput) -> Option<Digest> {
        self.index.read().forward.get(input).cloned()
    }

    /// Input recorded for `digest`, if any.
    #[must_use]
    pub fn input_for(&self, digest: &Digest) -> Option<ActionInput> {
        self.index.read().inverse.get(digest).cloned()
    }

    /// Bind `input` and `digest` to each other.
    ///
    /// Re-recording the same pair is a no-op. Recording a new digest for an
    /// input replaces its previous digest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingDigest`] under [`RebindPolicy::Reject`] when
    /// `digest` is already bound to another input.
    pub fn record(&self, input: &ActionInput, digest: Digest) -> Result<()> {
        let outcome = self.index.write().insert(input, digest.clone(), self.policy);
        match outcome {
            Ok(None) => {
                debug!(input = %input, digest = %digest, "Recorded input digest");
                Ok(())
            }
            Ok(Some(evicted)) => {
                warn!(
                    digest = %digest,
                    previous = %evicted,
                    input = %input,
                    "Digest rebound to a different input"
                );
                Ok(())
            }
            Err(e) => {
                warn!(digest = %digest, input = %input, "Rejected conflicting digest binding");
                Err(e)
            }
        }
    }

    /// Number of recorded bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().forward.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.read().forward.is_empty()
    }

    /// All bindings as `(exec_path, digest)`, sorted by path then digest.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(PathBuf, Digest)> {
        let mut entries: Vec<_> = self
            .index
            .read()
            .forward
            .iter()
            .map(|(input, digest)| (input.exec_path().to_path_buf(), digest.clone()))
            .collect();
        entries.sort();
        entries
    }
}

impl Default for DigestRegistry {
    fn default() -> Self {
        Self::strict()
    }
}
