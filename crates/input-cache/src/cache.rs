//! The lookup contract shared by every input cache

use crate::digest::Digest;
use crate::error::Result;
use crate::input::ActionInput;

/// Digest and metadata lookups for the inputs of build actions.
///
/// A remote-execution layer uses this to describe an action's input set by
/// digest rather than by path, and to decide which blobs need transferring.
/// Implementations must be shareable across worker threads; every call is
/// atomic and holds no lock once it returns.
pub trait ActionInputFileCache: Send + Sync {
    /// Digest of `input`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownInput`](crate::Error::UnknownInput) if no digest
    /// is recorded and the implementation cannot compute one.
    fn digest_of(&self, input: &ActionInput) -> Result<Digest>;

    /// The input that was recorded with `digest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDigest`](crate::Error::UnknownDigest) if the
    /// digest was never recorded.
    fn input_for(&self, digest: &Digest) -> Result<ActionInput>;

    /// Whether a regular file currently backs `input`. Missing paths are `false`.
    fn is_regular_file(&self, input: &ActionInput) -> bool;

    /// Current size of the file backing `input`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputUnavailable`](crate::Error::InputUnavailable) if
    /// the file is missing or unreadable at the time of the call.
    fn size_in_bytes(&self, input: &ActionInput) -> Result<i64>;

    /// Whether content for `digest` is present locally, without transferring it.
    ///
    /// # Errors
    ///
    /// Implementations that do not model a storage tier return
    /// [`Error::Unsupported`](crate::Error::Unsupported).
    fn is_available_locally(&self, digest: &Digest) -> Result<bool>;
}
