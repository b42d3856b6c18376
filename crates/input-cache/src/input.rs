//! Action input identities

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
struct InputInner {
    exec_path: PathBuf,
}

/// A file consumed by a build action.
///
/// Inputs compare and hash by identity: two inputs created separately are
/// distinct even when their execution paths are equal, while clones of one
/// input are the same input. The build graph owns inputs; caches only index
/// them.
#[derive(Clone)]
pub struct ActionInput(Arc<InputInner>);

impl ActionInput {
    /// Mint a new input identity for a path relative to the execution root.
    pub fn new(exec_path: impl Into<PathBuf>) -> Self {
        Self(Arc::new(InputInner {
            exec_path: exec_path.into(),
        }))
    }

    /// Path of the input relative to the execution root.
    #[must_use]
    pub fn exec_path(&self) -> &Path {
        &self.0.exec_path
    }
}

impl PartialEq for ActionInput {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ActionInput {}

impl Hash for ActionInput {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for ActionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActionInput")
            .field(&self.0.exec_path)
            .finish()
    }
}

impl fmt::Display for ActionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.exec_path.display())
    }
}
