//! Storage backing action inputs

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// The storage a cache reads inputs from.
///
/// Paths are execution paths relative to the store's root. Implementations
/// must not cache answers: inputs can be materialized or removed by other
/// steps between two calls.
pub trait BackingStore: Send + Sync + fmt::Debug {
    /// Whether a regular file currently exists at `exec_path`. Never fails.
    fn is_file(&self, exec_path: &Path) -> bool;

    /// Byte length of the file at `exec_path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the path is missing or unreadable.
    fn file_size(&self, exec_path: &Path) -> io::Result<u64>;

    /// Open the file at `exec_path` for hashing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened.
    fn open(&self, exec_path: &Path) -> io::Result<Box<dyn Read + Send>>;
}

/// Local filesystem rooted at a build's execution root.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    exec_root: PathBuf,
}

impl LocalFileSystem {
    /// Create a store rooted at `exec_root`.
    #[must_use]
    pub fn new(exec_root: impl Into<PathBuf>) -> Self {
        Self {
            exec_root: exec_root.into(),
        }
    }

    /// The execution root.
    #[must_use]
    pub fn exec_root(&self) -> &Path {
        &self.exec_root
    }

    /// Absolute location of an execution path.
    #[must_use]
    pub fn resolve(&self, exec_path: &Path) -> PathBuf {
        self.exec_root.join(exec_path)
    }
}

impl BackingStore for LocalFileSystem {
    fn is_file(&self, exec_path: &Path) -> bool {
        self.resolve(exec_path).is_file()
    }

    fn file_size(&self, exec_path: &Path) -> io::Result<u64> {
        fs::metadata(self.resolve(exec_path)).map(|m| m.len())
    }

    fn open(&self, exec_path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let file = fs::File::open(self.resolve(exec_path))?;
        Ok(Box::new(file))
    }
}
