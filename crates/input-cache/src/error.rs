//! Error types for the input digest cache

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use crate::digest::Digest;
use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for input cache operations
///
/// Every variant is scoped to the single lookup that produced it. Nothing in
/// this crate retries; callers decide whether to fail the action or re-query.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No digest has been recorded for the input and none can be computed
    #[error("No digest recorded for input {}", exec_path.display())]
    #[diagnostic(
        code(actioncache::inputs::unknown_input),
        help("Record a digest for the input before looking it up")
    )]
    UnknownInput {
        /// Execution path of the input
        exec_path: Box<Path>,
    },

    /// The digest was never recorded against any input
    #[error("No input recorded for digest {digest}")]
    #[diagnostic(code(actioncache::inputs::unknown_digest))]
    UnknownDigest {
        /// The digest that was looked up
        digest: Digest,
    },

    /// The digest is already bound to a different input
    #[error(
        "Digest {digest} is already bound to {}, refusing to bind it to {}",
        bound.display(),
        rejected.display()
    )]
    #[diagnostic(
        code(actioncache::inputs::conflicting_digest),
        help("Two distinct inputs with identical content indicate a build graph bug upstream")
    )]
    ConflictingDigest {
        /// The contested digest
        digest: Digest,
        /// Execution path of the input that already owns the digest
        bound: Box<Path>,
        /// Execution path of the input whose binding was rejected
        rejected: Box<Path>,
    },

    /// The backing store has no readable file for the input
    #[error("Input {} is unavailable", path.display())]
    #[diagnostic(
        code(actioncache::inputs::unavailable),
        help("The file may not have been materialized yet by an upstream step")
    )]
    InputUnavailable {
        /// Execution path of the input
        path: Box<Path>,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The implementation declines this capability
    #[error("{operation} is not supported by this cache")]
    #[diagnostic(code(actioncache::inputs::unsupported))]
    Unsupported {
        /// Name of the refused operation
        operation: &'static str,
    },

    /// Malformed digest text
    #[error("Invalid digest: {message}")]
    #[diagnostic(code(actioncache::inputs::invalid_digest))]
    InvalidDigest {
        /// Error message describing the malformed digest
        message: String,
    },

    /// I/O error while hashing or writing content
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(actioncache::inputs::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write", "create_dir_all")
        operation: String,
    },

    /// Configuration or validation error
    #[error("Cache configuration error: {message}")]
    #[diagnostic(code(actioncache::inputs::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },
}

impl Error {
    /// Create an unknown input error
    #[must_use]
    pub fn unknown_input(exec_path: impl AsRef<Path>) -> Self {
        Self::UnknownInput {
            exec_path: exec_path.as_ref().into(),
        }
    }

    /// Create an unknown digest error
    #[must_use]
    pub fn unknown_digest(digest: &Digest) -> Self {
        Self::UnknownDigest {
            digest: digest.clone(),
        }
    }

    /// Create a conflicting digest error
    #[must_use]
    pub fn conflicting_digest(
        digest: &Digest,
        bound: impl AsRef<Path>,
        rejected: impl AsRef<Path>,
    ) -> Self {
        Self::ConflictingDigest {
            digest: digest.clone(),
            bound: bound.as_ref().into(),
            rejected: rejected.as_ref().into(),
        }
    }

    /// Create an input unavailable error
    #[must_use]
    pub fn input_unavailable(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::InputUnavailable {
            path: path.as_ref().into(),
            source,
        }
    }

    /// Create an unsupported operation error
    #[must_use]
    pub const fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    /// Create an invalid digest error
    #[must_use]
    pub fn invalid_digest(msg: impl Into<String>) -> Self {
        Self::InvalidDigest {
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }
}

/// Result type for input cache operations
pub type Result<T> = std::result::Result<T, Error>;
