//! Action input digest cache for remote execution
//!
//! This crate maps the files consumed by build actions to content digests and
//! back, and answers the cheap metadata questions (is it a file, how big is
//! it) a remote-execution layer asks before reading content:
//! - [`ActionInputFileCache`]: the lookup contract callers program against
//! - [`FileCache`]: the filesystem-backed implementation used by real builds
//! - `testing::FakeFileCache`: a test double fed with injected digests,
//!   behind the `testing` feature
//!
//! # Overview
//!
//! Both implementations keep a [`DigestRegistry`], a one-to-one index where
//! `input_for(digest_of(x)) == x` for every recorded input. The production
//! cache rejects binding one digest to two inputs; the fake lets digests move
//! so fixtures can be re-seeded. Size and existence are never cached.
//!
//! A cache instance belongs to one build or test invocation and is passed
//! explicitly to whatever needs it.
//!
//! ```rust,no_run
//! use actioncache_inputs::{ActionInput, ActionInputFileCache, CacheConfig, FileCache};
//!
//! let cache = FileCache::new("/tmp/execroot", &CacheConfig::default())?;
//! let input = ActionInput::new("src/main.rs");
//! let digest = cache.digest_of(&input)?;
//! assert_eq!(cache.input_for(&digest)?, input);
//! # Ok::<(), actioncache_inputs::Error>(())
//! ```

mod cache;
pub mod config;
pub mod digest;
mod error;
mod filesystem;
mod input;
pub mod registry;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cache::ActionInputFileCache;
pub use config::CacheConfig;
pub use digest::{Digest, DigestFunction};
pub use error::{Error, Result};
pub use filesystem::{Content, FileCache};
pub use input::ActionInput;
pub use registry::{DigestRegistry, RebindPolicy};
pub use store::{BackingStore, LocalFileSystem};
