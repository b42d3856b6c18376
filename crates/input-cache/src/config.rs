//! Configuration for input digest caches

use crate::digest::DigestFunction;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings handed down by the option-parsing layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// Hash algorithm for every digest the cache produces
    #[serde(default)]
    pub digest_function: DigestFunction,

    /// Hash inputs on first lookup instead of failing with `UnknownInput`
    #[serde(default = "default_true")]
    pub compute_on_demand: bool,

    /// Root of a local content-addressed blob directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_cas: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            digest_function: DigestFunction::default(),
            compute_on_demand: default_true(),
            local_cas: None,
        }
    }
}

impl CacheConfig {
    /// Config using `function` and defaults for everything else.
    #[must_use]
    pub fn with_digest_function(function: DigestFunction) -> Self {
        Self {
            digest_function: function,
            ..Default::default()
        }
    }

    /// Check the settings for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `local_cas` is set to an empty path.
    pub fn validate(&self) -> Result<()> {
        if self
            .local_cas
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(Error::configuration("localCas must not be an empty path"));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
