//! Runtime configuration

use serde::{Deserialize, Serialize};

use crate::error::JsError;
use crate::gc::DEFAULT_GC_THRESHOLD;

/// Default limit on nested calls before a RangeError is raised
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Environment variable overriding the collection threshold
pub const GC_THRESHOLD_ENV: &str = "GC_THRESHOLD";

/// Tunables for a [`Runtime`](crate::Runtime)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Allocations between automatic collections. 0 disables automatic GC,
    /// 1 collects on every allocation.
    pub gc_threshold: usize,
    /// Maximum depth of the call stack
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gc_threshold: DEFAULT_GC_THRESHOLD,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, JsError> {
        serde_json::from_str(json)
            .map_err(|e| JsError::internal_error(format!("invalid runtime config: {}", e)))
    }

    /// Defaults, with `gc_threshold` taken from `GC_THRESHOLD` when it parses
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(threshold) = std::env::var(GC_THRESHOLD_ENV)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
        {
            config.gc_threshold = threshold;
        }
        config
    }

    pub fn with_gc_threshold(mut self, gc_threshold: usize) -> Self {
        self.gc_threshold = gc_threshold;
        self
    }
}
