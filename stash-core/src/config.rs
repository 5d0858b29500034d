//! Store configuration.
//!
//! Every store carries a [`StoreConfig`]. The defaults are suitable for
//! typical application state; hosts that load settings from a file can
//! parse a config from JSON with [`StoreConfig::from_json`]. Missing fields
//! fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Default limit on how deeply a patch may nest.
pub const DEFAULT_MAX_PATCH_DEPTH: usize = 64;

/// Default limit on re-entrant notification depth.
pub const DEFAULT_MAX_DISPATCH_DEPTH: usize = 32;

/// Tunables applied to a store at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum nesting depth accepted by `patch`.
    pub max_patch_depth: usize,

    /// Maximum depth of subscribers re-entering the store while an event
    /// is being dispatched. Events beyond this depth are dropped.
    pub max_dispatch_depth: usize,

    /// Whether the store connects to the devtools bridge.
    pub devtools: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_patch_depth: DEFAULT_MAX_PATCH_DEPTH,
            max_dispatch_depth: DEFAULT_MAX_DISPATCH_DEPTH,
            devtools: true,
        }
    }
}

impl StoreConfig {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would make every patch or every event fail.
    pub fn validate(&self) -> Result<()> {
        if self.max_patch_depth == 0 {
            return Err(StoreError::InvalidConfig("max_patch_depth"));
        }
        if self.max_dispatch_depth == 0 {
            return Err(StoreError::InvalidConfig("max_dispatch_depth"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let config = StoreConfig::from_json(r#"{"max_patch_depth": 8}"#).unwrap();
        assert_eq!(config.max_patch_depth, 8);
        assert_eq!(config.max_dispatch_depth, DEFAULT_MAX_DISPATCH_DEPTH);
        assert!(config.devtools);
    }

    #[test]
    fn empty_object_is_default() {
        let config = StoreConfig::from_json("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = StoreConfig::from_json(r#"{"max_dispatch_depth": 0}"#).unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig("max_dispatch_depth")));

        let err = StoreConfig::from_json(r#"{"max_patch_depth": 0}"#).unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig("max_patch_depth")));
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = StoreConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
