//! Runtime configuration

use serde::Deserialize;

use crate::errors::{ModelError, Result};

/// Behaviour switches of a [`crate::Store`]
///
/// Log filtering is not configured here; it follows `RUST_LOG`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Dispatch chains to observers at all
    pub deliver_notifications: bool,
    /// Emit a `Set` record when a single-valued feature is set to its current value
    pub touch_notifications: bool,
    /// Run the model invariant checks before dispatching an applied batch
    pub validate_after_apply: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            deliver_notifications: true,
            touch_notifications: true,
            validate_after_apply: true,
        }
    }
}

impl ModelConfig {
    /// Parse a configuration document; absent keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the text is not a valid configuration object.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ModelError::InvalidConfig {
            message: e.to_string(),
        })
    }
}
