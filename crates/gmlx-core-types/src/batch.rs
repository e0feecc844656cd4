//! Correlation identifier for dispatched notification batches
//!
//! Every notification chain that reaches observers is stamped with a
//! `BatchId`, which is also attached to the log events of the mutation that
//! produced it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one dispatched batch of notifications
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(String);

impl BatchId {
    /// Generate a new time-ordered BatchId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_id_generation() {
        let a = BatchId::new();
        let b = BatchId::new();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_batch_id_display() {
        let id = BatchId::from_string("batch-1".to_string());
        assert_eq!(format!("{}", id), "batch-1");
    }
}
