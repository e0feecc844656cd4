//! Command inventory for atomic batches
//!
//! Commands are processed by [`crate::apply::apply`], which runs a whole
//! batch against one notification chain and either commits all of it or
//! none of it.

use gmlx_core_types::{FeatureId, ObjectId};
use serde::{Deserialize, Serialize};

use crate::model::Value;

/// One reflective mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Set a feature to a whole value
    Set {
        object: ObjectId,
        feature: FeatureId,
        value: Value,
    },

    /// Unset a feature
    Unset { object: ObjectId, feature: FeatureId },

    /// Append to a list feature
    Add {
        object: ObjectId,
        feature: FeatureId,
        value: Value,
    },

    /// Insert into a list feature before `index`
    Insert {
        object: ObjectId,
        feature: FeatureId,
        index: usize,
        value: Value,
    },

    /// Remove the first occurrence of a value from a list feature
    Remove {
        object: ObjectId,
        feature: FeatureId,
        value: Value,
    },

    /// Move a list element
    Move {
        object: ObjectId,
        feature: FeatureId,
        from: usize,
        to: usize,
    },

    /// Remove every element of a list feature or every entry of a feature map slot
    Clear { object: ObjectId, feature: FeatureId },

    /// Append an entry for a feature map member
    MapAdd {
        object: ObjectId,
        member: FeatureId,
        value: Value,
    },

    /// Delete an object and its containment subtree
    Delete { object: ObjectId },
}

impl Command {
    /// Object the command is addressed to
    pub fn object(&self) -> ObjectId {
        match self {
            Command::Set { object, .. }
            | Command::Unset { object, .. }
            | Command::Add { object, .. }
            | Command::Insert { object, .. }
            | Command::Remove { object, .. }
            | Command::Move { object, .. }
            | Command::Clear { object, .. }
            | Command::MapAdd { object, .. }
            | Command::Delete { object } => *object,
        }
    }

    /// Operation name used in logs
    pub fn op_name(&self) -> &'static str {
        match self {
            Command::Set { .. } => "set",
            Command::Unset { .. } => "unset",
            Command::Add { .. } => "add",
            Command::Insert { .. } => "insert",
            Command::Remove { .. } => "remove",
            Command::Move { .. } => "move",
            Command::Clear { .. } => "clear",
            Command::MapAdd { .. } => "map_add",
            Command::Delete { .. } => "delete",
        }
    }
}
