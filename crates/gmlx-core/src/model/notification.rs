use gmlx_core_types::{FeatureId, ObjectId};
use serde::{Deserialize, Serialize};

use super::value::Value;

/// Kind of change a notification describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Set,
    Unset,
    Add,
    Remove,
    AddMany,
    RemoveMany,
    Move,
}

/// One recorded property change
///
/// For `Move`, `old_value` is the previous position as an `Int` and
/// `position` the new one. `is_set_change` is true when an unsettable
/// feature crossed its is-set boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub notifier: ObjectId,
    pub feature: FeatureId,
    pub kind: ChangeKind,
    pub old_value: Value,
    pub new_value: Value,
    pub position: Option<usize>,
    pub is_set_change: bool,
}

impl Notification {
    pub fn new(
        notifier: ObjectId,
        feature: FeatureId,
        kind: ChangeKind,
        old_value: Value,
        new_value: Value,
    ) -> Self {
        Self {
            notifier,
            feature,
            kind,
            old_value,
            new_value,
            position: None,
            is_set_change: false,
        }
    }

    pub fn set(notifier: ObjectId, feature: FeatureId, old_value: Value, new_value: Value) -> Self {
        Self::new(notifier, feature, ChangeKind::Set, old_value, new_value)
    }

    pub fn unset(notifier: ObjectId, feature: FeatureId, old_value: Value, new_value: Value) -> Self {
        Self::new(notifier, feature, ChangeKind::Unset, old_value, new_value)
    }

    pub fn add(notifier: ObjectId, feature: FeatureId, value: Value, position: usize) -> Self {
        Self::new(notifier, feature, ChangeKind::Add, Value::Null, value).at(position)
    }

    pub fn remove(notifier: ObjectId, feature: FeatureId, value: Value, position: usize) -> Self {
        Self::new(notifier, feature, ChangeKind::Remove, value, Value::Null).at(position)
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_set_change(mut self, is_set_change: bool) -> Self {
        self.is_set_change = is_set_change;
        self
    }

    /// A `Set` that did not change the value
    pub fn is_touch(&self) -> bool {
        self.kind == ChangeKind::Set && self.old_value == self.new_value && !self.is_set_change
    }
}
