use std::fmt;
use std::rc::Rc;

use gmlx_core_types::{ClassId, FeatureId, ObjectId};
use serde::{Deserialize, Serialize};

use super::class::ClassDescriptor;
use super::feature_map::FeatureMap;
use super::value::Value;
use crate::notify::Observer;

/// Where an object is held: the owning object and the feature under which
/// it appears there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    pub owner: ObjectId,
    pub feature: FeatureId,
}

/// Backing storage of one feature
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    Single(Value),
    Many(Vec<Value>),
    Map(FeatureMap),
    /// Values live as entries of the named feature map slot
    Grouped(FeatureId),
}

/// Base unit of the model graph
///
/// Holds one slot per feature of its class plus the containment back
/// reference. Objects only live inside a [`crate::Store`]; everything else
/// addresses them through their [`ObjectId`].
#[derive(Clone)]
pub struct StructuralObject {
    pub(crate) id: ObjectId,
    pub(crate) class: ClassId,
    pub(crate) slots: Vec<Slot>,
    pub(crate) set_flags: Vec<bool>,
    pub(crate) container: Option<ContainerRef>,
    pub(crate) observers: Vec<Rc<dyn Observer>>,
    pub(crate) deliver: bool,
}

impl StructuralObject {
    pub(crate) fn new(id: ObjectId, class: &ClassDescriptor) -> Self {
        let slots = class
            .features()
            .iter()
            .map(|f| {
                if let Some(group) = f.group() {
                    Slot::Grouped(group)
                } else if f.is_feature_map() {
                    Slot::Map(FeatureMap::new())
                } else if f.is_many() {
                    Slot::Many(Vec::new())
                } else {
                    Slot::Single(f.default_value())
                }
            })
            .collect();

        Self {
            id,
            class: class.id(),
            slots,
            set_flags: vec![false; class.feature_count()],
            container: None,
            observers: Vec::new(),
            deliver: true,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn container(&self) -> Option<ContainerRef> {
        self.container
    }

    pub fn is_root(&self) -> bool {
        self.container.is_none()
    }

    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub fn deliver(&self) -> bool {
        self.deliver
    }

    pub(crate) fn slot(&self, feature: FeatureId) -> &Slot {
        &self.slots[feature.index()]
    }

    pub(crate) fn slot_mut(&mut self, feature: FeatureId) -> &mut Slot {
        &mut self.slots[feature.index()]
    }

    pub(crate) fn is_flagged(&self, feature: FeatureId) -> bool {
        self.set_flags[feature.index()]
    }

    pub(crate) fn flag(&mut self, feature: FeatureId, set: bool) {
        self.set_flags[feature.index()] = set;
    }

    /// Every object value held by this object, with the feature it sits under
    ///
    /// Grouped features are reported under their member feature.
    pub(crate) fn object_values(&self) -> Vec<(FeatureId, ObjectId)> {
        let mut out = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let feature = FeatureId::new(index as u32);
            match slot {
                Slot::Single(Value::Object(id)) => out.push((feature, *id)),
                Slot::Many(items) => {
                    out.extend(items.iter().filter_map(|v| v.as_object()).map(|id| (feature, id)))
                }
                Slot::Map(map) => out.extend(
                    map.iter()
                        .filter_map(|e| e.value.as_object().map(|id| (e.feature, id))),
                ),
                _ => {}
            }
        }
        out
    }
}

impl fmt::Debug for StructuralObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralObject")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("slots", &self.slots)
            .field("set_flags", &self.set_flags)
            .field("container", &self.container)
            .field("observers", &self.observers.len())
            .field("deliver", &self.deliver)
            .finish()
    }
}
