//! Reflective operations over the object store
//!
//! Every mutating operation comes in two forms: a root form that builds a
//! fresh chain and dispatches it, and a `_with_chain` form that appends to a
//! caller-supplied chain so cascades can be batched.

pub mod containment_ops;
pub mod feature_map_ops;
pub mod lifecycle_ops;
pub mod list_ops;
pub mod object_ops;
pub mod reference_ops;
pub mod store;
pub mod views;

pub use store::Store;
pub use views::{FeatureMapView, ListView, MapView};

use gmlx_core_types::{FeatureId, ObjectId};

use crate::errors::{ModelError, Result};
use crate::metadata::provider::{require_class, require_feature};
use crate::metadata::MetadataProvider;
use crate::model::object::Slot;
use crate::model::{FeatureDescriptor, FeatureKind, FeatureMap, Value};

/// Resolve the descriptor of `feature` on `obj`'s class
///
/// The descriptor borrows from `meta`, not from the store, so the caller can
/// keep it while mutating.
pub(crate) fn descriptor<'m>(
    meta: &'m dyn MetadataProvider,
    store: &Store,
    obj: ObjectId,
    feature: FeatureId,
) -> Result<&'m FeatureDescriptor> {
    let class = require_class(meta, store.get_object(obj)?.class)?;
    require_feature(class, feature)
}

pub(crate) fn type_mismatch(feature: &FeatureDescriptor, reason: impl Into<String>) -> ModelError {
    ModelError::TypeMismatch {
        feature_name: feature.name().to_string(),
        reason: reason.into(),
    }
}

/// Check one element value against a feature's declared kind
///
/// `Null` is only accepted where a single-valued slot may be empty.
pub(crate) fn check_element(
    meta: &dyn MetadataProvider,
    store: &Store,
    feature: &FeatureDescriptor,
    value: &Value,
    allow_null: bool,
) -> Result<()> {
    if value.is_null() {
        return if allow_null {
            Ok(())
        } else {
            Err(type_mismatch(feature, "null is not a valid element"))
        };
    }

    match feature.kind() {
        FeatureKind::Attribute { data_type } => {
            if data_type.accepts(value) {
                Ok(())
            } else {
                Err(type_mismatch(
                    feature,
                    format!("{} value for {:?} attribute", value.kind_name(), data_type),
                ))
            }
        }
        FeatureKind::SingleContainment { target }
        | FeatureKind::MultiContainment { target }
        | FeatureKind::CrossReference { target, .. } => {
            let id = value.as_object().ok_or_else(|| {
                type_mismatch(feature, format!("expected object, got {}", value.kind_name()))
            })?;
            let class = store.get_object(id)?.class;
            if meta.is_subclass(class, *target) {
                Ok(())
            } else {
                let name = meta.class(class).map(|c| c.name()).unwrap_or("?");
                Err(type_mismatch(
                    feature,
                    format!("object {} of class {} does not conform to {}", id, name, target),
                ))
            }
        }
        FeatureKind::MapEntry => Err(type_mismatch(
            feature,
            "feature map slots hold entries, not plain values",
        )),
    }
}

/// Mark a feature set; returns whether it crossed the is-set boundary
pub(crate) fn mark_set(
    store: &mut Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
) -> Result<bool> {
    let object = store.get_object_mut(obj)?;
    let was = object.is_flagged(feature.id());
    object.flag(feature.id(), true);
    Ok(feature.is_unsettable() && !was)
}

pub(crate) fn list_slot<'s>(
    store: &'s Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
) -> Result<&'s [Value]> {
    match store.get_object(obj)?.slot(feature.id()) {
        Slot::Many(items) => Ok(items),
        _ => Err(type_mismatch(feature, "not a many-valued feature")),
    }
}

pub(crate) fn list_slot_mut<'s>(
    store: &'s mut Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
) -> Result<&'s mut Vec<Value>> {
    match store.get_object_mut(obj)?.slot_mut(feature.id()) {
        Slot::Many(items) => Ok(items),
        _ => Err(type_mismatch(feature, "not a many-valued feature")),
    }
}

pub(crate) fn map_slot<'s>(store: &'s Store, obj: ObjectId, group: FeatureId) -> Result<&'s FeatureMap> {
    match store.get_object(obj)?.slot(group) {
        Slot::Map(map) => Ok(map),
        _ => Err(ModelError::TypeMismatch {
            feature_name: group.to_string(),
            reason: "not a feature map slot".to_string(),
        }),
    }
}

pub(crate) fn map_slot_mut<'s>(
    store: &'s mut Store,
    obj: ObjectId,
    group: FeatureId,
) -> Result<&'s mut FeatureMap> {
    match store.get_object_mut(obj)?.slot_mut(group) {
        Slot::Map(map) => Ok(map),
        _ => Err(ModelError::TypeMismatch {
            feature_name: group.to_string(),
            reason: "not a feature map slot".to_string(),
        }),
    }
}

pub(crate) fn single_slot_mut<'s>(
    store: &'s mut Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
) -> Result<&'s mut Value> {
    match store.get_object_mut(obj)?.slot_mut(feature.id()) {
        Slot::Single(value) => Ok(value),
        _ => Err(type_mismatch(feature, "not a single-valued feature")),
    }
}
