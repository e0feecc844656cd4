//! Reflective get / set / unset / is_set by feature ID
//!
//! This is the contract generated accessors forward to. Dispatch is on the
//! feature's kind: single-valued slots are handled here, lists go to
//! [`super::list_ops`], feature maps and their members to
//! [`super::feature_map_ops`], and single cross references to
//! [`super::reference_ops`].

use gmlx_core_types::{BatchId, FeatureId, ObjectId};

use super::containment_ops::{adopt_with_chain, ensure_no_cycle, release};
use super::list_ops::take_all_with_chain;
use super::reference_ops::{self, inverse_remove_with_chain};
use super::{
    check_element, descriptor, feature_map_ops, list_ops, list_slot, map_slot, mark_set,
    single_slot_mut, type_mismatch, Store,
};
use crate::errors::Result;
use crate::model::object::Slot;
use crate::model::{FeatureDescriptor, FeatureKind, FeatureMap, Notification, Value};
use crate::notify::NotificationChain;

/// Read a feature as a whole value
///
/// Many-valued features read as `List`, feature map slots as `Entries`,
/// and single-valued feature map members as their first entry.
///
/// # Errors
/// * `UnknownFeature` - If `feature` is not declared on `obj`'s class
pub fn get(store: &Store, obj: ObjectId, feature: FeatureId) -> Result<Value> {
    let meta = store.metadata();
    let descriptor = descriptor(meta.as_ref(), store, obj, feature)?;
    if descriptor.group().is_some() {
        return feature_map_ops::get_member(store, obj, feature);
    }
    Ok(match store.get_object(obj)?.slot(feature) {
        Slot::Single(value) => value.clone(),
        Slot::Many(items) => Value::List(items.clone()),
        Slot::Map(map) => Value::Entries(map.entries().to_vec()),
        Slot::Grouped(_) => descriptor.default_value(),
    })
}

/// Borrow the elements of a list feature
///
/// # Errors
/// * `TypeMismatch` - If `feature` is single-valued or a feature map member
///
/// Read members through [`feature_map_ops::view`].
pub fn values(store: &Store, obj: ObjectId, feature: FeatureId) -> Result<&[Value]> {
    let meta = store.metadata();
    let descriptor = descriptor(meta.as_ref(), store, obj, feature)?;
    list_slot(store, obj, descriptor)
}

/// Borrow a feature map slot
///
/// # Errors
/// * `TypeMismatch` - If `group` is not a feature map slot
pub fn feature_map(store: &Store, obj: ObjectId, group: FeatureId) -> Result<&FeatureMap> {
    let meta = store.metadata();
    descriptor(meta.as_ref(), store, obj, group)?;
    map_slot(store, obj, group)
}

/// Set a feature and append the resulting records to `chain`
///
/// Single-valued features are replaced with one `Set` record. Setting a
/// single containment first detaches the new child from its previous
/// owner. Lists take a `List` and are cleared then refilled; feature map
/// slots take `Entries` and are replaced in bulk.
///
/// # Errors
/// * `TypeMismatch` - If the value kind disagrees with the feature
/// * `CycleDetected` - If a containment would close a cycle
///
/// Validation precedes mutation.
pub fn set_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    value: Value,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let descriptor = descriptor(meta.as_ref(), store, obj, feature)?;

    if descriptor.group().is_some() {
        return feature_map_ops::set_member_with_chain(store, obj, feature, value, chain);
    }

    match descriptor.kind() {
        FeatureKind::MapEntry => match value {
            Value::Entries(entries) => {
                feature_map_ops::replace_all_with_chain(store, obj, feature, entries, chain)
            }
            other => Err(type_mismatch(
                descriptor,
                format!("expected entries, got {}", other.kind_name()),
            )),
        },
        _ if descriptor.is_many() => match value {
            Value::List(items) => list_ops::replace_with_chain(store, obj, feature, items, chain),
            other => Err(type_mismatch(
                descriptor,
                format!("expected list, got {}", other.kind_name()),
            )),
        },
        FeatureKind::Attribute { .. } => set_attribute(store, obj, descriptor, value, chain),
        FeatureKind::SingleContainment { .. } => {
            set_containment(store, obj, descriptor, value, chain)
        }
        FeatureKind::CrossReference { .. } => {
            reference_ops::set_single_with_chain(store, obj, feature, value, chain)
        }
        FeatureKind::MultiContainment { .. } => Err(type_mismatch(descriptor, "expected list")),
    }
}

/// Set a feature and dispatch the resulting records
///
/// # Errors
/// * Any error of [`set_with_chain`]
pub fn set(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    value: impl Into<Value>,
) -> Result<Option<BatchId>> {
    let mut chain = NotificationChain::new();
    set_with_chain(store, obj, feature, value.into(), &mut chain)?;
    Ok(chain.dispatch(store))
}

fn set_attribute(
    store: &mut Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
    value: Value,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    check_element(meta.as_ref(), store, feature, &value, true)?;

    let old = single_slot_mut(store, obj, feature)?.clone();
    let set_change = mark_set(store, obj, feature)?;
    if old == value && !set_change && !store.config().touch_notifications {
        return Ok(());
    }
    *single_slot_mut(store, obj, feature)? = value.clone();
    chain.append(Notification::set(obj, feature.id(), old, value).with_set_change(set_change));
    Ok(())
}

fn set_containment(
    store: &mut Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
    value: Value,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    check_element(meta.as_ref(), store, feature, &value, true)?;

    let old = single_slot_mut(store, obj, feature)?.clone();
    if old == value {
        let set_change = mark_set(store, obj, feature)?;
        if set_change || store.config().touch_notifications {
            chain.append(
                Notification::set(obj, feature.id(), old, value).with_set_change(set_change),
            );
        }
        return Ok(());
    }

    if let Some(child) = value.as_object() {
        ensure_no_cycle(store, obj, child)?;
        adopt_with_chain(store, obj, feature.id(), child, chain)?;
    }
    if let Some(previous) = old.as_object() {
        release(store, previous, obj, feature.id())?;
    }

    *single_slot_mut(store, obj, feature)? = value.clone();
    let set_change = mark_set(store, obj, feature)?;
    chain.append(Notification::set(obj, feature.id(), old, value).with_set_change(set_change));
    Ok(())
}

/// Unset a feature and append the resulting records to `chain`
///
/// Unsettable features restore their default, clear the is-set flag and
/// record one `Unset` carrying the old value and whether the feature was
/// set. Other features behave as setting the default (clearing lists and
/// maps). Feature map members lose every entry.
///
/// # Errors
/// * `UnknownFeature` - If `feature` is not declared on `obj`'s class
pub fn unset_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let descriptor = descriptor(meta.as_ref(), store, obj, feature)?;

    if descriptor.group().is_some() {
        return feature_map_ops::unset_member_with_chain(store, obj, feature, chain);
    }
    if descriptor.is_feature_map() {
        return feature_map_ops::clear_with_chain(store, obj, feature, chain);
    }
    if !descriptor.is_unsettable() {
        if descriptor.is_many() {
            return list_ops::clear_bulk_with_chain(store, obj, feature, chain);
        }
        return set_with_chain(store, obj, feature, descriptor.default_value(), chain);
    }

    let was_set = store.get_object(obj)?.is_flagged(feature);
    let old = if descriptor.is_many() {
        Value::List(take_all_with_chain(store, obj, descriptor, chain)?)
    } else {
        let old = std::mem::replace(
            single_slot_mut(store, obj, descriptor)?,
            descriptor.default_value(),
        );
        if let Some(target) = old.as_object() {
            if descriptor.is_containment() {
                release(store, target, obj, feature)?;
            } else if let Some(opposite) = descriptor.opposite() {
                inverse_remove_with_chain(store, target, opposite, obj, chain)?;
            }
        }
        old
    };

    store.get_object_mut(obj)?.flag(feature, false);
    chain.append(
        Notification::unset(obj, feature, old, descriptor.default_value()).with_set_change(was_set),
    );
    Ok(())
}

/// Unset a feature and dispatch the resulting records
///
/// # Errors
/// * Any error of [`unset_with_chain`]
pub fn unset(store: &mut Store, obj: ObjectId, feature: FeatureId) -> Result<Option<BatchId>> {
    let mut chain = NotificationChain::new();
    unset_with_chain(store, obj, feature, &mut chain)?;
    Ok(chain.dispatch(store))
}

/// Whether a feature counts as set
///
/// Unsettable features answer from their explicit flag. Otherwise single
/// attributes are set when they differ from their default, single
/// references when non-null, and lists, maps and map members when
/// non-empty.
///
/// # Errors
/// * `UnknownFeature` - If `feature` is not declared on `obj`'s class
pub fn is_set(store: &Store, obj: ObjectId, feature: FeatureId) -> Result<bool> {
    let meta = store.metadata();
    let descriptor = descriptor(meta.as_ref(), store, obj, feature)?;
    let object = store.get_object(obj)?;

    if descriptor.group().is_some() {
        return Ok(feature_map_ops::count(store, obj, feature)? > 0);
    }
    if descriptor.is_unsettable() {
        return Ok(object.is_flagged(feature));
    }
    Ok(match object.slot(feature) {
        Slot::Single(value) => match descriptor.kind() {
            FeatureKind::Attribute { .. } => *value != descriptor.default_value(),
            _ => !value.is_null(),
        },
        Slot::Many(items) => !items.is_empty(),
        Slot::Map(map) => !map.is_empty(),
        Slot::Grouped(_) => false,
    })
}
