//! Cross references with opposite-end maintenance
//!
//! A cross reference `f` with opposite `g` is kept symmetric: whenever `a.f`
//! gains `b`, `b.g` gains `a`, and removals mirror the same way. The inverse
//! side effects are appended to the chain before the primary record.

use gmlx_core_types::{FeatureId, ObjectId};

use super::{check_element, descriptor, list_slot_mut, mark_set, single_slot_mut, Store};
use crate::errors::{ModelError, Result};
use crate::model::{FeatureDescriptor, Notification, Value};
use crate::notify::NotificationChain;

/// Add `source` to `target.opposite` without touching the forward end
///
/// When the opposite is single-valued and already points at some other
/// object `c`, `c` first loses `target` from its forward feature.
pub(crate) fn inverse_add_with_chain(
    store: &mut Store,
    target: ObjectId,
    opposite: FeatureId,
    source: ObjectId,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let back = descriptor(meta.as_ref(), store, target, opposite)?;
    let value = Value::Object(source);

    if back.is_many() {
        let items = list_slot_mut(store, target, back)?;
        if items.contains(&value) {
            return Ok(());
        }
        items.push(value.clone());
        let position = items.len() - 1;
        let set_change = mark_set(store, target, back)?;
        chain.append(
            Notification::add(target, back.id(), value, position).with_set_change(set_change),
        );
        return Ok(());
    }

    let old = single_slot_mut(store, target, back)?.clone();
    if old == value {
        return Ok(());
    }
    if let (Some(previous), Some(forward)) = (old.as_object(), back.opposite()) {
        let forward = descriptor(meta.as_ref(), store, previous, forward)?;
        basic_remove_with_chain(store, previous, forward, target, chain)?;
    }
    *single_slot_mut(store, target, back)? = value.clone();
    let set_change = mark_set(store, target, back)?;
    chain.append(Notification::set(target, back.id(), old, value).with_set_change(set_change));
    Ok(())
}

/// Remove `source` from `target.opposite` without touching the forward end
pub(crate) fn inverse_remove_with_chain(
    store: &mut Store,
    target: ObjectId,
    opposite: FeatureId,
    source: ObjectId,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let back = descriptor(meta.as_ref(), store, target, opposite)?;
    basic_remove_with_chain(store, target, back, source, chain)
}

/// Drop `value` from one end only, recording the change
fn basic_remove_with_chain(
    store: &mut Store,
    holder: ObjectId,
    feature: &FeatureDescriptor,
    removed: ObjectId,
    chain: &mut NotificationChain,
) -> Result<()> {
    let value = Value::Object(removed);
    if feature.is_many() {
        let items = list_slot_mut(store, holder, feature)?;
        if let Some(position) = items.iter().position(|v| *v == value) {
            items.remove(position);
            chain.append(Notification::remove(holder, feature.id(), value, position));
        }
    } else {
        let slot = single_slot_mut(store, holder, feature)?;
        if *slot == value {
            *slot = Value::Null;
            let set_change = mark_set(store, holder, feature)?;
            chain.append(
                Notification::set(holder, feature.id(), value, Value::Null)
                    .with_set_change(set_change),
            );
        }
    }
    Ok(())
}

/// Set a single-valued cross reference, maintaining its opposite
///
/// # Errors
/// * `TypeMismatch` - If `value` is neither null nor an object conforming to the target
/// * `ObjectNotFound` - If a handle is stale
pub fn set_single_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    value: Value,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let feature = descriptor(meta.as_ref(), store, obj, feature)?;
    if !feature.is_cross_reference() || feature.is_many() {
        return Err(ModelError::TypeMismatch {
            feature_name: feature.name().to_string(),
            reason: "not a single-valued cross reference".to_string(),
        });
    }
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

    if let Some(opposite) = feature.opposite() {
        if let Some(previous) = old.as_object() {
            inverse_remove_with_chain(store, previous, opposite, obj, chain)?;
        }
        if let Some(next) = value.as_object() {
            inverse_add_with_chain(store, next, opposite, obj, chain)?;
        }
    }

    *single_slot_mut(store, obj, feature)? = value.clone();
    let set_change = mark_set(store, obj, feature)?;
    chain.append(Notification::set(obj, feature.id(), old, value).with_set_change(set_change));
    Ok(())
}

/// Set a single-valued cross reference and dispatch
///
/// # Errors
/// * Any error of [`set_single_with_chain`]
pub fn set_single(store: &mut Store, obj: ObjectId, feature: FeatureId, value: Value) -> Result<()> {
    let mut chain = NotificationChain::new();
    set_single_with_chain(store, obj, feature, value, &mut chain)?;
    chain.dispatch(store);
    Ok(())
}

/// Objects `obj` refers to through `feature`, whatever its cardinality
///
/// # Errors
/// * `UnknownFeature` - If `feature` is not declared on `obj`'s class
pub fn targets(store: &Store, obj: ObjectId, feature: FeatureId) -> Result<Vec<ObjectId>> {
    let value = super::object_ops::get(store, obj, feature)?;
    Ok(match value {
        Value::Object(id) => vec![id],
        Value::List(items) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    })
}
