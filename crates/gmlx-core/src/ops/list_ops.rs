//! Ordered many-valued features
//!
//! Serves many-valued attributes, containment lists and cross-reference
//! lists alike. Object-valued lists are unique: adding an element that is
//! already present is a no-op. Containment lists re-parent the element,
//! cross-reference lists keep their opposite in step. Members of a feature
//! map are forwarded to [`super::feature_map_ops`].

use std::collections::HashSet;

use gmlx_core_types::{FeatureId, ObjectId};

use super::containment_ops::{adopt_with_chain, ensure_no_cycle, release};
use super::reference_ops::{inverse_add_with_chain, inverse_remove_with_chain};
use super::{
    check_element, descriptor, feature_map_ops, list_slot, list_slot_mut, mark_set, type_mismatch,
    Store,
};
use crate::errors::{ModelError, Result};
use crate::model::{ChangeKind, FeatureDescriptor, Notification, Value};
use crate::notify::NotificationChain;

fn require_list(feature: &FeatureDescriptor) -> Result<()> {
    if !feature.is_many() || feature.is_feature_map() {
        return Err(type_mismatch(feature, "not a list feature"));
    }
    Ok(())
}

fn out_of_bounds(feature: &FeatureDescriptor, index: usize, len: usize) -> ModelError {
    ModelError::IndexOutOfBounds {
        feature_name: feature.name().to_string(),
        index,
        len,
    }
}

/// Bring `value` under `obj.feature`: re-parent a child or link the opposite end
pub(crate) fn adopt_element(
    store: &mut Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
    value: &Value,
    chain: &mut NotificationChain,
) -> Result<()> {
    let Some(target) = value.as_object() else {
        return Ok(());
    };
    if feature.is_containment() {
        adopt_with_chain(store, obj, feature.id(), target, chain)?;
    } else if let Some(opposite) = feature.opposite() {
        inverse_add_with_chain(store, target, opposite, obj, chain)?;
    }
    Ok(())
}

/// Undo [`adopt_element`] for a value that has left `obj.feature`
pub(crate) fn forsake_element(
    store: &mut Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
    value: &Value,
    chain: &mut NotificationChain,
) -> Result<()> {
    let Some(target) = value.as_object() else {
        return Ok(());
    };
    if feature.is_containment() {
        release(store, target, obj, feature.id())?;
    } else if let Some(opposite) = feature.opposite() {
        inverse_remove_with_chain(store, target, opposite, obj, chain)?;
    }
    Ok(())
}

/// Append `value`; returns its position
///
/// # Errors
/// * `TypeMismatch` - If the element kind is wrong
/// * `CycleDetected` - If a containment list would hold an ancestor of its owner
pub fn add_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    value: Value,
    chain: &mut NotificationChain,
) -> Result<usize> {
    let meta = store.metadata();
    let feature = descriptor(meta.as_ref(), store, obj, feature)?;
    if feature.group().is_some() {
        return feature_map_ops::add_with_chain(store, obj, feature.id(), value, chain);
    }
    require_list(feature)?;
    check_element(meta.as_ref(), store, feature, &value, false)?;

    if feature.target().is_some() {
        if let Some(position) = list_slot(store, obj, feature)?.iter().position(|v| *v == value) {
            return Ok(position);
        }
    }
    if let (true, Some(child)) = (feature.is_containment(), value.as_object()) {
        ensure_no_cycle(store, obj, child)?;
    }

    adopt_element(store, obj, feature, &value, chain)?;
    let items = list_slot_mut(store, obj, feature)?;
    items.push(value.clone());
    let position = items.len() - 1;
    let set_change = mark_set(store, obj, feature)?;
    chain.append(Notification::add(obj, feature.id(), value, position).with_set_change(set_change));
    Ok(position)
}

pub fn add(store: &mut Store, obj: ObjectId, feature: FeatureId, value: Value) -> Result<usize> {
    let mut chain = NotificationChain::new();
    let position = add_with_chain(store, obj, feature, value, &mut chain)?;
    chain.dispatch(store);
    Ok(position)
}

/// Insert `value` before position `index` (`index == len` appends)
///
/// An object already in the list stays where it is and its current position
/// is returned.
///
/// # Errors
/// * `IndexOutOfBounds` - If `index > len`
/// * Any error of [`add_with_chain`]
pub fn insert_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    index: usize,
    value: Value,
    chain: &mut NotificationChain,
) -> Result<usize> {
    let meta = store.metadata();
    let feature = descriptor(meta.as_ref(), store, obj, feature)?;
    if feature.group().is_some() {
        return feature_map_ops::insert_with_chain(store, obj, feature.id(), index, value, chain);
    }
    require_list(feature)?;
    check_element(meta.as_ref(), store, feature, &value, false)?;

    let items = list_slot(store, obj, feature)?;
    if index > items.len() {
        return Err(out_of_bounds(feature, index, items.len()));
    }
    if feature.target().is_some() {
        if let Some(position) = items.iter().position(|v| *v == value) {
            return Ok(position);
        }
    }
    if let (true, Some(child)) = (feature.is_containment(), value.as_object()) {
        ensure_no_cycle(store, obj, child)?;
    }

    adopt_element(store, obj, feature, &value, chain)?;
    list_slot_mut(store, obj, feature)?.insert(index, value.clone());
    let set_change = mark_set(store, obj, feature)?;
    chain.append(Notification::add(obj, feature.id(), value, index).with_set_change(set_change));
    Ok(index)
}

pub fn insert(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    index: usize,
    value: Value,
) -> Result<usize> {
    let mut chain = NotificationChain::new();
    let position = insert_with_chain(store, obj, feature, index, value, &mut chain)?;
    chain.dispatch(store);
    Ok(position)
}

/// Remove the first occurrence of `value`; returns the position it had
///
/// # Errors
/// * `NotPresent` - If the list does not hold `value`
pub fn remove_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    value: &Value,
    chain: &mut NotificationChain,
) -> Result<usize> {
    let meta = store.metadata();
    let feature = descriptor(meta.as_ref(), store, obj, feature)?;
    if feature.group().is_some() {
        return feature_map_ops::remove_with_chain(store, obj, feature.id(), value, chain);
    }
    require_list(feature)?;

    let position = list_slot(store, obj, feature)?
        .iter()
        .position(|v| v == value)
        .ok_or_else(|| ModelError::NotPresent {
            feature_name: feature.name().to_string(),
            value: value.to_string(),
        })?;
    remove_position(store, obj, feature, position, chain)?;
    Ok(position)
}

pub fn remove(store: &mut Store, obj: ObjectId, feature: FeatureId, value: &Value) -> Result<usize> {
    let mut chain = NotificationChain::new();
    let position = remove_with_chain(store, obj, feature, value, &mut chain)?;
    chain.dispatch(store);
    Ok(position)
}

/// Remove and return the element at `index`
///
/// # Errors
/// * `IndexOutOfBounds` - If `index >= len`
pub fn remove_at_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    index: usize,
    chain: &mut NotificationChain,
) -> Result<Value> {
    let meta = store.metadata();
    let feature = descriptor(meta.as_ref(), store, obj, feature)?;
    if feature.group().is_some() {
        return feature_map_ops::remove_at_with_chain(store, obj, feature.id(), index, chain);
    }
    require_list(feature)?;

    let len = list_slot(store, obj, feature)?.len();
    if index >= len {
        return Err(out_of_bounds(feature, index, len));
    }
    remove_position(store, obj, feature, index, chain)
}

pub fn remove_at(store: &mut Store, obj: ObjectId, feature: FeatureId, index: usize) -> Result<Value> {
    let mut chain = NotificationChain::new();
    let value = remove_at_with_chain(store, obj, feature, index, &mut chain)?;
    chain.dispatch(store);
    Ok(value)
}

fn remove_position(
    store: &mut Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
    position: usize,
    chain: &mut NotificationChain,
) -> Result<Value> {
    let value = list_slot_mut(store, obj, feature)?.remove(position);
    forsake_element(store, obj, feature, &value, chain)?;
    let set_change = mark_set(store, obj, feature)?;
    chain.append(
        Notification::remove(obj, feature.id(), value.clone(), position)
            .with_set_change(set_change),
    );
    Ok(value)
}

/// Move the element at `from` to `to`
///
/// Records a `Move` whose old value is the previous position.
///
/// # Errors
/// * `IndexOutOfBounds` - If either index is `>= len`
pub fn move_item_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    from: usize,
    to: usize,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let feature = descriptor(meta.as_ref(), store, obj, feature)?;
    if feature.group().is_some() {
        return feature_map_ops::move_item_with_chain(store, obj, feature.id(), from, to, chain);
    }
    require_list(feature)?;

    let items = list_slot_mut(store, obj, feature)?;
    let len = items.len();
    if from >= len {
        return Err(out_of_bounds(feature, from, len));
    }
    if to >= len {
        return Err(out_of_bounds(feature, to, len));
    }
    let value = items.remove(from);
    items.insert(to, value.clone());
    let set_change = mark_set(store, obj, feature)?;
    chain.append(
        Notification::new(
            obj,
            feature.id(),
            ChangeKind::Move,
            Value::Int(from as i64),
            value,
        )
        .at(to)
        .with_set_change(set_change),
    );
    Ok(())
}

pub fn move_item(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    from: usize,
    to: usize,
) -> Result<()> {
    let mut chain = NotificationChain::new();
    move_item_with_chain(store, obj, feature, from, to, &mut chain)?;
    chain.dispatch(store);
    Ok(())
}

/// Remove every element, front first, one `Remove` per element
pub fn clear_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let feature = descriptor(meta.as_ref(), store, obj, feature)?;
    if feature.group().is_some() {
        return feature_map_ops::unset_member_with_chain(store, obj, feature.id(), chain);
    }
    require_list(feature)?;

    while !list_slot(store, obj, feature)?.is_empty() {
        remove_position(store, obj, feature, 0, chain)?;
    }
    Ok(())
}

pub fn clear(store: &mut Store, obj: ObjectId, feature: FeatureId) -> Result<()> {
    let mut chain = NotificationChain::new();
    clear_with_chain(store, obj, feature, &mut chain)?;
    chain.dispatch(store);
    Ok(())
}

/// Remove every element with a single `RemoveMany` record (`Remove` when only one)
pub fn clear_bulk_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let feature = descriptor(meta.as_ref(), store, obj, feature)?;
    if feature.group().is_some() {
        return feature_map_ops::unset_member_with_chain(store, obj, feature.id(), chain);
    }
    require_list(feature)?;

    let removed = take_all_with_chain(store, obj, feature, chain)?;
    if removed.is_empty() {
        return Ok(());
    }
    if removed.len() == 1 {
        let value = removed.into_iter().next().unwrap_or_default();
        chain.append(Notification::remove(obj, feature.id(), value, 0));
    } else {
        chain.append(Notification::new(
            obj,
            feature.id(),
            ChangeKind::RemoveMany,
            Value::List(removed),
            Value::Null,
        ));
    }
    Ok(())
}

pub fn clear_bulk(store: &mut Store, obj: ObjectId, feature: FeatureId) -> Result<()> {
    let mut chain = NotificationChain::new();
    clear_bulk_with_chain(store, obj, feature, &mut chain)?;
    chain.dispatch(store);
    Ok(())
}

/// Empty the list, running element side effects but recording no primary change
pub(crate) fn take_all_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
    chain: &mut NotificationChain,
) -> Result<Vec<Value>> {
    let removed = std::mem::take(list_slot_mut(store, obj, feature)?);
    for value in &removed {
        forsake_element(store, obj, feature, value, chain)?;
    }
    Ok(removed)
}

/// Append several values with one `AddMany` record (`Add` when only one is new)
///
/// Every value is validated before the list changes. Object values already
/// present, or repeated in `values`, are skipped.
///
/// # Errors
/// * Any error of [`add_with_chain`], for any of the values
pub fn add_all_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    values: Vec<Value>,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let feature = descriptor(meta.as_ref(), store, obj, feature)?;
    if feature.group().is_some() {
        for value in values {
            feature_map_ops::add_with_chain(store, obj, feature.id(), value, chain)?;
        }
        return Ok(());
    }
    require_list(feature)?;

    let fresh = admissible(store, obj, feature, values)?;
    append_all(store, obj, feature, fresh, chain)
}

pub fn add_all(store: &mut Store, obj: ObjectId, feature: FeatureId, values: Vec<Value>) -> Result<()> {
    let mut chain = NotificationChain::new();
    add_all_with_chain(store, obj, feature, values, &mut chain)?;
    chain.dispatch(store);
    Ok(())
}

/// Replace the whole list: clear, then add all
///
/// # Errors
/// * `TypeMismatch` - If a new value does not fit the list
/// * `CycleDetected` - If a containment list would hold an ancestor of its owner
///
/// Every new value is validated before the old ones are removed.
pub fn replace_with_chain(
    store: &mut Store,
    obj: ObjectId,
    feature: FeatureId,
    values: Vec<Value>,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let feature = descriptor(meta.as_ref(), store, obj, feature)?;
    if feature.group().is_some() {
        return feature_map_ops::set_member_with_chain(
            store,
            obj,
            feature.id(),
            Value::List(values),
            chain,
        );
    }
    require_list(feature)?;

    for value in &values {
        check_element(meta.as_ref(), store, feature, value, false)?;
        if let (true, Some(child)) = (feature.is_containment(), value.as_object()) {
            ensure_no_cycle(store, obj, child)?;
        }
    }

    clear_bulk_with_chain(store, obj, feature.id(), chain)?;
    let fresh = admissible(store, obj, feature, values)?;
    append_all(store, obj, feature, fresh, chain)
}

/// Validate `values` for appending and drop object duplicates
fn admissible(
    store: &Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
    values: Vec<Value>,
) -> Result<Vec<Value>> {
    let meta = store.metadata();
    let present = list_slot(store, obj, feature)?;
    let mut seen = HashSet::new();
    let mut fresh = Vec::with_capacity(values.len());

    for value in values {
        check_element(meta.as_ref(), store, feature, &value, false)?;
        if let Some(id) = value.as_object() {
            if present.contains(&value) || !seen.insert(id) {
                continue;
            }
            if feature.is_containment() {
                ensure_no_cycle(store, obj, id)?;
            }
        }
        fresh.push(value);
    }
    Ok(fresh)
}

fn append_all(
    store: &mut Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
    fresh: Vec<Value>,
    chain: &mut NotificationChain,
) -> Result<()> {
    if fresh.is_empty() {
        return Ok(());
    }
    for value in &fresh {
        adopt_element(store, obj, feature, value, chain)?;
    }

    let items = list_slot_mut(store, obj, feature)?;
    let start = items.len();
    items.extend(fresh.iter().cloned());
    let set_change = mark_set(store, obj, feature)?;

    let record = if fresh.len() == 1 {
        let value = fresh.into_iter().next().unwrap_or_default();
        Notification::add(obj, feature.id(), value, start)
    } else {
        Notification::new(
            obj,
            feature.id(),
            ChangeKind::AddMany,
            Value::Null,
            Value::List(fresh),
        )
        .at(start)
    };
    chain.append(record.with_set_change(set_change));
    Ok(())
}
