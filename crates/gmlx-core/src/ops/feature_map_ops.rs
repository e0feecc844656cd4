//! Feature maps: one ordered entry sequence shared by several member features
//!
//! Member operations address the member feature and a position within its
//! view (the member's entries in document order). Records are reported
//! under the member feature with the position inside the full map.
//! Group-level operations address the map slot itself.

use std::collections::HashSet;

use gmlx_core_types::{FeatureId, ObjectId};

use super::containment_ops::{ensure_no_cycle, release};
use super::list_ops::adopt_element;
use super::{check_element, descriptor, map_slot, map_slot_mut, type_mismatch, Store};
use crate::errors::{ModelError, Result};
use crate::metadata::MetadataProvider;
use crate::model::{ChangeKind, FeatureDescriptor, FeatureMap, FeatureMapEntry, Notification, Value};
use crate::notify::NotificationChain;

fn resolve_member<'m>(
    meta: &'m dyn MetadataProvider,
    store: &Store,
    obj: ObjectId,
    member: FeatureId,
) -> Result<(&'m FeatureDescriptor, FeatureId)> {
    let feature = descriptor(meta, store, obj, member)?;
    let group = feature
        .group()
        .ok_or_else(|| type_mismatch(feature, "not a feature map member"))?;
    Ok((feature, group))
}

fn resolve_group<'m>(
    meta: &'m dyn MetadataProvider,
    store: &Store,
    obj: ObjectId,
    group: FeatureId,
) -> Result<&'m FeatureDescriptor> {
    let feature = descriptor(meta, store, obj, group)?;
    if !feature.is_feature_map() {
        return Err(type_mismatch(feature, "not a feature map slot"));
    }
    Ok(feature)
}

/// Position within the member's view of the entry at full position `full`
fn view_position(map: &FeatureMap, member: FeatureId, full: usize) -> usize {
    map.entries()[..full]
        .iter()
        .filter(|e| e.feature == member)
        .count()
}

fn out_of_bounds(member: &FeatureDescriptor, index: usize, len: usize) -> ModelError {
    ModelError::IndexOutOfBounds {
        feature_name: member.name().to_string(),
        index,
        len,
    }
}

/// Current values of one member, in document order
///
/// # Errors
/// * `TypeMismatch` - If `member` is not stored in a feature map
pub fn view(store: &Store, obj: ObjectId, member: FeatureId) -> Result<Vec<Value>> {
    let meta = store.metadata();
    let (_, group) = resolve_member(meta.as_ref(), store, obj, member)?;
    Ok(map_slot(store, obj, group)?.values_of(member).cloned().collect())
}

/// Number of entries of one member
pub fn count(store: &Store, obj: ObjectId, member: FeatureId) -> Result<usize> {
    let meta = store.metadata();
    let (_, group) = resolve_member(meta.as_ref(), store, obj, member)?;
    Ok(map_slot(store, obj, group)?.count_of(member))
}

/// All entries of a map slot in document order
pub fn entries(store: &Store, obj: ObjectId, group: FeatureId) -> Result<Vec<FeatureMapEntry>> {
    let meta = store.metadata();
    resolve_group(meta.as_ref(), store, obj, group)?;
    Ok(map_slot(store, obj, group)?.entries().to_vec())
}

/// Lenient single-value read: the first entry of `member`, others untouched
///
/// Many-valued members return their whole view as a `List`. A member with
/// no entries reads as its default.
pub fn get_member(store: &Store, obj: ObjectId, member: FeatureId) -> Result<Value> {
    let meta = store.metadata();
    let (feature, group) = resolve_member(meta.as_ref(), store, obj, member)?;
    let map = map_slot(store, obj, group)?;
    if feature.is_many() {
        return Ok(Value::List(map.values_of(member).cloned().collect()));
    }
    Ok(map
        .first_of(member)
        .cloned()
        .unwrap_or_else(|| feature.default_value()))
}

/// Strict single-value read
///
/// # Errors
/// * `MultipleValues` - If `member` has more than one entry
pub fn get_single(store: &Store, obj: ObjectId, member: FeatureId) -> Result<Value> {
    let meta = store.metadata();
    let (feature, group) = resolve_member(meta.as_ref(), store, obj, member)?;
    let map = map_slot(store, obj, group)?;
    let count = map.count_of(member);
    if count > 1 {
        return Err(ModelError::MultipleValues {
            feature_name: feature.name().to_string(),
            count,
        });
    }
    Ok(map
        .first_of(member)
        .cloned()
        .unwrap_or_else(|| feature.default_value()))
}

/// Append an entry for `member` at the end of the full map
///
/// Returns the view position. A containment child already held by this
/// member stays where it is.
///
/// # Errors
/// * `TypeMismatch` - If the value does not fit the member
/// * `CycleDetected` - If a containment member would hold an ancestor of `obj`
pub fn add_with_chain(
    store: &mut Store,
    obj: ObjectId,
    member: FeatureId,
    value: Value,
    chain: &mut NotificationChain,
) -> Result<usize> {
    let meta = store.metadata();
    let (feature, group) = resolve_member(meta.as_ref(), store, obj, member)?;
    check_element(meta.as_ref(), store, feature, &value, false)?;

    if let (true, Some(child)) = (feature.is_containment(), value.as_object()) {
        let map = map_slot(store, obj, group)?;
        if let Some(full) = map.position_of(member, &value) {
            return Ok(view_position(map, member, full));
        }
        ensure_no_cycle(store, obj, child)?;
    }

    adopt_element(store, obj, feature, &value, chain)?;
    let map = map_slot_mut(store, obj, group)?;
    let full = map.push(FeatureMapEntry::new(member, value.clone()));
    let view = map.count_of(member) - 1;
    chain.append(Notification::add(obj, member, value, full));
    Ok(view)
}

pub fn add(store: &mut Store, obj: ObjectId, member: FeatureId, value: Value) -> Result<usize> {
    let mut chain = NotificationChain::new();
    let view = add_with_chain(store, obj, member, value, &mut chain)?;
    chain.dispatch(store);
    Ok(view)
}

/// Insert before the entry currently at `view_index` of `member`'s view
///
/// `view_index == count` appends at the end of the full map. Entries of
/// other members keep their places.
///
/// # Errors
/// * `IndexOutOfBounds` - If `view_index > count`
/// * Any error of [`add_with_chain`]
pub fn insert_with_chain(
    store: &mut Store,
    obj: ObjectId,
    member: FeatureId,
    view_index: usize,
    value: Value,
    chain: &mut NotificationChain,
) -> Result<usize> {
    let meta = store.metadata();
    let (feature, group) = resolve_member(meta.as_ref(), store, obj, member)?;
    check_element(meta.as_ref(), store, feature, &value, false)?;

    let map = map_slot(store, obj, group)?;
    let count = map.count_of(member);
    if view_index > count {
        return Err(out_of_bounds(feature, view_index, count));
    }
    if let (true, Some(child)) = (feature.is_containment(), value.as_object()) {
        if let Some(full) = map.position_of(member, &value) {
            return Ok(view_position(map, member, full));
        }
        ensure_no_cycle(store, obj, child)?;
    }

    adopt_element(store, obj, feature, &value, chain)?;
    let map = map_slot_mut(store, obj, group)?;
    let full = map.full_index(member, view_index).unwrap_or(map.len());
    map.insert(full, FeatureMapEntry::new(member, value.clone()));
    chain.append(Notification::add(obj, member, value, full));
    Ok(view_index)
}

pub fn insert(
    store: &mut Store,
    obj: ObjectId,
    member: FeatureId,
    view_index: usize,
    value: Value,
) -> Result<usize> {
    let mut chain = NotificationChain::new();
    let view = insert_with_chain(store, obj, member, view_index, value, &mut chain)?;
    chain.dispatch(store);
    Ok(view)
}

/// Remove the first entry `(member, value)`; returns its view position
///
/// # Errors
/// * `NotPresent` - If `member` holds no such value
pub fn remove_with_chain(
    store: &mut Store,
    obj: ObjectId,
    member: FeatureId,
    value: &Value,
    chain: &mut NotificationChain,
) -> Result<usize> {
    let meta = store.metadata();
    let (feature, group) = resolve_member(meta.as_ref(), store, obj, member)?;
    let map = map_slot(store, obj, group)?;
    let full = map
        .position_of(member, value)
        .ok_or_else(|| ModelError::NotPresent {
            feature_name: feature.name().to_string(),
            value: value.to_string(),
        })?;
    let view = view_position(map, member, full);
    remove_entry(store, obj, feature, group, full, chain)?;
    Ok(view)
}

pub fn remove(store: &mut Store, obj: ObjectId, member: FeatureId, value: &Value) -> Result<usize> {
    let mut chain = NotificationChain::new();
    let view = remove_with_chain(store, obj, member, value, &mut chain)?;
    chain.dispatch(store);
    Ok(view)
}

/// Remove the entry at `view_index` of `member`'s view
///
/// # Errors
/// * `IndexOutOfBounds` - If `view_index >= count`
pub fn remove_at_with_chain(
    store: &mut Store,
    obj: ObjectId,
    member: FeatureId,
    view_index: usize,
    chain: &mut NotificationChain,
) -> Result<Value> {
    let meta = store.metadata();
    let (feature, group) = resolve_member(meta.as_ref(), store, obj, member)?;
    let map = map_slot(store, obj, group)?;
    let full = map
        .full_index(member, view_index)
        .ok_or_else(|| out_of_bounds(feature, view_index, map.count_of(member)))?;
    remove_entry(store, obj, feature, group, full, chain)
}

pub fn remove_at(store: &mut Store, obj: ObjectId, member: FeatureId, view_index: usize) -> Result<Value> {
    let mut chain = NotificationChain::new();
    let value = remove_at_with_chain(store, obj, member, view_index, &mut chain)?;
    chain.dispatch(store);
    Ok(value)
}

fn remove_entry(
    store: &mut Store,
    obj: ObjectId,
    feature: &FeatureDescriptor,
    group: FeatureId,
    full: usize,
    chain: &mut NotificationChain,
) -> Result<Value> {
    let entry = map_slot_mut(store, obj, group)?.remove(full);
    if let (true, Some(child)) = (feature.is_containment(), entry.value.as_object()) {
        release(store, child, obj, feature.id())?;
    }
    chain.append(Notification::remove(obj, feature.id(), entry.value.clone(), full));
    Ok(entry.value)
}

/// Move an entry within `member`'s view
///
/// The record carries full-map positions: the old one as an `Int` old value
/// and the new one as position.
///
/// # Errors
/// * `IndexOutOfBounds` - If either index is `>= count`
pub fn move_item_with_chain(
    store: &mut Store,
    obj: ObjectId,
    member: FeatureId,
    from: usize,
    to: usize,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let (feature, group) = resolve_member(meta.as_ref(), store, obj, member)?;
    let map = map_slot_mut(store, obj, group)?;
    let count = map.count_of(member);
    let Some(full_from) = map.full_index(member, from) else {
        return Err(out_of_bounds(feature, from, count));
    };
    if to >= count {
        return Err(out_of_bounds(feature, to, count));
    }

    let entry = map.remove(full_from);
    let full_to = match map.full_index(member, to) {
        Some(full) => full,
        None if to == 0 => full_from,
        None => map.full_index(member, to - 1).map_or(full_from, |last| last + 1),
    };
    let value = entry.value.clone();
    map.insert(full_to, entry);
    chain.append(
        Notification::new(obj, member, ChangeKind::Move, Value::Int(full_from as i64), value)
            .at(full_to),
    );
    Ok(())
}

/// Remove every entry of `member`, front first, one `Remove` each
pub fn unset_member_with_chain(
    store: &mut Store,
    obj: ObjectId,
    member: FeatureId,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let (feature, group) = resolve_member(meta.as_ref(), store, obj, member)?;
    while let Some(full) = map_slot(store, obj, group)?.full_index(member, 0) {
        remove_entry(store, obj, feature, group, full, chain)?;
    }
    Ok(())
}

pub fn unset_member(store: &mut Store, obj: ObjectId, member: FeatureId) -> Result<()> {
    let mut chain = NotificationChain::new();
    unset_member_with_chain(store, obj, member, &mut chain)?;
    chain.dispatch(store);
    Ok(())
}

/// Set a member through its single-value or list form
///
/// Single-valued members replace their first entry in place, or append one
/// when none exists; null removes every entry. Many-valued members take a
/// `List` and replace their whole view.
///
/// # Errors
/// * `TypeMismatch` - If a value does not fit the member; nothing changes
pub fn set_member_with_chain(
    store: &mut Store,
    obj: ObjectId,
    member: FeatureId,
    value: Value,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let (feature, group) = resolve_member(meta.as_ref(), store, obj, member)?;

    if feature.is_many() {
        let Value::List(values) = value else {
            return Err(type_mismatch(
                feature,
                format!("expected list, got {}", value.kind_name()),
            ));
        };
        for v in &values {
            check_element(meta.as_ref(), store, feature, v, false)?;
            if let (true, Some(child)) = (feature.is_containment(), v.as_object()) {
                ensure_no_cycle(store, obj, child)?;
            }
        }
        unset_member_with_chain(store, obj, member, chain)?;
        for v in values {
            add_with_chain(store, obj, member, v, chain)?;
        }
        return Ok(());
    }

    if value.is_null() {
        return unset_member_with_chain(store, obj, member, chain);
    }
    check_element(meta.as_ref(), store, feature, &value, false)?;

    let map = map_slot(store, obj, group)?;
    if let Some(full) = map.full_index(member, 0) {
        if map.entries()[full].value == value {
            if store.config().touch_notifications {
                chain.append(Notification::set(obj, member, value.clone(), value).at(full));
            }
            return Ok(());
        }
    }

    let child = value.as_object().filter(|_| feature.is_containment());
    if let Some(child) = child {
        ensure_no_cycle(store, obj, child)?;
        adopt_element(store, obj, feature, &value, chain)?;
    }

    let map = map_slot_mut(store, obj, group)?;
    let (old, full) = match map.full_index(member, 0) {
        Some(full) => (map.replace_value(full, value.clone()), full),
        None => (Value::Null, map.push(FeatureMapEntry::new(member, value.clone()))),
    };
    if let (true, Some(previous)) = (feature.is_containment(), old.as_object()) {
        release(store, previous, obj, member)?;
    }
    chain.append(Notification::set(obj, member, old, value).at(full));
    Ok(())
}

pub fn set_member(store: &mut Store, obj: ObjectId, member: FeatureId, value: Value) -> Result<()> {
    let mut chain = NotificationChain::new();
    set_member_with_chain(store, obj, member, value, &mut chain)?;
    chain.dispatch(store);
    Ok(())
}

/// Remove every entry of a map slot with one `RemoveMany` record
pub fn clear_with_chain(
    store: &mut Store,
    obj: ObjectId,
    group: FeatureId,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    resolve_group(meta.as_ref(), store, obj, group)?;

    let removed = std::mem::take(map_slot_mut(store, obj, group)?);
    if removed.is_empty() {
        return Ok(());
    }
    for entry in removed.iter() {
        let member = descriptor(meta.as_ref(), store, obj, entry.feature)?;
        if let (true, Some(child)) = (member.is_containment(), entry.value.as_object()) {
            release(store, child, obj, entry.feature)?;
        }
    }
    chain.append(Notification::new(
        obj,
        group,
        ChangeKind::RemoveMany,
        Value::Entries(removed.entries().to_vec()),
        Value::Null,
    ));
    Ok(())
}

pub fn clear(store: &mut Store, obj: ObjectId, group: FeatureId) -> Result<()> {
    let mut chain = NotificationChain::new();
    clear_with_chain(store, obj, group, &mut chain)?;
    chain.dispatch(store);
    Ok(())
}

/// Replace the whole map slot
///
/// Every entry is validated (member of this group, value kind, no
/// containment cycle) before anything changes. The old entries leave with
/// one `RemoveMany`, the new ones arrive with one `AddMany` on the slot.
/// A containment child listed twice is kept at its first occurrence.
///
/// # Errors
/// * `TypeMismatch` - If an entry's feature is not a member of `group`
/// * `TypeMismatch` - If an entry's value does not fit its member
pub fn replace_all_with_chain(
    store: &mut Store,
    obj: ObjectId,
    group: FeatureId,
    new_entries: Vec<FeatureMapEntry>,
    chain: &mut NotificationChain,
) -> Result<()> {
    let meta = store.metadata();
    let slot = resolve_group(meta.as_ref(), store, obj, group)?;

    let mut members = Vec::with_capacity(new_entries.len());
    for entry in &new_entries {
        let member = descriptor(meta.as_ref(), store, obj, entry.feature)?;
        if member.group() != Some(group) {
            return Err(type_mismatch(
                slot,
                format!("feature '{}' is not a member of this map", member.name()),
            ));
        }
        check_element(meta.as_ref(), store, member, &entry.value, false)?;
        if let (true, Some(child)) = (member.is_containment(), entry.value.as_object()) {
            ensure_no_cycle(store, obj, child)?;
        }
        members.push(member);
    }

    clear_with_chain(store, obj, group, chain)?;

    let mut children = HashSet::new();
    let mut added = Vec::with_capacity(new_entries.len());
    for (entry, member) in new_entries.into_iter().zip(members) {
        if let (true, Some(child)) = (member.is_containment(), entry.value.as_object()) {
            if !children.insert(child) {
                continue;
            }
        }
        adopt_element(store, obj, member, &entry.value, chain)?;
        added.push(entry);
    }

    if added.is_empty() {
        return Ok(());
    }
    let map = map_slot_mut(store, obj, group)?;
    for entry in &added {
        map.push(entry.clone());
    }
    chain.append(
        Notification::new(
            obj,
            group,
            ChangeKind::AddMany,
            Value::Null,
            Value::Entries(added),
        )
        .at(0),
    );
    Ok(())
}

pub fn replace_all(
    store: &mut Store,
    obj: ObjectId,
    group: FeatureId,
    new_entries: Vec<FeatureMapEntry>,
) -> Result<()> {
    let mut chain = NotificationChain::new();
    replace_all_with_chain(store, obj, group, new_entries, &mut chain)?;
    chain.dispatch(store);
    Ok(())
}
