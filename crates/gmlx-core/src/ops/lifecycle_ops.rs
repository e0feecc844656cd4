use std::collections::HashSet;
use std::time::Instant;

use gmlx_core_types::{BatchId, ClassId, FeatureId, ObjectId};

use super::containment_ops::detach_with_chain;
use super::{descriptor, list_slot_mut, map_slot_mut, single_slot_mut, Store};
use crate::errors::Result;
use crate::model::object::Slot;
use crate::model::{FeatureDescriptor, FeatureKind, Notification, Value};
use crate::notify::NotificationChain;
use crate::{log_op_end, log_op_error, log_op_start};

/// Create a new root object of `class` with every slot at its default
///
/// # Errors
/// * `ClassNotFound` - If the metadata does not know `class`
pub fn create(store: &mut Store, class: ClassId) -> Result<ObjectId> {
    store.alloc(class)
}

/// Owner of `obj`, if contained
pub fn container(store: &Store, obj: ObjectId) -> Result<Option<ObjectId>> {
    Ok(store.get_object(obj)?.container.map(|c| c.owner))
}

/// Feature of the owner under which `obj` is held
///
/// For feature map entries this is the member feature, not the map slot.
pub fn container_feature(store: &Store, obj: ObjectId) -> Result<Option<FeatureId>> {
    Ok(store.get_object(obj)?.container.map(|c| c.feature))
}

/// Direct children of `obj`
///
/// Ordered by feature, then by position inside the feature. Feature map
/// slots contribute their containment entries in document order.
///
/// # Errors
/// * `ObjectNotFound` - If the handle is stale
pub fn contents(store: &Store, obj: ObjectId) -> Result<Vec<ObjectId>> {
    let meta = store.metadata();
    let object = store.get_object(obj)?;
    let class = store.class_of(obj)?;
    let mut children = Vec::new();

    for feature in class.features() {
        match (feature.kind(), object.slot(feature.id())) {
            (FeatureKind::SingleContainment { .. }, Slot::Single(Value::Object(child))) => {
                children.push(*child)
            }
            (FeatureKind::MultiContainment { .. }, Slot::Many(items)) => {
                children.extend(items.iter().filter_map(|v| v.as_object()))
            }
            (FeatureKind::MapEntry, Slot::Map(map)) => {
                for entry in map.iter() {
                    let member = descriptor(meta.as_ref(), store, obj, entry.feature)?;
                    if member.is_containment() {
                        children.extend(entry.value.as_object());
                    }
                }
            }
            _ => {}
        }
    }

    Ok(children)
}

/// Every object below `obj`, pre-order
///
/// # Errors
/// * `ObjectNotFound` - If the handle is stale
pub fn all_contents(store: &Store, obj: ObjectId) -> Result<Vec<ObjectId>> {
    let mut out = Vec::new();
    let mut stack: Vec<ObjectId> = contents(store, obj)?.into_iter().rev().collect();
    while let Some(next) = stack.pop() {
        out.push(next);
        stack.extend(contents(store, next)?.into_iter().rev());
    }
    Ok(out)
}

/// Topmost container of `obj` (the object itself when it is a root)
pub fn root_container(store: &Store, obj: ObjectId) -> Result<ObjectId> {
    let mut current = obj;
    let mut visited = HashSet::new();
    while let Some(owner) = container(store, current)? {
        if !visited.insert(owner) {
            break;
        }
        current = owner;
    }
    Ok(current)
}

/// True if `ancestor` is `obj` or contains it transitively
pub fn is_ancestor(store: &Store, ancestor: ObjectId, obj: ObjectId) -> Result<bool> {
    let mut current = Some(obj);
    let mut visited = HashSet::new();
    while let Some(id) = current {
        if id == ancestor {
            return Ok(true);
        }
        if !visited.insert(id) {
            break;
        }
        current = container(store, id)?;
    }
    Ok(false)
}

/// Delete `obj` and its containment subtree
///
/// The object is detached from its container, every reference into the
/// subtree from outside it is removed (with notifications on the referring
/// objects), and all handles in the subtree become stale.
///
/// # Errors
/// * `ObjectNotFound` - If the handle is stale
pub fn delete_with_chain(
    store: &mut Store,
    obj: ObjectId,
    chain: &mut NotificationChain,
) -> Result<Vec<ObjectId>> {
    let mut subtree = vec![obj];
    subtree.extend(all_contents(store, obj)?);
    let doomed: HashSet<ObjectId> = subtree.iter().copied().collect();

    detach_with_chain(store, obj, chain)?;

    let referrers: Vec<(ObjectId, FeatureId, ObjectId)> = store
        .list_objects()
        .into_iter()
        .filter(|o| !doomed.contains(&o.id))
        .flat_map(|o| {
            o.object_values()
                .into_iter()
                .filter(|(_, target)| doomed.contains(target))
                .map(move |(feature, target)| (o.id, feature, target))
        })
        .collect();

    let meta = store.metadata();
    for (source, feature, target) in referrers {
        let feature = descriptor(meta.as_ref(), store, source, feature)?;
        if !feature.is_cross_reference() {
            continue;
        }
        unlink_dangling(store, source, feature, target, chain)?;
    }

    for id in &subtree {
        store.release(*id)?;
    }

    Ok(subtree)
}

/// Delete `obj` and its subtree, dispatching the resulting changes
///
/// # Errors
/// * `ObjectNotFound` - If the handle is stale
pub fn delete(store: &mut Store, obj: ObjectId) -> Result<Option<BatchId>> {
    let start = Instant::now();
    log_op_start!("delete", object_id = %obj);

    let mut chain = NotificationChain::new();
    match delete_with_chain(store, obj, &mut chain) {
        Ok(removed) => {
            let batch_id = chain.dispatch(store);
            log_op_end!(
                "delete",
                duration_ms = start.elapsed().as_millis() as u64,
                object_id = %obj,
                removed = removed.len()
            );
            Ok(batch_id)
        }
        Err(e) => {
            log_op_error!(
                "delete",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(e)
        }
    }
}

fn unlink_dangling(
    store: &mut Store,
    source: ObjectId,
    feature: &FeatureDescriptor,
    target: ObjectId,
    chain: &mut NotificationChain,
) -> Result<()> {
    let value = Value::Object(target);

    if let Some(group) = feature.group() {
        let map = map_slot_mut(store, source, group)?;
        while let Some(position) = map.position_of(feature.id(), &value) {
            map.remove(position);
            chain.append(Notification::remove(source, feature.id(), value.clone(), position));
        }
    } else if feature.is_many() {
        let items = list_slot_mut(store, source, feature)?;
        if let Some(position) = items.iter().position(|v| *v == value) {
            items.remove(position);
            chain.append(Notification::remove(source, feature.id(), value, position));
        }
    } else {
        let slot = single_slot_mut(store, source, feature)?;
        if *slot == value {
            *slot = Value::Null;
            chain.append(Notification::set(source, feature.id(), value, Value::Null));
        }
    }
    Ok(())
}
