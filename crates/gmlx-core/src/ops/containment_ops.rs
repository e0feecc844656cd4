use gmlx_core_types::{FeatureId, ObjectId};

use super::lifecycle_ops::is_ancestor;
use super::{descriptor, list_slot_mut, map_slot_mut, mark_set, single_slot_mut, Store};
use crate::errors::{ModelError, Result};
use crate::model::{ContainerRef, Notification, Value};
use crate::notify::NotificationChain;

/// Fail with `CycleDetected` if `child` is `owner` or one of its ancestors
pub fn ensure_no_cycle(store: &Store, owner: ObjectId, child: ObjectId) -> Result<()> {
    if is_ancestor(store, child, owner)? {
        return Err(ModelError::CycleDetected { owner, child });
    }
    Ok(())
}

/// Remove `child` from whatever slot currently holds it
///
/// The old owner records the change on `chain`: a `Remove` for list and
/// feature map slots, a `Set` to null for single containment. The child is
/// left as a root. Returns the container it was detached from.
///
/// # Errors
/// * `ObjectNotFound` - If `child` or its recorded owner is gone
pub fn detach_with_chain(
    store: &mut Store,
    child: ObjectId,
    chain: &mut NotificationChain,
) -> Result<Option<ContainerRef>> {
    let Some(container) = store.get_object(child)?.container else {
        return Ok(None);
    };
    let ContainerRef { owner, feature } = container;
    let meta = store.metadata();
    let feature = descriptor(meta.as_ref(), store, owner, feature)?;
    let value = Value::Object(child);

    if let Some(group) = feature.group() {
        let map = map_slot_mut(store, owner, group)?;
        if let Some(position) = map.position_of(feature.id(), &value) {
            map.remove(position);
            chain.append(Notification::remove(owner, feature.id(), value, position));
        }
    } else if feature.is_many() {
        let items = list_slot_mut(store, owner, feature)?;
        if let Some(position) = items.iter().position(|v| *v == value) {
            items.remove(position);
            chain.append(Notification::remove(owner, feature.id(), value, position));
        }
    } else {
        let slot = single_slot_mut(store, owner, feature)?;
        if *slot == value {
            *slot = Value::Null;
            let set_change = mark_set(store, owner, feature)?;
            chain.append(
                Notification::set(owner, feature.id(), value, Value::Null)
                    .with_set_change(set_change),
            );
        }
    }

    store.get_object_mut(child)?.container = None;
    Ok(Some(container))
}

/// Detach `child` from its container and dispatch the resulting changes
///
/// # Errors
/// * `ObjectNotFound` - If the handle is stale
pub fn detach(store: &mut Store, child: ObjectId) -> Result<Option<ContainerRef>> {
    let mut chain = NotificationChain::new();
    let container = detach_with_chain(store, child, &mut chain)?;
    chain.dispatch(store);
    Ok(container)
}

/// Record `(owner, feature)` as the container of `child`
pub(crate) fn attach(
    store: &mut Store,
    child: ObjectId,
    owner: ObjectId,
    feature: FeatureId,
) -> Result<()> {
    store.get_object_mut(child)?.container = Some(ContainerRef { owner, feature });
    Ok(())
}

/// Clear the container of `child` if it still names `(owner, feature)`
pub(crate) fn release(
    store: &mut Store,
    child: ObjectId,
    owner: ObjectId,
    feature: FeatureId,
) -> Result<()> {
    let object = store.get_object_mut(child)?;
    if object.container == Some(ContainerRef { owner, feature }) {
        object.container = None;
    }
    Ok(())
}

/// Move `child` under `(owner, feature)`: detach first, then record the new container
///
/// The caller stores the child in the owner's slot.
pub(crate) fn adopt_with_chain(
    store: &mut Store,
    owner: ObjectId,
    feature: FeatureId,
    child: ObjectId,
    chain: &mut NotificationChain,
) -> Result<()> {
    detach_with_chain(store, child, chain)?;
    attach(store, child, owner, feature)
}
