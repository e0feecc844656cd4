use std::collections::{HashMap, HashSet};

use gmlx_core_types::{FeatureId, ObjectId};

use crate::model::ContainerRef;
use crate::ops::Store;

/// Object-valued slot entries of every live object, with the feature they sit under
fn object_edges(store: &Store) -> Vec<(ObjectId, FeatureId, ObjectId)> {
    store
        .list_objects()
        .into_iter()
        .flat_map(|o| {
            o.object_values()
                .into_iter()
                .map(move |(feature, target)| (o.id(), feature, target))
        })
        .collect()
}

fn is_containment(store: &Store, obj: ObjectId, feature: FeatureId) -> bool {
    store
        .feature_of(obj, feature)
        .map(|f| f.is_containment())
        .unwrap_or(false)
}

fn is_cross_reference(store: &Store, obj: ObjectId, feature: FeatureId) -> bool {
    store
        .feature_of(obj, feature)
        .map(|f| f.is_cross_reference())
        .unwrap_or(false)
}

/// Find children whose container reference is not backed by the owner's slot
///
/// Returns list of (child_id, owner_id) tuples
pub fn find_container_mismatches(store: &Store) -> Vec<(ObjectId, ObjectId)> {
    let held: HashSet<(ObjectId, FeatureId, ObjectId)> = object_edges(store)
        .into_iter()
        .filter(|(owner, feature, _)| is_containment(store, *owner, *feature))
        .collect();

    store
        .list_objects()
        .into_iter()
        .filter_map(|o| {
            let ContainerRef { owner, feature } = o.container()?;
            if held.contains(&(owner, feature, o.id())) {
                None
            } else {
                Some((o.id(), owner))
            }
        })
        .collect()
}

/// Find containment slot entries whose child does not point back at the slot
///
/// Returns list of (owner_id, feature_id, child_id) tuples
pub fn find_unowned_contained(store: &Store) -> Vec<(ObjectId, FeatureId, ObjectId)> {
    object_edges(store)
        .into_iter()
        .filter(|(owner, feature, _)| is_containment(store, *owner, *feature))
        .filter(|(owner, feature, child)| {
            let expected = Some(ContainerRef {
                owner: *owner,
                feature: *feature,
            });
            match store.get_object(*child) {
                Ok(c) => c.container() != expected,
                Err(_) => false,
            }
        })
        .collect()
}

/// Find children held by more than one containment slot
///
/// Returns list of (child_id, owner_ids) tuples
pub fn find_duplicate_containment(store: &Store) -> Vec<(ObjectId, Vec<ObjectId>)> {
    let mut holders: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
    for (owner, feature, child) in object_edges(store) {
        if is_containment(store, owner, feature) {
            holders.entry(child).or_default().push(owner);
        }
    }

    let mut duplicates: Vec<_> = holders
        .into_iter()
        .filter(|(_, owners)| owners.len() > 1)
        .collect();
    duplicates.sort_by_key(|(child, _)| *child);
    duplicates
}

/// Find object-valued slots pointing at objects that no longer exist
///
/// Returns list of (object_id, feature_id, target_id) tuples
pub fn find_dangling_references(store: &Store) -> Vec<(ObjectId, FeatureId, ObjectId)> {
    object_edges(store)
        .into_iter()
        .filter(|(_, _, target)| !store.contains(*target))
        .collect()
}

/// Find cross references whose opposite end does not point back
///
/// Returns list of (object_id, target_id) tuples
pub fn find_opposite_mismatches(store: &Store) -> Vec<(ObjectId, ObjectId)> {
    let edges: HashSet<(ObjectId, FeatureId, ObjectId)> = object_edges(store)
        .into_iter()
        .filter(|(source, feature, _)| is_cross_reference(store, *source, *feature))
        .collect();

    let mut mismatches: Vec<_> = edges
        .iter()
        .filter(|(source, feature, target)| {
            let Ok(descriptor) = store.feature_of(*source, *feature) else {
                return false;
            };
            match descriptor.opposite() {
                Some(opposite) => {
                    store.contains(*target) && !edges.contains(&(*target, opposite, *source))
                }
                None => false,
            }
        })
        .map(|(source, _, target)| (*source, *target))
        .collect();
    mismatches.sort();
    mismatches
}

/// Check if an object's container chain loops back on itself
pub fn has_containment_cycle(store: &Store, obj: ObjectId) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(obj);

    while let Some(id) = current {
        if !visited.insert(id) {
            return true;
        }
        current = match store.get_object(id) {
            Ok(o) => o.container().map(|c| c.owner),
            Err(_) => None,
        };
    }

    false
}
