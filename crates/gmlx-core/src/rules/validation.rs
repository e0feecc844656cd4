use crate::errors::{ModelError, Result};
use crate::ops::Store;

use super::invariants;

/// Validate the whole object graph
///
/// Checks, in order: containment cycles, container references backed by
/// the owner's slot, containment slots backed by the child's container
/// reference, single ownership, dangling references, and opposite
/// consistency.
///
/// # Errors
///
/// Returns the first violation found. For exhaustive reporting, call the
/// individual invariant functions directly.
pub fn validate_model(store: &Store) -> Result<()> {
    for object in store.list_objects() {
        if invariants::has_containment_cycle(store, object.id()) {
            let owner = object.container().map(|c| c.owner).unwrap_or(object.id());
            return Err(ModelError::CycleDetected {
                owner,
                child: object.id(),
            });
        }
    }

    if let Some((object_id, owner_id)) = invariants::find_container_mismatches(store).first() {
        return Err(ModelError::ContainerMismatch {
            object_id: *object_id,
            owner_id: *owner_id,
        });
    }

    if let Some((owner_id, _, object_id)) = invariants::find_unowned_contained(store).first() {
        return Err(ModelError::ContainerMismatch {
            object_id: *object_id,
            owner_id: *owner_id,
        });
    }

    if let Some((object_id, owners)) = invariants::find_duplicate_containment(store).first() {
        return Err(ModelError::ContainerMismatch {
            object_id: *object_id,
            owner_id: owners.last().copied().unwrap_or(*object_id),
        });
    }

    if let Some((object_id, feature_id, target_id)) =
        invariants::find_dangling_references(store).first()
    {
        return Err(ModelError::DanglingReference {
            object_id: *object_id,
            feature_id: *feature_id,
            target_id: *target_id,
        });
    }

    if let Some((object_id, target_id)) = invariants::find_opposite_mismatches(store).first() {
        return Err(ModelError::OppositeMismatch {
            object_id: *object_id,
            target_id: *target_id,
        });
    }

    Ok(())
}
