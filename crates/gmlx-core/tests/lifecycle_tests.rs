#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Object Lifecycle and Traversal Tests
//!
//! ## Scenarios Covered
//! - Direct and transitive contents in feature then document order
//! - Root container and ancestry queries
//! - Delete detaches the subtree and clears references into it
//! - Freed slots are reused under a new generation
//! - Explicit detach leaves the child a root

mod common;

use common::*;
use gmlx_core::ops::{containment_ops, feature_map_ops, lifecycle_ops, list_ops, object_ops};
use gmlx_core::rules::validation;
use gmlx_core::{ChangeKind, ContainerRef, ModelError, ObjectId, Store, Value};

struct Tree {
    coll: ObjectId,
    cs: ObjectId,
    a1: ObjectId,
    a2: ObjectId,
    remark: ObjectId,
}

/// coll { choice: [member cs] }, cs { axes: [a1 { remarks: remark }, a2] }
fn build_tree(store: &mut Store) -> Tree {
    let coll = create(store, COLLECTION);
    let cs = create(store, CS);
    let a1 = create(store, AXIS);
    let a2 = create(store, AXIS);
    let remark = create(store, REMARK);

    feature_map_ops::add(store, coll, MEMBER, cs.into()).unwrap();
    list_ops::add_all(store, cs, AXES, vec![a1.into(), a2.into()]).unwrap();
    object_ops::set(store, a1, REMARKS, remark).unwrap();

    Tree {
        coll,
        cs,
        a1,
        a2,
        remark,
    }
}

#[test]
fn test_contents_follow_feature_then_document_order() {
    // GIVEN a collection with remarks and mixed map entries
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);
    let remark = create(&mut store, REMARK);
    let d1 = create(&mut store, DEFINITION);
    let axis = create(&mut store, AXIS);
    let d2 = create(&mut store, DEFINITION);

    feature_map_ops::add(&mut store, coll, MEMBER, d1.into()).unwrap();
    feature_map_ops::add(&mut store, coll, NAME, "n".into()).unwrap();
    feature_map_ops::add(&mut store, coll, PRIMARY, axis.into()).unwrap();
    feature_map_ops::add(&mut store, coll, MEMBER, d2.into()).unwrap();
    object_ops::set(&mut store, coll, REMARKS, remark).unwrap();

    // THEN remarks comes first, then map children in document order
    assert_eq!(
        lifecycle_ops::contents(&store, coll).unwrap(),
        vec![remark, d1, axis, d2]
    );
}

#[test]
fn test_all_contents_is_preorder() {
    let mut store = new_store();
    let t = build_tree(&mut store);

    assert_eq!(
        lifecycle_ops::all_contents(&store, t.coll).unwrap(),
        vec![t.cs, t.a1, t.remark, t.a2]
    );
    assert_eq!(lifecycle_ops::contents(&store, t.cs).unwrap(), vec![t.a1, t.a2]);
}

#[test]
fn test_ancestry_queries() {
    let mut store = new_store();
    let t = build_tree(&mut store);

    assert_eq!(lifecycle_ops::root_container(&store, t.remark).unwrap(), t.coll);
    assert_eq!(lifecycle_ops::root_container(&store, t.coll).unwrap(), t.coll);
    assert!(lifecycle_ops::is_ancestor(&store, t.coll, t.remark).unwrap());
    assert!(lifecycle_ops::is_ancestor(&store, t.a1, t.a1).unwrap());
    assert!(!lifecycle_ops::is_ancestor(&store, t.a2, t.remark).unwrap());
    assert!(!lifecycle_ops::is_ancestor(&store, t.remark, t.coll).unwrap());

    assert_eq!(lifecycle_ops::container_feature(&store, t.cs).unwrap(), Some(MEMBER));
    assert_eq!(lifecycle_ops::container_feature(&store, t.a2).unwrap(), Some(AXES));
    assert_eq!(store.roots(), vec![t.coll]);
}

#[test]
fn test_delete_clears_references_into_subtree() {
    // GIVEN a tree referenced from outside by a CRS and a related list
    let mut store = new_store();
    let t = build_tree(&mut store);
    let crs = create(&mut store, CRS);
    let other = create(&mut store, COLLECTION);
    object_ops::set(&mut store, crs, COORDINATE_SYSTEM, t.cs).unwrap();
    list_ops::add(&mut store, other, RELATED, t.a1.into()).unwrap();
    let crs_recorder = observe(&mut store, crs);
    let other_recorder = observe(&mut store, other);

    // WHEN the collection is deleted
    lifecycle_ops::delete(&mut store, t.coll).unwrap();

    // THEN every handle in the subtree is stale
    for id in [t.coll, t.cs, t.a1, t.a2, t.remark] {
        assert!(!store.contains(id));
    }
    assert_eq!(store.object_count(), 2);

    // AND the outside references were removed with notifications
    assert_eq!(get(&store, crs, COORDINATE_SYSTEM), Value::Null);
    assert_eq!(get(&store, other, RELATED), objects(&[]));

    let crs_records = crs_recorder.notifications();
    assert_eq!(crs_records.len(), 1);
    assert_eq!(crs_records[0].kind, ChangeKind::Set);
    assert_eq!(crs_records[0].old_value, Value::Object(t.cs));

    let other_records = other_recorder.notifications();
    assert_eq!(other_records.len(), 1);
    assert_eq!(other_records[0].kind, ChangeKind::Remove);

    validation::validate_model(&store).unwrap();
}

#[test]
fn test_delete_contained_object_detaches_it() {
    let mut store = new_store();
    let t = build_tree(&mut store);
    let recorder = observe(&mut store, t.cs);

    lifecycle_ops::delete(&mut store, t.a1).unwrap();

    assert_eq!(get(&store, t.cs, AXES), objects(&[t.a2]));
    assert!(!store.contains(t.remark));

    let records = recorder.notifications();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, ChangeKind::Remove);
    assert_eq!(records[0].position, Some(0));
}

#[test]
fn test_freed_slot_reused_under_new_generation() {
    // GIVEN a deleted axis
    let mut store = new_store();
    let old = create(&mut store, AXIS);
    lifecycle_ops::delete(&mut store, old).unwrap();

    // WHEN a new object is created
    let new = create(&mut store, REMARK);

    // THEN it reuses the slot but not the handle
    assert_eq!(new.index(), old.index());
    assert_eq!(new.generation(), old.generation() + 1);
    assert_ne!(new, old);
    assert_eq!(
        object_ops::get(&store, old, IDENTIFIER),
        Err(ModelError::ObjectNotFound { object_id: old })
    );
    assert_eq!(store.class_of(new).unwrap().name(), "Remark");
}

#[test]
fn test_delete_stale_handle_fails() {
    let mut store = new_store();
    let axis = create(&mut store, AXIS);
    lifecycle_ops::delete(&mut store, axis).unwrap();

    let err = lifecycle_ops::delete(&mut store, axis).unwrap_err();
    assert_eq!(err, ModelError::ObjectNotFound { object_id: axis });
}

#[test]
fn test_unknown_class_rejected() {
    let mut store = new_store();
    let err = lifecycle_ops::create(&mut store, gmlx_core::ClassId::new(77)).unwrap_err();
    assert!(matches!(err, ModelError::ClassNotFound { .. }));
    assert_eq!(store.object_count(), 0);
}

#[test]
fn test_detach_leaves_child_root() {
    let mut store = new_store();
    let t = build_tree(&mut store);

    let previous = containment_ops::detach(&mut store, t.a2).unwrap();

    assert_eq!(
        previous,
        Some(ContainerRef {
            owner: t.cs,
            feature: AXES
        })
    );
    assert!(store.get_object(t.a2).unwrap().is_root());
    assert_eq!(get(&store, t.cs, AXES), objects(&[t.a1]));
    assert_eq!(containment_ops::detach(&mut store, t.a2).unwrap(), None);
    validation::validate_model(&store).unwrap();
}
