#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Feature Map Tests
//!
//! ## Scenarios Covered
//! - Member views are ordered projections of one shared entry sequence
//! - Insert by view position lands before the entry at that position
//! - Lenient single-value reads return the first entry; strict reads fail
//! - Single-valued member set replaces in place, unset removes every entry
//! - Bulk replace validates every entry before changing anything
//! - Containment members re-parent and reject cycles
//! - Live member and map views

mod common;

use common::*;
use gmlx_core::ops::{feature_map_ops, lifecycle_ops, list_ops, object_ops};
use gmlx_core::{ChangeKind, FeatureMapEntry, ModelError, Value};

fn names(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}

#[test]
fn test_views_project_shared_sequence_in_document_order() {
    // GIVEN name "a", a member definition, then name "b"
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);
    let def = create(&mut store, DEFINITION);
    feature_map_ops::add(&mut store, coll, NAME, "a".into()).unwrap();
    feature_map_ops::add(&mut store, coll, MEMBER, def.into()).unwrap();
    let view_index = feature_map_ops::add(&mut store, coll, NAME, "b".into()).unwrap();

    // THEN each member sees only its own entries, in document order
    assert_eq!(view_index, 1);
    assert_eq!(feature_map_ops::view(&store, coll, NAME).unwrap(), names(&["a", "b"]));
    assert_eq!(
        feature_map_ops::view(&store, coll, MEMBER).unwrap(),
        vec![Value::Object(def)]
    );
    assert_eq!(
        feature_map_ops::entries(&store, coll, CHOICE).unwrap(),
        vec![
            FeatureMapEntry::new(NAME, "a"),
            FeatureMapEntry::new(MEMBER, def),
            FeatureMapEntry::new(NAME, "b"),
        ]
    );
    assert_eq!(lifecycle_ops::container_feature(&store, def).unwrap(), Some(MEMBER));
}

#[test]
fn test_insert_by_view_position_preserves_document_order() {
    // GIVEN entries [name a, member d, name b]
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);
    let def = create(&mut store, DEFINITION);
    feature_map_ops::add(&mut store, coll, NAME, "a".into()).unwrap();
    feature_map_ops::add(&mut store, coll, MEMBER, def.into()).unwrap();
    feature_map_ops::add(&mut store, coll, NAME, "b".into()).unwrap();
    let recorder = observe(&mut store, coll);

    // WHEN "x" is inserted at view position 1 of the name view
    let position = feature_map_ops::insert(&mut store, coll, NAME, 1, "x".into()).unwrap();

    // THEN it sits right before "b" in the full map
    assert_eq!(position, 1);
    assert_eq!(
        feature_map_ops::view(&store, coll, NAME).unwrap(),
        names(&["a", "x", "b"])
    );
    let entries = feature_map_ops::entries(&store, coll, CHOICE).unwrap();
    assert_eq!(entries[1], FeatureMapEntry::new(MEMBER, def));
    assert_eq!(entries[2], FeatureMapEntry::new(NAME, "x"));

    let records = recorder.notifications();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].feature, NAME);
    assert_eq!(records[0].kind, ChangeKind::Add);
    assert_eq!(records[0].position, Some(2));

    // AND inserting at the view length appends to the full map
    feature_map_ops::insert(&mut store, coll, NAME, 3, "z".into()).unwrap();
    let entries = feature_map_ops::entries(&store, coll, CHOICE).unwrap();
    assert_eq!(entries.last(), Some(&FeatureMapEntry::new(NAME, "z")));

    // AND past the view length is rejected
    let err = feature_map_ops::insert(&mut store, coll, NAME, 9, "q".into()).unwrap_err();
    assert!(matches!(err, ModelError::IndexOutOfBounds { index: 9, len: 4, .. }));
}

#[test]
fn test_remove_keeps_other_entries_in_place() {
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);
    let def = create(&mut store, DEFINITION);
    feature_map_ops::add(&mut store, coll, NAME, "a".into()).unwrap();
    feature_map_ops::add(&mut store, coll, MEMBER, def.into()).unwrap();
    feature_map_ops::add(&mut store, coll, NAME, "b".into()).unwrap();

    let view_index = feature_map_ops::remove(&mut store, coll, NAME, &"a".into()).unwrap();

    assert_eq!(view_index, 0);
    assert_eq!(
        feature_map_ops::entries(&store, coll, CHOICE).unwrap(),
        vec![FeatureMapEntry::new(MEMBER, def), FeatureMapEntry::new(NAME, "b")]
    );

    let err = feature_map_ops::remove(&mut store, coll, NAME, &"a".into()).unwrap_err();
    assert!(matches!(err, ModelError::NotPresent { .. }));

    let removed = feature_map_ops::remove_at(&mut store, coll, MEMBER, 0).unwrap();
    assert_eq!(removed, Value::Object(def));
    assert!(store.get_object(def).unwrap().is_root());
}

#[test]
fn test_lenient_get_returns_first_strict_get_fails() {
    // GIVEN two entries for the single-valued primary member
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);
    let ax1 = create(&mut store, AXIS);
    let ax2 = create(&mut store, AXIS);
    feature_map_ops::add(&mut store, coll, PRIMARY, ax1.into()).unwrap();
    feature_map_ops::add(&mut store, coll, PRIMARY, ax2.into()).unwrap();

    // WHEN it is read through both forms
    let lenient = object_ops::get(&store, coll, PRIMARY).unwrap();
    let strict = feature_map_ops::get_single(&store, coll, PRIMARY);

    // THEN the lenient read keeps the others in place
    assert_eq!(lenient, Value::Object(ax1));
    assert_eq!(
        strict,
        Err(ModelError::MultipleValues {
            feature_name: "primary".to_string(),
            count: 2
        })
    );
    assert_eq!(feature_map_ops::count(&store, coll, PRIMARY).unwrap(), 2);
}

#[test]
fn test_empty_member_reads_default() {
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);

    assert_eq!(get(&store, coll, PRIMARY), Value::Null);
    assert_eq!(get(&store, coll, NAME), Value::List(vec![]));
    assert_eq!(feature_map_ops::get_single(&store, coll, PRIMARY).unwrap(), Value::Null);
    assert!(!object_ops::is_set(&store, coll, CHOICE).unwrap());
}

#[test]
fn test_single_member_set_replaces_first_entry_in_place() {
    // GIVEN [name a, primary ax1, name b]
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);
    let ax1 = create(&mut store, AXIS);
    let ax2 = create(&mut store, AXIS);
    feature_map_ops::add(&mut store, coll, NAME, "a".into()).unwrap();
    feature_map_ops::add(&mut store, coll, PRIMARY, ax1.into()).unwrap();
    feature_map_ops::add(&mut store, coll, NAME, "b".into()).unwrap();
    let recorder = observe(&mut store, coll);

    // WHEN primary is set to ax2
    object_ops::set(&mut store, coll, PRIMARY, ax2).unwrap();

    // THEN ax2 took ax1's place and ax1 was released
    assert_eq!(
        feature_map_ops::entries(&store, coll, CHOICE).unwrap(),
        vec![
            FeatureMapEntry::new(NAME, "a"),
            FeatureMapEntry::new(PRIMARY, ax2),
            FeatureMapEntry::new(NAME, "b"),
        ]
    );
    assert!(store.get_object(ax1).unwrap().is_root());
    assert_eq!(lifecycle_ops::container_feature(&store, ax2).unwrap(), Some(PRIMARY));

    let records = recorder.notifications();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, ChangeKind::Set);
    assert_eq!(records[0].old_value, Value::Object(ax1));
    assert_eq!(records[0].position, Some(1));
}

#[test]
fn test_single_member_set_appends_when_absent() {
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);
    let axis = create(&mut store, AXIS);
    feature_map_ops::add(&mut store, coll, NAME, "a".into()).unwrap();

    object_ops::set(&mut store, coll, PRIMARY, axis).unwrap();

    assert_eq!(
        feature_map_ops::entries(&store, coll, CHOICE).unwrap(),
        vec![FeatureMapEntry::new(NAME, "a"), FeatureMapEntry::new(PRIMARY, axis)]
    );
}

#[test]
fn test_unset_member_removes_every_entry() {
    // GIVEN [name a, member d, name b]
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);
    let def = create(&mut store, DEFINITION);
    feature_map_ops::add(&mut store, coll, NAME, "a".into()).unwrap();
    feature_map_ops::add(&mut store, coll, MEMBER, def.into()).unwrap();
    feature_map_ops::add(&mut store, coll, NAME, "b".into()).unwrap();
    let recorder = observe(&mut store, coll);

    // WHEN the name member is unset
    object_ops::unset(&mut store, coll, NAME).unwrap();

    // THEN both names left front first and the member entry stayed
    assert!(!object_ops::is_set(&store, coll, NAME).unwrap());
    assert_eq!(
        feature_map_ops::entries(&store, coll, CHOICE).unwrap(),
        vec![FeatureMapEntry::new(MEMBER, def)]
    );
    let positions: Vec<_> = recorder.notifications().iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![Some(0), Some(1)]);
}

#[test]
fn test_bulk_replace_validates_before_changing() {
    // GIVEN a map holding one name
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);
    feature_map_ops::add(&mut store, coll, NAME, "a".into()).unwrap();
    let recorder = observe(&mut store, coll);

    // WHEN the replacement names a feature outside the group
    let bad = vec![
        FeatureMapEntry::new(NAME, "b"),
        FeatureMapEntry::new(TAGS, "not-a-member"),
    ];
    let err = object_ops::set(&mut store, coll, CHOICE, bad).unwrap_err();

    // THEN nothing changed
    assert!(matches!(err, ModelError::TypeMismatch { .. }));
    assert_eq!(
        feature_map_ops::entries(&store, coll, CHOICE).unwrap(),
        vec![FeatureMapEntry::new(NAME, "a")]
    );
    assert!(recorder.is_empty());

    // AND a wrong value kind is rejected the same way
    let err = object_ops::set(&mut store, coll, CHOICE, vec![FeatureMapEntry::new(NAME, 7i64)])
        .unwrap_err();
    assert!(matches!(err, ModelError::TypeMismatch { .. }));
}

#[test]
fn test_bulk_replace_records_remove_many_then_add_many() {
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);
    let axis = create(&mut store, AXIS);
    feature_map_ops::add(&mut store, coll, NAME, "a".into()).unwrap();
    let recorder = observe(&mut store, coll);

    let replacement = vec![
        FeatureMapEntry::new(PRIMARY, axis),
        FeatureMapEntry::new(NAME, "b"),
    ];
    object_ops::set(&mut store, coll, CHOICE, replacement.clone()).unwrap();

    assert_eq!(feature_map_ops::entries(&store, coll, CHOICE).unwrap(), replacement);
    assert_eq!(lifecycle_ops::container(&store, axis).unwrap(), Some(coll));

    let records = recorder.notifications();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].kind, ChangeKind::RemoveMany);
    assert_eq!(records[0].feature, CHOICE);
    assert_eq!(
        records[0].old_value,
        Value::Entries(vec![FeatureMapEntry::new(NAME, "a")])
    );
    assert_eq!(records[1].kind, ChangeKind::AddMany);
    assert_eq!(records[1].new_value, Value::Entries(replacement));
}

#[test]
fn test_containment_member_reparents_between_maps() {
    // GIVEN a definition held by a first collection
    let mut store = new_store();
    let c1 = create(&mut store, COLLECTION);
    let c2 = create(&mut store, COLLECTION);
    let def = create(&mut store, DEFINITION);
    feature_map_ops::add(&mut store, c1, NAME, "n".into()).unwrap();
    feature_map_ops::add(&mut store, c1, MEMBER, def.into()).unwrap();
    let batches = observe_batches(&mut store);

    // WHEN the second collection adds it
    feature_map_ops::add(&mut store, c2, MEMBER, def.into()).unwrap();

    // THEN one batch holds REMOVE at the old full position, then ADD
    assert_eq!(feature_map_ops::count(&store, c1, MEMBER).unwrap(), 0);
    assert_eq!(lifecycle_ops::container(&store, def).unwrap(), Some(c2));

    let batches = batches.batches();
    assert_eq!(batches.len(), 1);
    let records = &batches[0].1;
    assert_eq!(records[0].notifier, c1);
    assert_eq!(records[0].kind, ChangeKind::Remove);
    assert_eq!(records[0].feature, MEMBER);
    assert_eq!(records[0].position, Some(1));
    assert_eq!(records[1].notifier, c2);
    assert_eq!(records[1].kind, ChangeKind::Add);
}

#[test]
fn test_containment_member_rejects_cycles() {
    let mut store = new_store();
    let outer = create(&mut store, COLLECTION);
    let inner = create(&mut store, COLLECTION);
    feature_map_ops::add(&mut store, outer, MEMBER, inner.into()).unwrap();

    let err = feature_map_ops::add(&mut store, inner, MEMBER, outer.into()).unwrap_err();
    assert_eq!(
        err,
        ModelError::CycleDetected {
            owner: inner,
            child: outer
        }
    );

    let err = list_ops::add(&mut store, outer, MEMBER, outer.into()).unwrap_err();
    assert!(matches!(err, ModelError::CycleDetected { .. }));
    assert!(store.get_object(outer).unwrap().is_root());
}

#[test]
fn test_move_within_member_view() {
    // GIVEN [name a, member d, name b, name c]
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);
    let def = create(&mut store, DEFINITION);
    feature_map_ops::add(&mut store, coll, NAME, "a".into()).unwrap();
    feature_map_ops::add(&mut store, coll, MEMBER, def.into()).unwrap();
    list_ops::add_all(&mut store, coll, NAME, vec!["b".into(), "c".into()]).unwrap();
    let recorder = observe(&mut store, coll);

    // WHEN the last name moves to the front of the name view
    list_ops::move_item(&mut store, coll, NAME, 2, 0).unwrap();

    // THEN the view reads [c, a, b] and the record uses full positions
    assert_eq!(
        feature_map_ops::view(&store, coll, NAME).unwrap(),
        names(&["c", "a", "b"])
    );
    let records = recorder.notifications();
    assert_eq!(records[0].kind, ChangeKind::Move);
    assert_eq!(records[0].old_value, Value::Int(3));
    assert_eq!(records[0].position, Some(0));
}

#[test]
fn test_member_and_map_views_are_live() {
    let mut store = new_store();
    let coll = create(&mut store, COLLECTION);

    let mut names_view = store.member_mut(coll, NAME).unwrap();
    names_view.add("a").unwrap();
    names_view.add("b").unwrap();
    names_view.insert(0, "first").unwrap();
    assert_eq!(names_view.len(), 3);
    assert_eq!(names_view.first().unwrap(), Value::List(names(&["first", "a", "b"])));
    assert_eq!(names_view.get(1), Some(Value::from("a")));

    let mut map = store.map_mut(coll, CHOICE).unwrap();
    assert_eq!(map.len(), 3);
    map.member(NAME).unwrap().remove(&"a".into()).unwrap();
    assert_eq!(map.entries().len(), 2);
    map.clear().unwrap();
    assert!(map.is_empty());

    assert!(matches!(
        store.member_mut(coll, TAGS),
        Err(ModelError::TypeMismatch { .. })
    ));
    assert!(matches!(
        store.map_mut(coll, NAME),
        Err(ModelError::TypeMismatch { .. })
    ));
}
