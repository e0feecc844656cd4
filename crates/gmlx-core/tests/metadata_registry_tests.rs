#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Metadata Registry Tests
//!
//! ## Scenarios Covered
//! - Subtypes carry the flattened feature table of their ancestors
//! - Feature IDs must continue the supertype's numbering
//! - Opposites must point back; grouped features may not declare one
//! - Group members must name a feature map of the same class
//! - Declared defaults must fit their feature's data type and shape

mod common;

use std::sync::Arc;

use common::*;
use gmlx_core::ops::{lifecycle_ops, object_ops};
use gmlx_core::{
    ClassId, DataType, FeatureDescriptor, FeatureId, MetadataProvider, MetadataRegistry,
    ModelError, RegistryBuilder, Store, Value,
};

const A: ClassId = ClassId::new(10);
const B: ClassId = ClassId::new(11);
const F0: FeatureId = FeatureId::new(0);
const F1: FeatureId = FeatureId::new(1);

fn is_invalid<T>(result: gmlx_core::Result<T>) -> bool {
    matches!(result, Err(ModelError::InvalidMetadata { .. }))
}

#[test]
fn test_subtype_features_are_flattened() {
    let registry = registry();
    let axis = registry.class_by_name("CoordinateSystemAxis").unwrap();

    assert_eq!(axis.id(), AXIS);
    assert_eq!(axis.supertype(), Some(DEFINITION));
    assert_eq!(axis.feature_count(), 6);
    assert_eq!(axis.feature_by_name("identifier").unwrap().id(), IDENTIFIER);
    assert_eq!(axis.feature(MINIMUM_VALUE).unwrap().name(), "minimumValue");
    assert_eq!(axis.own_features().len(), 3);

    assert!(registry.is_subclass(AXIS, DEFINITION));
    assert!(!registry.is_subclass(DEFINITION, AXIS));
    assert!(!registry.is_subclass(REMARK, DEFINITION));
}

#[test]
fn test_group_members_listed_in_feature_order() {
    let registry = registry();
    let coll = registry.class(COLLECTION).unwrap();

    let members: Vec<_> = coll.group_members(CHOICE).map(|f| f.name()).collect();
    assert_eq!(members, vec!["member", "name", "primary"]);
    assert_eq!(registry.len(), 7);
}

#[test]
fn test_non_contiguous_feature_id_rejected() {
    // GIVEN a base class with two features
    let builder = MetadataRegistry::builder()
        .add_class(
            A,
            "Base",
            None,
            vec![
                FeatureDescriptor::attribute(F0, "a", DataType::Int),
                FeatureDescriptor::attribute(F1, "b", DataType::Int),
            ],
        )
        .unwrap();

    // WHEN its own feature restarts at 0
    let result = builder.add_class(
        B,
        "Derived",
        Some(A),
        vec![FeatureDescriptor::attribute(F0, "c", DataType::Int)],
    );

    // THEN the builder refuses it
    assert!(is_invalid(result));
}

#[test]
fn test_duplicate_and_dangling_declarations_rejected() {
    let base = || {
        RegistryBuilder::new()
            .add_class(A, "A", None, vec![])
            .unwrap()
    };

    assert!(is_invalid(base().add_class(A, "Other", None, vec![])));
    assert!(is_invalid(base().add_class(B, "A", None, vec![])));
    assert!(is_invalid(base().add_class(B, "B", Some(ClassId::new(99)), vec![])));
    assert!(is_invalid(
        base()
            .add_class(
                B,
                "B",
                None,
                vec![FeatureDescriptor::containment(F0, "child", ClassId::new(99))],
            )
            .unwrap()
            .build()
    ));
}

#[test]
fn test_opposite_must_point_back() {
    let result = RegistryBuilder::new()
        .add_class(
            A,
            "A",
            None,
            vec![FeatureDescriptor::reference(F0, "b", B).with_opposite(F0)],
        )
        .unwrap()
        .add_class(B, "B", None, vec![FeatureDescriptor::reference(F0, "a", A)])
        .unwrap()
        .build();

    assert!(is_invalid(result));
}

#[test]
fn test_matching_opposites_accepted() {
    let registry = RegistryBuilder::new()
        .add_class(
            A,
            "A",
            None,
            vec![FeatureDescriptor::reference(F0, "b", B).with_opposite(F0)],
        )
        .unwrap()
        .add_class(
            B,
            "B",
            None,
            vec![FeatureDescriptor::reference(F0, "a", A)
                .many()
                .with_opposite(F0)],
        )
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(registry.class(A).unwrap().feature(F0).unwrap().opposite(), Some(F0));
}

#[test]
fn test_grouped_feature_rules() {
    // A grouped reference may not declare an opposite
    let with_opposite = RegistryBuilder::new()
        .add_class(
            A,
            "A",
            None,
            vec![
                FeatureDescriptor::feature_map(F0, "group"),
                FeatureDescriptor::reference(F1, "b", B)
                    .with_opposite(F0)
                    .in_group(F0),
            ],
        )
        .unwrap()
        .add_class(
            B,
            "B",
            None,
            vec![FeatureDescriptor::reference(F0, "a", A).with_opposite(F1)],
        )
        .unwrap()
        .build();
    assert!(is_invalid(with_opposite));

    // The group must be a feature map
    let not_a_map = RegistryBuilder::new()
        .add_class(
            A,
            "A",
            None,
            vec![
                FeatureDescriptor::attribute(F0, "plain", DataType::String),
                FeatureDescriptor::attribute(F1, "member", DataType::String).in_group(F0),
            ],
        )
        .unwrap()
        .build();
    assert!(is_invalid(not_a_map));
}

#[test]
fn test_default_must_fit_feature() {
    let build = |feature: FeatureDescriptor| {
        RegistryBuilder::new()
            .add_class(A, "A", None, vec![feature])
            .and_then(RegistryBuilder::build)
    };

    // Wrong data type
    assert!(is_invalid(build(
        FeatureDescriptor::attribute(F0, "n", DataType::Int).with_default("x")
    )));
    // Many-valued attribute
    assert!(is_invalid(build(
        FeatureDescriptor::attribute(F0, "n", DataType::Int)
            .many()
            .with_default(Value::Int(1))
    )));
    // Non-attribute feature
    assert!(is_invalid(build(
        FeatureDescriptor::reference(F0, "other", A).with_default("x")
    )));

    // A fitting default builds and survives set then unset
    let registry = build(
        FeatureDescriptor::attribute(F0, "n", DataType::Int).with_default(Value::Int(7)),
    )
    .unwrap();
    let mut store = Store::new(Arc::new(registry));
    let obj = lifecycle_ops::create(&mut store, A).unwrap();
    object_ops::set(&mut store, obj, F0, Value::Int(3)).unwrap();
    object_ops::unset(&mut store, obj, F0).unwrap();
    assert_eq!(object_ops::get(&store, obj, F0).unwrap(), Value::Int(7));
}
