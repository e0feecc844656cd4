//! Shared fixture: a small GML-flavoured metadata package
//!
//! ```text
//! Definition            identifier, description (unsettable), remarks -> Remark
//! ├── CoordinateSystemAxis   abbreviation, direction = "east", minimumValue (unsettable)
//! ├── CoordinateSystem       axes -> Axis*, usedBy <-> CRS.coordinateSystem
//! ├── CRS                    coordinateSystem <-> CoordinateSystem.usedBy
//! └── DefinitionCollection   choice { member -> Definition*, name*, primary -> Axis },
//!                            tags*, related -> Definition*
//! Remark                     text
//! TopoComplex                subComplexes -> TopoComplex*, maximalComplex -> TopoComplex
//! ```

#![allow(dead_code)]

use std::rc::Rc;
use std::sync::Arc;

use gmlx_core::ops::{lifecycle_ops, object_ops};
use gmlx_core::{
    ChangeRecorder, ClassId, DataType, FeatureDescriptor, FeatureId, MetadataRegistry, ObjectId,
    Observer, Store, Value,
};

pub const DEFINITION: ClassId = ClassId::new(0);
pub const REMARK: ClassId = ClassId::new(1);
pub const AXIS: ClassId = ClassId::new(2);
pub const CS: ClassId = ClassId::new(3);
pub const CRS: ClassId = ClassId::new(4);
pub const COLLECTION: ClassId = ClassId::new(5);
pub const COMPLEX: ClassId = ClassId::new(6);

// Definition
pub const IDENTIFIER: FeatureId = FeatureId::new(0);
pub const DESCRIPTION: FeatureId = FeatureId::new(1);
pub const REMARKS: FeatureId = FeatureId::new(2);

// Remark
pub const TEXT: FeatureId = FeatureId::new(0);

// CoordinateSystemAxis
pub const ABBREVIATION: FeatureId = FeatureId::new(3);
pub const DIRECTION: FeatureId = FeatureId::new(4);
pub const MINIMUM_VALUE: FeatureId = FeatureId::new(5);

// CoordinateSystem
pub const AXES: FeatureId = FeatureId::new(3);
pub const USED_BY: FeatureId = FeatureId::new(4);

// CRS
pub const COORDINATE_SYSTEM: FeatureId = FeatureId::new(3);

// DefinitionCollection
pub const CHOICE: FeatureId = FeatureId::new(3);
pub const MEMBER: FeatureId = FeatureId::new(4);
pub const NAME: FeatureId = FeatureId::new(5);
pub const PRIMARY: FeatureId = FeatureId::new(6);
pub const TAGS: FeatureId = FeatureId::new(7);
pub const RELATED: FeatureId = FeatureId::new(8);

// TopoComplex
pub const SUB_COMPLEXES: FeatureId = FeatureId::new(0);
pub const MAXIMAL_COMPLEX: FeatureId = FeatureId::new(1);

pub fn registry() -> MetadataRegistry {
    MetadataRegistry::builder()
        .add_class(
            DEFINITION,
            "Definition",
            None,
            vec![
                FeatureDescriptor::attribute(IDENTIFIER, "identifier", DataType::String),
                FeatureDescriptor::attribute(DESCRIPTION, "description", DataType::String)
                    .unsettable(),
                FeatureDescriptor::containment(REMARKS, "remarks", REMARK),
            ],
        )
        .unwrap()
        .add_class(
            REMARK,
            "Remark",
            None,
            vec![FeatureDescriptor::attribute(TEXT, "text", DataType::String)],
        )
        .unwrap()
        .add_class(
            AXIS,
            "CoordinateSystemAxis",
            Some(DEFINITION),
            vec![
                FeatureDescriptor::attribute(ABBREVIATION, "abbreviation", DataType::String),
                FeatureDescriptor::attribute(DIRECTION, "direction", DataType::String)
                    .with_default("east"),
                FeatureDescriptor::attribute(MINIMUM_VALUE, "minimumValue", DataType::Float)
                    .with_default(0.0)
                    .unsettable(),
            ],
        )
        .unwrap()
        .add_class(
            CS,
            "CoordinateSystem",
            Some(DEFINITION),
            vec![
                FeatureDescriptor::containment_many(AXES, "axes", AXIS),
                FeatureDescriptor::reference(USED_BY, "usedBy", CRS)
                    .many()
                    .with_opposite(COORDINATE_SYSTEM),
            ],
        )
        .unwrap()
        .add_class(
            CRS,
            "CRS",
            Some(DEFINITION),
            vec![FeatureDescriptor::reference(COORDINATE_SYSTEM, "coordinateSystem", CS)
                .with_opposite(USED_BY)],
        )
        .unwrap()
        .add_class(
            COLLECTION,
            "DefinitionCollection",
            Some(DEFINITION),
            vec![
                FeatureDescriptor::feature_map(CHOICE, "choice"),
                FeatureDescriptor::containment_many(MEMBER, "member", DEFINITION)
                    .in_group(CHOICE),
                FeatureDescriptor::attribute(NAME, "name", DataType::String)
                    .many()
                    .in_group(CHOICE),
                FeatureDescriptor::containment(PRIMARY, "primary", AXIS).in_group(CHOICE),
                FeatureDescriptor::attribute(TAGS, "tags", DataType::String).many(),
                FeatureDescriptor::reference(RELATED, "related", DEFINITION).many(),
            ],
        )
        .unwrap()
        .add_class(
            COMPLEX,
            "TopoComplex",
            None,
            vec![
                FeatureDescriptor::containment_many(SUB_COMPLEXES, "subComplexes", COMPLEX),
                FeatureDescriptor::containment(MAXIMAL_COMPLEX, "maximalComplex", COMPLEX),
            ],
        )
        .unwrap()
        .build()
        .unwrap()
}

pub fn new_store() -> Store {
    Store::new(Arc::new(registry()))
}

pub fn create(store: &mut Store, class: ClassId) -> ObjectId {
    lifecycle_ops::create(store, class).unwrap()
}

/// Register a recorder on `obj` and return a handle sharing its buffers
pub fn observe(store: &mut Store, obj: ObjectId) -> ChangeRecorder {
    let recorder = ChangeRecorder::new();
    let observer: Rc<dyn Observer> = Rc::new(recorder.clone());
    store.add_observer(obj, observer).unwrap();
    recorder
}

/// Register a model-wide recorder and return a handle sharing its buffers
pub fn observe_batches(store: &mut Store) -> ChangeRecorder {
    let recorder = ChangeRecorder::new();
    store.add_batch_observer(Rc::new(recorder.clone()));
    recorder
}

pub fn get(store: &Store, obj: ObjectId, feature: FeatureId) -> Value {
    object_ops::get(store, obj, feature).unwrap()
}

pub fn objects(ids: &[ObjectId]) -> Value {
    Value::List(ids.iter().copied().map(Value::Object).collect())
}
