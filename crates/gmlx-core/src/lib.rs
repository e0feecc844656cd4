//! gmlx Core - structural object runtime for generated GML model types
//!
//! Generated per-type accessors forward every property read and write to
//! this crate by feature ID. The runtime owns the real invariants:
//! - Single-owner containment trees with automatic re-parenting
//! - Batched notification chains dispatched once per outermost call
//! - Feature maps: several member features sharing one ordered entry sequence
//! - Opposite-end maintenance for bidirectional cross references
//! - Atomic command batches with invariant validation
//!
//! Objects live in an arena [`Store`] over shared, immutable class metadata
//! ([`MetadataProvider`]). Everything is single-threaded and synchronous.

pub mod apply;
pub mod commands;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod metadata;
pub mod model;
pub mod notify;
pub mod ops;
pub mod render;
pub mod rules;

// Re-export commonly used types
pub use apply::{apply, apply_one};
pub use commands::Command;
pub use config::ModelConfig;
pub use errors::{ExError, ExErrorKind, ModelError, Result};
pub use gmlx_core_types::{BatchId, ClassId, FeatureId, ObjectId};
pub use metadata::{MetadataProvider, MetadataRegistry, RegistryBuilder};
pub use model::{
    ChangeKind, ClassDescriptor, ContainerRef, DataType, FeatureDescriptor, FeatureKind,
    FeatureMap, FeatureMapEntry, Notification, StructuralObject, Value,
};
pub use notify::{BatchObserver, ChangeRecorder, NotificationChain, Observer};
pub use ops::{FeatureMapView, ListView, MapView, Store};
