//! Core types shared across the gmlx runtime crates
//!
//! This crate provides the small vocabulary that the object runtime, its
//! logging facility and generated model code all agree on:
//!
//! - **Identifiers**: ObjectId, ClassId, FeatureId
//! - **Batch correlation**: BatchId for dispatched notification batches
//! - **Schema constants**: Canonical field keys and event names

pub mod batch;
pub mod ids;
pub mod schema;

pub use batch::BatchId;
pub use ids::{ClassId, FeatureId, ObjectId};
