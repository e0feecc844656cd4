//! Class and feature metadata consumed by the runtime

pub mod provider;
pub mod registry;

pub use provider::MetadataProvider;
pub use registry::{MetadataRegistry, RegistryBuilder};
