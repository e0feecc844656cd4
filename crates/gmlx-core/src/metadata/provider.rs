use gmlx_core_types::{ClassId, FeatureId};

use crate::errors::{ModelError, Result};
use crate::model::{ClassDescriptor, FeatureDescriptor};

/// Read-only lookup of class metadata
///
/// Generated model packages implement this (or build a
/// [`super::MetadataRegistry`]) and hand it to the store behind an `Arc`.
pub trait MetadataProvider: Send + Sync {
    fn class(&self, id: ClassId) -> Option<&ClassDescriptor>;

    /// True if `sub` is `sup` or inherits from it
    fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
        let mut current = Some(sub);
        while let Some(id) = current {
            if id == sup {
                return true;
            }
            current = self.class(id).and_then(|c| c.supertype());
        }
        false
    }
}

/// Resolve a class or fail with `ClassNotFound`
pub fn require_class(meta: &dyn MetadataProvider, id: ClassId) -> Result<&ClassDescriptor> {
    meta.class(id)
        .ok_or(ModelError::ClassNotFound { class_id: id })
}

/// Resolve a feature of a class or fail with `UnknownFeature`
pub fn require_feature(class: &ClassDescriptor, feature: FeatureId) -> Result<&FeatureDescriptor> {
    class.feature(feature).ok_or_else(|| ModelError::UnknownFeature {
        class_name: class.name().to_string(),
        feature_id: feature,
    })
}
