use std::collections::HashMap;

use gmlx_core_types::ClassId;

use super::provider::MetadataProvider;
use crate::errors::{ModelError, Result};
use crate::model::{ClassDescriptor, FeatureDescriptor};

/// Immutable metadata package built by [`RegistryBuilder`]
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    classes: HashMap<ClassId, ClassDescriptor>,
    by_name: HashMap<String, ClassId>,
}

impl MetadataRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn class_by_name(&self, name: &str) -> Option<&ClassDescriptor> {
        self.by_name.get(name).and_then(|id| self.classes.get(id))
    }

    /// All classes ordered by ID
    pub fn classes(&self) -> Vec<&ClassDescriptor> {
        let mut classes: Vec<_> = self.classes.values().collect();
        classes.sort_by_key(|c| c.id());
        classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl MetadataProvider for MetadataRegistry {
    fn class(&self, id: ClassId) -> Option<&ClassDescriptor> {
        self.classes.get(&id)
    }
}

/// Incremental builder for a [`MetadataRegistry`]
///
/// Classes must be added after their supertype. Each class lists only the
/// features it declares itself; inherited features are copied from the
/// supertype so every class carries its flattened table.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: MetadataRegistry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one class
    ///
    /// # Errors
    ///
    /// Returns `InvalidMetadata` if the class ID or name is already taken,
    /// the supertype is unknown, the declared feature IDs do not continue
    /// the supertype's numbering, a feature name repeats, or a declared
    /// default does not fit its feature.
    pub fn add_class(
        mut self,
        id: ClassId,
        name: impl Into<String>,
        supertype: Option<ClassId>,
        own_features: Vec<FeatureDescriptor>,
    ) -> Result<Self> {
        let name = name.into();
        if self.registry.classes.contains_key(&id) {
            return Err(invalid(format!("duplicate class id {}", id)));
        }
        if self.registry.by_name.contains_key(&name) {
            return Err(invalid(format!("duplicate class name '{}'", name)));
        }

        let mut features = match supertype {
            Some(sup) => self
                .registry
                .classes
                .get(&sup)
                .ok_or_else(|| invalid(format!("class '{}' extends unknown {}", name, sup)))?
                .features()
                .to_vec(),
            None => Vec::new(),
        };
        let own_start = features.len();

        for (offset, feature) in own_features.into_iter().enumerate() {
            let expected = own_start + offset;
            if feature.id().index() != expected {
                return Err(invalid(format!(
                    "feature '{}' of class '{}' has id {} but {} was expected",
                    feature.name(),
                    name,
                    feature.id(),
                    expected
                )));
            }
            check_default(&name, &feature)?;
            if features.iter().any(|f| f.name() == feature.name()) {
                return Err(invalid(format!(
                    "feature name '{}' repeats in class '{}'",
                    feature.name(),
                    name
                )));
            }
            features.push(feature);
        }

        self.registry.by_name.insert(name.clone(), id);
        self.registry.classes.insert(
            id,
            ClassDescriptor::new(id, name, supertype, features, own_start),
        );
        Ok(self)
    }

    /// Check cross-class consistency and freeze the registry
    ///
    /// # Errors
    ///
    /// Returns `InvalidMetadata` for unknown reference targets, group members
    /// pointing at something other than a feature map of the same class,
    /// grouped features declaring an opposite, and opposites that do not
    /// point back.
    pub fn build(self) -> Result<MetadataRegistry> {
        let registry = self.registry;

        for class in registry.classes.values() {
            for feature in class.own_features() {
                check_feature(&registry, class, feature)?;
            }
        }

        Ok(registry)
    }
}

/// Only single-valued attributes carry a default, and it must fit the data type
fn check_default(class_name: &str, feature: &FeatureDescriptor) -> Result<()> {
    let default = feature.declared_default();
    if default.is_null() {
        return Ok(());
    }
    let fits = match feature.data_type() {
        Some(data_type) => !feature.is_many() && data_type.accepts(default),
        None => false,
    };
    if !fits {
        return Err(invalid(format!(
            "default {} does not fit feature '{}.{}'",
            default,
            class_name,
            feature.name()
        )));
    }
    Ok(())
}

fn check_feature(
    registry: &MetadataRegistry,
    class: &ClassDescriptor,
    feature: &FeatureDescriptor,
) -> Result<()> {
    if let Some(target) = feature.target() {
        if registry.class(target).is_none() {
            return Err(invalid(format!(
                "feature '{}.{}' targets unknown {}",
                class.name(),
                feature.name(),
                target
            )));
        }
    }

    if let Some(group) = feature.group() {
        let slot = class.feature(group).ok_or_else(|| {
            invalid(format!(
                "feature '{}.{}' names missing group {}",
                class.name(),
                feature.name(),
                group
            ))
        })?;
        if !slot.is_feature_map() || slot.group().is_some() {
            return Err(invalid(format!(
                "group '{}.{}' of feature '{}' is not a feature map",
                class.name(),
                slot.name(),
                feature.name()
            )));
        }
        if feature.is_feature_map() {
            return Err(invalid(format!(
                "feature map '{}.{}' cannot itself be grouped",
                class.name(),
                feature.name()
            )));
        }
        if feature.opposite().is_some() {
            return Err(invalid(format!(
                "grouped feature '{}.{}' cannot declare an opposite",
                class.name(),
                feature.name()
            )));
        }
    }

    if let (Some(opposite), Some(target)) = (feature.opposite(), feature.target()) {
        let back = registry
            .class(target)
            .and_then(|t| t.feature(opposite))
            .ok_or_else(|| {
                invalid(format!(
                    "opposite {} of '{}.{}' is not declared on its target",
                    opposite,
                    class.name(),
                    feature.name()
                ))
            })?;
        if !back.is_cross_reference() || back.opposite() != Some(feature.id()) {
            return Err(invalid(format!(
                "opposite '{}' of '{}.{}' does not point back",
                back.name(),
                class.name(),
                feature.name()
            )));
        }
        if back.target().is_some_and(|t| !registry.is_subclass(class.id(), t)) {
            return Err(invalid(format!(
                "opposite '{}' of '{}.{}' targets an unrelated class",
                back.name(),
                class.name(),
                feature.name()
            )));
        }
    }

    Ok(())
}

fn invalid(reason: String) -> ModelError {
    ModelError::InvalidMetadata { reason }
}
