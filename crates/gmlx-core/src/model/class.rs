use gmlx_core_types::{ClassId, FeatureId};
use serde::{Deserialize, Serialize};

use super::feature::FeatureDescriptor;

/// Metadata of one model class with its flattened feature table
///
/// `features` holds the inherited features followed by the class's own, so
/// a feature's ID is also its position in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    id: ClassId,
    name: String,
    supertype: Option<ClassId>,
    features: Vec<FeatureDescriptor>,
    own_start: usize,
}

impl ClassDescriptor {
    pub(crate) fn new(
        id: ClassId,
        name: String,
        supertype: Option<ClassId>,
        features: Vec<FeatureDescriptor>,
        own_start: usize,
    ) -> Self {
        Self {
            id,
            name,
            supertype,
            features,
            own_start,
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supertype(&self) -> Option<ClassId> {
        self.supertype
    }

    /// Look up a feature by ID
    pub fn feature(&self, id: FeatureId) -> Option<&FeatureDescriptor> {
        self.features.get(id.index()).filter(|f| f.id() == id)
    }

    pub fn feature_by_name(&self, name: &str) -> Option<&FeatureDescriptor> {
        self.features.iter().find(|f| f.name() == name)
    }

    /// All features, inherited first
    pub fn features(&self) -> &[FeatureDescriptor] {
        &self.features
    }

    /// Features declared on this class itself
    pub fn own_features(&self) -> &[FeatureDescriptor] {
        &self.features[self.own_start..]
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Member features stored in the given feature map slot, in declaration order
    pub fn group_members(&self, group: FeatureId) -> impl Iterator<Item = &FeatureDescriptor> {
        self.features
            .iter()
            .filter(move |f| f.group() == Some(group))
    }
}
