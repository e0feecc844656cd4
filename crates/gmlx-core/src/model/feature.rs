use gmlx_core_types::{ClassId, FeatureId};
use serde::{Deserialize, Serialize};

use super::value::Value;

/// Scalar type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    Int,
    Float,
    String,
    /// Any scalar (schema unions such as `xs:anySimpleType`)
    Any,
}

impl DataType {
    /// Check whether a scalar value is acceptable for this data type
    ///
    /// Null is accepted everywhere; it stands for "no value".
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (DataType::Bool, Value::Bool(_)) => true,
            (DataType::Int, Value::Int(_)) => true,
            (DataType::Float, Value::Float(_) | Value::Int(_)) => true,
            (DataType::String, Value::String(_)) => true,
            (
                DataType::Any,
                Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_),
            ) => true,
            _ => false,
        }
    }
}

/// Closed set of structural feature kinds driving reflective dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Scalar attribute (single or ordered multi)
    Attribute { data_type: DataType },
    /// Owned child, at most one
    SingleContainment { target: ClassId },
    /// Ordered list of owned children
    MultiContainment { target: ClassId },
    /// Non-owning reference, optionally kept consistent with an opposite end
    CrossReference {
        target: ClassId,
        opposite: Option<FeatureId>,
    },
    /// Feature map slot whose values are tagged entries of member features
    MapEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    Single,
    Many,
}

/// Static metadata describing one structural slot of a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    id: FeatureId,
    name: String,
    kind: FeatureKind,
    many: bool,
    default: Value,
    unsettable: bool,
    group: Option<FeatureId>,
}

impl FeatureDescriptor {
    fn with_kind(id: FeatureId, name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            many: false,
            default: Value::Null,
            unsettable: false,
            group: None,
        }
    }

    /// Single-valued attribute
    pub fn attribute(id: FeatureId, name: impl Into<String>, data_type: DataType) -> Self {
        Self::with_kind(id, name, FeatureKind::Attribute { data_type })
    }

    /// Single containment reference
    pub fn containment(id: FeatureId, name: impl Into<String>, target: ClassId) -> Self {
        Self::with_kind(id, name, FeatureKind::SingleContainment { target })
    }

    /// Ordered multi containment reference
    pub fn containment_many(id: FeatureId, name: impl Into<String>, target: ClassId) -> Self {
        Self::with_kind(id, name, FeatureKind::MultiContainment { target })
    }

    /// Single-valued cross reference
    pub fn reference(id: FeatureId, name: impl Into<String>, target: ClassId) -> Self {
        Self::with_kind(
            id,
            name,
            FeatureKind::CrossReference {
                target,
                opposite: None,
            },
        )
    }

    /// Feature map slot (XML choice/sequence group)
    pub fn feature_map(id: FeatureId, name: impl Into<String>) -> Self {
        Self::with_kind(id, name, FeatureKind::MapEntry)
    }

    /// Make an attribute or cross reference ordered multi-valued
    pub fn many(mut self) -> Self {
        match self.kind {
            FeatureKind::SingleContainment { target } => {
                self.kind = FeatureKind::MultiContainment { target };
            }
            _ => self.many = true,
        }
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Track an explicit is-set flag distinct from the default value
    pub fn unsettable(mut self) -> Self {
        self.unsettable = true;
        self
    }

    /// Store this feature's values as entries of the given feature map slot
    pub fn in_group(mut self, group: FeatureId) -> Self {
        self.group = Some(group);
        self
    }

    /// Declare the opposite end of a cross reference
    pub fn with_opposite(mut self, opposite: FeatureId) -> Self {
        if let FeatureKind::CrossReference { opposite: o, .. } = &mut self.kind {
            *o = Some(opposite);
        }
        self
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FeatureKind {
        &self.kind
    }

    pub fn is_unsettable(&self) -> bool {
        self.unsettable
    }

    pub fn group(&self) -> Option<FeatureId> {
        self.group
    }

    pub fn cardinality(&self) -> Cardinality {
        match self.kind {
            FeatureKind::SingleContainment { .. } => Cardinality::Single,
            FeatureKind::MultiContainment { .. } | FeatureKind::MapEntry => Cardinality::Many,
            _ if self.many => Cardinality::Many,
            _ => Cardinality::Single,
        }
    }

    pub fn is_many(&self) -> bool {
        self.cardinality() == Cardinality::Many
    }

    pub fn is_containment(&self) -> bool {
        matches!(
            self.kind,
            FeatureKind::SingleContainment { .. } | FeatureKind::MultiContainment { .. }
        )
    }

    pub fn is_cross_reference(&self) -> bool {
        matches!(self.kind, FeatureKind::CrossReference { .. })
    }

    pub fn is_feature_map(&self) -> bool {
        matches!(self.kind, FeatureKind::MapEntry)
    }

    /// Class that object values of this feature must conform to
    pub fn target(&self) -> Option<ClassId> {
        match self.kind {
            FeatureKind::SingleContainment { target }
            | FeatureKind::MultiContainment { target }
            | FeatureKind::CrossReference { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Option<FeatureId> {
        match self.kind {
            FeatureKind::CrossReference { opposite, .. } => opposite,
            _ => None,
        }
    }

    pub fn data_type(&self) -> Option<DataType> {
        match self.kind {
            FeatureKind::Attribute { data_type } => Some(data_type),
            _ => None,
        }
    }

    /// Default as declared through [`FeatureDescriptor::with_default`]
    pub fn declared_default(&self) -> &Value {
        &self.default
    }

    /// Value a freshly created or unset slot holds
    pub fn default_value(&self) -> Value {
        match self.kind {
            FeatureKind::MapEntry => Value::Entries(Vec::new()),
            _ if self.is_many() => Value::List(Vec::new()),
            FeatureKind::Attribute { .. } => self.default.clone(),
            _ => Value::Null,
        }
    }
}
