use gmlx_core_types::{BatchId, ClassId, FeatureId, ObjectId};
use thiserror::Error;

/// Result type alias using ModelError
pub type Result<T> = std::result::Result<T, ModelError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every runtime error maps onto one of these kinds, each with a stable code
/// that generated client code and tests can match on without depending on
/// message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Feature dispatch
    UnknownFeature,
    TypeMismatch,

    // Collections
    NotPresent,
    MultipleValues,
    IndexOutOfBounds,

    // Graph structure
    NotFound,
    CycleDetected,
    InvariantViolation,

    // Metadata / configuration
    InvalidMetadata,
    InvalidConfig,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::UnknownFeature => "ERR_UNKNOWN_FEATURE",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::NotPresent => "ERR_NOT_PRESENT",
            ExErrorKind::MultipleValues => "ERR_MULTIPLE_VALUES",
            ExErrorKind::IndexOutOfBounds => "ERR_INDEX_OUT_OF_BOUNDS",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::InvalidMetadata => "ERR_INVALID_METADATA",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification plus the object/feature context of the call
/// that failed, for logging and external reporting.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    object_id: Option<ObjectId>,
    feature_id: Option<FeatureId>,
    batch_id: Option<BatchId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            object_id: None,
            feature_id: None,
            batch_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add object context
    pub fn with_object_id(mut self, id: ObjectId) -> Self {
        self.object_id = Some(id);
        self
    }

    /// Add feature context
    pub fn with_feature_id(mut self, id: FeatureId) -> Self {
        self.feature_id = Some(id);
        self
    }

    /// Add batch correlation context
    pub fn with_batch_id(mut self, batch_id: BatchId) -> Self {
        self.batch_id = Some(batch_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.object_id
    }

    pub fn feature_id(&self) -> Option<FeatureId> {
        self.feature_id
    }

    pub fn batch_id(&self) -> Option<&BatchId> {
        self.batch_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(object_id) = &self.object_id {
            write!(f, " (object_id: {})", object_id)?;
        }
        if let Some(feature_id) = &self.feature_id {
            write!(f, " (feature_id: {})", feature_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for structural object runtime operations
///
/// Every variant is a programmer error in the calling (usually generated)
/// code or in the metadata it was generated from. None are retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    // ===== Feature dispatch =====
    /// Feature ID is not declared on the object's class
    #[error("Unknown feature {feature_id} on class {class_name}")]
    UnknownFeature {
        class_name: String,
        feature_id: FeatureId,
    },

    /// Value kind disagrees with the feature's declared kind
    #[error("Type mismatch on feature '{feature_name}': {reason}")]
    TypeMismatch {
        feature_name: String,
        reason: String,
    },

    // ===== Collection errors =====
    /// Value is not an element of the collection it was removed from
    #[error("Value {value} is not present in feature '{feature_name}'")]
    NotPresent { feature_name: String, value: String },

    /// Single-value access hit a feature map holding several entries
    #[error("Feature '{feature_name}' holds {count} entries where one was expected")]
    MultipleValues { feature_name: String, count: usize },

    /// Positional access past the end of a collection
    #[error("Index {index} out of bounds for feature '{feature_name}' (len {len})")]
    IndexOutOfBounds {
        feature_name: String,
        index: usize,
        len: usize,
    },

    // ===== Graph errors =====
    /// Object handle is unknown or stale
    #[error("Object not found: {object_id}")]
    ObjectNotFound { object_id: ObjectId },

    /// Class is not known to the metadata provider
    #[error("Class not found: {class_id}")]
    ClassNotFound { class_id: ClassId },

    /// Containing the child below the owner would make it its own ancestor
    #[error("Cycle detected: {child} cannot be contained below {owner}")]
    CycleDetected { owner: ObjectId, child: ObjectId },

    /// Child's container reference disagrees with the owning slot
    #[error("Object {object_id} claims container {owner_id} but is not held there")]
    ContainerMismatch {
        object_id: ObjectId,
        owner_id: ObjectId,
    },

    /// Object-valued slot points at a freed object
    #[error("Object {object_id} feature {feature_id} references missing object {target_id}")]
    DanglingReference {
        object_id: ObjectId,
        feature_id: FeatureId,
        target_id: ObjectId,
    },

    /// Bidirectional reference is only recorded on one end
    #[error("Object {object_id} references {target_id} but the opposite end does not point back")]
    OppositeMismatch {
        object_id: ObjectId,
        target_id: ObjectId,
    },

    // ===== Metadata / configuration =====
    /// Metadata registry rejected a class or feature declaration
    #[error("Invalid metadata: {reason}")]
    InvalidMetadata { reason: String },

    /// Configuration could not be parsed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Conversion from ModelError to ExError
impl From<ModelError> for ExError {
    fn from(err: ModelError) -> Self {
        let message = err.to_string();
        match err {
            ModelError::UnknownFeature { feature_id, .. } => {
                ExError::new(ExErrorKind::UnknownFeature)
                    .with_feature_id(feature_id)
                    .with_message(message)
            }
            ModelError::TypeMismatch { .. } => {
                ExError::new(ExErrorKind::TypeMismatch).with_message(message)
            }
            ModelError::NotPresent { .. } => {
                ExError::new(ExErrorKind::NotPresent).with_message(message)
            }
            ModelError::MultipleValues { .. } => {
                ExError::new(ExErrorKind::MultipleValues).with_message(message)
            }
            ModelError::IndexOutOfBounds { .. } => {
                ExError::new(ExErrorKind::IndexOutOfBounds).with_message(message)
            }
            ModelError::ObjectNotFound { object_id } => ExError::new(ExErrorKind::NotFound)
                .with_object_id(object_id)
                .with_message(message),
            ModelError::ClassNotFound { .. } => {
                ExError::new(ExErrorKind::NotFound).with_message(message)
            }
            ModelError::CycleDetected { child, .. } => ExError::new(ExErrorKind::CycleDetected)
                .with_object_id(child)
                .with_message(message),
            ModelError::ContainerMismatch { object_id, .. } => {
                ExError::new(ExErrorKind::InvariantViolation)
                    .with_object_id(object_id)
                    .with_message(message)
            }
            ModelError::DanglingReference {
                object_id,
                feature_id,
                ..
            } => ExError::new(ExErrorKind::InvariantViolation)
                .with_object_id(object_id)
                .with_feature_id(feature_id)
                .with_message(message),
            ModelError::OppositeMismatch { object_id, .. } => {
                ExError::new(ExErrorKind::InvariantViolation)
                    .with_object_id(object_id)
                    .with_message(message)
            }
            ModelError::InvalidMetadata { .. } => {
                ExError::new(ExErrorKind::InvalidMetadata).with_message(message)
            }
            ModelError::InvalidConfig { .. } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(message)
            }
        }
    }
}
