pub mod class;
pub mod feature;
pub mod feature_map;
pub mod notification;
pub mod object;
pub mod value;

pub use class::ClassDescriptor;
pub use feature::{Cardinality, DataType, FeatureDescriptor, FeatureKind};
pub use feature_map::FeatureMap;
pub use notification::{ChangeKind, Notification};
pub use object::{ContainerRef, StructuralObject};
pub use value::{FeatureMapEntry, Value};
