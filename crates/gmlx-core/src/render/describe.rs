use gmlx_core_types::ObjectId;

use crate::errors::Result;
use crate::model::FeatureKind;
use crate::ops::{object_ops, Store};

/// Render the debug form of an object
///
/// `ClassName#index (attr: value, ...)`, listing only attributes that are
/// set, in feature order. The parenthesised part is omitted when no
/// attribute is set.
///
/// # Errors
/// * `ObjectNotFound` - If the handle is stale
pub fn describe(store: &Store, obj: ObjectId) -> Result<String> {
    let class = store.class_of(obj)?;
    let mut output = format!("{}#{}", class.name(), obj.index());

    let mut parts = Vec::new();
    for feature in class.features() {
        if !matches!(feature.kind(), FeatureKind::Attribute { .. }) {
            continue;
        }
        if !object_ops::is_set(store, obj, feature.id())? {
            continue;
        }
        let value = object_ops::get(store, obj, feature.id())?;
        parts.push(format!("{}: {}", feature.name(), value));
    }

    if !parts.is_empty() {
        output.push_str(&format!(" ({})", parts.join(", ")));
    }
    Ok(output)
}
