use gmlx_core_types::ObjectId;
use serde_json::{json, Map, Value as Json};

use crate::errors::Result;
use crate::model::{FeatureDescriptor, Value};
use crate::ops::{object_ops, Store};

/// Dump the containment subtree of `obj` as diffable JSON
///
/// Each object becomes `{"id", "class", "features"}` with only its set
/// features. Contained children are nested; cross references appear as
/// object IDs; feature map slots become arrays of `{"feature", "value"}`.
///
/// # Errors
/// * `ObjectNotFound` - If the handle is stale
pub fn dump_json(store: &Store, obj: ObjectId) -> Result<Json> {
    let class = store.class_of(obj)?;
    let mut features = Map::new();

    for feature in class.features() {
        if feature.group().is_some() || !object_ops::is_set(store, obj, feature.id())? {
            continue;
        }
        let value = object_ops::get(store, obj, feature.id())?;
        let rendered = if feature.is_feature_map() {
            let mut entries = Vec::new();
            for entry in value.as_entries().unwrap_or_default() {
                let member = store.feature_of(obj, entry.feature)?;
                entries.push(json!({
                    "feature": member.name(),
                    "value": render_value(store, member, &entry.value)?,
                }));
            }
            Json::Array(entries)
        } else {
            render_value(store, feature, &value)?
        };
        features.insert(feature.name().to_string(), rendered);
    }

    Ok(json!({
        "id": obj.to_string(),
        "class": class.name(),
        "features": features,
    }))
}

fn render_value(store: &Store, feature: &FeatureDescriptor, value: &Value) -> Result<Json> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Float(x) => json!(x),
        Value::String(s) => json!(s),
        Value::Object(id) if feature.is_containment() => dump_json(store, *id)?,
        Value::Object(id) => json!(id.to_string()),
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|v| render_value(store, feature, v))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Entries(entries) => Json::Array(
            entries
                .iter()
                .map(|e| json!({ "feature": e.feature.get(), "value": e.value.to_string() }))
                .collect(),
        ),
    })
}
