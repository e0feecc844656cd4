//! Live views over many-valued features
//!
//! A view borrows the store mutably and addresses one feature of one
//! object. Reads always reflect the current slot; writes go through the
//! root operations, so each call dispatches its own chain.

use gmlx_core_types::{FeatureId, ObjectId};

use super::{descriptor, feature_map_ops, list_ops, list_slot, type_mismatch, Store};
use crate::errors::Result;
use crate::model::{FeatureMapEntry, Value};

/// Live view of a list feature
#[derive(Debug)]
pub struct ListView<'a> {
    store: &'a mut Store,
    obj: ObjectId,
    feature: FeatureId,
}

impl<'a> ListView<'a> {
    fn items(&self) -> &[Value] {
        let meta = self.store.metadata();
        descriptor(meta.as_ref(), self.store, self.obj, self.feature)
            .and_then(|d| list_slot(self.store, self.obj, d))
            .unwrap_or(&[])
    }

    pub fn owner(&self) -> ObjectId {
        self.obj
    }

    pub fn feature(&self) -> FeatureId {
        self.feature
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items().get(index)
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items().contains(value)
    }

    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.items().iter().position(|v| v == value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items().iter()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.items().to_vec()
    }

    pub fn add(&mut self, value: impl Into<Value>) -> Result<usize> {
        list_ops::add(self.store, self.obj, self.feature, value.into())
    }

    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> Result<usize> {
        list_ops::insert(self.store, self.obj, self.feature, index, value.into())
    }

    pub fn remove(&mut self, value: &Value) -> Result<usize> {
        list_ops::remove(self.store, self.obj, self.feature, value)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Value> {
        list_ops::remove_at(self.store, self.obj, self.feature, index)
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        list_ops::move_item(self.store, self.obj, self.feature, from, to)
    }

    pub fn add_all(&mut self, values: Vec<Value>) -> Result<()> {
        list_ops::add_all(self.store, self.obj, self.feature, values)
    }

    pub fn clear(&mut self) -> Result<()> {
        list_ops::clear(self.store, self.obj, self.feature)
    }
}

/// Live projection of one feature map member
#[derive(Debug)]
pub struct FeatureMapView<'a> {
    store: &'a mut Store,
    obj: ObjectId,
    member: FeatureId,
}

impl<'a> FeatureMapView<'a> {
    pub fn member(&self) -> FeatureId {
        self.member
    }

    pub fn len(&self) -> usize {
        feature_map_ops::count(self.store, self.obj, self.member).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.to_vec().into_iter().nth(index)
    }

    pub fn to_vec(&self) -> Vec<Value> {
        feature_map_ops::view(self.store, self.obj, self.member).unwrap_or_default()
    }

    /// First entry, others left in place
    pub fn first(&self) -> Result<Value> {
        feature_map_ops::get_member(self.store, self.obj, self.member)
    }

    pub fn single(&self) -> Result<Value> {
        feature_map_ops::get_single(self.store, self.obj, self.member)
    }

    pub fn add(&mut self, value: impl Into<Value>) -> Result<usize> {
        feature_map_ops::add(self.store, self.obj, self.member, value.into())
    }

    pub fn insert(&mut self, view_index: usize, value: impl Into<Value>) -> Result<usize> {
        feature_map_ops::insert(self.store, self.obj, self.member, view_index, value.into())
    }

    pub fn remove(&mut self, value: &Value) -> Result<usize> {
        feature_map_ops::remove(self.store, self.obj, self.member, value)
    }

    pub fn remove_at(&mut self, view_index: usize) -> Result<Value> {
        feature_map_ops::remove_at(self.store, self.obj, self.member, view_index)
    }

    pub fn set(&mut self, value: impl Into<Value>) -> Result<()> {
        feature_map_ops::set_member(self.store, self.obj, self.member, value.into())
    }

    pub fn clear(&mut self) -> Result<()> {
        feature_map_ops::unset_member(self.store, self.obj, self.member)
    }
}

/// Live view of a whole feature map slot
#[derive(Debug)]
pub struct MapView<'a> {
    store: &'a mut Store,
    obj: ObjectId,
    group: FeatureId,
}

impl<'a> MapView<'a> {
    pub fn entries(&self) -> Vec<FeatureMapEntry> {
        feature_map_ops::entries(self.store, self.obj, self.group).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Projection of one member of this slot
    ///
    /// # Errors
    /// * `TypeMismatch` - If `member` is not stored in this slot
    pub fn member(&mut self, member: FeatureId) -> Result<FeatureMapView<'_>> {
        self.store.member_mut(self.obj, member)
    }

    pub fn replace_all(&mut self, entries: Vec<FeatureMapEntry>) -> Result<()> {
        feature_map_ops::replace_all(self.store, self.obj, self.group, entries)
    }

    pub fn clear(&mut self) -> Result<()> {
        feature_map_ops::clear(self.store, self.obj, self.group)
    }
}

impl Store {
    /// Live view of a list feature
    ///
    /// # Errors
    /// * `TypeMismatch` - Unless `feature` is a plain many-valued feature
    pub fn list_mut(&mut self, obj: ObjectId, feature: FeatureId) -> Result<ListView<'_>> {
        let meta = self.metadata();
        let d = descriptor(meta.as_ref(), self, obj, feature)?;
        if !d.is_many() || d.is_feature_map() || d.group().is_some() {
            return Err(type_mismatch(d, "not a list feature"));
        }
        Ok(ListView {
            store: self,
            obj,
            feature,
        })
    }

    /// Live projection of a feature map member
    ///
    /// # Errors
    /// * `TypeMismatch` - Unless `member` is stored in a feature map
    pub fn member_mut(&mut self, obj: ObjectId, member: FeatureId) -> Result<FeatureMapView<'_>> {
        let meta = self.metadata();
        let d = descriptor(meta.as_ref(), self, obj, member)?;
        if d.group().is_none() {
            return Err(type_mismatch(d, "not a feature map member"));
        }
        Ok(FeatureMapView {
            store: self,
            obj,
            member,
        })
    }

    /// Live view of a feature map slot
    ///
    /// # Errors
    /// * `TypeMismatch` - Unless `group` is a feature map slot
    pub fn map_mut(&mut self, obj: ObjectId, group: FeatureId) -> Result<MapView<'_>> {
        let meta = self.metadata();
        let d = descriptor(meta.as_ref(), self, obj, group)?;
        if !d.is_feature_map() {
            return Err(type_mismatch(d, "not a feature map slot"));
        }
        Ok(MapView {
            store: self,
            obj,
            group,
        })
    }
}
