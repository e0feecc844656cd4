use std::rc::Rc;
use std::sync::Arc;

use gmlx_core_types::{ClassId, FeatureId, ObjectId};

use crate::config::ModelConfig;
use crate::errors::{ModelError, Result};
use crate::metadata::provider::{require_class, require_feature};
use crate::metadata::MetadataProvider;
use crate::model::{ClassDescriptor, FeatureDescriptor, StructuralObject};
use crate::notify::{BatchObserver, Observer};

/// Arena owning every structural object of one model
///
/// Objects are addressed by generation-checked [`ObjectId`] handles; freeing
/// a slot bumps its generation so stale handles fail with `ObjectNotFound`
/// instead of reaching a reused slot. Not thread-safe: observers are held
/// through `Rc` and mutation is single-threaded by contract.
#[derive(Clone)]
pub struct Store {
    pub(crate) meta: Arc<dyn MetadataProvider>,
    pub(crate) config: ModelConfig,
    pub(crate) objects: Vec<Option<StructuralObject>>,
    pub(crate) generations: Vec<u32>,
    pub(crate) free: Vec<u32>,
    pub(crate) batch_observers: Vec<Rc<dyn BatchObserver>>,
}

/// Object state captured before an atomic batch
pub(crate) struct Snapshot {
    objects: Vec<Option<StructuralObject>>,
    generations: Vec<u32>,
    free: Vec<u32>,
}

impl Store {
    /// Create an empty store over the given metadata
    pub fn new(meta: Arc<dyn MetadataProvider>) -> Self {
        Self::with_config(meta, ModelConfig::default())
    }

    pub fn with_config(meta: Arc<dyn MetadataProvider>, config: ModelConfig) -> Self {
        Self {
            meta,
            config,
            objects: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            batch_observers: Vec::new(),
        }
    }

    /// Shared handle to the metadata
    ///
    /// Operations hold their own clone so descriptor borrows do not pin the
    /// store while it is mutated.
    pub fn metadata(&self) -> Arc<dyn MetadataProvider> {
        Arc::clone(&self.meta)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ModelConfig) {
        self.config = config;
    }

    /// Get an object by handle
    ///
    /// # Errors
    /// * `ObjectNotFound` - If the handle was never issued or is stale
    pub fn get_object(&self, id: ObjectId) -> Result<&StructuralObject> {
        self.objects
            .get(id.index())
            .and_then(|slot| slot.as_ref())
            .filter(|o| o.id == id)
            .ok_or(ModelError::ObjectNotFound { object_id: id })
    }

    /// Get a mutable reference to an object by handle
    ///
    /// # Errors
    /// * `ObjectNotFound` - If the handle was never issued or is stale
    pub(crate) fn get_object_mut(&mut self, id: ObjectId) -> Result<&mut StructuralObject> {
        self.objects
            .get_mut(id.index())
            .and_then(|slot| slot.as_mut())
            .filter(|o| o.id == id)
            .ok_or(ModelError::ObjectNotFound { object_id: id })
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get_object(id).is_ok()
    }

    /// All live objects in slot order
    pub fn list_objects(&self) -> Vec<&StructuralObject> {
        self.objects.iter().flatten().collect()
    }

    pub fn object_count(&self) -> usize {
        self.objects.iter().flatten().count()
    }

    /// Objects without a container
    pub fn roots(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .flatten()
            .filter(|o| o.is_root())
            .map(|o| o.id)
            .collect()
    }

    /// Class descriptor of a live object
    ///
    /// # Errors
    /// * `ObjectNotFound` - If the handle is stale
    /// * `ClassNotFound` - If the metadata no longer knows the object's class
    pub fn class_of(&self, id: ObjectId) -> Result<&ClassDescriptor> {
        let class = self.get_object(id)?.class;
        require_class(self.meta.as_ref(), class)
    }

    /// Feature descriptor of a live object's feature
    ///
    /// # Errors
    /// * `UnknownFeature` - If the class does not declare `feature`
    pub fn feature_of(&self, id: ObjectId, feature: FeatureId) -> Result<&FeatureDescriptor> {
        require_feature(self.class_of(id)?, feature)
    }

    /// Register an observer on one object
    ///
    /// # Errors
    /// * `ObjectNotFound` - If the handle is stale
    pub fn add_observer(&mut self, id: ObjectId, observer: Rc<dyn Observer>) -> Result<()> {
        self.get_object_mut(id)?.observers.push(observer);
        Ok(())
    }

    /// Remove a previously registered observer (matched by pointer)
    ///
    /// # Errors
    /// * `ObjectNotFound` - If the handle is stale
    pub fn remove_observer(&mut self, id: ObjectId, observer: &Rc<dyn Observer>) -> Result<bool> {
        let object = self.get_object_mut(id)?;
        let before = object.observers.len();
        object.observers.retain(|o| !Rc::ptr_eq(o, observer));
        Ok(object.observers.len() != before)
    }

    /// Toggle delivery to an object's observers
    ///
    /// # Errors
    /// * `ObjectNotFound` - If the handle is stale
    pub fn set_deliver(&mut self, id: ObjectId, deliver: bool) -> Result<()> {
        self.get_object_mut(id)?.deliver = deliver;
        Ok(())
    }

    pub fn add_batch_observer(&mut self, observer: Rc<dyn BatchObserver>) {
        self.batch_observers.push(observer);
    }

    pub fn batch_observers(&self) -> &[Rc<dyn BatchObserver>] {
        &self.batch_observers
    }

    /// Allocate a fresh object of `class`, reusing a freed slot if any
    pub(crate) fn alloc(&mut self, class: ClassId) -> Result<ObjectId> {
        let meta = self.metadata();
        let descriptor = require_class(meta.as_ref(), class)?;

        let id = match self.free.pop() {
            Some(index) => ObjectId::new(index, self.generations[index as usize]),
            None => {
                let index = self.objects.len() as u32;
                self.objects.push(None);
                self.generations.push(0);
                ObjectId::new(index, 0)
            }
        };
        self.objects[id.index()] = Some(StructuralObject::new(id, descriptor));
        Ok(id)
    }

    /// Release an object's slot and invalidate its handle
    pub(crate) fn release(&mut self, id: ObjectId) -> Result<()> {
        self.get_object(id)?;
        let index = id.index();
        self.objects[index] = None;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free.push(index as u32);
        Ok(())
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            objects: self.objects.clone(),
            generations: self.generations.clone(),
            free: self.free.clone(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.objects = snapshot.objects;
        self.generations = snapshot.generations;
        self.free = snapshot.free;
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("objects", &self.object_count())
            .field("free", &self.free.len())
            .field("batch_observers", &self.batch_observers.len())
            .finish()
    }
}
