use std::cell::RefCell;
use std::rc::Rc;

use gmlx_core_types::BatchId;

use crate::model::Notification;

/// Per-object change listener
///
/// Receives each record whose notifier is the object it was registered on,
/// in chain order. Errors inside an observer are the observer's concern.
pub trait Observer {
    fn notify_changed(&self, notification: &Notification);
}

impl<F> Observer for F
where
    F: Fn(&Notification),
{
    fn notify_changed(&self, notification: &Notification) {
        self(notification)
    }
}

/// Model-wide listener receiving each dispatched chain as one batch
pub trait BatchObserver {
    fn batch_dispatched(&self, batch_id: &BatchId, notifications: &[Notification]);
}

/// Observer that records what it is told
///
/// Clones share the same buffers, so a test can keep one clone and register
/// another.
#[derive(Debug, Clone, Default)]
pub struct ChangeRecorder {
    notifications: Rc<RefCell<Vec<Notification>>>,
    batches: Rc<RefCell<Vec<(BatchId, Vec<Notification>)>>>,
}

impl ChangeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records received through [`Observer`], in delivery order
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }

    /// Batches received through [`BatchObserver`]
    pub fn batches(&self) -> Vec<(BatchId, Vec<Notification>)> {
        self.batches.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.notifications.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.notifications.borrow_mut().clear();
        self.batches.borrow_mut().clear();
    }
}

impl Observer for ChangeRecorder {
    fn notify_changed(&self, notification: &Notification) {
        self.notifications.borrow_mut().push(notification.clone());
    }
}

impl BatchObserver for ChangeRecorder {
    fn batch_dispatched(&self, batch_id: &BatchId, notifications: &[Notification]) {
        self.batches
            .borrow_mut()
            .push((batch_id.clone(), notifications.to_vec()));
    }
}
