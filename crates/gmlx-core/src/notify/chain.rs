use gmlx_core_types::BatchId;

use crate::model::Notification;
use crate::ops::Store;

/// Ordered accumulator of notification records
///
/// Every mutation appends to a chain instead of notifying directly. The
/// outermost call dispatches the chain once, so observers never see a
/// cascading change half-applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationChain {
    records: Vec<Notification>,
}

impl NotificationChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, notification: Notification) {
        self.records.push(notification);
    }

    pub fn extend(&mut self, other: NotificationChain) {
        self.records.extend(other.records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Notification] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Notification> {
        self.records
    }

    /// Deliver the chain
    ///
    /// Each record goes to the observers of its notifier, in append order,
    /// when the notifier is still alive and has delivery enabled. The whole
    /// chain then goes to the store's batch observers as one slice. Returns
    /// the batch ID, or `None` when nothing was dispatched.
    pub fn dispatch(self, store: &Store) -> Option<BatchId> {
        if self.records.is_empty() || !store.config().deliver_notifications {
            return None;
        }

        let batch_id = BatchId::new();
        tracing::debug!(
            component = module_path!(),
            op = "dispatch",
            batch_id = %batch_id,
            batch_len = self.records.len(),
            "dispatching notification batch"
        );

        for record in &self.records {
            let Ok(subject) = store.get_object(record.notifier) else {
                continue;
            };
            if !subject.deliver {
                continue;
            }
            for observer in &subject.observers {
                observer.notify_changed(record);
            }
        }

        for observer in store.batch_observers() {
            observer.batch_dispatched(&batch_id, &self.records);
        }

        Some(batch_id)
    }
}

impl From<Vec<Notification>> for NotificationChain {
    fn from(records: Vec<Notification>) -> Self {
        Self { records }
    }
}
