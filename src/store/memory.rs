use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::{Mutex, PoisonError};

use crate::core::model::ScheduleDocument;
use crate::store::{ScheduleStore, StoreError, Subscribers, UserId};

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<UserId, ScheduleDocument>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScheduleStore for MemoryStore {
    fn get(&self, user: &UserId) -> Result<Option<ScheduleDocument>, StoreError> {
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(documents.get(user).cloned())
    }

    fn put(&self, user: &UserId, document: &ScheduleDocument) -> Result<(), StoreError> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.clone(), document.clone());
        self.subscribers.notify(user, document);
        Ok(())
    }

    fn delete(&self, user: &UserId) -> Result<(), StoreError> {
        let removed = self
            .documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(user);
        if removed.is_some() {
            self.subscribers.notify(user, &ScheduleDocument::default());
        }
        Ok(())
    }

    fn subscribe(&self, user: &UserId) -> Receiver<ScheduleDocument> {
        self.subscribers.add(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ClassEntry, TimeRange, Weekday};

    fn document(subject: &str) -> ScheduleDocument {
        ScheduleDocument {
            schedule: vec![ClassEntry::new(
                Weekday::Monday,
                TimeRange::from_clock(8, 30, 9, 35).unwrap(),
                subject,
            )],
            ..Default::default()
        }
    }

    #[test]
    fn put_overwrites_and_notifies() {
        let store = MemoryStore::new();
        let user = UserId::new("student-1");
        let updates = store.subscribe(&user);

        store.put(&user, &document("CS101")).unwrap();
        store.put(&user, &document("EE201")).unwrap();

        let stored = store.get(&user).unwrap().unwrap();
        assert_eq!(stored.schedule.len(), 1);
        assert_eq!(stored.schedule[0].subject, "EE201");
        assert_eq!(updates.try_recv().unwrap().schedule[0].subject, "CS101");
        assert_eq!(updates.try_recv().unwrap().schedule[0].subject, "EE201");
    }

    #[test]
    fn users_are_isolated() {
        let store = MemoryStore::new();
        store.put(&UserId::new("a"), &document("CS101")).unwrap();
        assert!(store.get(&UserId::new("b")).unwrap().is_none());
    }

    #[test]
    fn delete_publishes_empty_document() {
        let store = MemoryStore::new();
        let user = UserId::new("a");
        store.put(&user, &document("CS101")).unwrap();
        let updates = store.subscribe(&user);
        store.delete(&user).unwrap();
        assert!(store.get(&user).unwrap().is_none());
        assert!(updates.try_recv().unwrap().schedule.is_empty());
    }
}
