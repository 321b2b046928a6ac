pub mod file;
pub mod grouping;
pub mod memory;
pub mod writer;

pub use file::JsonFileStore;
pub use grouping::{group_by_day, GroupedSchedule};
pub use memory::MemoryStore;
pub use writer::ScheduleWriter;

use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::core::model::ScheduleDocument;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("schedule serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("refusing to overwrite the schedule with an empty one")]
    EmptySchedule,

    #[error("invalid user id: {0:?}")]
    InvalidUser(String),
}

/// Opaque key of the schedule's owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keyed document store holding one schedule per user.
pub trait ScheduleStore: Send + Sync {
    fn get(&self, user: &UserId) -> Result<Option<ScheduleDocument>, StoreError>;

    /// Replaces the user's whole document.
    fn put(&self, user: &UserId, document: &ScheduleDocument) -> Result<(), StoreError>;

    fn delete(&self, user: &UserId) -> Result<(), StoreError>;

    /// Receives every document written for `user` after this call.
    /// Deletion is delivered as an empty document.
    fn subscribe(&self, user: &UserId) -> Receiver<ScheduleDocument>;
}

impl<S: ScheduleStore + ?Sized> ScheduleStore for &S {
    fn get(&self, user: &UserId) -> Result<Option<ScheduleDocument>, StoreError> {
        (**self).get(user)
    }

    fn put(&self, user: &UserId, document: &ScheduleDocument) -> Result<(), StoreError> {
        (**self).put(user, document)
    }

    fn delete(&self, user: &UserId) -> Result<(), StoreError> {
        (**self).delete(user)
    }

    fn subscribe(&self, user: &UserId) -> Receiver<ScheduleDocument> {
        (**self).subscribe(user)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Mutex<HashMap<UserId, Vec<Sender<ScheduleDocument>>>>,
}

impl Subscribers {
    pub(crate) fn add(&self, user: &UserId) -> Receiver<ScheduleDocument> {
        let (tx, rx) = mpsc::channel();
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user.clone())
            .or_default()
            .push(tx);
        rx
    }

    /// Sends to live subscribers and forgets dropped ones.
    pub(crate) fn notify(&self, user: &UserId, document: &ScheduleDocument) {
        let mut senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = senders.get_mut(user) {
            list.retain(|tx| tx.send(document.clone()).is_ok());
            if list.is_empty() {
                senders.remove(user);
            }
        }
    }
}
