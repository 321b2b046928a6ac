use chrono::Utc;
use tracing::info;

use crate::core::model::{ClassEntry, ScanSource, ScheduleDocument};
use crate::parser::dedup::dedup_entries;
use crate::store::{ScheduleStore, StoreError, UserId};

/// Persists freshly parsed schedules as whole-document overwrites.
#[derive(Debug)]
pub struct ScheduleWriter<S> {
    store: S,
}

impl<S: ScheduleStore> ScheduleWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Deduplicates, orders by (day, start time) and replaces the user's
    /// document. An empty schedule is refused; use [`Self::clear`].
    pub fn save(
        &self,
        user: &UserId,
        entries: Vec<ClassEntry>,
        source: Option<ScanSource>,
    ) -> Result<ScheduleDocument, StoreError> {
        let mut schedule = dedup_entries(entries);
        if schedule.is_empty() {
            return Err(StoreError::EmptySchedule);
        }
        schedule.sort_by_key(|entry| (entry.day, entry.time));

        let document = ScheduleDocument {
            schedule,
            updated_at: Some(Utc::now()),
            source,
        };
        self.store.put(user, &document)?;
        info!(user = %user, entries = document.schedule.len(), "saved schedule");
        Ok(document)
    }

    /// Explicitly removes the user's schedule.
    pub fn clear(&self, user: &UserId) -> Result<(), StoreError> {
        self.store.delete(user)?;
        info!(user = %user, "cleared schedule");
        Ok(())
    }
}
