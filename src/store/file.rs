use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::core::model::ScheduleDocument;
use crate::store::{ScheduleStore, StoreError, Subscribers, UserId};

/// One `<user>.json` document per user under `root`.
///
/// Writes land in a temp file beside the target and are renamed over it, so
/// a failed write leaves the previous document as it was.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    subscribers: Subscribers,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            subscribers: Subscribers::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, user: &UserId) -> Result<PathBuf, StoreError> {
        let id = user.as_str();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidUser(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.json")))
    }
}

impl ScheduleStore for JsonFileStore {
    fn get(&self, user: &UserId) -> Result<Option<ScheduleDocument>, StoreError> {
        let path = self.document_path(user)?;
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn put(&self, user: &UserId, document: &ScheduleDocument) -> Result<(), StoreError> {
        let path = self.document_path(user)?;
        fs::create_dir_all(&self.root)?;

        let tmp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, document)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|err| StoreError::Io(err.error))?;

        debug!(path = %path.display(), entries = document.schedule.len(), "wrote schedule");
        self.subscribers.notify(user, document);
        Ok(())
    }

    fn delete(&self, user: &UserId) -> Result<(), StoreError> {
        let path = self.document_path(user)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                self.subscribers.notify(user, &ScheduleDocument::default());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn subscribe(&self, user: &UserId) -> Receiver<ScheduleDocument> {
        self.subscribers.add(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ClassEntry, TimeRange, Weekday};
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    fn document() -> ScheduleDocument {
        ScheduleDocument {
            schedule: vec![ClassEntry::new(
                Weekday::Wednesday,
                TimeRange::from_clock(10, 40, 11, 45).unwrap(),
                "MATH",
            )],
            ..Default::default()
        }
    }

    #[test]
    fn round_trips_documents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path().join("schedules"));
        let user = UserId::new("student_42");

        assert!(store.get(&user)?.is_none());
        store.put(&user, &document())?;
        assert_eq!(store.get(&user)?, Some(document()));
        assert!(dir.path().join("schedules/student_42.json").exists());

        store.delete(&user)?;
        assert!(store.get(&user)?.is_none());
        store.delete(&user)?;
        Ok(())
    }

    #[test]
    fn leaves_no_temp_files_behind() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path().to_path_buf());
        store.put(&UserId::new("a"), &document())?;
        store.put(&UserId::new("a"), &document())?;
        let files: Vec<_> = fs::read_dir(dir.path())?.collect::<std::io::Result<_>>()?;
        assert_eq!(files.len(), 1);
        Ok(())
    }

    #[test]
    fn failed_rename_keeps_existing_documents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path().to_path_buf());
        let saved = UserId::new("saved");
        store.put(&saved, &document())?;

        // A non-empty directory in place of the target makes the rename fail.
        let blocked = UserId::new("blocked");
        fs::create_dir_all(dir.path().join("blocked.json/inner"))?;
        let err = store.put(&blocked, &document()).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        assert_eq!(store.get(&saved)?, Some(document()));
        let mut names: Vec<_> = fs::read_dir(dir.path())?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<_>>()?;
        names.sort();
        assert_eq!(names, vec!["blocked.json", "saved.json"]);
        Ok(())
    }

    #[test]
    fn rejects_path_like_user_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().to_path_buf());
        for id in ["../escape", "", "a/b"] {
            let err = store.put(&UserId::new(id), &document()).unwrap_err();
            assert!(matches!(err, StoreError::InvalidUser(_)));
        }
    }
}
