use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::{ClassEntry, ScheduleDocument, ROOM_UNKNOWN};
use crate::export::Exporter;
use crate::store::group_by_day;

#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    fn format_entry(entry: &ClassEntry) -> String {
        if entry.room == ROOM_UNKNOWN {
            format!("{}  {}", entry.time, entry.subject)
        } else {
            format!("{}  {} ({})", entry.time, entry.subject, entry.room)
        }
    }
}

impl Exporter for TextExporter {
    fn render(&self, document: &ScheduleDocument) -> Result<String> {
        let grouped = group_by_day(&document.schedule);
        if grouped.is_empty() {
            return Ok("No classes scheduled.\n".to_string());
        }

        let mut text = String::new();
        for (day, entries) in grouped.iter() {
            text.push_str(&format!("=== {day} ===\n"));
            for entry in entries {
                text.push_str(&Self::format_entry(entry));
                text.push('\n');
            }
            text.push('\n');
        }
        Ok(text)
    }

    fn export(&self, document: &ScheduleDocument) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join("schedule.txt");
        fs::write(&path, self.render(document)?)?;
        Ok(path)
    }
}
