use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::{ScheduleDocument, TimeRange, ROOM_UNKNOWN};
use crate::export::Exporter;
use crate::store::group_by_day;

/// Week grid: one column per scheduled day, one row per distinct period.
#[derive(Debug, Clone)]
pub struct MarkdownExporter {
    out_dir: PathBuf,
}

impl MarkdownExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl Exporter for MarkdownExporter {
    fn render(&self, document: &ScheduleDocument) -> Result<String> {
        let grouped = group_by_day(&document.schedule);
        let mut markdown = String::from("# Weekly Schedule\n\n");
        if grouped.is_empty() {
            markdown.push_str("_No classes scheduled._\n");
            return Ok(markdown);
        }

        let days: Vec<_> = grouped.iter().map(|(day, _)| day).collect();
        let periods: BTreeSet<TimeRange> = document.schedule.iter().map(|e| e.time).collect();

        markdown.push_str("| Time |");
        for day in &days {
            markdown.push_str(&format!(" {day} |"));
        }
        markdown.push_str("\n| --- |");
        markdown.push_str(&" --- |".repeat(days.len()));
        markdown.push('\n');

        for period in &periods {
            markdown.push_str(&format!("| {period} |"));
            for day in &days {
                let cell = grouped
                    .day(*day)
                    .iter()
                    .filter(|entry| entry.time == *period)
                    .map(|entry| {
                        let subject = Self::escape_cell(&entry.subject);
                        if entry.room == ROOM_UNKNOWN {
                            subject
                        } else {
                            format!("{subject} ({})", Self::escape_cell(&entry.room))
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("<br>");
                markdown.push_str(&format!(" {cell} |"));
            }
            markdown.push('\n');
        }

        Ok(markdown)
    }

    fn export(&self, document: &ScheduleDocument) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join("schedule.md");
        fs::write(&path, self.render(document)?)?;
        Ok(path)
    }
}
