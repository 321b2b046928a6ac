use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::ScheduleDocument;
use crate::export::Exporter;

#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for JsonExporter {
    fn render(&self, document: &ScheduleDocument) -> Result<String> {
        Ok(serde_json::to_string_pretty(document)?)
    }

    fn export(&self, document: &ScheduleDocument) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join("schedule.json");
        fs::write(&path, self.render(document)?)?;
        Ok(path)
    }
}
