use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, info_span, warn};

use crate::core::config::TimetableConfig;
use crate::core::error::ScanError;
use crate::core::model::{ClassEntry, OcrResult, ScanSource, ScheduleDocument};
use crate::export::{Exporter, JsonExporter, MarkdownExporter, TextExporter};
use crate::ocr::{adapt_text, recognize_result, OcrEngine};
use crate::parser::{HeuristicScheduleParser, ScheduleParser};
use crate::store::{ScheduleStore, ScheduleWriter, UserId};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub store_root: PathBuf,
    pub timetable: TimetableConfig,
}

impl PipelineConfig {
    pub fn new(store_root: PathBuf, timetable: TimetableConfig) -> Self {
        Self {
            store_root,
            timetable,
        }
    }
}

/// Image → OCR → parse → save, one sequential flow per scan. Nothing is
/// written unless every earlier stage succeeded.
pub struct ScanPipeline<E, S> {
    engine: E,
    writer: ScheduleWriter<S>,
    parser: HeuristicScheduleParser,
}

impl<E: OcrEngine, S: ScheduleStore> ScanPipeline<E, S> {
    pub fn new(engine: E, store: S, config: TimetableConfig) -> Self {
        Self {
            engine,
            writer: ScheduleWriter::new(store),
            parser: HeuristicScheduleParser::new(config),
        }
    }

    /// Parses an image without touching the store.
    pub fn preview(&self, image: &Path) -> Result<(OcrResult, Vec<ClassEntry>), ScanError> {
        let result = recognize_result(&self.engine, image)?;
        let entries = self.parser.parse(&result)?;
        Ok((result, entries))
    }

    pub fn scan(&self, user: &UserId, image: &Path) -> Result<ScheduleDocument, ScanError> {
        let _span = info_span!("scan", user = %user, image = %image.display()).entered();

        let (result, entries) = self.preview(image).inspect_err(|err| {
            warn!(error = %err, "scan produced no schedule; stored schedule left unchanged");
        })?;
        info!(source = ?result.source(), entries = entries.len(), "parsed timetable");

        Ok(self.writer.save(user, entries, Some(result.source()))?)
    }

    /// Saves user-corrected text from a failed scan.
    pub fn resubmit_text(&self, user: &UserId, text: &str) -> Result<ScheduleDocument, ScanError> {
        let _span = info_span!("resubmit", user = %user).entered();
        let result = adapt_text(text)?;
        let entries = self.parser.parse(&result)?;
        Ok(self.writer.save(user, entries, Some(ScanSource::Text))?)
    }
}

/// Writes every export format for a document into `output`.
pub fn export_document(document: &ScheduleDocument, output: &Path) -> Result<Vec<PathBuf>> {
    let exporters: [Box<dyn Exporter>; 3] = [
        Box::new(JsonExporter::new(output.to_path_buf())),
        Box::new(TextExporter::new(output.to_path_buf())),
        Box::new(MarkdownExporter::new(output.to_path_buf())),
    ];
    exporters
        .iter()
        .map(|exporter| exporter.export(document))
        .collect()
}
