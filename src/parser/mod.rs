pub mod coordinate;
pub mod dedup;
pub mod lines;
pub mod normalize;

pub use coordinate::{match_annotations, parse_annotations};
pub use dedup::dedup_entries;
pub use lines::{parse_text, scan_lines};

use crate::core::config::TimetableConfig;
use crate::core::error::ScanError;
use crate::core::model::{ClassEntry, OcrResult};

pub trait ScheduleParser {
    fn parse(&self, result: &OcrResult) -> Result<Vec<ClassEntry>, ScanError>;
}

/// Routes annotations to the coordinate matcher and plain text to the line
/// scanner.
#[derive(Debug, Clone, Default)]
pub struct HeuristicScheduleParser {
    config: TimetableConfig,
}

impl HeuristicScheduleParser {
    pub fn new(config: TimetableConfig) -> Self {
        Self { config }
    }
}

impl ScheduleParser for HeuristicScheduleParser {
    fn parse(&self, result: &OcrResult) -> Result<Vec<ClassEntry>, ScanError> {
        parse_result(result, &self.config)
    }
}

pub fn parse_result(result: &OcrResult, config: &TimetableConfig) -> Result<Vec<ClassEntry>, ScanError> {
    match result {
        OcrResult::Annotations { annotations } => parse_annotations(annotations, config),
        OcrResult::Text { full_text } => parse_text(full_text, config),
    }
}
