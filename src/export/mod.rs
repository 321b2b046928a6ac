pub mod json_export;
pub mod markdown_export;
pub mod text_export;

use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::ScheduleDocument;

pub use json_export::JsonExporter;
pub use markdown_export::MarkdownExporter;
pub use text_export::TextExporter;

pub trait Exporter {
    /// Renders the document in this exporter's format.
    fn render(&self, document: &ScheduleDocument) -> Result<String>;

    /// Writes the rendering under the exporter's directory and returns the path.
    fn export(&self, document: &ScheduleDocument) -> Result<PathBuf>;
}
