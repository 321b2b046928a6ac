pub mod core;
pub mod export;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod store;

pub use core::config::TimetableConfig;
pub use core::error::{FailureReason, ScanError};
pub use core::model::{Annotation, ClassEntry, OcrResult, ScheduleDocument, TimeRange, Weekday};
