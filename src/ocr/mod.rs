pub mod adapter;
pub mod bridge;

pub use adapter::{adapt_payload, adapt_response, adapt_text};
pub use bridge::{CommandOcrEngine, RecordedOcrEngine};

use std::path::Path;

use crate::core::error::ScanError;
use crate::core::model::OcrResult;

/// Black-box text recognizer. Returns the engine's raw payload.
pub trait OcrEngine {
    fn recognize(&self, image: &Path) -> Result<String, ScanError>;
}

/// Recognizes an image and unwraps the payload into an [`OcrResult`].
pub fn recognize_result(engine: &dyn OcrEngine, image: &Path) -> Result<OcrResult, ScanError> {
    let payload = engine.recognize(image)?;
    adapt_payload(&payload)
}
