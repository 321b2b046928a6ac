use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::core::error::ScanError;
use crate::ocr::OcrEngine;

/// Exit status external OCR scripts use when the user aborted the capture.
const CANCELLED_STATUS: i32 = 130;

/// Runs an external OCR program and returns its stdout as the payload.
#[derive(Debug, Clone)]
pub struct CommandOcrEngine {
    program: String,
    script_path: PathBuf,
    lang: String,
}

impl CommandOcrEngine {
    pub fn new() -> Self {
        Self {
            program: "python3".to_string(),
            script_path: PathBuf::from("ocr/bridge/ocr_bridge.py"),
            lang: "eng".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_script(mut self, script_path: PathBuf) -> Self {
        self.script_path = script_path;
        self
    }

    pub fn with_lang(mut self, lang: String) -> Self {
        self.lang = lang;
        self
    }
}

impl Default for CommandOcrEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for CommandOcrEngine {
    fn recognize(&self, image: &Path) -> Result<String, ScanError> {
        if !image.is_file() {
            return Err(ScanError::Engine(format!(
                "image not found: {}",
                image.display()
            )));
        }

        debug!(program = %self.program, script = %self.script_path.display(), "invoking OCR bridge");
        let output = Command::new(&self.program)
            .arg(&self.script_path)
            .arg("--image")
            .arg(image)
            .arg("--lang")
            .arg(&self.lang)
            .output()
            .map_err(|err| ScanError::Engine(format!("failed to invoke {}: {err}", self.program)))?;

        if output.status.code() == Some(CANCELLED_STATUS) {
            return Err(ScanError::Cancelled);
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "OCR bridge failed");
            return Err(ScanError::Engine(format!("OCR bridge failed: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Replays a captured engine response stored on disk: the "image" path
/// points at the saved JSON or text payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedOcrEngine;

impl RecordedOcrEngine {
    pub fn new() -> Self {
        Self
    }
}

impl OcrEngine for RecordedOcrEngine {
    fn recognize(&self, image: &Path) -> Result<String, ScanError> {
        fs::read_to_string(image).map_err(|err| {
            ScanError::Engine(format!("failed to read recorded response {}: {err}", image.display()))
        })
    }
}
