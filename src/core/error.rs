use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

/// Why a parser produced nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    NoDays,
    NoTimeSlots,
    NoEntries,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::NoDays => "no weekday headers were recognized",
            FailureReason::NoTimeSlots => "no time slots were recognized",
            FailureReason::NoEntries => "no classes could be matched to a day and time",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("no text detected in the image")]
    NoTextDetected,

    #[error("could not read a timetable: {reason}")]
    ParsingFailed {
        reason: FailureReason,
        /// Recognized text handed back for manual correction.
        raw_text: Option<String>,
    },

    #[error("scan cancelled")]
    Cancelled,

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("saving the schedule failed: {0}")]
    Storage(#[from] StoreError),
}

impl ScanError {
    pub fn parsing_failed(reason: FailureReason, raw_text: Option<&str>) -> Self {
        ScanError::ParsingFailed {
            reason,
            raw_text: raw_text.map(str::to_string),
        }
    }

    /// Single message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ScanError::NoTextDetected => {
                "No text was found in the photo. Try again with a sharper, well-lit image."
                    .to_string()
            }
            ScanError::ParsingFailed { reason, raw_text } => {
                let mut message = format!(
                    "Couldn't read a timetable ({reason}). Try a clearer photo of the whole grid"
                );
                if raw_text.is_some() {
                    message.push_str(", or correct the recognized text and resubmit it");
                }
                message.push('.');
                message
            }
            ScanError::Cancelled => "Scan cancelled. Your saved schedule was not changed.".to_string(),
            ScanError::Engine(_) => {
                "Text recognition is unavailable right now. Please try again.".to_string()
            }
            ScanError::Storage(_) => {
                "Your schedule could not be saved. Your previous schedule is unchanged; please retry."
                    .to_string()
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ScanError::Storage(_) | ScanError::Engine(_))
    }

    pub fn raw_text(&self) -> Option<&str> {
        match self {
            ScanError::ParsingFailed { raw_text, .. } => raw_text.as_deref(),
            _ => None,
        }
    }
}
