use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::core::error::ScanError;
use crate::core::geometry::BBox;
use crate::core::model::{Annotation, OcrResult};

#[derive(Debug, Deserialize)]
struct RawAnnotation {
    label: String,
    box_2d: [f32; 4],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisionResponse {
    #[serde(default)]
    full_text_annotation: Option<VisionFullText>,
    #[serde(default)]
    text_annotations: Vec<VisionWord>,
}

#[derive(Debug, Deserialize)]
struct VisionFullText {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisionWord {
    #[serde(default)]
    description: String,
    #[serde(default)]
    bounding_poly: Option<VisionPoly>,
}

#[derive(Debug, Deserialize)]
struct VisionPoly {
    #[serde(default)]
    vertices: Vec<VisionVertex>,
}

// Vision omits zero-valued coordinates.
#[derive(Debug, Deserialize)]
struct VisionVertex {
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
}

/// Unwraps an engine payload that may be JSON or bare recognized text.
pub fn adapt_payload(payload: &str) -> Result<OcrResult, ScanError> {
    match serde_json::from_str::<Value>(payload) {
        Ok(value @ (Value::Array(_) | Value::Object(_))) => adapt_response(&value),
        _ => adapt_text(payload),
    }
}

pub fn adapt_text(text: &str) -> Result<OcrResult, ScanError> {
    if text.trim().is_empty() {
        return Err(ScanError::NoTextDetected);
    }
    Ok(OcrResult::Text {
        full_text: text.to_string(),
    })
}

/// Detects which of the two result shapes a JSON response carries.
pub fn adapt_response(raw: &Value) -> Result<OcrResult, ScanError> {
    if raw.is_array() {
        return annotations_from(raw);
    }

    let full_text = ["fullText", "full_text"]
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_str));

    if let Some(list) = raw.get("annotations") {
        match annotations_from(list) {
            Err(ScanError::NoTextDetected) if full_text.is_some() => {
                debug!("annotation list empty, using full text");
            }
            outcome => return outcome,
        }
    }

    if let Some(text) = full_text {
        return adapt_text(text);
    }

    if let Some(status) = raw.get("error") {
        return Err(engine_status(status));
    }

    if let Some(first) = raw
        .get("responses")
        .and_then(Value::as_array)
        .and_then(|responses| responses.first())
    {
        return adapt_vision(first);
    }

    debug!("OCR response has no recognizable result shape");
    Err(ScanError::NoTextDetected)
}

/// Vision reports rejected requests (bad key, quota) as a status object.
fn engine_status(status: &Value) -> ScanError {
    let message = status
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unspecified error");
    match status.get("code").and_then(Value::as_i64) {
        Some(code) => ScanError::Engine(format!("OCR service error {code}: {message}")),
        None => ScanError::Engine(format!("OCR service error: {message}")),
    }
}

fn annotations_from(list: &Value) -> Result<OcrResult, ScanError> {
    let raw: Vec<RawAnnotation> = serde_json::from_value(list.clone())
        .map_err(|err| ScanError::Engine(format!("malformed annotation list: {err}")))?;
    finish_annotations(
        raw.into_iter()
            .map(|a| Annotation::new(a.label, BBox::from(a.box_2d)))
            .collect(),
    )
}

fn adapt_vision(response: &Value) -> Result<OcrResult, ScanError> {
    if let Some(status) = response.get("error") {
        return Err(engine_status(status));
    }
    let response: VisionResponse = serde_json::from_value(response.clone())
        .map_err(|err| ScanError::Engine(format!("malformed vision response: {err}")))?;

    if let Some(full) = response
        .full_text_annotation
        .filter(|full| !full.text.trim().is_empty())
    {
        return adapt_text(&full.text);
    }

    // The first entry summarizes the whole page when words follow it.
    let words = if response.text_annotations.len() > 1 {
        &response.text_annotations[1..]
    } else {
        &response.text_annotations[..]
    };

    let annotations = words
        .iter()
        .filter_map(|word| {
            let vertices: Vec<(f32, f32)> = word
                .bounding_poly
                .as_ref()?
                .vertices
                .iter()
                .map(|v| (v.x, v.y))
                .collect();
            let bbox = BBox::enclosing(&vertices)?;
            Some(Annotation::new(word.description.clone(), bbox))
        })
        .collect();
    finish_annotations(annotations)
}

fn finish_annotations(annotations: Vec<Annotation>) -> Result<OcrResult, ScanError> {
    let annotations: Vec<Annotation> = annotations
        .into_iter()
        .filter(|a| !a.label.trim().is_empty())
        .collect();
    if annotations.is_empty() {
        return Err(ScanError::NoTextDetected);
    }
    debug!(count = annotations.len(), "adapted annotation response");
    Ok(OcrResult::Annotations { annotations })
}
