//! Spatial join of OCR boxes: each short subject label takes the day column
//! nearest horizontally and the time row nearest vertically.

use tracing::{debug, info};

use crate::core::config::TimetableConfig;
use crate::core::error::{FailureReason, ScanError};
use crate::core::geometry::BBox;
use crate::core::model::{Annotation, ClassEntry, TimeRange, Weekday};
use crate::parser::dedup::dedup_entries;
use crate::parser::normalize::normalize_label;

#[derive(Debug, Clone)]
struct DayToken {
    day: Weekday,
    bbox: BBox,
}

#[derive(Debug, Clone)]
struct TimeToken {
    range: TimeRange,
    bbox: BBox,
}

#[derive(Debug, Clone)]
struct SubjectToken {
    label: String,
    bbox: BBox,
}

#[derive(Debug, Default)]
struct Buckets {
    days: Vec<DayToken>,
    times: Vec<TimeToken>,
    subjects: Vec<SubjectToken>,
}

fn partition(annotations: &[Annotation], config: &TimetableConfig) -> Buckets {
    let mut buckets = Buckets::default();

    for annotation in annotations {
        let label = normalize_label(&annotation.label);
        let bbox = annotation.box_2d;

        if let Some(day) = config.weekdays.resolve(&label) {
            buckets.days.push(DayToken { day, bbox });
        } else if let Some(range) = config.slots.lookup(&label) {
            buckets.times.push(TimeToken { range, bbox });
        } else if is_subject_candidate(&label, config) {
            buckets.subjects.push(SubjectToken { label, bbox });
        } else {
            debug!(label = %label, "ignoring annotation");
        }
    }

    buckets
}

fn is_subject_candidate(label: &str, config: &TimetableConfig) -> bool {
    config.subject_len.admits(label) && !label.contains(':') && !label.contains('(')
}

/// First item with the smallest distance; later ties never replace it.
fn nearest<T>(items: &[T], distance: impl Fn(&T) -> f32) -> Option<&T> {
    let mut best: Option<(&T, f32)> = None;
    for item in items {
        let d = distance(item);
        if d.is_nan() {
            continue;
        }
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((item, d)),
        }
    }
    best.map(|(item, _)| item)
}

fn join(buckets: &Buckets) -> Vec<ClassEntry> {
    let entries = buckets
        .subjects
        .iter()
        .filter_map(|subject| {
            let time = nearest(&buckets.times, |t| t.bbox.vertical_distance(&subject.bbox))?;
            let day = nearest(&buckets.days, |d| d.bbox.horizontal_distance(&subject.bbox))?;
            Some(ClassEntry::new(day.day, time.range, subject.label.clone()))
        })
        .collect();
    dedup_entries(entries)
}

/// Matches subject boxes to day and time boxes. Unmatched subjects are dropped.
pub fn match_annotations(annotations: &[Annotation], config: &TimetableConfig) -> Vec<ClassEntry> {
    join(&partition(annotations, config))
}

/// [`match_annotations`] plus the empty-result failure policy.
pub fn parse_annotations(
    annotations: &[Annotation],
    config: &TimetableConfig,
) -> Result<Vec<ClassEntry>, ScanError> {
    let buckets = partition(annotations, config);
    debug!(
        days = buckets.days.len(),
        times = buckets.times.len(),
        subjects = buckets.subjects.len(),
        "partitioned annotations"
    );

    if buckets.days.is_empty() {
        return Err(ScanError::parsing_failed(FailureReason::NoDays, None));
    }
    if buckets.times.is_empty() {
        return Err(ScanError::parsing_failed(FailureReason::NoTimeSlots, None));
    }

    let entries = join(&buckets);
    if entries.is_empty() {
        return Err(ScanError::parsing_failed(FailureReason::NoEntries, None));
    }

    info!(entries = entries.len(), "matched annotations to schedule");
    Ok(entries)
}
