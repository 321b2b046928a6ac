//! Sequential scan of recognized text laid out as
//! `<day headers> <slot line> <one subject per day> <slot line> ...`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::core::config::TimetableConfig;
use crate::core::error::{FailureReason, ScanError};
use crate::core::model::{ClassEntry, TimeRange, Weekday};
use crate::parser::dedup::dedup_entries;
use crate::parser::normalize::normalize_label;

static SLOT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Letters may touch the range ("09:35AM"), digits may not.
    Regex::new(r"(?:^|[^0-9])([0-9]{2}):([0-9]{2})\s*-\s*([0-9]{2}):([0-9]{2})(?:[^0-9]|$)")
        .expect("slot pattern compiles")
});

#[derive(Debug, Clone)]
struct SlotLine {
    index: usize,
    /// `None` when the line has the slot shape but impossible clock values.
    time: Option<TimeRange>,
}

#[derive(Debug, Default)]
struct TextLayout {
    lines: Vec<String>,
    days: Vec<Weekday>,
    slots: Vec<SlotLine>,
}

impl TextLayout {
    fn read(full_text: &str, config: &TimetableConfig) -> Self {
        let lines: Vec<String> = full_text
            .lines()
            .map(normalize_label)
            .filter(|line| !line.is_empty() && !line.eq_ignore_ascii_case("time"))
            .collect();

        let mut days = Vec::new();
        let mut slots = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            if let Some(day) = config.weekdays.resolve(line) {
                if !days.contains(&day) {
                    days.push(day);
                }
            } else if let Some(time) = find_slot(line) {
                slots.push(SlotLine { index, time });
            }
        }

        Self { lines, days, slots }
    }

    fn entries(&self) -> Vec<ClassEntry> {
        let mut entries = Vec::new();

        for (n, slot) in self.slots.iter().enumerate() {
            let end = self
                .slots
                .get(n + 1)
                .map_or(self.lines.len(), |next| next.index);
            let Some(time) = slot.time else {
                debug!(line = %self.lines[slot.index], "skipping slot with invalid clock values");
                continue;
            };

            let subjects = self.lines[slot.index + 1..end]
                .iter()
                .filter(|line| !is_excluded(line));
            for (day, subject) in self.days.iter().zip(subjects) {
                entries.push(ClassEntry::new(*day, time, subject.clone()));
            }
        }

        dedup_entries(entries)
    }
}

/// Finds a `HH:MM-HH:MM` token anywhere in the line.
///
/// Outer `None`: no slot token. Inner `None`: a slot token whose clock values
/// are out of range.
fn find_slot(line: &str) -> Option<Option<TimeRange>> {
    let caps = SLOT_PATTERN.captures(line)?;
    let field = |i: usize| caps[i].parse::<u32>().ok();
    Some(
        field(1)
            .zip(field(2))
            .zip(field(3).zip(field(4)))
            .and_then(|((sh, sm), (eh, em))| TimeRange::from_clock(sh, sm, eh, em)),
    )
}

fn is_excluded(line: &str) -> bool {
    Weekday::from_name(line).is_some() || line.eq_ignore_ascii_case("lunch")
}

/// Builds entries from line-oriented text. Never fails; may return nothing.
pub fn scan_lines(full_text: &str, config: &TimetableConfig) -> Vec<ClassEntry> {
    TextLayout::read(full_text, config).entries()
}

/// [`scan_lines`] plus the empty-result failure policy. Failures carry the
/// original text so it can be corrected and resubmitted.
pub fn parse_text(full_text: &str, config: &TimetableConfig) -> Result<Vec<ClassEntry>, ScanError> {
    let layout = TextLayout::read(full_text, config);
    debug!(
        lines = layout.lines.len(),
        days = layout.days.len(),
        slots = layout.slots.len(),
        "read text layout"
    );

    if layout.days.is_empty() {
        return Err(ScanError::parsing_failed(FailureReason::NoDays, Some(full_text)));
    }
    if layout.slots.is_empty() {
        return Err(ScanError::parsing_failed(
            FailureReason::NoTimeSlots,
            Some(full_text),
        ));
    }

    let entries = layout.entries();
    if entries.is_empty() {
        return Err(ScanError::parsing_failed(FailureReason::NoEntries, Some(full_text)));
    }

    info!(entries = entries.len(), "parsed timetable text");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(s: &str) -> TimeRange {
        s.parse().unwrap()
    }

    #[test]
    fn assigns_subjects_to_day_columns_in_order() {
        let text = "Monday\nTuesday\n08:30-09:35\nMath\nPhysics\n09:35-10:40\nLunch\nChem";
        let entries = parse_text(text, &TimetableConfig::default()).unwrap();
        assert_eq!(
            entries,
            vec![
                ClassEntry::new(Weekday::Monday, range("08:30-09:35"), "Math"),
                ClassEntry::new(Weekday::Tuesday, range("08:30-09:35"), "Physics"),
                ClassEntry::new(Weekday::Monday, range("09:35-10:40"), "Chem"),
            ]
        );
        assert!(entries.iter().all(|e| e.time.to_string().contains(" - ")));
    }

    #[test]
    fn only_lines_strictly_between_slots_belong_to_a_slot() {
        let text = "Time\nMonday\nTuesday\nWednesday\n\
                    08:30-09:35\nA1\nFriday\nLUNCH\nB1\n\
                    09:35-10:40\nC1";
        let entries = scan_lines(text, &TimetableConfig::default());
        let first: Vec<_> = entries
            .iter()
            .filter(|e| e.time == range("08:30-09:35"))
            .map(|e| (e.day, e.subject.as_str()))
            .collect();
        assert_eq!(first, vec![(Weekday::Monday, "A1"), (Weekday::Tuesday, "B1")]);

        let second: Vec<_> = entries
            .iter()
            .filter(|e| e.time == range("09:35-10:40"))
            .map(|e| (e.day, e.subject.as_str()))
            .collect();
        assert_eq!(second, vec![(Weekday::Monday, "C1")]);
    }

    #[test]
    fn extra_subject_lines_are_dropped() {
        let text = "Monday\n10:40-11:45\nA\nB\nC";
        let entries = scan_lines(text, &TimetableConfig::default());
        assert_eq!(
            entries,
            vec![ClassEntry::new(Weekday::Monday, range("10:40-11:45"), "A")]
        );
    }

    #[test]
    fn finds_slot_anywhere_in_line() {
        let text = "Monday\nPeriod 1 08:30 - 09:35 (theory)\nOS";
        let entries = scan_lines(text, &TimetableConfig::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].time.to_string(), "08:30 - 09:35");
    }

    #[test]
    fn letters_glued_to_the_range_still_mark_a_slot() {
        for text in [
            "Monday\n08:30-09:35AM\nMath",
            "Monday\n08:30-09:35hrs\nMath",
            "Monday\nSlot1:08:30-09:35\nMath",
        ] {
            let entries = scan_lines(text, &TimetableConfig::default());
            assert_eq!(
                entries,
                vec![ClassEntry::new(Weekday::Monday, range("08:30-09:35"), "Math")],
                "{text}"
            );
        }
    }

    #[test]
    fn invalid_clock_values_delimit_but_produce_nothing() {
        let text = "Monday\n08:30-09:35\nA\n25:00-26:00\nB\n09:35-10:40\nC";
        let entries = scan_lines(text, &TimetableConfig::default());
        let subjects: Vec<_> = entries.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, vec!["A", "C"]);
    }

    #[test]
    fn ignores_digits_glued_to_the_pattern() {
        assert!(find_slot("108:30-09:35").is_none());
        assert!(find_slot("8:30-9:35").is_none());
        assert!(find_slot("08:30-09:355").is_none());
        assert_eq!(find_slot("08:30-09:35"), Some(Some(range("08:30-09:35"))));
    }

    #[test]
    fn repeated_headers_do_not_shift_columns() {
        let text = "Monday\nTuesday\nMonday\n08:30-09:35\nX1\nY1";
        let entries = scan_lines(text, &TimetableConfig::default());
        let days: Vec<_> = entries.iter().map(|e| e.day).collect();
        assert_eq!(days, vec![Weekday::Monday, Weekday::Tuesday]);
    }

    #[test]
    fn every_day_comes_from_detected_headers() {
        let text = "Wednesday\nFriday\n08:30-09:35\nA\nB\nC\n09:35-10:40\nD\nE";
        let entries = scan_lines(text, &TimetableConfig::default());
        assert!(entries
            .iter()
            .all(|e| matches!(e.day, Weekday::Wednesday | Weekday::Friday)));
    }

    #[test]
    fn missing_headers_fail_with_raw_text() {
        let text = "08:30-09:35\nMath";
        let err = parse_text(text, &TimetableConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ScanError::ParsingFailed { reason: FailureReason::NoDays, .. }
        ));
        assert_eq!(err.raw_text(), Some(text));
    }

    #[test]
    fn missing_slots_fail() {
        let err = parse_text("Monday\nMath", &TimetableConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ScanError::ParsingFailed { reason: FailureReason::NoTimeSlots, .. }
        ));
    }

    #[test]
    fn slots_without_subjects_fail() {
        let err = parse_text("Monday\n08:30-09:35\nLunch", &TimetableConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ScanError::ParsingFailed { reason: FailureReason::NoEntries, .. }
        ));
    }
}
