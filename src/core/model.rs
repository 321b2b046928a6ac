use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::geometry::BBox;

/// Room value used when the input carries no room information.
pub const ROOM_UNKNOWN: &str = "N/A";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Exact, case-sensitive lookup by English name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.name() == name)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time range '{0}', expected HH:MM - HH:MM")]
pub struct TimeRangeError(pub String);

/// A class period. Displays and serializes as `"HH:MM - HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Builds a range from clock fields, `None` when any field is out of range.
    pub fn from_clock(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> Option<Self> {
        let start = NaiveTime::from_hms_opt(start_h, start_m, 0)?;
        let end = NaiveTime::from_hms_opt(end_h, end_m, 0)?;
        Some(Self::new(start, end))
    }

    /// Start time as `HH:MM`, the key used by the slot registry.
    pub fn start_label(&self) -> String {
        self.start.format("%H:%M").to_string()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

impl FromStr for TimeRange {
    type Err = TimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimeRangeError(s.to_string());
        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| invalid())?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| invalid())?;
        Ok(Self::new(start, end))
    }
}

impl TryFrom<String> for TimeRange {
    type Error = TimeRangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeRange> for String {
    fn from(range: TimeRange) -> Self {
        range.to_string()
    }
}

/// One scheduled class occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassEntry {
    pub day: Weekday,
    pub time: TimeRange,
    pub subject: String,
    pub room: String,
}

impl ClassEntry {
    pub fn new(day: Weekday, time: TimeRange, subject: impl Into<String>) -> Self {
        Self {
            day,
            time,
            subject: subject.into(),
            room: ROOM_UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanSource {
    Annotations,
    Text,
}

/// The per-user persisted schedule. Replaced wholesale on every save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    pub schedule: Vec<ClassEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ScanSource>,
}

/// A labeled box reported by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub label: String,
    pub box_2d: BBox,
}

impl Annotation {
    pub fn new(label: impl Into<String>, box_2d: BBox) -> Self {
        Self {
            label: label.into(),
            box_2d,
        }
    }
}

/// OCR output after unwrapping the engine envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum OcrResult {
    Text { full_text: String },
    Annotations { annotations: Vec<Annotation> },
}

impl OcrResult {
    pub fn source(&self) -> ScanSource {
        match self {
            OcrResult::Text { .. } => ScanSource::Text,
            OcrResult::Annotations { .. } => ScanSource::Annotations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn time_range_uses_spaced_canonical_form() {
        let range: TimeRange = "08:30-09:35".parse().unwrap();
        assert_eq!(range.to_string(), "08:30 - 09:35");
        assert_eq!(range.start_label(), "08:30");
        assert_eq!("08:30 - 09:35".parse::<TimeRange>().unwrap(), range);
    }

    #[test]
    fn rejects_out_of_range_clock_values() {
        assert!("25:00 - 26:00".parse::<TimeRange>().is_err());
        assert!("lunch".parse::<TimeRange>().is_err());
        assert_eq!(TimeRange::from_clock(8, 60, 9, 0), None);
    }

    #[test]
    fn ranges_order_by_start_time() {
        let early = TimeRange::from_clock(8, 30, 9, 35).unwrap();
        let late = TimeRange::from_clock(13, 30, 14, 35).unwrap();
        assert!(early < late);
        assert!(early.to_string() < late.to_string());
    }

    #[test]
    fn weekday_lookup_is_exact() {
        assert_eq!(Weekday::from_name("Monday"), Some(Weekday::Monday));
        assert_eq!(Weekday::from_name("monday"), None);
        assert_eq!(Weekday::from_name("Mon"), None);
    }

    #[test]
    fn entry_serializes_to_document_shape() {
        let entry = ClassEntry::new(
            Weekday::Monday,
            TimeRange::from_clock(8, 30, 9, 35).unwrap(),
            "CS101",
        );
        let document = ScheduleDocument {
            schedule: vec![entry],
            ..Default::default()
        };
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "schedule": [{
                    "day": "Monday",
                    "time": "08:30 - 09:35",
                    "subject": "CS101",
                    "room": "N/A"
                }]
            })
        );
        let back: ScheduleDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, document);
    }
}
