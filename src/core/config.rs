use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::model::{TimeRange, Weekday};

/// Ordered closed set of day names the parsers accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdayVocabulary(Vec<Weekday>);

impl WeekdayVocabulary {
    pub fn new(days: Vec<Weekday>) -> Self {
        Self(days)
    }

    /// Resolves a normalized label to a weekday in this vocabulary.
    pub fn resolve(&self, label: &str) -> Option<Weekday> {
        Weekday::from_name(label).filter(|day| self.0.contains(day))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    pub fn days(&self) -> &[Weekday] {
        &self.0
    }
}

impl Default for WeekdayVocabulary {
    fn default() -> Self {
        Self(Weekday::ALL[..5].to_vec())
    }
}

/// Bell schedule: slot start label (`"08:30"`) to its full period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotRegistry(BTreeMap<String, TimeRange>);

impl SlotRegistry {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Registers each range under its own start label.
    pub fn from_ranges(ranges: impl IntoIterator<Item = TimeRange>) -> Self {
        Self(
            ranges
                .into_iter()
                .map(|range| (range.start_label(), range))
                .collect(),
        )
    }

    pub fn insert(&mut self, label: impl Into<String>, range: TimeRange) {
        self.0.insert(label.into(), range);
    }

    pub fn lookup(&self, label: &str) -> Option<TimeRange> {
        self.0.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SlotRegistry {
    fn default() -> Self {
        const PERIODS: [(u32, u32, u32, u32); 7] = [
            (8, 30, 9, 35),
            (9, 35, 10, 40),
            (10, 40, 11, 45),
            (11, 45, 12, 50),
            (13, 30, 14, 35),
            (14, 35, 15, 40),
            (15, 40, 16, 45),
        ];
        Self::from_ranges(
            PERIODS
                .iter()
                .filter_map(|&(sh, sm, eh, em)| TimeRange::from_clock(sh, sm, eh, em)),
        )
    }
}

/// Accepted character count for subject labels in the coordinate matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectLength {
    pub min: usize,
    pub max: usize,
}

impl SubjectLength {
    pub fn admits(&self, label: &str) -> bool {
        let len = label.chars().count();
        len >= self.min && len <= self.max
    }
}

impl Default for SubjectLength {
    fn default() -> Self {
        Self { min: 2, max: 6 }
    }
}

/// Institution-specific tables the parsers are run against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableConfig {
    pub weekdays: WeekdayVocabulary,
    pub slots: SlotRegistry,
    pub subject_len: SubjectLength,
}

impl TimetableConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: TimetableConfig = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        if config.weekdays.days().is_empty() {
            anyhow::bail!("config {} lists no weekdays", path.display());
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }
}
