use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::model::{ClassEntry, Weekday};

/// Entries bucketed by weekday (Monday first), each day sorted by start time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupedSchedule {
    days: BTreeMap<Weekday, Vec<ClassEntry>>,
}

impl GroupedSchedule {
    pub fn day(&self, day: Weekday) -> &[ClassEntry] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[ClassEntry])> {
        self.days.iter().map(|(day, entries)| (*day, entries.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Stable: entries sharing a slot keep their input order.
pub fn group_by_day(entries: &[ClassEntry]) -> GroupedSchedule {
    let mut days: BTreeMap<Weekday, Vec<ClassEntry>> = BTreeMap::new();
    for entry in entries {
        days.entry(entry.day).or_default().push(entry.clone());
    }
    for list in days.values_mut() {
        list.sort_by_key(|entry| entry.time);
    }
    GroupedSchedule { days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::TimeRange;
    use pretty_assertions::assert_eq;

    fn entry(day: Weekday, time: &str, subject: &str) -> ClassEntry {
        ClassEntry::new(day, time.parse::<TimeRange>().unwrap(), subject)
    }

    #[test]
    fn groups_and_sorts_by_start_time() {
        let entries = vec![
            entry(Weekday::Tuesday, "13:30 - 14:35", "LAB"),
            entry(Weekday::Monday, "09:35 - 10:40", "PHY"),
            entry(Weekday::Tuesday, "08:30 - 09:35", "CHEM"),
            entry(Weekday::Monday, "08:30 - 09:35", "MATH"),
        ];
        let grouped = group_by_day(&entries);

        let order: Vec<_> = grouped
            .iter()
            .flat_map(|(day, list)| list.iter().map(move |e| (day, e.subject.as_str())))
            .collect();
        assert_eq!(
            order,
            vec![
                (Weekday::Monday, "MATH"),
                (Weekday::Monday, "PHY"),
                (Weekday::Tuesday, "CHEM"),
                (Weekday::Tuesday, "LAB"),
            ]
        );
        assert!(grouped.day(Weekday::Friday).is_empty());
    }

    #[test]
    fn grouping_is_independent_of_input_order() {
        let mut entries = vec![
            entry(Weekday::Friday, "10:40 - 11:45", "A"),
            entry(Weekday::Monday, "08:30 - 09:35", "B"),
            entry(Weekday::Friday, "08:30 - 09:35", "C"),
        ];
        let forward = group_by_day(&entries);
        entries.reverse();
        assert_eq!(group_by_day(&entries), forward);
    }
}
