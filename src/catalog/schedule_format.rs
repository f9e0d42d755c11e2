//! Compact schedule summaries for course cards.

use sea_orm::ActiveEnum;

use crate::entities::schedule;
use crate::entities::sea_orm_active_enums::DayOfWeek;

/// Shown whenever a course has no schedule rows.
pub const SCHEDULE_UNAVAILABLE: &str = "Schedule not available";

/// One meeting slot, already ordered by the query that produced it.
///
/// The day is kept as text: rows written by this service always hold a
/// known weekday, but imported data may not, and the card must render
/// either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

impl From<&schedule::Model> for ScheduleSlot {
    fn from(row: &schedule::Model) -> Self {
        Self {
            day: row.day_of_week.to_value(),
            start_time: row.start_time.clone(),
            end_time: row.end_time.clone(),
        }
    }
}

const DAY_ABBREVS: [(&str, &str); 7] = [
    ("monday", "Mon"),
    ("tuesday", "Tue"),
    ("wednesday", "Wed"),
    ("thursday", "Thu"),
    ("friday", "Fri"),
    ("saturday", "Sat"),
    ("sunday", "Sun"),
];

fn day_abbrev(day: &str) -> Option<&'static str> {
    DAY_ABBREVS
        .iter()
        .find(|(name, _)| day.eq_ignore_ascii_case(name))
        .map(|(_, abbrev)| *abbrev)
}

/// Week position for sorting slots, Monday first.
pub fn day_order(day: &DayOfWeek) -> u8 {
    match day {
        DayOfWeek::Monday => 0,
        DayOfWeek::Tuesday => 1,
        DayOfWeek::Wednesday => 2,
        DayOfWeek::Thursday => 3,
        DayOfWeek::Friday => 4,
        DayOfWeek::Saturday => 5,
        DayOfWeek::Sunday => 6,
    }
}

/// Formats meeting slots as `"Mon, Wed • 10:00-11:30"`.
///
/// Day names are abbreviated case-insensitively, deduplicated in
/// first-appearance order, and the time range is taken from the first
/// slot. A day string that is not a weekday passes through unchanged.
/// Courses whose slots meet at different times still summarize to a
/// single range on the card; the detail view lists every slot.
pub fn format_schedule(slots: &[ScheduleSlot]) -> String {
    let Some(first) = slots.first() else {
        return SCHEDULE_UNAVAILABLE.to_string();
    };

    let mut days: Vec<&str> = Vec::new();
    for slot in slots {
        let label = day_abbrev(&slot.day).unwrap_or(slot.day.as_str());
        if !days.contains(&label) {
            days.push(label);
        }
    }

    format!("{} \u{2022} {}-{}", days.join(", "), first.start_time, first.end_time)
}
