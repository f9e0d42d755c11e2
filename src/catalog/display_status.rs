//! Per-viewer course status resolution.
//!
//! A course card never shows raw enrollment rows. It shows one status
//! resolved from the viewer's own enrollment (if any), the live
//! registered count and the course capacity. Resolution is an ordered
//! rule list; the first matching rule wins, so a student's own
//! enrollment always beats capacity and capacity always beats the
//! open fallback.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::sea_orm_active_enums::EnrollmentStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Registered,
    Waitlisted,
    Dropped,
    Closed,
    Open,
}

/// One resolution rule. Adding a status is one new variant plus one
/// line in [`RULES`].
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// The viewer's own enrollment row carries this status.
    OwnEnrollment(EnrollmentStatus, DisplayStatus),
    /// No own-enrollment rule matched and the course is at or over capacity.
    AtCapacity(DisplayStatus),
    /// Catch-all, must stay last.
    Otherwise(DisplayStatus),
}

const RULES: &[Rule] = &[
    Rule::OwnEnrollment(EnrollmentStatus::Registered, DisplayStatus::Registered),
    Rule::OwnEnrollment(EnrollmentStatus::Waitlisted, DisplayStatus::Waitlisted),
    Rule::OwnEnrollment(EnrollmentStatus::Dropped, DisplayStatus::Dropped),
    Rule::AtCapacity(DisplayStatus::Closed),
    Rule::Otherwise(DisplayStatus::Open),
];

impl Rule {
    fn apply(
        self,
        registered_count: u64,
        capacity: i32,
        enrollment: Option<EnrollmentStatus>,
    ) -> Option<DisplayStatus> {
        match self {
            Rule::OwnEnrollment(status, out) => (enrollment == Some(status)).then_some(out),
            Rule::AtCapacity(out) => (registered_count >= capacity.max(0) as u64).then_some(out),
            Rule::Otherwise(out) => Some(out),
        }
    }
}

impl DisplayStatus {
    /// Resolves the status shown to one viewer for one course.
    ///
    /// `registered_count` counts rows in `registered` status only;
    /// waitlisted and dropped rows do not consume capacity.
    /// `enrollment` is the status of the viewer's own enrollment row,
    /// `None` when the viewer has never interacted with the course.
    pub fn resolve(
        registered_count: u64,
        capacity: i32,
        enrollment: Option<EnrollmentStatus>,
    ) -> Self {
        RULES
            .iter()
            .find_map(|rule| rule.apply(registered_count, capacity, enrollment))
            .expect("rule list ends with a catch-all")
    }

    /// Human label for the card. Open courses show remaining room.
    pub fn label(self, registered_count: u64, capacity: i32) -> String {
        match self {
            DisplayStatus::Registered => "Registered".to_string(),
            DisplayStatus::Waitlisted => "Waitlisted".to_string(),
            DisplayStatus::Dropped => "Dropped".to_string(),
            DisplayStatus::Closed => "Closed".to_string(),
            DisplayStatus::Open => format!("Open ({}/{})", registered_count, capacity),
        }
    }

    pub fn is_actionable(self) -> bool {
        matches!(self, DisplayStatus::Open | DisplayStatus::Dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_registration_beats_full_course() {
        let status = DisplayStatus::resolve(30, 30, Some(EnrollmentStatus::Registered));
        assert_eq!(status, DisplayStatus::Registered);
    }

    #[test]
    fn waitlisted_beats_capacity() {
        let status = DisplayStatus::resolve(31, 30, Some(EnrollmentStatus::Waitlisted));
        assert_eq!(status, DisplayStatus::Waitlisted);
    }

    #[test]
    fn dropped_shows_even_when_room_remains() {
        let status = DisplayStatus::resolve(3, 30, Some(EnrollmentStatus::Dropped));
        assert_eq!(status, DisplayStatus::Dropped);
    }

    #[test]
    fn closed_exactly_at_capacity() {
        assert_eq!(DisplayStatus::resolve(30, 30, None), DisplayStatus::Closed);
        assert_eq!(DisplayStatus::resolve(29, 30, None), DisplayStatus::Open);
    }

    #[test]
    fn over_capacity_is_closed() {
        assert_eq!(DisplayStatus::resolve(31, 30, None), DisplayStatus::Closed);
    }

    #[test]
    fn zero_capacity_course_is_always_closed() {
        assert_eq!(DisplayStatus::resolve(0, 0, None), DisplayStatus::Closed);
    }

    #[test]
    fn resolution_is_pure() {
        let a = DisplayStatus::resolve(12, 30, Some(EnrollmentStatus::Registered));
        let b = DisplayStatus::resolve(12, 30, Some(EnrollmentStatus::Registered));
        assert_eq!(a, b);
    }

    #[test]
    fn open_label_shows_seat_usage() {
        assert_eq!(DisplayStatus::Open.label(12, 30), "Open (12/30)");
        assert_eq!(DisplayStatus::Closed.label(30, 30), "Closed");
    }

    #[test]
    fn only_open_and_dropped_allow_registration() {
        assert!(DisplayStatus::Open.is_actionable());
        assert!(DisplayStatus::Dropped.is_actionable());
        assert!(!DisplayStatus::Registered.is_actionable());
        assert!(!DisplayStatus::Waitlisted.is_actionable());
        assert!(!DisplayStatus::Closed.is_actionable());
    }
}
