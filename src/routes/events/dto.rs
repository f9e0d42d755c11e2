use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entities::calendar_event;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Half-open range: events are returned when they overlap
/// `[from, to)`. Both bounds are optional; a missing bound leaves
/// that side of the range open.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListEventsParams {
    /// Inclusive range start, `YYYY-MM-DDTHH:MM:SS`.
    #[param(example = "2026-09-01T00:00:00")]
    pub from: Option<String>,

    /// Exclusive range end, `YYYY-MM-DDTHH:MM:SS`.
    #[param(example = "2026-10-01T00:00:00")]
    pub to: Option<String>,
}

pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|_| format!("'{}' is not a YYYY-MM-DDTHH:MM:SS timestamp", value))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarEventResponse {
    pub event_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: String,
    pub ends_at: String,
    pub course_id: Option<Uuid>,
}

impl From<&calendar_event::Model> for CalendarEventResponse {
    fn from(row: &calendar_event::Model) -> Self {
        CalendarEventResponse {
            event_id: row.event_id,
            title: row.title.clone(),
            description: row.description.clone(),
            location: row.location.clone(),
            starts_at: row.starts_at.format(DATETIME_FORMAT).to_string(),
            ends_at: row.ends_at.format(DATETIME_FORMAT).to_string(),
            course_id: row.course_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarEventListResponse {
    pub events: Vec<CalendarEventResponse>,
}

impl CalendarEventListResponse {
    pub fn from_rows(rows: &[calendar_event::Model]) -> Self {
        CalendarEventListResponse {
            events: rows.iter().map(CalendarEventResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    #[schema(example = "Midterm exam")]
    pub title: String,

    pub description: Option<String>,

    #[schema(example = "Science Hall 204")]
    pub location: Option<String>,

    #[schema(example = "2026-10-14T10:00:00")]
    pub starts_at: String,

    #[schema(example = "2026-10-14T12:00:00")]
    pub ends_at: String,

    /// Attach the event to a course so it shows on course pages.
    pub course_id: Option<Uuid>,
}

impl CreateEventRequest {
    pub fn validate(&self) -> Result<(NaiveDateTime, NaiveDateTime), String> {
        if self.title.trim().is_empty() {
            return Err("Title cannot be blank".to_string());
        }
        let starts_at = parse_datetime(&self.starts_at)?;
        let ends_at = parse_datetime(&self.ends_at)?;
        if ends_at <= starts_at {
            return Err("Event must end after it starts".to_string());
        }
        Ok((starts_at, ends_at))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
}

impl UpdateEventRequest {
    /// Parses whichever timestamps are present; the range check runs
    /// in the handler once the surviving values are known.
    pub fn parsed_times(
        &self,
    ) -> Result<(Option<NaiveDateTime>, Option<NaiveDateTime>), String> {
        let starts_at = self.starts_at.as_deref().map(parse_datetime).transpose()?;
        let ends_at = self.ends_at.as_deref().map(parse_datetime).transpose()?;
        Ok((starts_at, ends_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_parsing_round_trips() {
        let parsed = parse_datetime("2026-10-14T10:30:00").unwrap();
        assert_eq!(parsed.format(DATETIME_FORMAT).to_string(), "2026-10-14T10:30:00");
        assert!(parse_datetime("2026-10-14 10:30").is_err());
        assert!(parse_datetime("teatime").is_err());
    }

    #[test]
    fn event_must_end_after_start() {
        let request = CreateEventRequest {
            title: "Exam".to_string(),
            description: None,
            location: None,
            starts_at: "2026-10-14T10:00:00".to_string(),
            ends_at: "2026-10-14T10:00:00".to_string(),
            course_id: None,
        };
        assert!(request.validate().is_err());

        let request = CreateEventRequest {
            ends_at: "2026-10-14T12:00:00".to_string(),
            ..request
        };
        assert!(request.validate().is_ok());
    }
}
