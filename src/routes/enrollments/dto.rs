use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{course, enrollment};
use crate::entities::sea_orm_active_enums::EnrollmentStatus;
use crate::repositories::ScheduleEntry;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub course_id: Uuid,

    /// When the course is full, join the waitlist instead of failing.
    #[serde(default)]
    #[schema(example = false)]
    pub join_waitlist: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollmentResponse {
    pub enrollment_id: Uuid,
    pub course_id: Uuid,
    pub status: EnrollmentStatus,
    pub message: String,
}

impl EnrollmentResponse {
    pub fn from_row(row: &enrollment::Model, message: String) -> Self {
        EnrollmentResponse {
            enrollment_id: row.enrollment_id,
            course_id: row.course_id,
            status: row.status,
            message,
        }
    }
}

/// One row of the "My Schedule" tab.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleRowResponse {
    pub course_id: Uuid,
    #[schema(example = "CS 350")]
    pub code: String,
    #[schema(example = "Operating Systems")]
    pub title: String,
    pub credits: i32,
    pub status: EnrollmentStatus,
    #[schema(example = "Mon, Wed \u{2022} 10:00-11:30")]
    pub schedule_summary: String,
}

impl From<&ScheduleEntry> for ScheduleRowResponse {
    fn from(entry: &ScheduleEntry) -> Self {
        ScheduleRowResponse {
            course_id: entry.course.course_id,
            code: entry.course.code.clone(),
            title: entry.course.title.clone(),
            credits: entry.course.credits,
            status: entry.enrollment.status,
            schedule_summary: entry.schedule_summary.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MyScheduleResponse {
    pub rows: Vec<ScheduleRowResponse>,
    pub total_credits: i32,
}

impl MyScheduleResponse {
    /// Waitlisted courses appear in the schedule but their credits do
    /// not count until a seat opens.
    pub fn from_entries(entries: &[ScheduleEntry]) -> Self {
        let total_credits = entries
            .iter()
            .filter(|e| e.enrollment.status == EnrollmentStatus::Registered)
            .map(|e| e.course.credits)
            .sum();
        MyScheduleResponse {
            rows: entries.iter().map(ScheduleRowResponse::from).collect(),
            total_credits,
        }
    }
}

/// One row of the enrollment history view, dropped courses included.
#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollmentHistoryRow {
    pub enrollment_id: Uuid,
    pub course_id: Uuid,
    pub code: String,
    pub title: String,
    pub status: EnrollmentStatus,
    pub updated_at: String,
}

impl EnrollmentHistoryRow {
    pub fn from_row(enrollment: &enrollment::Model, course: &course::Model) -> Self {
        EnrollmentHistoryRow {
            enrollment_id: enrollment.enrollment_id,
            course_id: enrollment.course_id,
            code: course.code.clone(),
            title: course.title.clone(),
            status: enrollment.status,
            updated_at: enrollment.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollmentHistoryResponse {
    pub rows: Vec<EnrollmentHistoryRow>,
}

/// One roster row for instructors.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterRowResponse {
    pub student_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub student_code: Option<String>,
    pub status: EnrollmentStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RosterResponse {
    pub course_id: Uuid,
    pub rows: Vec<RosterRowResponse>,
    pub registered_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schedule_format::SCHEDULE_UNAVAILABLE;
    use chrono::Utc;

    fn course(credits: i32) -> course::Model {
        course::Model {
            course_id: Uuid::new_v4(),
            code: "CS 101".to_string(),
            title: "Intro".to_string(),
            description: String::new(),
            credits,
            department_id: Uuid::new_v4(),
            instructor_id: None,
            capacity: 30,
            delivery_mode: crate::entities::sea_orm_active_enums::DeliveryMode::InPerson,
            level: 100,
            semester: "fall".to_string(),
            year: 2026,
            moodle_id: None,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    fn entry(credits: i32, status: EnrollmentStatus) -> ScheduleEntry {
        let course = course(credits);
        ScheduleEntry {
            enrollment: enrollment::Model {
                enrollment_id: Uuid::new_v4(),
                student_id: Uuid::new_v4(),
                course_id: course.course_id,
                status,
                created_at: Utc::now().naive_utc(),
                updated_at: Utc::now().naive_utc(),
            },
            course,
            schedule_summary: SCHEDULE_UNAVAILABLE.to_string(),
        }
    }

    #[test]
    fn waitlisted_credits_do_not_count() {
        let entries = vec![
            entry(4, EnrollmentStatus::Registered),
            entry(3, EnrollmentStatus::Registered),
            entry(5, EnrollmentStatus::Waitlisted),
        ];
        let response = MyScheduleResponse::from_entries(&entries);
        assert_eq!(response.total_credits, 7);
        assert_eq!(response.rows.len(), 3);
    }

    #[test]
    fn empty_schedule_sums_to_zero() {
        let response = MyScheduleResponse::from_entries(&[]);
        assert_eq!(response.total_credits, 0);
        assert!(response.rows.is_empty());
    }
}
