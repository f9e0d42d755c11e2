use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{assignment, grade, user};
use crate::repositories::GradeReportRow;
use crate::routes::events::dto::parse_datetime;

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentResponse {
    pub assignment_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_at: Option<String>,
    pub points_possible: i32,
    pub moodle_id: Option<String>,
}

impl From<&assignment::Model> for AssignmentResponse {
    fn from(row: &assignment::Model) -> Self {
        AssignmentResponse {
            assignment_id: row.assignment_id,
            course_id: row.course_id,
            title: row.title.clone(),
            description: row.description.clone(),
            due_at: row.due_at.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            points_possible: row.points_possible,
            moodle_id: row.moodle_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentListResponse {
    pub assignments: Vec<AssignmentResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAssignmentRequest {
    #[schema(example = "Problem set 3")]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// `YYYY-MM-DDTHH:MM:SS`, omitted means no due date.
    #[schema(example = "2026-10-05T23:59:00")]
    pub due_at: Option<String>,

    #[schema(example = 100)]
    pub points_possible: i32,

    pub moodle_id: Option<String>,
}

impl CreateAssignmentRequest {
    pub fn validate(&self) -> Result<Option<chrono::NaiveDateTime>, String> {
        if self.title.trim().is_empty() {
            return Err("Title cannot be blank".to_string());
        }
        if self.points_possible <= 0 {
            return Err("Points possible must be positive".to_string());
        }
        self.due_at.as_deref().map(parse_datetime).transpose()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordGradeRequest {
    pub student_id: Uuid,

    #[schema(example = "87.5")]
    pub points: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GradeResponse {
    pub grade_id: Uuid,
    pub assignment_id: Uuid,
    pub student_id: Uuid,
    pub points: Decimal,
    pub graded_at: String,
}

impl From<&grade::Model> for GradeResponse {
    fn from(row: &grade::Model) -> Self {
        GradeResponse {
            grade_id: row.grade_id,
            assignment_id: row.assignment_id,
            student_id: row.student_id,
            points: row.points,
            graded_at: row.graded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GradeRecordedResponse {
    pub grade: GradeResponse,
    pub message: String,
}

impl GradeRecordedResponse {
    pub fn from_row(row: &grade::Model, message: String) -> Self {
        GradeRecordedResponse {
            grade: GradeResponse::from(row),
            message,
        }
    }
}

/// One graded student on an assignment, for the instructor's view.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentGradeRow {
    pub grade: GradeResponse,
    pub student_name: String,
    pub student_code: Option<String>,
}

impl AssignmentGradeRow {
    pub fn from_row(grade: &grade::Model, student: Option<&user::Model>) -> Self {
        AssignmentGradeRow {
            grade: GradeResponse::from(grade),
            student_name: student
                .map(|s| format!("{} {}", s.first_name, s.last_name))
                .unwrap_or_else(|| "(unknown)".to_string()),
            student_code: student.and_then(|s| s.student_code.clone()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentGradesResponse {
    pub assignment: AssignmentResponse,
    pub grades: Vec<AssignmentGradeRow>,
}

/// One row of the student's own grade report.
#[derive(Debug, Serialize, ToSchema)]
pub struct GradeReportRowResponse {
    pub course_code: String,
    pub course_title: String,
    pub assignment_title: String,
    pub points: Decimal,
    pub points_possible: i32,
    pub graded_at: String,
}

impl From<&GradeReportRow> for GradeReportRowResponse {
    fn from(row: &GradeReportRow) -> Self {
        GradeReportRowResponse {
            course_code: row.course_code.clone(),
            course_title: row.course_title.clone(),
            assignment_title: row.assignment.title.clone(),
            points: row.grade.points,
            points_possible: row.assignment.points_possible,
            graded_at: row.grade.graded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GradeReportResponse {
    pub rows: Vec<GradeReportRowResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_requires_title_and_positive_points() {
        let request = CreateAssignmentRequest {
            title: " ".to_string(),
            description: String::new(),
            due_at: None,
            points_possible: 100,
            moodle_id: None,
        };
        assert!(request.validate().is_err());

        let request = CreateAssignmentRequest {
            title: "PS1".to_string(),
            points_possible: 0,
            ..request
        };
        assert!(request.validate().is_err());

        let request = CreateAssignmentRequest {
            points_possible: 100,
            due_at: Some("2026-10-05T23:59:00".to_string()),
            ..request
        };
        assert!(request.validate().unwrap().is_some());
    }
}
