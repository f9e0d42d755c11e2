use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{delete, get},
};
use uuid::Uuid;

use super::dto::{
    AssignmentGradeRow, AssignmentGradesResponse, AssignmentListResponse, AssignmentResponse,
    CreateAssignmentRequest, GradeRecordedResponse, GradeReportResponse, GradeReportRowResponse,
    RecordGradeRequest,
};
use crate::entities::course;
use crate::entities::sea_orm_active_enums::{EnrollmentStatus, RoleEnum};
use crate::extractor::{AuthClaims, TokenClaims};
use crate::middleware::permission;
use crate::repositories::{
    CourseRepository, EnrollmentRepository, GradeOutcome, GradebookRepository,
};

pub fn create_route() -> Router {
    Router::new()
        .route(
            "/api/v1/gradebook/courses/{course_id}/assignments",
            get(course_assignments).post(create_assignment),
        )
        .route(
            "/api/v1/gradebook/assignments/{assignment_id}",
            delete(delete_assignment),
        )
        .route(
            "/api/v1/gradebook/assignments/{assignment_id}/grades",
            get(assignment_grades).post(record_grade),
        )
        .route("/api/v1/gradebook/my-grades", get(my_grades))
}

fn parse_user_id(auth: &TokenClaims) -> Result<Uuid, (StatusCode, String)> {
    Uuid::parse_str(&auth.user_id).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Invalid user_id: {}", e),
        )
    })
}

/// Admins may touch any gradebook; faculty only their own courses.
fn ensure_course_staff(
    auth: &TokenClaims,
    course: &course::Model,
) -> Result<(), (StatusCode, String)> {
    permission::require_staff(auth)?;
    if auth.role == RoleEnum::Faculty {
        let caller_id = parse_user_id(auth)?;
        if course.instructor_id != Some(caller_id) {
            return Err((
                StatusCode::FORBIDDEN,
                "Only the course instructor can manage this gradebook".to_string(),
            ));
        }
    }
    Ok(())
}

async fn load_course(course_id: Uuid) -> Result<course::Model, (StatusCode, String)> {
    CourseRepository::new()
        .find_by_id(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Course not found".to_string()))
}

/// Assignments are visible to the course instructor, admins and
/// students holding a live (non-dropped) enrollment.
async fn ensure_assignment_reader(
    auth: &TokenClaims,
    course: &course::Model,
) -> Result<(), (StatusCode, String)> {
    if auth.role == RoleEnum::Admin {
        return Ok(());
    }
    let caller_id = parse_user_id(auth)?;
    if auth.role == RoleEnum::Faculty {
        if course.instructor_id == Some(caller_id) {
            return Ok(());
        }
        return Err((
            StatusCode::FORBIDDEN,
            "Only the course instructor can view this gradebook".to_string(),
        ));
    }

    let enrollment = EnrollmentRepository::new()
        .find_one(caller_id, course.course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?;
    match enrollment {
        Some(row) if row.status != EnrollmentStatus::Dropped => Ok(()),
        _ => Err((
            StatusCode::FORBIDDEN,
            "Only enrolled students can view this course's assignments".to_string(),
        )),
    }
}

/// Assignments of one course, earliest due date first
#[utoipa::path(
    get,
    path = "/api/v1/gradebook/courses/{course_id}/assignments",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Assignments for the course", body = AssignmentListResponse),
        (status = 403, description = "Forbidden - Instructor, enrolled student or admin only"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Gradebook"
)]
pub async fn course_assignments(
    AuthClaims(auth_claims): AuthClaims,
    Path(course_id): Path<Uuid>,
) -> Result<(StatusCode, Json<AssignmentListResponse>), (StatusCode, String)> {
    let course = load_course(course_id).await?;
    ensure_assignment_reader(&auth_claims, &course).await?;

    let assignments = GradebookRepository::new()
        .find_assignments_for_course(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load assignments: {}", e),
            )
        })?;

    Ok((
        StatusCode::OK,
        Json(AssignmentListResponse {
            assignments: assignments.iter().map(AssignmentResponse::from).collect(),
        }),
    ))
}

/// Create an assignment (course instructor or admin)
#[utoipa::path(
    post,
    path = "/api/v1/gradebook/courses/{course_id}/assignments",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden - Instructor of this course or admin only"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Gradebook"
)]
pub async fn create_assignment(
    AuthClaims(auth_claims): AuthClaims,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<AssignmentResponse>), (StatusCode, String)> {
    let course = load_course(course_id).await?;
    ensure_course_staff(&auth_claims, &course)?;

    let due_at = payload
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let assignment = GradebookRepository::new()
        .create_assignment(
            Uuid::new_v4(),
            course_id,
            payload.title.trim().to_string(),
            payload.description,
            due_at,
            payload.points_possible,
            payload.moodle_id,
        )
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create assignment: {}", e),
            )
        })?;

    Ok((
        StatusCode::CREATED,
        Json(AssignmentResponse::from(&assignment)),
    ))
}

/// Delete an assignment and its grades (course instructor or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/gradebook/assignments/{assignment_id}",
    params(
        ("assignment_id" = Uuid, Path, description = "Assignment ID")
    ),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 403, description = "Forbidden - Instructor of this course or admin only"),
        (status = 404, description = "Assignment not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Gradebook"
)]
pub async fn delete_assignment(
    AuthClaims(auth_claims): AuthClaims,
    Path(assignment_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let gradebook_repo = GradebookRepository::new();

    let assignment = gradebook_repo
        .find_assignment(assignment_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Assignment not found".to_string()))?;

    let course = load_course(assignment.course_id).await?;
    ensure_course_staff(&auth_claims, &course)?;

    gradebook_repo
        .delete_assignment(assignment_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to delete assignment: {}", e),
            )
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Record or overwrite one student's grade (course instructor or admin)
#[utoipa::path(
    post,
    path = "/api/v1/gradebook/assignments/{assignment_id}/grades",
    params(
        ("assignment_id" = Uuid, Path, description = "Assignment ID")
    ),
    request_body = RecordGradeRequest,
    responses(
        (status = 201, description = "Grade recorded", body = GradeRecordedResponse),
        (status = 400, description = "Points out of range"),
        (status = 403, description = "Forbidden - Instructor of this course or admin only"),
        (status = 404, description = "Assignment not found"),
        (status = 409, description = "Student has no registered enrollment in the course"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Gradebook"
)]
pub async fn record_grade(
    AuthClaims(auth_claims): AuthClaims,
    Path(assignment_id): Path<Uuid>,
    Json(payload): Json<RecordGradeRequest>,
) -> Result<(StatusCode, Json<GradeRecordedResponse>), (StatusCode, String)> {
    let gradebook_repo = GradebookRepository::new();

    let assignment = gradebook_repo
        .find_assignment(assignment_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Assignment not found".to_string()))?;

    let course = load_course(assignment.course_id).await?;
    ensure_course_staff(&auth_claims, &course)?;

    // Waitlisted and dropped students have no seat to be graded in.
    let enrollment = EnrollmentRepository::new()
        .find_one(payload.student_id, assignment.course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?;
    if enrollment.map(|e| e.status) != Some(EnrollmentStatus::Registered) {
        return Err((
            StatusCode::CONFLICT,
            "Student is not registered in this course".to_string(),
        ));
    }

    let graded_by = parse_user_id(&auth_claims)?;

    let outcome = gradebook_repo
        .record_grade(assignment_id, payload.student_id, payload.points, graded_by)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to record grade: {}", e),
            )
        })?;

    let message = outcome.message();
    match outcome {
        GradeOutcome::Recorded(row) => Ok((
            StatusCode::CREATED,
            Json(GradeRecordedResponse::from_row(&row, message)),
        )),
        GradeOutcome::AssignmentNotFound => Err((StatusCode::NOT_FOUND, message)),
        GradeOutcome::PointsOutOfRange { .. } => Err((StatusCode::BAD_REQUEST, message)),
    }
}

/// Every recorded grade on one assignment (course instructor or admin)
#[utoipa::path(
    get,
    path = "/api/v1/gradebook/assignments/{assignment_id}/grades",
    params(
        ("assignment_id" = Uuid, Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "Grades for the assignment", body = AssignmentGradesResponse),
        (status = 403, description = "Forbidden - Instructor of this course or admin only"),
        (status = 404, description = "Assignment not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Gradebook"
)]
pub async fn assignment_grades(
    AuthClaims(auth_claims): AuthClaims,
    Path(assignment_id): Path<Uuid>,
) -> Result<(StatusCode, Json<AssignmentGradesResponse>), (StatusCode, String)> {
    let gradebook_repo = GradebookRepository::new();

    let assignment = gradebook_repo
        .find_assignment(assignment_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Assignment not found".to_string()))?;

    let course = load_course(assignment.course_id).await?;
    ensure_course_staff(&auth_claims, &course)?;

    let rows = gradebook_repo
        .find_grades_for_assignment(assignment_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load grades: {}", e),
            )
        })?;

    Ok((
        StatusCode::OK,
        Json(AssignmentGradesResponse {
            assignment: AssignmentResponse::from(&assignment),
            grades: rows
                .iter()
                .map(|(grade, student)| AssignmentGradeRow::from_row(grade, student.as_ref()))
                .collect(),
        }),
    ))
}

/// The caller's own grade report across all courses (Student only)
#[utoipa::path(
    get,
    path = "/api/v1/gradebook/my-grades",
    responses(
        (status = 200, description = "Grade report", body = GradeReportResponse),
        (status = 403, description = "Forbidden - Students only"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Gradebook"
)]
pub async fn my_grades(
    AuthClaims(auth_claims): AuthClaims,
) -> Result<(StatusCode, Json<GradeReportResponse>), (StatusCode, String)> {
    permission::require_student(&auth_claims)?;
    let student_id = parse_user_id(&auth_claims)?;

    let rows = GradebookRepository::new()
        .find_grades_for_student(student_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load grades: {}", e),
            )
        })?;

    Ok((
        StatusCode::OK,
        Json(GradeReportResponse {
            rows: rows.iter().map(GradeReportRowResponse::from).collect(),
        }),
    ))
}
