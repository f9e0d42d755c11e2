use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use super::dto::{
    EnrollmentHistoryResponse, EnrollmentHistoryRow, EnrollmentResponse, MyScheduleResponse,
    RegisterRequest, RosterResponse, RosterRowResponse,
};
use crate::cache::{QUERY_CACHE, Resource};
use crate::entities::sea_orm_active_enums::RoleEnum;
use crate::extractor::AuthClaims;
use crate::middleware::permission;
use crate::repositories::{
    CourseRepository, DropOutcome, EnrollmentRepository, RegisterOutcome,
};

pub fn create_route() -> Router {
    Router::new()
        .route("/api/v1/enrollments", get(my_history).post(register))
        .route("/api/v1/enrollments/schedule", get(my_schedule))
        .route("/api/v1/enrollments/{course_id}/drop", post(drop_course))
        .route("/api/v1/enrollments/roster/{course_id}", get(course_roster))
}

fn parse_user_id(auth: &crate::extractor::TokenClaims) -> Result<Uuid, (StatusCode, String)> {
    Uuid::parse_str(&auth.user_id).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Invalid user_id: {}", e),
        )
    })
}

/// Register for a course, joining the waitlist when asked and the
/// course is full (Student only)
#[utoipa::path(
    post,
    path = "/api/v1/enrollments",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered or waitlisted", body = EnrollmentResponse),
        (status = 403, description = "Forbidden - Students only"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course full or already enrolled"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
pub async fn register(
    AuthClaims(auth_claims): AuthClaims,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), (StatusCode, String)> {
    permission::require_student(&auth_claims)?;
    let student_id = parse_user_id(&auth_claims)?;

    let outcome = EnrollmentRepository::new()
        .register(student_id, payload.course_id, payload.join_waitlist)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to register: {}", e),
            )
        })?;

    // Invalidation happens only after the write has resolved, so a
    // refetch can never observe the pre-mutation page as fresh.
    if outcome.is_success() {
        QUERY_CACHE.invalidate(Resource::Enrollments);
    }

    let message = outcome.message();
    match outcome {
        RegisterOutcome::Registered(row) | RegisterOutcome::Waitlisted(row) => Ok((
            StatusCode::CREATED,
            Json(EnrollmentResponse::from_row(&row, message)),
        )),
        RegisterOutcome::CourseFull | RegisterOutcome::AlreadyEnrolled => {
            Err((StatusCode::CONFLICT, message))
        }
        RegisterOutcome::CourseNotFound => Err((StatusCode::NOT_FOUND, message)),
    }
}

/// Drop a registered or waitlisted course (Student only)
#[utoipa::path(
    post,
    path = "/api/v1/enrollments/{course_id}/drop",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course dropped", body = EnrollmentResponse),
        (status = 403, description = "Forbidden - Students only"),
        (status = 404, description = "No active enrollment"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
pub async fn drop_course(
    AuthClaims(auth_claims): AuthClaims,
    Path(course_id): Path<Uuid>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), (StatusCode, String)> {
    permission::require_student(&auth_claims)?;
    let student_id = parse_user_id(&auth_claims)?;

    let outcome = EnrollmentRepository::new()
        .drop_course(student_id, course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to drop course: {}", e),
            )
        })?;

    if outcome.is_success() {
        QUERY_CACHE.invalidate(Resource::Enrollments);
    }

    let message = outcome.message();
    match outcome {
        DropOutcome::Dropped(row) => Ok((
            StatusCode::OK,
            Json(EnrollmentResponse::from_row(&row, message)),
        )),
        DropOutcome::NotEnrolled => Err((StatusCode::NOT_FOUND, message)),
    }
}

/// The caller's current schedule: registered and waitlisted courses
/// with formatted meeting times (Student only)
#[utoipa::path(
    get,
    path = "/api/v1/enrollments/schedule",
    responses(
        (status = 200, description = "Current schedule", body = MyScheduleResponse),
        (status = 403, description = "Forbidden - Students only"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
pub async fn my_schedule(
    AuthClaims(auth_claims): AuthClaims,
) -> Result<(StatusCode, Json<MyScheduleResponse>), (StatusCode, String)> {
    permission::require_student(&auth_claims)?;
    let student_id = parse_user_id(&auth_claims)?;

    let entries = match QUERY_CACHE.get_schedule(student_id) {
        Some(entries) => entries,
        None => {
            let entries = EnrollmentRepository::new()
                .find_my_schedule(student_id)
                .await
                .map_err(|e| {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to load schedule: {}", e),
                    )
                })?;
            QUERY_CACHE.insert_schedule(student_id, entries.clone());
            entries
        }
    };

    Ok((
        StatusCode::OK,
        Json(MyScheduleResponse::from_entries(&entries)),
    ))
}

/// Full enrollment history for the caller, dropped courses included
/// (Student only)
#[utoipa::path(
    get,
    path = "/api/v1/enrollments",
    responses(
        (status = 200, description = "Enrollment history", body = EnrollmentHistoryResponse),
        (status = 403, description = "Forbidden - Students only"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
pub async fn my_history(
    AuthClaims(auth_claims): AuthClaims,
) -> Result<(StatusCode, Json<EnrollmentHistoryResponse>), (StatusCode, String)> {
    permission::require_student(&auth_claims)?;
    let student_id = parse_user_id(&auth_claims)?;

    let rows = EnrollmentRepository::new()
        .find_history(student_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load history: {}", e),
            )
        })?;

    Ok((
        StatusCode::OK,
        Json(EnrollmentHistoryResponse {
            rows: rows
                .iter()
                .map(|(e, c)| EnrollmentHistoryRow::from_row(e, c))
                .collect(),
        }),
    ))
}

/// The roster of one course (course instructor or admin)
#[utoipa::path(
    get,
    path = "/api/v1/enrollments/roster/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course roster", body = RosterResponse),
        (status = 403, description = "Forbidden - Instructor of this course or admin only"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
pub async fn course_roster(
    AuthClaims(auth_claims): AuthClaims,
    Path(course_id): Path<Uuid>,
) -> Result<(StatusCode, Json<RosterResponse>), (StatusCode, String)> {
    permission::require_staff(&auth_claims)?;

    let course = CourseRepository::new()
        .find_by_id(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    // Faculty may only see rosters of their own courses.
    if auth_claims.role == RoleEnum::Faculty {
        let caller_id = parse_user_id(&auth_claims)?;
        if course.instructor_id != Some(caller_id) {
            return Err((
                StatusCode::FORBIDDEN,
                "Only the course instructor can view this roster".to_string(),
            ));
        }
    }

    let enrollment_repo = EnrollmentRepository::new();
    let rows = enrollment_repo
        .find_roster_with_students(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load roster: {}", e),
            )
        })?;

    let registered_count = enrollment_repo
        .count_registered(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?;

    Ok((
        StatusCode::OK,
        Json(RosterResponse {
            course_id,
            rows: rows
                .into_iter()
                .map(|(enrollment, student)| RosterRowResponse {
                    student_id: student.user_id,
                    full_name: format!("{} {}", student.first_name, student.last_name),
                    email: student.email,
                    student_code: student.student_code,
                    status: enrollment.status,
                })
                .collect(),
            registered_count,
        }),
    ))
}
