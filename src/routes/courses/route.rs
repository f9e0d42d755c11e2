use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    routing::{delete, get, post},
};
use std::collections::HashMap;
use uuid::Uuid;

use super::dto::{
    AddScheduleSlotRequest, CourseCard, CourseDetailResponse, CourseListResponse,
    CreateCourseRequest, ListCoursesParams, ScheduleSlotResponse, UpdateCourseRequest,
};
use crate::cache::{CoursePageKey, QUERY_CACHE, Resource};
use crate::catalog::view_state::CatalogViewState;
use crate::config::APP_CONFIG;
use crate::entities::sea_orm_active_enums::{EnrollmentStatus, RoleEnum};
use crate::extractor::AuthClaims;
use crate::middleware::permission;
use crate::repositories::{
    CourseRepository, CourseUpdate, DepartmentRepository, EnrollmentRepository,
    NotificationRepository, UserRepository,
};

pub fn create_route() -> Router {
    Router::new()
        .route("/api/v1/courses", get(list_courses).post(create_course))
        .route("/api/v1/courses/teaching", get(my_teaching))
        .route(
            "/api/v1/courses/{course_id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route(
            "/api/v1/courses/{course_id}/schedule",
            post(add_schedule_slot),
        )
        .route(
            "/api/v1/courses/{course_id}/schedule/{schedule_id}",
            delete(remove_schedule_slot),
        )
}

/// The viewer's own enrollment per course, for status resolution.
/// Only students have enrollments; other roles see capacity-only
/// statuses.
async fn viewer_status_map(
    role: &RoleEnum,
    user_id: &str,
    course_ids: &[Uuid],
) -> Result<HashMap<Uuid, EnrollmentStatus>, (StatusCode, String)> {
    if *role != RoleEnum::Student {
        return Ok(HashMap::new());
    }
    let viewer_id = Uuid::parse_str(user_id).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Invalid user_id: {}", e),
        )
    })?;
    EnrollmentRepository::new()
        .find_status_map(viewer_id, course_ids)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })
}

/// Browse the course catalog with filters, search and pagination
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    params(ListCoursesParams),
    responses(
        (status = 200, description = "One page of course cards", body = CourseListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn list_courses(
    AuthClaims(auth_claims): AuthClaims,
    Query(params): Query<ListCoursesParams>,
) -> Result<(StatusCode, Json<CourseListResponse>), (StatusCode, String)> {
    let state = CatalogViewState::from_request(params.filter(), params.page);
    let key = CoursePageKey {
        filter: state.filter().clone(),
        page: state.page(),
    };

    // Cached pages are viewer-independent; the viewer's own statuses
    // are resolved over the page after retrieval.
    let page = match QUERY_CACHE.get_course_page(&key) {
        Some(page) => page,
        None => {
            let page = CourseRepository::new()
                .find_page(state.filter(), state.page(), APP_CONFIG.page_size)
                .await
                .map_err(|e| {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to query courses: {}", e),
                    )
                })?;
            QUERY_CACHE.insert_course_page(key, page.clone());
            page
        }
    };

    let course_ids: Vec<Uuid> = page.listings.iter().map(|l| l.course.course_id).collect();
    let status_map =
        viewer_status_map(&auth_claims.role, &auth_claims.user_id, &course_ids).await?;

    let courses = page
        .listings
        .iter()
        .map(|listing| {
            CourseCard::from_listing(
                listing,
                status_map.get(&listing.course.course_id).copied(),
            )
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(CourseListResponse {
            courses,
            page: state.page(),
            page_size: APP_CONFIG.page_size,
            total_items: page.total_items,
            total_pages: page.total_pages,
        }),
    ))
}

/// Course detail with individual meeting slots
#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course detail", body = CourseDetailResponse),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn get_course(
    AuthClaims(auth_claims): AuthClaims,
    Path(course_id): Path<Uuid>,
) -> Result<(StatusCode, Json<CourseDetailResponse>), (StatusCode, String)> {
    let course_repo = CourseRepository::new();

    let listing = course_repo
        .find_listing(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    let slots = course_repo.find_slots(course_id).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {}", e),
        )
    })?;

    let status_map =
        viewer_status_map(&auth_claims.role, &auth_claims.user_id, &[course_id]).await?;

    let description = listing.course.description.clone();
    let moodle_id = listing.course.moodle_id.clone();
    let card = CourseCard::from_listing(&listing, status_map.get(&course_id).copied());

    Ok((
        StatusCode::OK,
        Json(CourseDetailResponse {
            card,
            description,
            moodle_id,
            slots: slots.into_iter().map(ScheduleSlotResponse::from).collect(),
        }),
    ))
}

/// Courses taught by the requesting faculty member
#[utoipa::path(
    get,
    path = "/api/v1/courses/teaching",
    responses(
        (status = 200, description = "Courses taught by the caller", body = CourseListResponse),
        (status = 403, description = "Forbidden - Faculty or admin only"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn my_teaching(
    AuthClaims(auth_claims): AuthClaims,
) -> Result<(StatusCode, Json<CourseListResponse>), (StatusCode, String)> {
    permission::require_staff(&auth_claims)?;

    let instructor_id = Uuid::parse_str(&auth_claims.user_id).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Invalid user_id: {}", e),
        )
    })?;

    let listings = CourseRepository::new()
        .find_by_instructor(instructor_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?;

    let total = listings.len() as u64;
    let courses: Vec<CourseCard> = listings
        .iter()
        .map(|listing| CourseCard::from_listing(listing, None))
        .collect();

    Ok((
        StatusCode::OK,
        Json(CourseListResponse {
            courses,
            page: 1,
            page_size: total.max(1),
            total_items: total,
            total_pages: if total == 0 { 0 } else { 1 },
        }),
    ))
}

/// Create a course (Admin only)
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseDetailResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 409, description = "Course code already exists"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn create_course(
    AuthClaims(auth_claims): AuthClaims,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseDetailResponse>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    payload
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let course_repo = CourseRepository::new();

    let code = payload.code.trim().to_string();
    let existing = course_repo.find_by_code(&code).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {}", e),
        )
    })?;
    if existing.is_some() {
        return Err((
            StatusCode::CONFLICT,
            format!("Course code '{}' already exists", code),
        ));
    }

    DepartmentRepository::new()
        .find_by_id(payload.department_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Unknown department".to_string()))?;

    if let Some(instructor_id) = payload.instructor_id {
        let instructor = UserRepository::new()
            .find_by_id(instructor_id)
            .await
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", e),
                )
            })?
            .ok_or_else(|| (StatusCode::BAD_REQUEST, "Unknown instructor".to_string()))?;
        if instructor.role != RoleEnum::Faculty {
            return Err((
                StatusCode::BAD_REQUEST,
                "Instructor must be a faculty member".to_string(),
            ));
        }
    }

    let course = course_repo
        .create(
            Uuid::new_v4(),
            code,
            payload.title.trim().to_string(),
            payload.description,
            payload.credits,
            payload.department_id,
            payload.instructor_id,
            payload.capacity,
            payload.delivery_mode,
            payload.level,
            payload.semester.trim().to_lowercase(),
            payload.year,
            payload.moodle_id,
        )
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create course: {}", e),
            )
        })?;

    QUERY_CACHE.invalidate(Resource::Courses);

    let listing = course_repo
        .find_listing(course.course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Course vanished after insert".to_string(),
            )
        })?;

    let description = listing.course.description.clone();
    let moodle_id = listing.course.moodle_id.clone();
    let card = CourseCard::from_listing(&listing, None);

    Ok((
        StatusCode::CREATED,
        Json(CourseDetailResponse {
            card,
            description,
            moodle_id,
            slots: Vec::new(),
        }),
    ))
}

/// Update a course (Admin only)
#[utoipa::path(
    put,
    path = "/api/v1/courses/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseDetailResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Capacity below current registration count"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn update_course(
    AuthClaims(auth_claims): AuthClaims,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<(StatusCode, Json<CourseDetailResponse>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    payload
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let course_repo = CourseRepository::new();

    course_repo
        .find_by_id(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    // Shrinking capacity never un-registers anyone; refuse a capacity
    // the current roster already exceeds.
    if let Some(capacity) = payload.capacity {
        let registered = EnrollmentRepository::new()
            .count_registered(course_id)
            .await
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", e),
                )
            })?;
        if (capacity as u64) < registered {
            return Err((
                StatusCode::CONFLICT,
                format!(
                    "Capacity {} is below the {} currently registered students",
                    capacity, registered
                ),
            ));
        }
    }

    course_repo
        .update(
            course_id,
            CourseUpdate {
                code: payload.code,
                title: payload.title,
                description: payload.description,
                credits: payload.credits,
                department_id: payload.department_id,
                instructor_id: payload.instructor_id,
                capacity: payload.capacity,
                delivery_mode: payload.delivery_mode,
                level: payload.level,
                semester: payload.semester.map(|s| s.trim().to_lowercase()),
                year: payload.year,
                moodle_id: payload.moodle_id,
            },
        )
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to update course: {}", e),
            )
        })?;

    QUERY_CACHE.invalidate(Resource::Courses);

    let listing = course_repo
        .find_listing(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    let slots = course_repo.find_slots(course_id).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {}", e),
        )
    })?;

    let description = listing.course.description.clone();
    let moodle_id = listing.course.moodle_id.clone();
    let card = CourseCard::from_listing(&listing, None);

    Ok((
        StatusCode::OK,
        Json(CourseDetailResponse {
            card,
            description,
            moodle_id,
            slots: slots.into_iter().map(ScheduleSlotResponse::from).collect(),
        }),
    ))
}

/// Delete a course (Admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course still has enrolled students"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn delete_course(
    AuthClaims(auth_claims): AuthClaims,
    Path(course_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    let course_repo = CourseRepository::new();

    course_repo
        .find_by_id(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    // Dropped rows are history and do not block deletion; anyone still
    // registered or waitlisted does.
    let roster = EnrollmentRepository::new()
        .find_roster(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?;
    if !roster.is_empty() {
        return Err((
            StatusCode::CONFLICT,
            format!(
                "Course still has {} enrolled student(s); drop them first",
                roster.len()
            ),
        ));
    }

    course_repo.delete(course_id).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to delete course: {}", e),
        )
    })?;

    QUERY_CACHE.invalidate(Resource::Courses);

    Ok(StatusCode::NO_CONTENT)
}

/// Add a meeting slot to a course (Admin only)
#[utoipa::path(
    post,
    path = "/api/v1/courses/{course_id}/schedule",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    request_body = AddScheduleSlotRequest,
    responses(
        (status = 201, description = "Slot added", body = ScheduleSlotResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn add_schedule_slot(
    AuthClaims(auth_claims): AuthClaims,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<AddScheduleSlotRequest>,
) -> Result<(StatusCode, Json<ScheduleSlotResponse>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    payload
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let course_repo = CourseRepository::new();

    let course = course_repo
        .find_by_id(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    let slot = course_repo
        .add_slot(
            Uuid::new_v4(),
            course_id,
            payload.day_of_week,
            payload.start_time,
            payload.end_time,
            payload.location,
        )
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to add schedule slot: {}", e),
            )
        })?;

    QUERY_CACHE.invalidate(Resource::Courses);
    notify_schedule_change(&course.code, course_id).await;

    Ok((StatusCode::CREATED, Json(ScheduleSlotResponse::from(slot))))
}

/// Remove a meeting slot from a course (Admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{course_id}/schedule/{schedule_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("schedule_id" = Uuid, Path, description = "Schedule slot ID")
    ),
    responses(
        (status = 204, description = "Slot removed"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Course or slot not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn remove_schedule_slot(
    AuthClaims(auth_claims): AuthClaims,
    Path((course_id, schedule_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    let course_repo = CourseRepository::new();

    let course = course_repo
        .find_by_id(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    // A slot hanging off a different course reads as missing, so the
    // path can only ever delete within its own course.
    let slot = course_repo
        .find_slot(schedule_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .filter(|slot| slot.course_id == course_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Schedule slot not found".to_string()))?;

    course_repo.remove_slot(slot.schedule_id).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to remove schedule slot: {}", e),
        )
    })?;

    QUERY_CACHE.invalidate(Resource::Courses);
    notify_schedule_change(&course.code, course_id).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Best-effort fanout to the course roster after a schedule change; a
/// failure here never fails the mutation that triggered it.
async fn notify_schedule_change(course_code: &str, course_id: Uuid) {
    let roster = match EnrollmentRepository::new().find_roster(course_id).await {
        Ok(roster) => roster,
        Err(e) => {
            tracing::error!("Failed to load roster for schedule notice: {}", e);
            return;
        }
    };

    let student_ids: Vec<Uuid> = roster.iter().map(|row| row.student_id).collect();
    let body = format!("The meeting times for {} have changed", course_code);
    if let Err(e) = NotificationRepository::new()
        .notify_roster(&student_ids, "Schedule updated", &body)
        .await
    {
        tracing::error!("Failed to send schedule notice: {}", e);
    }
}
