use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use super::dto::{
    CalendarEventListResponse, CalendarEventResponse, CreateEventRequest, ListEventsParams,
    UpdateEventRequest, parse_datetime,
};
use crate::extractor::AuthClaims;
use crate::middleware::permission;
use crate::repositories::{CalendarEventRepository, CalendarEventUpdate, CourseRepository};

pub fn create_route() -> Router {
    Router::new()
        .route("/api/v1/events", get(list_events).post(create_event))
        .route("/api/v1/events/course/{course_id}", get(course_events))
        .route(
            "/api/v1/events/{event_id}",
            put(update_event).delete(delete_event),
        )
}

/// Calendar events overlapping a date range
#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(ListEventsParams),
    responses(
        (status = 200, description = "Events in range", body = CalendarEventListResponse),
        (status = 400, description = "Malformed range"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
pub async fn list_events(
    AuthClaims(_auth_claims): AuthClaims,
    Query(params): Query<ListEventsParams>,
) -> Result<(StatusCode, Json<CalendarEventListResponse>), (StatusCode, String)> {
    let from = params
        .from
        .as_deref()
        .map(parse_datetime)
        .transpose()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let to = params
        .to
        .as_deref()
        .map(parse_datetime)
        .transpose()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    if let (Some(from), Some(to)) = (from, to) {
        if to <= from {
            return Err((
                StatusCode::BAD_REQUEST,
                "Range end must be after range start".to_string(),
            ));
        }
    }

    let events = CalendarEventRepository::new()
        .find_in_range(from, to)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load events: {}", e),
            )
        })?;

    Ok((
        StatusCode::OK,
        Json(CalendarEventListResponse::from_rows(&events)),
    ))
}

/// Events attached to one course
#[utoipa::path(
    get,
    path = "/api/v1/events/course/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Events for the course", body = CalendarEventListResponse),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
pub async fn course_events(
    AuthClaims(_auth_claims): AuthClaims,
    Path(course_id): Path<Uuid>,
) -> Result<(StatusCode, Json<CalendarEventListResponse>), (StatusCode, String)> {
    CourseRepository::new()
        .find_by_id(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    let events = CalendarEventRepository::new()
        .find_for_course(course_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load events: {}", e),
            )
        })?;

    Ok((
        StatusCode::OK,
        Json(CalendarEventListResponse::from_rows(&events)),
    ))
}

/// Create a calendar event (Faculty or admin)
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = CalendarEventResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden - Faculty or admin only"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
pub async fn create_event(
    AuthClaims(auth_claims): AuthClaims,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<CalendarEventResponse>), (StatusCode, String)> {
    permission::require_staff(&auth_claims)?;

    let (starts_at, ends_at) = payload
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    if let Some(course_id) = payload.course_id {
        CourseRepository::new()
            .find_by_id(course_id)
            .await
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", e),
                )
            })?
            .ok_or_else(|| (StatusCode::NOT_FOUND, "Course not found".to_string()))?;
    }

    let created_by = Uuid::parse_str(&auth_claims.user_id).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Invalid user_id: {}", e),
        )
    })?;

    let event = CalendarEventRepository::new()
        .create(
            Uuid::new_v4(),
            payload.title.trim().to_string(),
            payload.description,
            payload.location,
            starts_at,
            ends_at,
            payload.course_id,
            created_by,
        )
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create event: {}", e),
            )
        })?;

    Ok((StatusCode::CREATED, Json(CalendarEventResponse::from(&event))))
}

/// Update a calendar event (Faculty or admin)
#[utoipa::path(
    put,
    path = "/api/v1/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = CalendarEventResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden - Faculty or admin only"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
pub async fn update_event(
    AuthClaims(auth_claims): AuthClaims,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<(StatusCode, Json<CalendarEventResponse>), (StatusCode, String)> {
    permission::require_staff(&auth_claims)?;

    let (starts_at, ends_at) = payload
        .parsed_times()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let event_repo = CalendarEventRepository::new();

    let existing = event_repo
        .find_by_id(event_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Event not found".to_string()))?;

    // The range check runs against whichever bound survives the update.
    let effective_start = starts_at.unwrap_or(existing.starts_at);
    let effective_end = ends_at.unwrap_or(existing.ends_at);
    if effective_end <= effective_start {
        return Err((
            StatusCode::BAD_REQUEST,
            "Event must end after it starts".to_string(),
        ));
    }

    let event = event_repo
        .update(
            event_id,
            CalendarEventUpdate {
                title: payload.title,
                description: payload.description,
                location: payload.location,
                starts_at,
                ends_at,
            },
        )
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to update event: {}", e),
            )
        })?;

    Ok((StatusCode::OK, Json(CalendarEventResponse::from(&event))))
}

/// Delete a calendar event (Faculty or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Forbidden - Faculty or admin only"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
pub async fn delete_event(
    AuthClaims(auth_claims): AuthClaims,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    permission::require_staff(&auth_claims)?;

    CalendarEventRepository::new()
        .delete(event_id)
        .await
        .map_err(|e| {
            let message = e.to_string();
            if message.contains("not found") {
                (StatusCode::NOT_FOUND, "Event not found".to_string())
            } else {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to delete event: {}", message),
                )
            }
        })?;

    Ok(StatusCode::NO_CONTENT)
}
