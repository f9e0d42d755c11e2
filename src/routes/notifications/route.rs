use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use super::dto::{
    BroadcastRequest, BroadcastResponse, NotificationListResponse, NotificationResponse,
    SendNotificationRequest, UnreadCountResponse,
};
use crate::extractor::AuthClaims;
use crate::middleware::permission;
use crate::repositories::{NotificationRepository, UserRepository};

pub fn create_route() -> Router {
    Router::new()
        .route("/api/v1/notifications", get(my_notifications).post(send))
        .route("/api/v1/notifications/unread-count", get(unread_count))
        .route("/api/v1/notifications/broadcast", post(broadcast))
        .route(
            "/api/v1/notifications/{notification_id}/read",
            post(mark_read),
        )
        .route("/api/v1/notifications/read-all", post(mark_all_read))
}

fn parse_user_id(auth: &crate::extractor::TokenClaims) -> Result<Uuid, (StatusCode, String)> {
    Uuid::parse_str(&auth.user_id).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Invalid user_id: {}", e),
        )
    })
}

/// The caller's inbox, split into unread and read tabs
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Notifications for the caller", body = NotificationListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn my_notifications(
    AuthClaims(auth_claims): AuthClaims,
) -> Result<(StatusCode, Json<NotificationListResponse>), (StatusCode, String)> {
    let user_id = parse_user_id(&auth_claims)?;

    let rows = NotificationRepository::new()
        .find_for_user(user_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load notifications: {}", e),
            )
        })?;

    Ok((
        StatusCode::OK,
        Json(NotificationListResponse::from_rows(&rows)),
    ))
}

/// Unread badge count for the navigation bar
#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn unread_count(
    AuthClaims(auth_claims): AuthClaims,
) -> Result<(StatusCode, Json<UnreadCountResponse>), (StatusCode, String)> {
    let user_id = parse_user_id(&auth_claims)?;

    let unread_count = NotificationRepository::new()
        .unread_count(user_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to count notifications: {}", e),
            )
        })?;

    Ok((StatusCode::OK, Json(UnreadCountResponse { unread_count })))
}

/// Mark one of the caller's notifications as read; already-read rows
/// are left untouched
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{notification_id}/read",
    params(
        ("notification_id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked read", body = NotificationResponse),
        (status = 404, description = "Notification not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_read(
    AuthClaims(auth_claims): AuthClaims,
    Path(notification_id): Path<Uuid>,
) -> Result<(StatusCode, Json<NotificationResponse>), (StatusCode, String)> {
    let user_id = parse_user_id(&auth_claims)?;

    let row = NotificationRepository::new()
        .mark_read(notification_id, user_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to mark notification read: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Notification not found".to_string()))?;

    Ok((StatusCode::OK, Json(NotificationResponse::from(&row))))
}

/// Mark every unread notification of the caller as read
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "All notifications marked read", body = UnreadCountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_all_read(
    AuthClaims(auth_claims): AuthClaims,
) -> Result<(StatusCode, Json<UnreadCountResponse>), (StatusCode, String)> {
    let user_id = parse_user_id(&auth_claims)?;

    NotificationRepository::new()
        .mark_all_read(user_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to mark notifications read: {}", e),
            )
        })?;

    Ok((StatusCode::OK, Json(UnreadCountResponse { unread_count: 0 })))
}

/// Send a notification to one user (Faculty or admin)
#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = SendNotificationRequest,
    responses(
        (status = 201, description = "Notification sent", body = NotificationResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden - Faculty or admin only"),
        (status = 404, description = "Recipient not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn send(
    AuthClaims(auth_claims): AuthClaims,
    Json(payload): Json<SendNotificationRequest>,
) -> Result<(StatusCode, Json<NotificationResponse>), (StatusCode, String)> {
    permission::require_staff(&auth_claims)?;

    payload
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    UserRepository::new()
        .find_by_id(payload.user_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Recipient not found".to_string()))?;

    let row = NotificationRepository::new()
        .create(
            Uuid::new_v4(),
            payload.user_id,
            payload.title.trim().to_string(),
            payload.body.trim().to_string(),
        )
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to send notification: {}", e),
            )
        })?;

    Ok((StatusCode::CREATED, Json(NotificationResponse::from(&row))))
}

/// Broadcast a notification to every active user (Admin only)
#[utoipa::path(
    post,
    path = "/api/v1/notifications/broadcast",
    request_body = BroadcastRequest,
    responses(
        (status = 201, description = "Broadcast sent", body = BroadcastResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn broadcast(
    AuthClaims(auth_claims): AuthClaims,
    Json(payload): Json<BroadcastRequest>,
) -> Result<(StatusCode, Json<BroadcastResponse>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    payload
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let recipients = NotificationRepository::new()
        .broadcast(payload.title.trim(), payload.body.trim())
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to broadcast: {}", e),
            )
        })?;

    Ok((StatusCode::CREATED, Json(BroadcastResponse { recipients })))
}
