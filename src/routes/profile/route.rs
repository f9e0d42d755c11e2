use axum::{Json, Router, http::StatusCode, routing::get};
use uuid::Uuid;

use super::dto::{NavigationResponse, ProfileResponse};
use crate::extractor::AuthClaims;
use crate::navigation::nav_entries;
use crate::repositories::{DepartmentRepository, NotificationRepository, UserRepository};

pub fn create_route() -> Router {
    Router::new()
        .route("/api/v1/me", get(my_profile))
        .route("/api/v1/me/navigation", get(my_navigation))
}

/// The caller's own account with their department
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Profile of the caller", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account no longer exists"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn my_profile(
    AuthClaims(auth_claims): AuthClaims,
) -> Result<(StatusCode, Json<ProfileResponse>), (StatusCode, String)> {
    let user_id = Uuid::parse_str(&auth_claims.user_id).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Invalid user_id: {}", e),
        )
    })?;

    let user = UserRepository::new()
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Account no longer exists".to_string()))?;

    let department = match user.department_id {
        Some(department_id) => DepartmentRepository::new()
            .find_by_id(department_id)
            .await
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", e),
                )
            })?,
        None => None,
    };

    Ok((
        StatusCode::OK,
        Json(ProfileResponse::from_user(&user, department.as_ref())),
    ))
}

/// Navigation entries for the caller's role, with the unread badge
#[utoipa::path(
    get,
    path = "/api/v1/me/navigation",
    responses(
        (status = 200, description = "Navigation for the caller", body = NavigationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn my_navigation(
    AuthClaims(auth_claims): AuthClaims,
) -> Result<(StatusCode, Json<NavigationResponse>), (StatusCode, String)> {
    let user_id = Uuid::parse_str(&auth_claims.user_id).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Invalid user_id: {}", e),
        )
    })?;

    let unread_notifications = NotificationRepository::new()
        .unread_count(user_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to count notifications: {}", e),
            )
        })?;

    Ok((
        StatusCode::OK,
        Json(NavigationResponse {
            role: auth_claims.role,
            entries: nav_entries(&auth_claims.role),
            unread_notifications,
        }),
    ))
}
