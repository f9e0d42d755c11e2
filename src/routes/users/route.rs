use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use super::dto::{
    CreateUserRequest, UpdateUserRequest, UserListResponse, UserQueryParams, UserResponse,
};
use crate::config::APP_CONFIG;
use crate::entities::sea_orm_active_enums::RoleEnum;
use crate::extractor::AuthClaims;
use crate::middleware::permission;
use crate::repositories::{DepartmentRepository, UserRepository, UserUpdate};

pub fn create_route() -> Router {
    Router::new()
        .route("/api/v1/users", get(list_users).post(create_user))
        .route(
            "/api/v1/users/{user_id}",
            get(get_user).put(update_user),
        )
        .route("/api/v1/users/{user_id}/deactivate", post(deactivate_user))
}

/// List user accounts with optional role filter and search (Admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserQueryParams),
    responses(
        (status = 200, description = "One page of users", body = UserListResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    AuthClaims(auth_claims): AuthClaims,
    Query(params): Query<UserQueryParams>,
) -> Result<(StatusCode, Json<UserListResponse>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    let page = params.page.unwrap_or(1).max(1);
    let (users, total_items) = UserRepository::new()
        .find_all_with_pagination(page, APP_CONFIG.page_size, params.role, params.search)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to query users: {}", e),
            )
        })?;

    Ok((
        StatusCode::OK,
        Json(UserListResponse::from_rows(
            &users,
            page,
            total_items,
            APP_CONFIG.page_size,
        )),
    ))
}

/// One user account (Admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User detail", body = UserResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    AuthClaims(auth_claims): AuthClaims,
    Path(user_id): Path<Uuid>,
) -> Result<(StatusCode, Json<UserResponse>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    let user = UserRepository::new()
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "User not found".to_string()))?;

    Ok((StatusCode::OK, Json(UserResponse::from(&user))))
}

/// Create a user account (Admin only)
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn create_user(
    AuthClaims(auth_claims): AuthClaims,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    payload
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let user_repo = UserRepository::new();

    let email = payload.email.trim().to_lowercase();
    let existing = user_repo.find_by_email(&email).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {}", e),
        )
    })?;
    if existing.is_some() {
        return Err((
            StatusCode::CONFLICT,
            format!("Email '{}' is already registered", email),
        ));
    }

    if let Some(department_id) = payload.department_id {
        DepartmentRepository::new()
            .find_by_id(department_id)
            .await
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", e),
                )
            })?
            .ok_or_else(|| (StatusCode::BAD_REQUEST, "Unknown department".to_string()))?;
    }

    // Student codes only make sense on student accounts.
    let student_code = (payload.role == RoleEnum::Student)
        .then(|| payload.student_code.as_deref().map(str::trim))
        .flatten()
        .map(str::to_string);

    let user = user_repo
        .create(
            Uuid::new_v4(),
            payload.first_name.trim().to_string(),
            payload.last_name.trim().to_string(),
            email,
            payload.role,
            student_code,
            payload.department_id,
        )
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create user: {}", e),
            )
        })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Update a user account (Admin only)
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_user(
    AuthClaims(auth_claims): AuthClaims,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    payload
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let user_repo = UserRepository::new();

    user_repo
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "User not found".to_string()))?;

    let user = user_repo
        .update(
            user_id,
            UserUpdate {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email.map(|e| e.trim().to_lowercase()),
                role: payload.role,
                student_code: payload.student_code,
                department_id: payload.department_id,
                active: payload.active,
            },
        )
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to update user: {}", e),
            )
        })?;

    Ok((StatusCode::OK, Json(UserResponse::from(&user))))
}

/// Deactivate a user account; the row is kept so history stays intact
/// (Admin only)
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/deactivate",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deactivated", body = UserResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn deactivate_user(
    AuthClaims(auth_claims): AuthClaims,
    Path(user_id): Path<Uuid>,
) -> Result<(StatusCode, Json<UserResponse>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    let user = UserRepository::new()
        .deactivate(user_id)
        .await
        .map_err(|e| {
            let message = e.to_string();
            if message.contains("not found") {
                (StatusCode::NOT_FOUND, "User not found".to_string())
            } else {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to deactivate user: {}", message),
                )
            }
        })?;

    Ok((StatusCode::OK, Json(UserResponse::from(&user))))
}
