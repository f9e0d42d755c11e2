use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use super::dto::{
    CreateDepartmentRequest, DepartmentListResponse, DepartmentResponse, UpdateDepartmentRequest,
};
use crate::cache::{QUERY_CACHE, Resource};
use crate::extractor::AuthClaims;
use crate::middleware::permission;
use crate::repositories::{CourseRepository, DepartmentRepository, DepartmentUpdate};

pub fn create_route() -> Router {
    Router::new()
        .route("/api/v1/departments", post(create_department))
        .route("/api/v1/departments", get(get_all_departments))
        .route("/api/v1/departments/{department_id}", get(get_department))
        .route(
            "/api/v1/departments/{department_id}",
            put(update_department),
        )
        .route(
            "/api/v1/departments/{department_id}",
            delete(delete_department),
        )
}

/// Create a new department (Admin only)
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = DepartmentResponse),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 409, description = "Department code already exists"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn create_department(
    AuthClaims(auth_claims): AuthClaims,
    Json(payload): Json<CreateDepartmentRequest>,
) -> Result<(StatusCode, Json<DepartmentResponse>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    let code = payload.code.trim().to_string();
    let name = payload.name.trim().to_string();
    if code.is_empty() || name.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Code and name are required".to_string(),
        ));
    }

    let dept_repo = DepartmentRepository::new();

    let existing = dept_repo.find_by_code(&code).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {}", e),
        )
    })?;
    if existing.is_some() {
        return Err((
            StatusCode::CONFLICT,
            format!("Department code '{}' already exists", code),
        ));
    }

    let department = dept_repo
        .create(Uuid::new_v4(), code, name)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create department: {}", e),
            )
        })?;

    QUERY_CACHE.invalidate(Resource::Departments);

    Ok((
        StatusCode::CREATED,
        Json(DepartmentResponse::from(department)),
    ))
}

/// Get all departments (Authenticated users)
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "Departments retrieved", body = DepartmentListResponse),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn get_all_departments(
    AuthClaims(_auth_claims): AuthClaims,
) -> Result<(StatusCode, Json<DepartmentListResponse>), (StatusCode, String)> {
    if let Some(rows) = QUERY_CACHE.get_departments() {
        return Ok((
            StatusCode::OK,
            Json(DepartmentListResponse::from_rows(rows)),
        ));
    }

    let dept_repo = DepartmentRepository::new();
    let departments = dept_repo.find_all().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to get departments: {}", e),
        )
    })?;

    QUERY_CACHE.insert_departments(departments.clone());

    Ok((
        StatusCode::OK,
        Json(DepartmentListResponse::from_rows(departments)),
    ))
}

/// Get department by ID (Authenticated users)
#[utoipa::path(
    get,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id" = Uuid, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department retrieved", body = DepartmentResponse),
        (status = 404, description = "Department not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn get_department(
    AuthClaims(_auth_claims): AuthClaims,
    Path(department_id): Path<Uuid>,
) -> Result<(StatusCode, Json<DepartmentResponse>), (StatusCode, String)> {
    let dept_repo = DepartmentRepository::new();

    let department = dept_repo
        .find_by_id(department_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Department not found".to_string()))?;

    Ok((StatusCode::OK, Json(DepartmentResponse::from(department))))
}

/// Update a department (Admin only)
#[utoipa::path(
    put,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id" = Uuid, Path, description = "Department ID")
    ),
    request_body = UpdateDepartmentRequest,
    responses(
        (status = 200, description = "Department updated", body = DepartmentResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Department not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn update_department(
    AuthClaims(auth_claims): AuthClaims,
    Path(department_id): Path<Uuid>,
    Json(payload): Json<UpdateDepartmentRequest>,
) -> Result<(StatusCode, Json<DepartmentResponse>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    let dept_repo = DepartmentRepository::new();

    dept_repo
        .find_by_id(department_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Department not found".to_string()))?;

    let department = dept_repo
        .update(
            department_id,
            DepartmentUpdate {
                code: payload.code,
                name: payload.name,
            },
        )
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to update department: {}", e),
            )
        })?;

    QUERY_CACHE.invalidate(Resource::Departments);

    Ok((StatusCode::OK, Json(DepartmentResponse::from(department))))
}

/// Delete a department (Admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id" = Uuid, Path, description = "Department ID")
    ),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department still referenced by courses"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn delete_department(
    AuthClaims(auth_claims): AuthClaims,
    Path(department_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    let dept_repo = DepartmentRepository::new();

    dept_repo
        .find_by_id(department_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Department not found".to_string()))?;

    // The RESTRICT foreign key would reject the delete anyway; counting
    // first keeps the conflict response distinct from a database failure.
    let course_count = CourseRepository::new()
        .count_in_department(department_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })?;
    if course_count > 0 {
        return Err((
            StatusCode::CONFLICT,
            format!(
                "Department still has {} course(s); reassign or delete them first",
                course_count
            ),
        ));
    }

    dept_repo.delete(department_id).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to delete department: {}", e),
        )
    })?;

    QUERY_CACHE.invalidate(Resource::Departments);

    Ok(StatusCode::NO_CONTENT)
}
