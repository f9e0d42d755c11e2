use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::cache::{CacheStats, QUERY_CACHE, Resource};
use crate::extractor::AuthClaims;
use crate::middleware::permission;

pub fn create_route() -> Router {
    Router::new()
        .route("/api/v1/admin/cache/stats", get(cache_stats))
        .route("/api/v1/admin/cache/invalidate", post(invalidate_cache))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InvalidateRequest {
    /// Omit to drop every cached family.
    pub resource: Option<Resource>,
}

/// Entry counts per cached family (Admin only)
#[utoipa::path(
    get,
    path = "/api/v1/admin/cache/stats",
    responses(
        (status = 200, description = "Cache statistics", body = CacheStats),
        (status = 403, description = "Forbidden - Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn cache_stats(
    AuthClaims(auth_claims): AuthClaims,
) -> Result<(StatusCode, Json<CacheStats>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;
    Ok((StatusCode::OK, Json(QUERY_CACHE.stats())))
}

/// Manually invalidate one resource's cached families, or everything
/// (Admin only)
#[utoipa::path(
    post,
    path = "/api/v1/admin/cache/invalidate",
    request_body = InvalidateRequest,
    responses(
        (status = 200, description = "Cache invalidated", body = CacheStats),
        (status = 403, description = "Forbidden - Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn invalidate_cache(
    AuthClaims(auth_claims): AuthClaims,
    Json(payload): Json<InvalidateRequest>,
) -> Result<(StatusCode, Json<CacheStats>), (StatusCode, String)> {
    permission::require_admin(&auth_claims)?;

    match payload.resource {
        Some(resource) => QUERY_CACHE.invalidate(resource),
        None => QUERY_CACHE.clear_all(),
    }

    Ok((StatusCode::OK, Json(QUERY_CACHE.stats())))
}
