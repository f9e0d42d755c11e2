use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::time::Instant;

use crate::config::APP_CONFIG;

fn should_ignore_path(path: &str) -> bool {
    matches!(path, "/health" | "/health/")
}

fn log_body_for(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn redact_sensitive_fields(mut value: Value) -> Value {
    if let Value::Object(ref mut map) = value {
        let sensitive_fields = ["token", "jwt", "authorization", "secret", "api_key"];
        for field in sensitive_fields {
            if map.contains_key(field) {
                map.insert(field.to_string(), Value::String("[REDACTED]".to_string()));
            }
        }
    }
    value
}

fn redact_sensitive_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = headers.clone();
    for name in ["authorization", "cookie", "x-api-key"] {
        if let Ok(name) = name.parse::<http::HeaderName>() {
            if filtered.contains_key(&name) {
                filtered.insert(name, "[REDACTED]".parse().unwrap());
            }
        }
    }
    filtered
}

async fn buffer_body<B>(direction: &str, body: B) -> Result<Bytes, (StatusCode, String)>
where
    B: BodyExt,
    B::Error: std::fmt::Display,
{
    match body.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) => Err((
            StatusCode::BAD_REQUEST,
            format!("failed to read {direction} body: {err}"),
        )),
    }
}

fn parse_redacted(bytes: &Bytes) -> Value {
    let body_str = String::from_utf8_lossy(bytes);
    match serde_json::from_str::<Value>(&body_str) {
        Ok(json) => redact_sensitive_fields(json),
        Err(_) => Value::Object(serde_json::Map::new()),
    }
}

/// Logs one structured event per completed request: method, path,
/// request id, status and latency, plus the redacted JSON bodies for
/// mutating methods. Health checks and CORS preflights stay out of
/// the log.
pub async fn http_logger(
    req: Request,
    next: Next,
) -> std::result::Result<impl IntoResponse, (StatusCode, String)> {
    let start_time = Instant::now();

    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = uri.path().to_string();

    if should_ignore_path(&path) || method == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let req_headers = req.headers().clone();
    let x_request_id = req_headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let log_bodies = log_body_for(&method);

    let (req, req_body) = if log_bodies {
        let (parts, body) = req.into_parts();
        let bytes = buffer_body("request", body).await?;
        let parsed = parse_redacted(&bytes);
        (Request::from_parts(parts, Body::from(bytes)), parsed)
    } else {
        (req, Value::Object(serde_json::Map::new()))
    };

    let mut response = next.run(req).await;

    let latency = start_time.elapsed();
    let status = response.status();
    let res_headers = response.headers().clone();

    let res_body = if log_bodies {
        let (parts, body) = response.into_parts();
        let bytes = buffer_body("response", body).await?;
        let parsed = parse_redacted(&bytes);
        response = Response::from_parts(parts, Body::from(bytes));
        parsed
    } else {
        Value::Object(serde_json::Map::new())
    };

    tracing::info!(
        method = ?method,
        uri = ?uri,
        path = %path,
        x_request_id = %x_request_id,
        req_headers = ?redact_sensitive_headers(&req_headers),
        req_body = %req_body,
        status = ?status,
        latency_ms = latency.as_millis(),
        res_headers = ?redact_sensitive_headers(&res_headers),
        res_body = %res_body,
        app_env = %APP_CONFIG.app_env,
        "HTTP request completed"
    );

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn health_checks_are_ignored() {
        assert!(should_ignore_path("/health"));
        assert!(should_ignore_path("/health/"));
        assert!(!should_ignore_path("/api/v1/courses"));
    }

    #[test]
    fn bodies_are_logged_for_mutating_methods_only() {
        assert!(log_body_for(&Method::POST));
        assert!(log_body_for(&Method::PUT));
        assert!(log_body_for(&Method::PATCH));
        assert!(!log_body_for(&Method::GET));
        assert!(!log_body_for(&Method::DELETE));
    }

    #[test]
    fn sensitive_body_fields_are_redacted() {
        let body = json!({"token": "abc", "title": "Midterm moved"});
        let redacted = redact_sensitive_fields(body);
        assert_eq!(redacted["token"], "[REDACTED]");
        assert_eq!(redacted["title"], "Midterm moved");
    }

    #[test]
    fn authorization_header_is_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc".parse().unwrap());
        headers.insert("accept", "application/json".parse().unwrap());
        let filtered = redact_sensitive_headers(&headers);
        assert_eq!(filtered["authorization"], "[REDACTED]");
        assert_eq!(filtered["accept"], "application/json");
    }
}
