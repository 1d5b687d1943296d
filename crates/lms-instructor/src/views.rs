//! HTTP handlers for the instructor API.
//!
//! - `GET /health`
//! - `POST /courses/{course_id}/instructor/api/students_query`
//!
//! Errors are rendered as `{"error": "...", "status": <code>}` with the
//! status taken from [`LmsError::status_code`].

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lms_core::logging::request_span;
use lms_core::{LmsError, StartupContext};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::criterion::{parse_all, RawCriterion};
use crate::data_access::get_users;
use crate::results::StudentRef;
use crate::store::StudentStore;

/// Header carrying the request id, echoed on every response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The startup context.
    pub context: Arc<StartupContext>,
    /// The store queries run against.
    pub store: Arc<dyn StudentStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// An [`LmsError`] rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError(pub LmsError);

impl From<LmsError> for ApiError {
    fn from(err: LmsError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(LmsError::BadRequest(rejection.body_text()))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

/// Body of a students query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentsQueryRequest {
    /// The criteria, in the order the instructor added them.
    #[serde(default)]
    pub queries: Vec<RawCriterion>,
}

/// Result of a students query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentsQueryResponse {
    /// The course that was queried.
    pub course_id: String,
    /// Number of matching students.
    pub count: usize,
    /// Matching students, ordered by id.
    pub students: Vec<StudentRef>,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "services": state.context.services().names(),
    }))
}

/// `POST /courses/{course_id}/instructor/api/students_query`
pub async fn students_query(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    payload: Result<Json<StudentsQueryRequest>, JsonRejection>,
) -> Result<Json<StudentsQueryResponse>, ApiError> {
    let Json(request) = payload?;
    let queries = parse_all(request.queries)?;

    let students: Vec<StudentRef> = get_users(state.store.as_ref(), &course_id, &queries)
        .await?
        .into_iter()
        .collect();

    Ok(Json(StudentsQueryResponse {
        course_id,
        count: students.len(),
        students,
    }))
}

/// Middleware that runs each request inside a span tagged with its id.
///
/// An incoming `x-request-id` header is reused; otherwise a UUID v4 is
/// generated.
pub async fn request_id(request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), ToString::to_string);

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = request_span(&id);
    let started = Instant::now();

    let mut response = next.run(request).instrument(span.clone()).await;

    span.in_scope(|| {
        tracing::info!(
            %method,
            %path,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "request finished"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status() {
        let response = ApiError(LmsError::InvalidCriterion("bad".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError(LmsError::DatabaseError("down".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_request_defaults_to_no_queries() {
        let request: StudentsQueryRequest = serde_json::from_str("{}").unwrap();
        assert!(request.queries.is_empty());
    }
}
