use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Duration;
use serde::Deserialize;
use serde_json::json;

use super::bulk::BulkAction;
use super::domain::{JobId, JobPosting, Principal, ReportId, ReportReason};
use super::error::ModerationError;
use super::repository::{JobRepository, ReportRepository};
use super::service::ModerationService;
use super::status::JobStatus;
use super::views::{JobView, ReportView};
use crate::config::MAX_WINDOW_DAYS;

/// Header carrying the user id resolved by the upstream authentication layer.
pub const USER_HEADER: &str = "x-user-id";

type SharedService<J, R> = Arc<ModerationService<J, R>>;

/// Router builder exposing job, report and moderation endpoints.
pub fn moderation_router<J, R>(service: SharedService<J, R>) -> Router
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    Router::new()
        .route("/api/v1/jobs", post(create_job_handler::<J, R>))
        .route("/api/v1/jobs/:job_id", get(job_handler::<J, R>))
        .route("/api/v1/jobs/:job_id/status", post(transition_handler::<J, R>))
        .route("/api/v1/jobs/:job_id/reports", post(report_handler::<J, R>))
        .route(
            "/api/v1/moderation/reports/:report_id/review",
            post(review_handler::<J, R>),
        )
        .route("/api/v1/moderation/bulk", post(bulk_handler::<J, R>))
        .route(
            "/api/v1/moderation/dashboard",
            get(dashboard_handler::<J, R>),
        )
        .route(
            "/api/v1/moderation/jobs/:job_id/audit",
            get(audit_handler::<J, R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateJobRequest {
    #[serde(flatten)]
    pub(crate) posting: JobPosting,
    #[serde(default = "default_initial_status")]
    pub(crate) status: JobStatus,
}

fn default_initial_status() -> JobStatus {
    JobStatus::Active
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRequest {
    pub(crate) status: JobStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportRequest {
    pub(crate) reason: ReportReason,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkRequest {
    pub(crate) action: BulkAction,
    pub(crate) ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardQuery {
    #[serde(default)]
    pub(crate) window_days: Option<i64>,
}

fn error_response(error: ModerationError) -> Response {
    let status = error.status_code();
    let payload = json!({
        "error": error.to_string(),
        "kind": error.kind(),
    });
    (status, axum::Json(payload)).into_response()
}

fn principal<J, R>(
    service: &ModerationService<J, R>,
    headers: &HeaderMap,
) -> Result<Principal, ModerationError>
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    let user_id = headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok());
    service.authenticate(user_id)
}

fn job_response(status: StatusCode, view: JobView) -> Response {
    (status, axum::Json(view)).into_response()
}

fn report_response(status: StatusCode, view: ReportView) -> Response {
    (status, axum::Json(view)).into_response()
}

pub(crate) async fn create_job_handler<J, R>(
    State(service): State<SharedService<J, R>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<CreateJobRequest>,
) -> Response
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    let result = principal(&service, &headers)
        .and_then(|owner| service.create_job(&owner, request.posting, request.status));
    match result {
        Ok(job) => job_response(StatusCode::CREATED, job.to_view()),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn job_handler<J, R>(
    State(service): State<SharedService<J, R>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    let result = principal(&service, &headers)
        .and_then(|viewer| service.view_job(&JobId(job_id), &viewer));
    match result {
        Ok(job) => job_response(StatusCode::OK, job.to_view()),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transition_handler<J, R>(
    State(service): State<SharedService<J, R>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    let result = principal(&service, &headers)
        .and_then(|actor| service.transition(&JobId(job_id), request.status, &actor));
    match result {
        Ok(job) => job_response(StatusCode::OK, job.to_view()),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<J, R>(
    State(service): State<SharedService<J, R>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<ReportRequest>,
) -> Response
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    let result = principal(&service, &headers).and_then(|reporter| {
        service.file_report(
            &JobId(job_id),
            &reporter,
            request.reason,
            request.description,
        )
    });
    match result {
        Ok(report) => report_response(StatusCode::CREATED, report.to_view()),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<J, R>(
    State(service): State<SharedService<J, R>>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    let result = principal(&service, &headers)
        .and_then(|admin| service.mark_reviewed(&ReportId(report_id), &admin));
    match result {
        Ok(report) => report_response(StatusCode::OK, report.to_view()),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn bulk_handler<J, R>(
    State(service): State<SharedService<J, R>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<BulkRequest>,
) -> Response
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    match principal(&service, &headers) {
        Ok(actor) => {
            let summary = service.bulk(request.action, &request.ids, &actor);
            (StatusCode::OK, axum::Json(summary)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn dashboard_handler<J, R>(
    State(service): State<SharedService<J, R>>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Response
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    let window = match query.window_days {
        Some(days) if (1..=MAX_WINDOW_DAYS).contains(&days) => Some(Duration::days(days)),
        Some(days) => {
            let payload = json!({
                "error": format!("window_days must be between 1 and {MAX_WINDOW_DAYS} (found {days})"),
                "kind": "invalid_window",
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
        None => None,
    };

    let result =
        principal(&service, &headers).and_then(|viewer| service.dashboard(&viewer, window));
    match result {
        Ok(dashboard) => (StatusCode::OK, axum::Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn audit_handler<J, R>(
    State(service): State<SharedService<J, R>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    let result = principal(&service, &headers)
        .and_then(|viewer| service.audit_trail(&JobId(job_id), &viewer));
    match result {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}
