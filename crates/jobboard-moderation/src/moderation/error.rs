use axum::http::StatusCode;

use super::domain::{JobId, ReportId, UserId};
use super::repository::RepositoryError;
use super::status::JobStatus;

/// Failures surfaced by the moderation core to its caller.
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("job cannot move from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
    #[error("job cannot be created as {0}; use DRAFT or ACTIVE")]
    InvalidInitialStatus(JobStatus),
    #[error("not permitted to perform this action")]
    Unauthorized,
    #[error("authentication required")]
    Unauthenticated,
    #[error("job {0} not found")]
    JobNotFound(JobId),
    #[error("report {0} not found")]
    ReportNotFound(ReportId),
    #[error("you already reported this job")]
    DuplicateReport { job_id: JobId, reporter: UserId },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ModerationError {
    /// Stable identifier the presentation layer can branch on.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::InvalidInitialStatus(_) => "invalid_initial_status",
            Self::Unauthorized => "unauthorized",
            Self::Unauthenticated => "unauthenticated",
            Self::JobNotFound(_) => "job_not_found",
            Self::ReportNotFound(_) => "report_not_found",
            Self::DuplicateReport { .. } => "duplicate_report",
            Self::Repository(_) => "repository",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidTransition { .. } | Self::DuplicateReport { .. } => StatusCode::CONFLICT,
            Self::InvalidInitialStatus(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::JobNotFound(_) | Self::ReportNotFound(_) => StatusCode::NOT_FOUND,
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
