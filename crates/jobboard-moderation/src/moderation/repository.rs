use chrono::{DateTime, Utc};

use super::domain::{AuditEntry, Job, JobId, JobReport, ReportId, UserId, UserIdentity};
use super::status::JobStatus;

/// Storage abstraction for postings.
pub trait JobRepository: Send + Sync {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError>;
    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    /// Replace the stored job only if its status still equals `expected`.
    ///
    /// Fails with [`RepositoryError::Conflict`] when another writer got there first and
    /// [`RepositoryError::NotFound`] when the job is unknown.
    fn update_if_status(&self, job: Job, expected: JobStatus) -> Result<(), RepositoryError>;
    fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<Job>, RepositoryError>;
    fn all(&self) -> Result<Vec<Job>, RepositoryError>;
}

/// Storage abstraction for filed reports.
///
/// Implementations enforce the (job, reporter) uniqueness constraint themselves so two
/// racing inserts cannot both land.
pub trait ReportRepository: Send + Sync {
    /// Fails with [`RepositoryError::Duplicate`] if the reporter already flagged the job and
    /// with [`RepositoryError::Conflict`] if the report id is already taken.
    fn insert(&self, report: JobReport) -> Result<JobReport, RepositoryError>;
    fn fetch(&self, id: &ReportId) -> Result<Option<JobReport>, RepositoryError>;
    /// Record the first review of a report. Later calls leave the stored review untouched.
    fn mark_reviewed(
        &self,
        id: &ReportId,
        reviewer: &UserId,
        at: DateTime<Utc>,
    ) -> Result<ReviewMark, RepositoryError>;
    fn unreviewed(&self) -> Result<Vec<JobReport>, RepositoryError>;
    fn all(&self) -> Result<Vec<JobReport>, RepositoryError>;
}

/// Stored report after a review request, and whether that request performed the review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewMark {
    pub report: JobReport,
    pub first_review: bool,
}

/// Append-only moderation history.
pub trait AuditLog: Send + Sync {
    fn append(&self, entry: AuditEntry) -> Result<(), RepositoryError>;
    fn entries(&self) -> Result<Vec<AuditEntry>, RepositoryError>;
}

/// Identity lookups supplied by the authentication layer.
pub trait UserDirectory: Send + Sync {
    fn resolve(&self, id: &UserId) -> Result<Option<UserIdentity>, RepositoryError>;
    /// All administrator identities.
    fn staff(&self) -> Result<Vec<UserIdentity>, RepositoryError>;
}

/// Outbound hook invoked once a report is committed (e-mail, queue, webhook, log).
pub trait NotificationDispatcher: Send + Sync {
    fn notify(
        &self,
        recipients: &[UserIdentity],
        job: &Job,
        report: &JobReport,
    ) -> Result<(), DispatchError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record violates a uniqueness constraint")]
    Duplicate,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Append to the audit log without failing the mutation that produced the entry.
pub(crate) fn append_audit(log: &dyn AuditLog, entry: AuditEntry) {
    if let Err(err) = log.append(entry) {
        tracing::warn!(error = %err, "failed to append moderation audit entry");
    }
}
