use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::JobStatus;

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

/// Identifier wrapper for filed reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

/// Identifier wrapper for platform accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Controls which features an account can access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    JobSeeker,
    Recruiter,
}

/// Resolved account as handed over by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub account_type: AccountType,
    pub is_staff: bool,
    pub is_active: bool,
}

impl UserIdentity {
    pub fn is_recruiter(&self) -> bool {
        self.account_type == AccountType::Recruiter
    }
}

/// Whoever is behind the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Authenticated(UserIdentity),
}

impl Principal {
    /// The acting identity, if it is authenticated and still active.
    pub fn identity(&self) -> Option<&UserIdentity> {
        match self {
            Principal::Authenticated(identity) if identity.is_active => Some(identity),
            _ => None,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.identity().is_some_and(|identity| identity.is_staff)
    }

    pub fn is_user(&self, user: &UserId) -> bool {
        self.identity().is_some_and(|identity| &identity.id == user)
    }
}

impl From<UserIdentity> for Principal {
    fn from(value: UserIdentity) -> Self {
        Principal::Authenticated(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkType {
    Remote,
    #[default]
    OnSite,
    Hybrid,
}

/// Content supplied by a recruiter when creating a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub work_type: WorkType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A posting with its moderation-relevant status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub owner: UserId,
    pub posting: JobPosting,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub moderated_by: Option<UserId>,
    pub moderated_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.posting
            .expires_at
            .is_some_and(|expires_at| expires_at <= now)
    }
}

/// Category a reporter picks when flagging a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportReason {
    Spam,
    Inappropriate,
    Fake,
    Discriminatory,
    Other,
}

impl ReportReason {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Spam,
            Self::Inappropriate,
            Self::Fake,
            Self::Discriminatory,
            Self::Other,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Spam => "Spam",
            Self::Inappropriate => "Inappropriate Content",
            Self::Fake => "Fake Job Posting",
            Self::Discriminatory => "Discriminatory",
            Self::Other => "Other",
        }
    }
}

/// A user-filed flag against a posting. One per (job, reporter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub id: ReportId,
    pub job_id: JobId,
    pub reporter: UserId,
    pub reason: ReportReason,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed: bool,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// What an audit entry is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum AuditSubject {
    Job(JobId),
    Report(ReportId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuditAction {
    JobCreated { status: JobStatus },
    StatusChanged { from: JobStatus, to: JobStatus },
    ReportFiled { job_id: JobId, reason: ReportReason },
    ReportReviewed { job_id: JobId },
}

/// Immutable record of who changed what and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor: UserId,
    pub subject: AuditSubject,
    pub action: AuditAction,
    pub at: DateTime<Utc>,
}

impl AuditEntry {
    /// Whether the entry concerns the job, directly or through one of its reports.
    pub fn concerns_job(&self, job_id: &JobId) -> bool {
        match (&self.subject, &self.action) {
            (AuditSubject::Job(id), _) => id == job_id,
            (_, AuditAction::ReportFiled { job_id: id, .. })
            | (_, AuditAction::ReportReviewed { job_id: id }) => id == job_id,
            _ => false,
        }
    }
}
