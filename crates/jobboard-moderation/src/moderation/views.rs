use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Job, JobId, JobReport, ReportId, ReportReason, UserId, WorkType};
use super::status::JobStatus;

#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub work_type: WorkType,
    pub owner: UserId,
    pub status: JobStatus,
    pub status_label: &'static str,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderated_by: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderated_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn to_view(&self) -> JobView {
        JobView {
            id: self.id.clone(),
            title: self.posting.title.clone(),
            company: self.posting.company.clone(),
            location: self.posting.location.clone(),
            work_type: self.posting.work_type,
            owner: self.owner.clone(),
            status: self.status,
            status_label: self.status.label(),
            created_at: self.created_at,
            expires_at: self.posting.expires_at,
            moderated_by: self.moderated_by.clone(),
            moderated_at: self.moderated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub id: ReportId,
    pub job_id: JobId,
    pub reporter: UserId,
    pub reason: ReportReason,
    pub reason_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl JobReport {
    pub fn to_view(&self) -> ReportView {
        ReportView {
            id: self.id.clone(),
            job_id: self.job_id.clone(),
            reporter: self.reporter.clone(),
            reason: self.reason,
            reason_label: self.reason.label(),
            description: self.description.clone(),
            created_at: self.created_at,
            reviewed: self.reviewed,
            reviewed_by: self.reviewed_by.clone(),
            reviewed_at: self.reviewed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: JobStatus,
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonCount {
    pub reason: ReportReason,
    pub reason_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationStatistics {
    pub jobs_by_status: Vec<StatusCount>,
    pub total_reports: usize,
    pub unreviewed_reports: usize,
    pub reports_by_reason: Vec<ReasonCount>,
}

impl ModerationStatistics {
    pub fn jobs_with_status(&self, status: JobStatus) -> usize {
        self.jobs_by_status
            .iter()
            .find(|entry| entry.status == status)
            .map_or(0, |entry| entry.count)
    }

    pub fn reports_with_reason(&self, reason: ReportReason) -> usize {
        self.reports_by_reason
            .iter()
            .find(|entry| entry.reason == reason)
            .map_or(0, |entry| entry.count)
    }
}

/// Everything the administrator dashboard renders in one read.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationDashboard {
    pub generated_at: DateTime<Utc>,
    pub window_days: i64,
    pub recent_jobs: Vec<JobView>,
    pub unreviewed_reports: Vec<ReportView>,
    pub statistics: ModerationStatistics,
}
