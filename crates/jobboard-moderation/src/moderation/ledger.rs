use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::bulk::BulkOutcome;
use super::domain::{
    AuditAction, AuditEntry, AuditSubject, Job, JobId, JobReport, Principal, ReportId,
    ReportReason,
};
use super::error::ModerationError;
use super::repository::{
    append_audit, AuditLog, Clock, JobRepository, NotificationDispatcher, ReportRepository,
    RepositoryError, UserDirectory,
};
use super::visibility;

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("rpt-{id:06}"))
}

/// Records one report per (job, reporter) and tracks administrator review.
pub struct ReportLedger<J, R> {
    jobs: Arc<J>,
    reports: Arc<R>,
    directory: Arc<dyn UserDirectory>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    audit: Arc<dyn AuditLog>,
    clock: Arc<dyn Clock>,
}

impl<J, R> ReportLedger<J, R>
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    pub fn new(
        jobs: Arc<J>,
        reports: Arc<R>,
        directory: Arc<dyn UserDirectory>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        audit: Arc<dyn AuditLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            jobs,
            reports,
            directory,
            dispatcher,
            audit,
            clock,
        }
    }

    /// File a report against a job the reporter can see.
    ///
    /// The report is committed before administrators are notified; a failed notification
    /// is logged and never undoes or fails the report.
    pub fn file_report(
        &self,
        job_id: &JobId,
        reporter: &Principal,
        reason: ReportReason,
        description: Option<String>,
    ) -> Result<JobReport, ModerationError> {
        let job = self
            .jobs
            .fetch(job_id)?
            .ok_or_else(|| ModerationError::JobNotFound(job_id.clone()))?;
        let identity = reporter
            .identity()
            .ok_or(ModerationError::Unauthenticated)?;

        let now = self.clock.now();
        if !visibility::can_view(&job, reporter, now) {
            return Err(ModerationError::JobNotFound(job_id.clone()));
        }

        let report = JobReport {
            id: next_report_id(),
            job_id: job.id.clone(),
            reporter: identity.id.clone(),
            reason,
            description: description
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
            created_at: now,
            reviewed: false,
            reviewed_by: None,
            reviewed_at: None,
        };

        let stored = match self.reports.insert(report) {
            Ok(stored) => stored,
            Err(RepositoryError::Duplicate) => {
                return Err(ModerationError::DuplicateReport {
                    job_id: job.id.clone(),
                    reporter: identity.id.clone(),
                })
            }
            Err(other) => return Err(other.into()),
        };

        append_audit(
            self.audit.as_ref(),
            AuditEntry {
                actor: identity.id.clone(),
                subject: AuditSubject::Report(stored.id.clone()),
                action: AuditAction::ReportFiled {
                    job_id: job.id.clone(),
                    reason,
                },
                at: now,
            },
        );
        info!(
            report_id = %stored.id,
            job_id = %job.id,
            reporter = %identity.id,
            reason = reason.label(),
            "job report filed"
        );

        self.notify_staff(&job, &stored);
        Ok(stored)
    }

    fn notify_staff(&self, job: &Job, report: &JobReport) {
        let recipients = match self.directory.staff() {
            Ok(recipients) => recipients,
            Err(err) => {
                warn!(report_id = %report.id, error = %err, "could not resolve report notification recipients");
                return;
            }
        };

        if recipients.is_empty() {
            debug!(report_id = %report.id, "no administrators to notify about report");
            return;
        }

        if let Err(err) = self.dispatcher.notify(&recipients, job, report) {
            warn!(
                report_id = %report.id,
                job_id = %job.id,
                recipients = recipients.len(),
                error = %err,
                "report notification failed"
            );
        }
    }

    /// Mark a report reviewed. The first review wins; repeats succeed without changes.
    pub fn mark_reviewed(
        &self,
        report_id: &ReportId,
        admin: &Principal,
    ) -> Result<JobReport, ModerationError> {
        if self.reports.fetch(report_id)?.is_none() {
            return Err(ModerationError::ReportNotFound(report_id.clone()));
        }
        let identity = admin
            .identity()
            .filter(|identity| identity.is_staff)
            .ok_or(ModerationError::Unauthorized)?;

        let now = self.clock.now();
        let mark = match self.reports.mark_reviewed(report_id, &identity.id, now) {
            Ok(mark) => mark,
            Err(RepositoryError::NotFound) => {
                return Err(ModerationError::ReportNotFound(report_id.clone()))
            }
            Err(other) => return Err(other.into()),
        };

        if mark.first_review {
            append_audit(
                self.audit.as_ref(),
                AuditEntry {
                    actor: identity.id.clone(),
                    subject: AuditSubject::Report(report_id.clone()),
                    action: AuditAction::ReportReviewed {
                        job_id: mark.report.job_id.clone(),
                    },
                    at: now,
                },
            );
            info!(report_id = %report_id, reviewer = %identity.id, "job report reviewed");
        } else {
            debug!(report_id = %report_id, reviewer = %identity.id, "job report already reviewed");
        }

        Ok(mark.report)
    }

    pub fn bulk_mark_reviewed(
        &self,
        report_ids: &[ReportId],
        admin: &Principal,
    ) -> BulkOutcome<ReportId, JobReport> {
        BulkOutcome::collect(report_ids, |report_id| {
            self.mark_reviewed(report_id, admin)
        })
    }
}
