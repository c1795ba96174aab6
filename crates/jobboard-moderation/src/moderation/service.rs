use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use super::aggregator::ModerationAggregator;
use super::bulk::{BulkAction, BulkOutcome, BulkSummaryView};
use super::domain::{
    AuditEntry, Job, JobId, JobPosting, JobReport, Principal, ReportId, ReportReason, UserId,
};
use super::error::ModerationError;
use super::ledger::ReportLedger;
use super::machine::JobStatusMachine;
use super::repository::{
    AuditLog, Clock, JobRepository, NotificationDispatcher, ReportRepository, UserDirectory,
};
use super::status::JobStatus;
use super::views::{ModerationDashboard, ModerationStatistics};
use super::visibility;
use crate::config::ModerationConfig;

/// External collaborators the moderation core consumes but does not implement.
#[derive(Clone)]
pub struct ModerationCollaborators {
    pub directory: Arc<dyn UserDirectory>,
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    pub audit: Arc<dyn AuditLog>,
    pub clock: Arc<dyn Clock>,
}

/// Facade composing the status machine, report ledger and aggregator over shared stores.
pub struct ModerationService<J, R> {
    machine: JobStatusMachine<J>,
    ledger: ReportLedger<J, R>,
    aggregator: ModerationAggregator<J, R>,
    directory: Arc<dyn UserDirectory>,
    audit: Arc<dyn AuditLog>,
    clock: Arc<dyn Clock>,
}

impl<J, R> ModerationService<J, R>
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    pub fn new(
        jobs: Arc<J>,
        reports: Arc<R>,
        collaborators: ModerationCollaborators,
        config: ModerationConfig,
    ) -> Self {
        let ModerationCollaborators {
            directory,
            dispatcher,
            audit,
            clock,
        } = collaborators;

        let machine = JobStatusMachine::new(jobs.clone(), audit.clone(), clock.clone());
        let ledger = ReportLedger::new(
            jobs.clone(),
            reports.clone(),
            directory.clone(),
            dispatcher,
            audit.clone(),
            clock.clone(),
        );
        let aggregator =
            ModerationAggregator::new(jobs, reports, clock.clone(), config.recent_window());

        Self {
            machine,
            ledger,
            aggregator,
            directory,
            audit,
            clock,
        }
    }

    pub fn machine(&self) -> &JobStatusMachine<J> {
        &self.machine
    }

    /// Resolve a request's user id to a principal. Unknown ids are treated as anonymous.
    pub fn authenticate(&self, user_id: Option<&str>) -> Result<Principal, ModerationError> {
        let Some(raw) = user_id.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(Principal::Anonymous);
        };

        Ok(self
            .directory
            .resolve(&UserId(raw.to_string()))?
            .map(Principal::Authenticated)
            .unwrap_or(Principal::Anonymous))
    }

    pub fn create_job(
        &self,
        owner: &Principal,
        posting: JobPosting,
        initial_status: JobStatus,
    ) -> Result<Job, ModerationError> {
        self.machine.create(owner, posting, initial_status)
    }

    /// Fetch a job, hiding it from viewers who may not see it.
    pub fn view_job(&self, job_id: &JobId, viewer: &Principal) -> Result<Job, ModerationError> {
        let job = self.machine.fetch(job_id)?;
        if visibility::can_view(&job, viewer, self.clock.now()) {
            Ok(job)
        } else {
            Err(ModerationError::JobNotFound(job_id.clone()))
        }
    }

    pub fn transition(
        &self,
        job_id: &JobId,
        target: JobStatus,
        actor: &Principal,
    ) -> Result<Job, ModerationError> {
        self.machine.transition(job_id, target, actor)
    }

    pub fn file_report(
        &self,
        job_id: &JobId,
        reporter: &Principal,
        reason: ReportReason,
        description: Option<String>,
    ) -> Result<JobReport, ModerationError> {
        self.ledger.file_report(job_id, reporter, reason, description)
    }

    pub fn mark_reviewed(
        &self,
        report_id: &ReportId,
        admin: &Principal,
    ) -> Result<JobReport, ModerationError> {
        self.ledger.mark_reviewed(report_id, admin)
    }

    /// Apply one moderation action to many jobs or reports and summarize each outcome.
    pub fn bulk(&self, action: BulkAction, ids: &[String], actor: &Principal) -> BulkSummaryView {
        let summary = match action {
            BulkAction::MarkReviewed => {
                let report_ids: Vec<ReportId> = ids.iter().cloned().map(ReportId).collect();
                self.ledger
                    .bulk_mark_reviewed(&report_ids, actor)
                    .summary(action)
            }
            BulkAction::Restore => {
                let job_ids: Vec<JobId> = ids.iter().cloned().map(JobId).collect();
                BulkOutcome::collect(&job_ids, |job_id| self.machine.restore(job_id, actor))
                    .summary(action)
            }
            BulkAction::Remove => self.bulk_transition(ids, JobStatus::Removed, actor, action),
            BulkAction::Close => self.bulk_transition(ids, JobStatus::Closed, actor, action),
        };

        info!(
            action = action.label(),
            succeeded = summary.succeeded,
            failed = summary.failed,
            "bulk moderation applied"
        );
        summary
    }

    fn bulk_transition(
        &self,
        ids: &[String],
        target: JobStatus,
        actor: &Principal,
        action: BulkAction,
    ) -> BulkSummaryView {
        let job_ids: Vec<JobId> = ids.iter().cloned().map(JobId).collect();
        self.machine
            .bulk_transition(&job_ids, target, actor)
            .summary(action)
    }

    pub fn recent_jobs(
        &self,
        viewer: &Principal,
        window: Option<Duration>,
    ) -> Result<Vec<Job>, ModerationError> {
        self.aggregator.recent_jobs(viewer, window)
    }

    pub fn unreviewed_reports(&self) -> Result<Vec<JobReport>, ModerationError> {
        self.aggregator.unreviewed_reports()
    }

    pub fn statistics(&self) -> Result<ModerationStatistics, ModerationError> {
        self.aggregator.statistics()
    }

    pub fn dashboard(
        &self,
        viewer: &Principal,
        window: Option<Duration>,
    ) -> Result<ModerationDashboard, ModerationError> {
        if !viewer.is_staff() {
            return Err(ModerationError::Unauthorized);
        }
        self.aggregator.dashboard(viewer, window)
    }

    /// Moderation history for a job and the reports filed against it, oldest first.
    pub fn audit_trail(
        &self,
        job_id: &JobId,
        viewer: &Principal,
    ) -> Result<Vec<AuditEntry>, ModerationError> {
        if !viewer.is_staff() {
            return Err(ModerationError::Unauthorized);
        }
        self.machine.fetch(job_id)?;

        let mut entries: Vec<AuditEntry> = self
            .audit
            .entries()?
            .into_iter()
            .filter(|entry| entry.concerns_job(job_id))
            .collect();
        entries.sort_by_key(|entry| entry.at);
        Ok(entries)
    }
}
