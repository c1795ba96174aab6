use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::domain::{Job, JobReport, Principal, ReportReason};
use super::error::ModerationError;
use super::repository::{Clock, JobRepository, ReportRepository};
use super::status::JobStatus;
use super::views::{ModerationDashboard, ModerationStatistics, ReasonCount, StatusCount};
use super::visibility;

/// Read-only summaries over the job and report stores. Never writes.
pub struct ModerationAggregator<J, R> {
    jobs: Arc<J>,
    reports: Arc<R>,
    clock: Arc<dyn Clock>,
    default_window: Duration,
}

impl<J, R> ModerationAggregator<J, R>
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    pub fn new(
        jobs: Arc<J>,
        reports: Arc<R>,
        clock: Arc<dyn Clock>,
        default_window: Duration,
    ) -> Self {
        Self {
            jobs,
            reports,
            clock,
            default_window,
        }
    }

    /// Jobs created within the trailing window that `viewer` may see, newest first.
    ///
    /// A window reaching past the earliest representable instant covers every job.
    pub fn recent_jobs(
        &self,
        viewer: &Principal,
        window: Option<Duration>,
    ) -> Result<Vec<Job>, ModerationError> {
        let now = self.clock.now();
        let since = now
            .checked_sub_signed(window.unwrap_or(self.default_window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut jobs: Vec<Job> = self
            .jobs
            .created_since(since)?
            .into_iter()
            .filter(|job| job.created_at >= since && job.created_at <= now)
            .filter(|job| visibility::can_view(job, viewer, now))
            .collect();
        jobs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(jobs)
    }

    /// Reports still awaiting review, oldest first so the backlog drains in order.
    pub fn unreviewed_reports(&self) -> Result<Vec<JobReport>, ModerationError> {
        let mut reports: Vec<JobReport> = self
            .reports
            .unreviewed()?
            .into_iter()
            .filter(|report| !report.reviewed)
            .collect();
        reports.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(reports)
    }

    pub fn statistics(&self) -> Result<ModerationStatistics, ModerationError> {
        let jobs = self.jobs.all()?;
        let reports = self.reports.all()?;

        let mut by_status: HashMap<JobStatus, usize> = HashMap::new();
        for job in &jobs {
            *by_status.entry(job.status).or_default() += 1;
        }

        let mut by_reason: HashMap<ReportReason, usize> = HashMap::new();
        for report in &reports {
            *by_reason.entry(report.reason).or_default() += 1;
        }

        let jobs_by_status = JobStatus::ordered()
            .into_iter()
            .map(|status| StatusCount {
                status,
                status_label: status.label(),
                count: by_status.get(&status).copied().unwrap_or(0),
            })
            .collect();

        let reports_by_reason = ReportReason::ordered()
            .into_iter()
            .map(|reason| ReasonCount {
                reason,
                reason_label: reason.label(),
                count: by_reason.get(&reason).copied().unwrap_or(0),
            })
            .collect();

        Ok(ModerationStatistics {
            jobs_by_status,
            total_reports: reports.len(),
            unreviewed_reports: reports.iter().filter(|report| !report.reviewed).count(),
            reports_by_reason,
        })
    }

    /// Drafts are counted in the statistics but never listed unless `viewer` owns them.
    pub fn dashboard(
        &self,
        viewer: &Principal,
        window: Option<Duration>,
    ) -> Result<ModerationDashboard, ModerationError> {
        let window = window.unwrap_or(self.default_window);
        let recent_jobs = self.recent_jobs(viewer, Some(window))?;
        let unreviewed_reports = self.unreviewed_reports()?;
        let statistics = self.statistics()?;

        Ok(ModerationDashboard {
            generated_at: self.clock.now(),
            window_days: window.num_days(),
            recent_jobs: recent_jobs.iter().map(Job::to_view).collect(),
            unreviewed_reports: unreviewed_reports.iter().map(JobReport::to_view).collect(),
            statistics,
        })
    }
}
