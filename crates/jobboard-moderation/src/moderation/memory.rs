//! Process-local stores backing the demo service and the test suites.
//!
//! Each store guards its records with one mutex, which is enough to honour the
//! repository contracts: conditional status writes, one report per (job, reporter) and a
//! single first review.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{AuditEntry, Job, JobId, JobReport, ReportId, UserId};
use super::repository::{AuditLog, JobRepository, ReportRepository, RepositoryError, ReviewMark};
use super::status::JobStatus;

#[derive(Debug, Default, Clone)]
pub struct InMemoryJobRepository {
    records: Arc<Mutex<HashMap<JobId, Job>>>,
}

impl JobRepository for InMemoryJobRepository {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut guard = self.records.lock().expect("job mutex poisoned");
        if guard.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let guard = self.records.lock().expect("job mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_if_status(&self, job: Job, expected: JobStatus) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("job mutex poisoned");
        match guard.get_mut(&job.id) {
            Some(stored) if stored.status == expected => {
                *stored = job;
                Ok(())
            }
            Some(_) => Err(RepositoryError::Conflict),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<Job>, RepositoryError> {
        let guard = self.records.lock().expect("job mutex poisoned");
        Ok(guard
            .values()
            .filter(|job| job.created_at >= since)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<Job>, RepositoryError> {
        let guard = self.records.lock().expect("job mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryReportRepository {
    records: Arc<Mutex<HashMap<ReportId, JobReport>>>,
}

impl ReportRepository for InMemoryReportRepository {
    fn insert(&self, report: JobReport) -> Result<JobReport, RepositoryError> {
        let mut guard = self.records.lock().expect("report mutex poisoned");
        let duplicate = guard.values().any(|existing| {
            existing.job_id == report.job_id && existing.reporter == report.reporter
        });
        if duplicate {
            return Err(RepositoryError::Duplicate);
        }
        if guard.contains_key(&report.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(report.id.clone(), report.clone());
        Ok(report)
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<JobReport>, RepositoryError> {
        let guard = self.records.lock().expect("report mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn mark_reviewed(
        &self,
        id: &ReportId,
        reviewer: &UserId,
        at: DateTime<Utc>,
    ) -> Result<ReviewMark, RepositoryError> {
        let mut guard = self.records.lock().expect("report mutex poisoned");
        let report = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let first_review = !report.reviewed;
        if first_review {
            report.reviewed = true;
            report.reviewed_by = Some(reviewer.clone());
            report.reviewed_at = Some(at);
        }
        Ok(ReviewMark {
            report: report.clone(),
            first_review,
        })
    }

    fn unreviewed(&self) -> Result<Vec<JobReport>, RepositoryError> {
        let guard = self.records.lock().expect("report mutex poisoned");
        Ok(guard
            .values()
            .filter(|report| !report.reviewed)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<JobReport>, RepositoryError> {
        let guard = self.records.lock().expect("report mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

/// Append-only audit trail kept in insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl InMemoryAuditLog {
    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditLog for InMemoryAuditLog {
    fn append(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry);
        Ok(())
    }

    fn entries(&self) -> Result<Vec<AuditEntry>, RepositoryError> {
        Ok(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::domain::ReportReason;
    use chrono::TimeZone;

    fn filed(id: &str, job: &str, reporter: &str) -> JobReport {
        JobReport {
            id: ReportId(id.to_string()),
            job_id: JobId(job.to_string()),
            reporter: UserId(reporter.to_string()),
            reason: ReportReason::Spam,
            description: None,
            created_at: Utc
                .with_ymd_and_hms(2025, 10, 1, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
            reviewed: false,
            reviewed_by: None,
            reviewed_at: None,
        }
    }

    #[test]
    fn report_insert_separates_repeat_reporters_from_taken_ids() {
        let reports = InMemoryReportRepository::default();
        reports
            .insert(filed("rpt-000001", "job-000001", "seeker-uma"))
            .expect("first report");

        assert!(matches!(
            reports.insert(filed("rpt-000002", "job-000001", "seeker-uma")),
            Err(RepositoryError::Duplicate)
        ));
        assert!(matches!(
            reports.insert(filed("rpt-000001", "job-000002", "seeker-uma")),
            Err(RepositoryError::Conflict)
        ));
        reports
            .insert(filed("rpt-000003", "job-000002", "seeker-uma"))
            .expect("same reporter, different job");
        assert_eq!(reports.all().expect("reports").len(), 2);
    }
}
