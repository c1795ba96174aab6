use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use super::bulk::BulkOutcome;
use super::domain::{AuditAction, AuditEntry, AuditSubject, Job, JobId, JobPosting, Principal};
use super::error::ModerationError;
use super::repository::{append_audit, AuditLog, Clock, JobRepository, RepositoryError};
use super::status::{rule_for, JobStatus};

/// Conditional writes attempted before giving up on a job that keeps changing underneath.
const MAX_COMMIT_ATTEMPTS: usize = 5;

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

/// Governs posting creation and every status change afterwards.
pub struct JobStatusMachine<J> {
    jobs: Arc<J>,
    audit: Arc<dyn AuditLog>,
    clock: Arc<dyn Clock>,
}

impl<J> JobStatusMachine<J>
where
    J: JobRepository + 'static,
{
    pub fn new(jobs: Arc<J>, audit: Arc<dyn AuditLog>, clock: Arc<dyn Clock>) -> Self {
        Self { jobs, audit, clock }
    }

    /// Create a posting owned by the acting recruiter in DRAFT or ACTIVE.
    pub fn create(
        &self,
        owner: &Principal,
        posting: JobPosting,
        initial_status: JobStatus,
    ) -> Result<Job, ModerationError> {
        let identity = owner.identity().ok_or(ModerationError::Unauthenticated)?;
        if !(identity.is_recruiter() || identity.is_staff) {
            return Err(ModerationError::Unauthorized);
        }
        if !initial_status.is_initial() {
            return Err(ModerationError::InvalidInitialStatus(initial_status));
        }

        let now = self.clock.now();
        let job = Job {
            id: next_job_id(),
            owner: identity.id.clone(),
            posting,
            status: initial_status,
            created_at: now,
            updated_at: now,
            moderated_by: None,
            moderated_at: None,
        };

        let stored = self.jobs.insert(job)?;
        append_audit(
            self.audit.as_ref(),
            AuditEntry {
                actor: identity.id.clone(),
                subject: AuditSubject::Job(stored.id.clone()),
                action: AuditAction::JobCreated {
                    status: stored.status,
                },
                at: now,
            },
        );
        info!(job_id = %stored.id, owner = %stored.owner, status = %stored.status, "job created");
        Ok(stored)
    }

    /// Move a job to `target`, validated against the status being replaced at commit time.
    pub fn transition(
        &self,
        job_id: &JobId,
        target: JobStatus,
        actor: &Principal,
    ) -> Result<Job, ModerationError> {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let current = self
                .jobs
                .fetch(job_id)?
                .ok_or_else(|| ModerationError::JobNotFound(job_id.clone()))?;

            let rule = rule_for(current.status, target).ok_or(
                ModerationError::InvalidTransition {
                    from: current.status,
                    to: target,
                },
            )?;
            if !rule.authority.permits(&current, actor) {
                return Err(ModerationError::Unauthorized);
            }
            let identity = actor.identity().ok_or(ModerationError::Unauthorized)?;

            let now = self.clock.now();
            let mut updated = current.clone();
            updated.status = target;
            updated.updated_at = now;
            if identity.is_staff {
                updated.moderated_by = Some(identity.id.clone());
                updated.moderated_at = Some(now);
            }

            match self.jobs.update_if_status(updated.clone(), current.status) {
                Ok(()) => {
                    append_audit(
                        self.audit.as_ref(),
                        AuditEntry {
                            actor: identity.id.clone(),
                            subject: AuditSubject::Job(job_id.clone()),
                            action: AuditAction::StatusChanged {
                                from: current.status,
                                to: target,
                            },
                            at: now,
                        },
                    );
                    info!(
                        job_id = %job_id,
                        from = %current.status,
                        to = %target,
                        actor = %identity.id,
                        "job status changed"
                    );
                    return Ok(updated);
                }
                Err(RepositoryError::Conflict) => {
                    debug!(job_id = %job_id, attempt, "job status changed before commit, re-evaluating");
                }
                Err(RepositoryError::NotFound) => {
                    return Err(ModerationError::JobNotFound(job_id.clone()))
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(RepositoryError::Unavailable(format!(
            "job {job_id} kept changing while committing a status update"
        ))
        .into())
    }

    /// Reopen a closed or removed posting.
    pub fn restore(&self, job_id: &JobId, actor: &Principal) -> Result<Job, ModerationError> {
        let current = self.fetch(job_id)?;
        if !matches!(current.status, JobStatus::Closed | JobStatus::Removed) {
            return Err(ModerationError::InvalidTransition {
                from: current.status,
                to: JobStatus::Active,
            });
        }
        self.transition(job_id, JobStatus::Active, actor)
    }

    /// Apply the same transition to each job independently.
    pub fn bulk_transition(
        &self,
        job_ids: &[JobId],
        target: JobStatus,
        actor: &Principal,
    ) -> BulkOutcome<JobId, Job> {
        BulkOutcome::collect(job_ids, |job_id| self.transition(job_id, target, actor))
    }

    pub fn fetch(&self, job_id: &JobId) -> Result<Job, ModerationError> {
        self.jobs
            .fetch(job_id)?
            .ok_or_else(|| ModerationError::JobNotFound(job_id.clone()))
    }
}
