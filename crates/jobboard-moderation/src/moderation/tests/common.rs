use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::config::ModerationConfig;
use crate::moderation::domain::{
    AccountType, Job, JobId, JobPosting, JobReport, Principal, ReportId, UserId, UserIdentity,
    WorkType,
};
use crate::moderation::memory::{InMemoryAuditLog, InMemoryJobRepository, InMemoryReportRepository};
use crate::moderation::repository::{
    Clock, DispatchError, JobRepository, NotificationDispatcher, ReportRepository,
    RepositoryError, ReviewMark, UserDirectory,
};
use crate::moderation::service::{ModerationCollaborators, ModerationService};
use crate::moderation::status::JobStatus;

pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn identity(id: &str, account_type: AccountType, is_staff: bool) -> UserIdentity {
    UserIdentity {
        id: UserId(id.to_string()),
        username: id.to_string(),
        email: format!("{id}@jobboard.test"),
        account_type,
        is_staff,
        is_active: true,
    }
}

pub(super) fn owner() -> Principal {
    identity("recruiter-olivia", AccountType::Recruiter, false).into()
}

pub(super) fn other_recruiter() -> Principal {
    identity("recruiter-rafael", AccountType::Recruiter, false).into()
}

pub(super) fn admin() -> Principal {
    identity("admin-ada", AccountType::JobSeeker, true).into()
}

pub(super) fn second_admin() -> Principal {
    identity("admin-grace", AccountType::JobSeeker, true).into()
}

pub(super) fn seeker(name: &str) -> Principal {
    identity(name, AccountType::JobSeeker, false).into()
}

pub(super) fn inactive_seeker() -> Principal {
    let mut user = identity("seeker-dormant", AccountType::JobSeeker, false);
    user.is_active = false;
    user.into()
}

pub(super) fn user_id(principal: &Principal) -> UserId {
    principal
        .identity()
        .map(|identity| identity.id.clone())
        .expect("principal is authenticated")
}

pub(super) fn posting(title: &str) -> JobPosting {
    JobPosting {
        title: title.to_string(),
        company: "Northwind Labs".to_string(),
        location: "Des Moines, IA".to_string(),
        work_type: WorkType::Hybrid,
        description: "Own the listings moderation pipeline.".to_string(),
        expires_at: None,
    }
}

pub(super) type MemoryJobs = InMemoryJobRepository;
pub(super) type MemoryReports = InMemoryReportRepository;
pub(super) type MemoryAudit = InMemoryAuditLog;

/// Job store whose conditional update always loses the race once, then behaves.
pub(super) struct RacingJobs {
    pub(super) inner: MemoryJobs,
    pub(super) interloper: Mutex<Option<JobStatus>>,
}

impl RacingJobs {
    pub(super) fn with_interloper(status: JobStatus) -> Self {
        Self {
            inner: MemoryJobs::default(),
            interloper: Mutex::new(Some(status)),
        }
    }
}

impl JobRepository for RacingJobs {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError> {
        self.inner.insert(job)
    }

    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn update_if_status(&self, job: Job, expected: JobStatus) -> Result<(), RepositoryError> {
        let interloper = self.interloper.lock().expect("race mutex poisoned").take();
        if let Some(status) = interloper {
            let mut competing = self.inner.fetch(&job.id)?.ok_or(RepositoryError::NotFound)?;
            competing.status = status;
            self.inner.update_if_status(competing, expected)?;
        }
        self.inner.update_if_status(job, expected)
    }

    fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<Job>, RepositoryError> {
        self.inner.created_since(since)
    }

    fn all(&self) -> Result<Vec<Job>, RepositoryError> {
        self.inner.all()
    }
}

/// Report store holding a foreign report under every id it is asked to insert, as a
/// store seeded by an earlier process would.
#[derive(Default)]
pub(super) struct TakenIdReports {
    pub(super) inner: MemoryReports,
}

impl ReportRepository for TakenIdReports {
    fn insert(&self, report: JobReport) -> Result<JobReport, RepositoryError> {
        let mut earlier = report.clone();
        earlier.job_id = JobId("job-from-an-earlier-run".to_string());
        earlier.reporter = UserId("seeker-from-an-earlier-run".to_string());
        self.inner.insert(earlier)?;
        self.inner.insert(report)
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<JobReport>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn mark_reviewed(
        &self,
        id: &ReportId,
        reviewer: &UserId,
        at: DateTime<Utc>,
    ) -> Result<ReviewMark, RepositoryError> {
        self.inner.mark_reviewed(id, reviewer, at)
    }

    fn unreviewed(&self) -> Result<Vec<JobReport>, RepositoryError> {
        self.inner.unreviewed()
    }

    fn all(&self) -> Result<Vec<JobReport>, RepositoryError> {
        self.inner.all()
    }
}

pub(super) struct MemoryDirectory {
    users: Vec<UserIdentity>,
}

impl MemoryDirectory {
    pub(super) fn seeded() -> Self {
        let users = [owner(), other_recruiter(), admin(), second_admin(), seeker("seeker-uma")]
            .into_iter()
            .filter_map(|principal| match principal {
                Principal::Authenticated(identity) => Some(identity),
                Principal::Anonymous => None,
            })
            .collect();
        Self { users }
    }
}

impl UserDirectory for MemoryDirectory {
    fn resolve(&self, id: &UserId) -> Result<Option<UserIdentity>, RepositoryError> {
        Ok(self.users.iter().find(|user| &user.id == id).cloned())
    }

    fn staff(&self) -> Result<Vec<UserIdentity>, RepositoryError> {
        Ok(self
            .users
            .iter()
            .filter(|user| user.is_staff && user.is_active)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct DispatchedNotice {
    pub(super) recipients: Vec<UserId>,
    pub(super) job_id: JobId,
    pub(super) report_id: ReportId,
}

#[derive(Default)]
pub(super) struct RecordingDispatcher {
    notices: Mutex<Vec<DispatchedNotice>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub(super) fn failing() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(super) fn notices(&self) -> Vec<DispatchedNotice> {
        self.notices.lock().expect("dispatch mutex poisoned").clone()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn notify(
        &self,
        recipients: &[UserIdentity],
        job: &Job,
        report: &JobReport,
    ) -> Result<(), DispatchError> {
        self.notices
            .lock()
            .expect("dispatch mutex poisoned")
            .push(DispatchedNotice {
                recipients: recipients.iter().map(|user| user.id.clone()).collect(),
                job_id: job.id.clone(),
                report_id: report.id.clone(),
            });
        if self.fail {
            return Err(DispatchError::Transport("smtp relay refused".to_string()));
        }
        Ok(())
    }
}

pub(super) struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    pub(super) fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(super) fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().expect("clock mutex poisoned");
        *guard += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

pub(super) struct Harness<J = MemoryJobs, R = MemoryReports> {
    pub(super) service: Arc<ModerationService<J, R>>,
    pub(super) jobs: Arc<J>,
    pub(super) reports: Arc<R>,
    pub(super) audit: Arc<MemoryAudit>,
    pub(super) dispatcher: Arc<RecordingDispatcher>,
    pub(super) clock: Arc<TestClock>,
}

pub(super) fn harness() -> Harness {
    harness_with(MemoryJobs::default(), RecordingDispatcher::default())
}

pub(super) fn harness_with<J>(jobs: J, dispatcher: RecordingDispatcher) -> Harness<J>
where
    J: JobRepository + 'static,
{
    harness_from(jobs, MemoryReports::default(), dispatcher)
}

pub(super) fn harness_from<J, R>(jobs: J, reports: R, dispatcher: RecordingDispatcher) -> Harness<J, R>
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    let jobs = Arc::new(jobs);
    let reports = Arc::new(reports);
    let audit = Arc::new(MemoryAudit::default());
    let dispatcher = Arc::new(dispatcher);
    let clock = Arc::new(TestClock::at(start()));

    let collaborators = ModerationCollaborators {
        directory: Arc::new(MemoryDirectory::seeded()),
        dispatcher: dispatcher.clone(),
        audit: audit.clone(),
        clock: clock.clone(),
    };
    let service = Arc::new(ModerationService::new(
        jobs.clone(),
        reports.clone(),
        collaborators,
        ModerationConfig::default(),
    ));

    Harness {
        service,
        jobs,
        reports,
        audit,
        dispatcher,
        clock,
    }
}

impl<J, R> Harness<J, R>
where
    J: JobRepository + 'static,
    R: ReportRepository + 'static,
{
    pub(super) fn active_job(&self, title: &str) -> Job {
        self.service
            .create_job(&owner(), posting(title), JobStatus::Active)
            .expect("owner can publish a job")
    }

    pub(super) fn draft_job(&self, title: &str) -> Job {
        self.service
            .create_job(&owner(), posting(title), JobStatus::Draft)
            .expect("owner can draft a job")
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
