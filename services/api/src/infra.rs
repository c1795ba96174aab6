use jobboard_moderation::config::ModerationConfig;
use jobboard_moderation::moderation::{
    AccountType, DispatchError, InMemoryAuditLog, InMemoryJobRepository,
    InMemoryReportRepository, Job, JobId, JobReport, ModerationCollaborators, ModerationService,
    NotificationDispatcher, Principal, ReportId, RepositoryError, SystemClock, UserDirectory,
    UserId, UserIdentity,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

pub(crate) type InMemoryModerationService =
    ModerationService<InMemoryJobRepository, InMemoryReportRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Fixed set of accounts standing in for the platform's user service.
#[derive(Clone)]
pub(crate) struct SeededDirectory {
    users: Arc<Vec<UserIdentity>>,
}

fn seeded_user(id: &str, account_type: AccountType, is_staff: bool) -> UserIdentity {
    UserIdentity {
        id: UserId(id.to_string()),
        username: id.to_string(),
        email: format!("{id}@jobboard.local"),
        account_type,
        is_staff,
        is_active: true,
    }
}

impl Default for SeededDirectory {
    fn default() -> Self {
        let users = vec![
            seeded_user("admin-1", AccountType::JobSeeker, true),
            seeded_user("admin-2", AccountType::JobSeeker, true),
            seeded_user("recruiter-1", AccountType::Recruiter, false),
            seeded_user("seeker-1", AccountType::JobSeeker, false),
            seeded_user("seeker-2", AccountType::JobSeeker, false),
        ];
        Self {
            users: Arc::new(users),
        }
    }
}

impl SeededDirectory {
    pub(crate) fn principal(&self, id: &str) -> Principal {
        self.users
            .iter()
            .find(|user| user.id.0 == id)
            .cloned()
            .map(Into::into)
            .unwrap_or(Principal::Anonymous)
    }
}

impl UserDirectory for SeededDirectory {
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
pub(crate) struct StaffNotice {
    pub(crate) recipient: String,
    pub(crate) job_id: JobId,
    pub(crate) report_id: ReportId,
    pub(crate) subject: String,
}

/// Outbox that logs each staff notification instead of sending mail.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationOutbox {
    notices: Arc<Mutex<Vec<StaffNotice>>>,
}

impl NotificationDispatcher for InMemoryNotificationOutbox {
    fn notify(
        &self,
        recipients: &[UserIdentity],
        job: &Job,
        report: &JobReport,
    ) -> Result<(), DispatchError> {
        let subject = format!(
            "New report on \"{}\": {}",
            job.posting.title,
            report.reason.label()
        );
        let mut guard = self.notices.lock().expect("outbox mutex poisoned");
        for recipient in recipients {
            info!(recipient = %recipient.email, job_id = %job.id, report_id = %report.id, "staff notification queued");
            guard.push(StaffNotice {
                recipient: recipient.email.clone(),
                job_id: job.id.clone(),
                report_id: report.id.clone(),
                subject: subject.clone(),
            });
        }
        Ok(())
    }
}

impl InMemoryNotificationOutbox {
    pub(crate) fn notices(&self) -> Vec<StaffNotice> {
        self.notices.lock().expect("outbox mutex poisoned").clone()
    }
}

pub(crate) fn in_memory_service(
    config: ModerationConfig,
    directory: SeededDirectory,
    outbox: InMemoryNotificationOutbox,
) -> Arc<InMemoryModerationService> {
    let collaborators = ModerationCollaborators {
        directory: Arc::new(directory),
        dispatcher: Arc::new(outbox),
        audit: Arc::new(InMemoryAuditLog::default()),
        clock: Arc::new(SystemClock),
    };
    Arc::new(ModerationService::new(
        Arc::new(InMemoryJobRepository::default()),
        Arc::new(InMemoryReportRepository::default()),
        collaborators,
        config,
    ))
}
