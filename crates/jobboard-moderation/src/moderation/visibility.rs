//! Who may see a posting.
//!
//! Drafts stay with their owner and removed postings stay with staff, whatever else the
//! viewer is. Live postings are public until they expire.

use chrono::{DateTime, Utc};

use super::domain::{Job, Principal};
use super::status::JobStatus;

pub fn can_view(job: &Job, viewer: &Principal, now: DateTime<Utc>) -> bool {
    let is_owner = viewer.is_user(&job.owner);
    let is_staff = viewer.is_staff();

    match job.status {
        JobStatus::Removed => is_staff,
        JobStatus::Draft => is_owner,
        JobStatus::Active if !job.is_expired(now) => true,
        JobStatus::Active | JobStatus::Closed => is_owner || is_staff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::domain::{
        AccountType, JobId, JobPosting, UserId, UserIdentity, WorkType,
    };
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn user(id: &str, is_staff: bool) -> Principal {
        Principal::Authenticated(UserIdentity {
            id: UserId(id.to_string()),
            username: id.to_string(),
            email: format!("{id}@example.test"),
            account_type: AccountType::Recruiter,
            is_staff,
            is_active: true,
        })
    }

    fn job(status: JobStatus, expires_at: Option<DateTime<Utc>>) -> Job {
        Job {
            id: JobId("job-visibility".to_string()),
            owner: UserId("owner".to_string()),
            posting: JobPosting {
                title: "Platform Engineer".to_string(),
                company: "Acme".to_string(),
                location: "Remote".to_string(),
                work_type: WorkType::Remote,
                description: String::new(),
                expires_at,
            },
            status,
            created_at: now() - Duration::days(2),
            updated_at: now() - Duration::days(2),
            moderated_by: None,
            moderated_at: None,
        }
    }

    #[test]
    fn drafts_are_owner_only_even_for_staff() {
        let draft = job(JobStatus::Draft, None);
        assert!(can_view(&draft, &user("owner", false), now()));
        assert!(!can_view(&draft, &user("admin", true), now()));
        assert!(!can_view(&draft, &Principal::Anonymous, now()));
    }

    #[test]
    fn removed_jobs_are_staff_only_even_for_owner() {
        let removed = job(JobStatus::Removed, None);
        assert!(can_view(&removed, &user("admin", true), now()));
        assert!(!can_view(&removed, &user("owner", false), now()));
        assert!(!can_view(&removed, &user("seeker", false), now()));
    }

    #[test]
    fn active_jobs_are_public_until_expiry() {
        let live = job(JobStatus::Active, Some(now() + Duration::days(1)));
        assert!(can_view(&live, &Principal::Anonymous, now()));

        let expired = job(JobStatus::Active, Some(now() - Duration::minutes(1)));
        assert!(!can_view(&expired, &Principal::Anonymous, now()));
        assert!(can_view(&expired, &user("owner", false), now()));
    }

    #[test]
    fn closed_jobs_are_owner_or_staff() {
        let closed = job(JobStatus::Closed, None);
        assert!(can_view(&closed, &user("owner", false), now()));
        assert!(can_view(&closed, &user("admin", true), now()));
        assert!(!can_view(&closed, &user("seeker", false), now()));
    }
}
