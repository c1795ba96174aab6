use super::common::*;
use chrono::Duration;

use crate::moderation::domain::{Principal, ReportReason};
use crate::moderation::status::JobStatus;
use crate::moderation::ModerationError;

#[test]
fn recent_jobs_use_the_configured_window_newest_first() {
    let harness = harness();
    let oldest = harness.active_job("Ten Days Old");
    harness.clock.advance(Duration::days(3));
    let middle = harness.active_job("Seven Days Old");
    harness.clock.advance(Duration::days(5));
    let newest = harness.active_job("Two Days Old");
    harness.clock.advance(Duration::days(2));

    let recent = harness
        .service
        .recent_jobs(&admin(), None)
        .expect("recent jobs");
    let ids: Vec<_> = recent.iter().map(|job| job.id.clone()).collect();
    assert_eq!(ids, vec![newest.id.clone(), middle.id.clone()]);

    let wider = harness
        .service
        .recent_jobs(&admin(), Some(Duration::days(30)))
        .expect("recent jobs");
    let ids: Vec<_> = wider.iter().map(|job| job.id.clone()).collect();
    assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);
}

#[test]
fn recent_jobs_hide_drafts_from_everyone_but_their_owner() {
    let harness = harness();
    let removed = harness.active_job("Pulled");
    harness
        .service
        .transition(&removed.id, JobStatus::Removed, &admin())
        .expect("staff removes");
    let draft = harness.draft_job("Unpublished Role");
    let live = harness.active_job("Live");

    let staff_view = harness
        .service
        .recent_jobs(&admin(), None)
        .expect("recent jobs");
    let ids: Vec<_> = staff_view.iter().map(|job| job.id.clone()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&removed.id));
    assert!(ids.contains(&live.id));
    assert!(staff_view.iter().all(|job| job.status != JobStatus::Draft));

    let owner_view = harness
        .service
        .recent_jobs(&owner(), None)
        .expect("recent jobs");
    let ids: Vec<_> = owner_view.iter().map(|job| job.id.clone()).collect();
    assert!(ids.contains(&draft.id));
    assert!(!ids.contains(&removed.id));

    let public_view = harness
        .service
        .recent_jobs(&Principal::Anonymous, None)
        .expect("recent jobs");
    let ids: Vec<_> = public_view.iter().map(|job| job.id.clone()).collect();
    assert_eq!(ids, vec![live.id]);
}

#[test]
fn dashboard_counts_drafts_without_listing_them() {
    let harness = harness();
    let draft = harness.draft_job("Unpublished Role");
    harness.active_job("Live");

    let dashboard = harness
        .service
        .dashboard(&admin(), None)
        .expect("staff dashboard");

    assert_eq!(dashboard.recent_jobs.len(), 1);
    assert!(dashboard.recent_jobs.iter().all(|job| job.id != draft.id));
    assert_eq!(dashboard.statistics.jobs_with_status(JobStatus::Draft), 1);
}

#[test]
fn oversized_window_covers_every_job() {
    let harness = harness();
    let first = harness.active_job("First");
    harness.clock.advance(Duration::days(400));
    let second = harness.active_job("Second");

    let window = Duration::days(365 * 400_000);
    let recent = harness
        .service
        .recent_jobs(&admin(), Some(window))
        .expect("recent jobs");
    let ids: Vec<_> = recent.iter().map(|job| job.id.clone()).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let dashboard = harness
        .service
        .dashboard(&admin(), Some(window))
        .expect("staff dashboard");
    assert_eq!(dashboard.recent_jobs.len(), 2);
    assert_eq!(dashboard.window_days, 365 * 400_000);
}

#[test]
fn unreviewed_reports_are_oldest_first_and_exclude_reviewed() {
    let harness = harness();
    let job = harness.active_job("Flagged");

    let first = harness
        .service
        .file_report(&job.id, &seeker("seeker-uma"), ReportReason::Spam, None)
        .expect("first report");
    harness.clock.advance(Duration::hours(1));
    let second = harness
        .service
        .file_report(&job.id, &other_recruiter(), ReportReason::Fake, None)
        .expect("second report");
    harness.clock.advance(Duration::hours(1));
    let third = harness
        .service
        .file_report(&job.id, &admin(), ReportReason::Other, None)
        .expect("third report");

    harness
        .service
        .mark_reviewed(&second.id, &admin())
        .expect("review");

    let pending = harness
        .service
        .unreviewed_reports()
        .expect("unreviewed reports");
    let ids: Vec<_> = pending.iter().map(|report| report.id.clone()).collect();
    assert_eq!(ids, vec![first.id, third.id]);
}

#[test]
fn statistics_count_every_status_and_reason() {
    let harness = harness();
    let live = harness.active_job("Live");
    harness.active_job("Also Live");
    harness.draft_job("Draft");
    let pulled = harness.active_job("Pulled");
    harness
        .service
        .transition(&pulled.id, JobStatus::Removed, &admin())
        .expect("staff removes");

    let report = harness
        .service
        .file_report(&live.id, &seeker("seeker-uma"), ReportReason::Spam, None)
        .expect("report");
    harness
        .service
        .file_report(&live.id, &other_recruiter(), ReportReason::Spam, None)
        .expect("report");
    harness
        .service
        .mark_reviewed(&report.id, &admin())
        .expect("review");

    let stats = harness.service.statistics().expect("statistics");

    assert_eq!(stats.jobs_by_status.len(), JobStatus::ordered().len());
    assert_eq!(stats.jobs_with_status(JobStatus::Active), 2);
    assert_eq!(stats.jobs_with_status(JobStatus::Draft), 1);
    assert_eq!(stats.jobs_with_status(JobStatus::Removed), 1);
    assert_eq!(stats.jobs_with_status(JobStatus::Closed), 0);

    assert_eq!(stats.total_reports, 2);
    assert_eq!(stats.unreviewed_reports, 1);
    assert_eq!(stats.reports_by_reason.len(), ReportReason::ordered().len());
    assert_eq!(stats.reports_with_reason(ReportReason::Spam), 2);
    assert_eq!(stats.reports_with_reason(ReportReason::Fake), 0);
}

#[test]
fn statistics_over_empty_stores_are_all_zero() {
    let harness = harness();
    let stats = harness.service.statistics().expect("statistics");

    assert!(stats.jobs_by_status.iter().all(|entry| entry.count == 0));
    assert!(stats.reports_by_reason.iter().all(|entry| entry.count == 0));
    assert_eq!(stats.total_reports, 0);
    assert_eq!(stats.unreviewed_reports, 0);
}

#[test]
fn dashboard_is_for_staff_only() {
    let harness = harness();
    harness.active_job("Visible");

    for viewer in [owner(), seeker("seeker-uma"), Principal::Anonymous] {
        match harness.service.dashboard(&viewer, None) {
            Err(ModerationError::Unauthorized) => {}
            other => panic!("expected unauthorized, got {other:?}"),
        }
    }

    let dashboard = harness
        .service
        .dashboard(&admin(), None)
        .expect("staff dashboard");
    assert_eq!(dashboard.window_days, 7);
    assert_eq!(dashboard.generated_at, start());
    assert_eq!(dashboard.recent_jobs.len(), 1);
    assert!(dashboard.unreviewed_reports.is_empty());
    assert_eq!(dashboard.statistics.jobs_with_status(JobStatus::Active), 1);

    let narrowed = harness
        .service
        .dashboard(&admin(), Some(Duration::days(1)))
        .expect("staff dashboard");
    assert_eq!(narrowed.window_days, 1);
}

#[test]
fn reading_summaries_never_writes() {
    let harness = harness();
    let job = harness.active_job("Stable");
    let before = harness.audit.snapshot().len();

    harness.service.dashboard(&admin(), None).expect("dashboard");
    harness.service.statistics().expect("statistics");

    assert_eq!(harness.audit.snapshot().len(), before);
    let stored = harness.service.machine().fetch(&job.id).expect("job exists");
    assert_eq!(stored, job);
}
