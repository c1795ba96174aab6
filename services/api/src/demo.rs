use crate::infra::{in_memory_service, InMemoryNotificationOutbox, SeededDirectory};
use chrono::Duration;
use clap::Args;
use jobboard_moderation::config::{ModerationConfig, MAX_WINDOW_DAYS};
use jobboard_moderation::error::AppError;
use jobboard_moderation::moderation::{
    BulkAction, BulkSummaryView, JobPosting, JobStatus, ModerationDashboard, ReportReason,
    WorkType,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Dashboard window in days (defaults to the configured recent window).
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_WINDOW_DAYS))]
    pub(crate) window_days: Option<i64>,
    /// Print dashboards as JSON instead of a text summary.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let directory = SeededDirectory::default();
    let outbox = InMemoryNotificationOutbox::default();
    let service = in_memory_service(
        ModerationConfig::default(),
        directory.clone(),
        outbox.clone(),
    );
    let window = args.window_days.map(Duration::days);

    let recruiter = directory.principal("recruiter-1");
    let admin = directory.principal("admin-1");
    let second_admin = directory.principal("admin-2");
    let seeker = directory.principal("seeker-1");
    let other_seeker = directory.principal("seeker-2");

    println!("Job board moderation demo");
    println!("=========================");

    let suspicious = service.create_job(
        &recruiter,
        demo_posting("Work From Home Data Entry", WorkType::Remote),
        JobStatus::Active,
    )?;
    let warehouse = service.create_job(
        &recruiter,
        demo_posting("Warehouse Associate", WorkType::OnSite),
        JobStatus::Active,
    )?;
    let draft = service.create_job(
        &recruiter,
        demo_posting("Senior Rust Engineer", WorkType::Hybrid),
        JobStatus::Draft,
    )?;

    println!("\nPostings by recruiter-1:");
    for job in [&suspicious, &warehouse, &draft] {
        println!(
            "  - {} [{}] {}",
            job.id,
            job.status.label(),
            job.posting.title
        );
    }

    println!("\nReports:");
    let spam = service.file_report(
        &suspicious.id,
        &seeker,
        ReportReason::Spam,
        Some("Asks applicants to pay a starter-kit fee".to_string()),
    )?;
    let fake = service.file_report(&suspicious.id, &other_seeker, ReportReason::Fake, None)?;
    for report in [&spam, &fake] {
        println!(
            "  - {} by {} on {}: {}",
            report.id,
            report.reporter,
            report.job_id,
            report.reason.label()
        );
    }
    match service.file_report(&suspicious.id, &seeker, ReportReason::Spam, None) {
        Ok(report) => println!("  Repeat report unexpectedly accepted as {}", report.id),
        Err(err) => println!("  Repeat report from seeker-1 refused: {err}"),
    }
    match service.file_report(&draft.id, &seeker, ReportReason::Other, None) {
        Ok(report) => println!("  Draft report unexpectedly accepted as {}", report.id),
        Err(err) => println!("  Report on an unpublished draft refused: {err}"),
    }

    println!("\nDashboard before review:");
    render_dashboard(&service.dashboard(&admin, window)?, args.json);

    println!("\nReview:");
    let reviewed = service.mark_reviewed(&spam.id, &admin)?;
    let repeated = service.mark_reviewed(&spam.id, &second_admin)?;
    println!(
        "  {} reviewed by {}; repeat review by admin-2 kept reviewer {}",
        reviewed.id,
        reviewed
            .reviewed_by
            .as_ref()
            .map_or("nobody", |reviewer| reviewer.0.as_str()),
        repeated
            .reviewed_by
            .as_ref()
            .map_or("nobody", |reviewer| reviewer.0.as_str()),
    );

    let removed = service.transition(&suspicious.id, JobStatus::Removed, &admin)?;
    println!("  {} is now {}", removed.id, removed.status.label());
    match service.transition(&suspicious.id, JobStatus::Active, &recruiter) {
        Ok(job) => println!("  Owner unexpectedly restored {}", job.id),
        Err(err) => println!("  Owner restore of a removed posting refused: {err}"),
    }

    println!("\nBulk actions:");
    render_bulk(&service.bulk(
        BulkAction::MarkReviewed,
        &[fake.id.0.clone()],
        &admin,
    ));
    render_bulk(&service.bulk(
        BulkAction::Close,
        &[warehouse.id.0.clone(), draft.id.0.clone()],
        &recruiter,
    ));

    println!("\nDashboard after review:");
    render_dashboard(&service.dashboard(&admin, window)?, args.json);

    println!("\nAudit trail for {}:", suspicious.id);
    for entry in service.audit_trail(&suspicious.id, &admin)? {
        match serde_json::to_string(&entry.action) {
            Ok(action) => println!("  - {} {} {}", entry.at.to_rfc3339(), entry.actor, action),
            Err(err) => println!("  - audit entry unavailable: {err}"),
        }
    }

    let notices = outbox.notices();
    if notices.is_empty() {
        println!("\nStaff notifications: none queued");
    } else {
        println!("\nStaff notifications:");
        for notice in notices {
            println!(
                "  - {} -> {} ({} on {})",
                notice.recipient, notice.subject, notice.report_id, notice.job_id
            );
        }
    }

    Ok(())
}

fn demo_posting(title: &str, work_type: WorkType) -> JobPosting {
    JobPosting {
        title: title.to_string(),
        company: "Riverfront Logistics".to_string(),
        location: "Des Moines, IA".to_string(),
        work_type,
        description: format!("{title} role posted for the moderation walkthrough."),
        expires_at: None,
    }
}

fn render_dashboard(dashboard: &ModerationDashboard, as_json: bool) {
    if as_json {
        match serde_json::to_string_pretty(dashboard) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("  Dashboard payload unavailable: {err}"),
        }
        return;
    }

    let stats = &dashboard.statistics;
    println!(
        "  Window: {} days, {} recent postings",
        dashboard.window_days,
        dashboard.recent_jobs.len()
    );
    let by_status: Vec<String> = stats
        .jobs_by_status
        .iter()
        .map(|entry| format!("{}={}", entry.status_label, entry.count))
        .collect();
    println!("  Postings by status: {}", by_status.join(", "));
    println!(
        "  Reports: {} total, {} awaiting review",
        stats.total_reports, stats.unreviewed_reports
    );
    for entry in stats.reports_by_reason.iter().filter(|entry| entry.count > 0) {
        println!("    - {}: {}", entry.reason_label, entry.count);
    }
    for report in &dashboard.unreviewed_reports {
        println!(
            "  Pending {} on {} ({})",
            report.id, report.job_id, report.reason_label
        );
    }
}

fn render_bulk(summary: &BulkSummaryView) {
    println!(
        "  {:?}: {} succeeded, {} failed",
        summary.action, summary.succeeded, summary.failed
    );
    for item in &summary.items {
        match &item.error {
            Some(error) => println!("    - {} failed: {}", item.id, error),
            None => println!("    - {} ok", item.id),
        }
    }
}
