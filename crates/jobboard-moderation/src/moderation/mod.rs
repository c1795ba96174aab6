//! Job posting moderation: status machine, report ledger and dashboard aggregation.
//!
//! Storage, identity resolution and notification delivery are consumed through the
//! traits in [`repository`]; the embedding service supplies the implementations.

pub mod aggregator;
pub mod bulk;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod machine;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod status;
pub mod views;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use aggregator::ModerationAggregator;
pub use bulk::{BulkAction, BulkItem, BulkItemView, BulkOutcome, BulkSummaryView};
pub use domain::{
    AccountType, AuditAction, AuditEntry, AuditSubject, Job, JobId, JobPosting, JobReport,
    Principal, ReportId, ReportReason, UserId, UserIdentity, WorkType,
};
pub use error::ModerationError;
pub use ledger::ReportLedger;
pub use machine::JobStatusMachine;
pub use memory::{InMemoryAuditLog, InMemoryJobRepository, InMemoryReportRepository};
pub use repository::{
    AuditLog, Clock, DispatchError, JobRepository, NotificationDispatcher, ReportRepository,
    RepositoryError, ReviewMark, SystemClock, UserDirectory,
};
pub use router::{moderation_router, USER_HEADER};
pub use service::{ModerationCollaborators, ModerationService};
pub use status::{JobStatus, TransitionAuthority, TransitionRule};
pub use views::{
    JobView, ModerationDashboard, ModerationStatistics, ReasonCount, ReportView, StatusCount,
};
