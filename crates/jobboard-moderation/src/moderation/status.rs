use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{Job, Principal};

/// Lifecycle state of a posting. Exactly one applies at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Draft,
    Active,
    Closed,
    Removed,
}

impl JobStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Draft, Self::Active, Self::Closed, Self::Removed]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Active => "Active",
            Self::Closed => "Closed",
            Self::Removed => "Removed",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
            Self::Removed => "REMOVED",
        }
    }

    /// Statuses a posting may be created in.
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::Draft | Self::Active)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may drive a given transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAuthority {
    Owner,
    OwnerOrStaff,
    StaffOnly,
}

impl TransitionAuthority {
    pub fn permits(self, job: &Job, principal: &Principal) -> bool {
        let is_owner = principal.is_user(&job.owner);
        let is_staff = principal.is_staff();
        match self {
            Self::Owner => is_owner,
            Self::OwnerOrStaff => is_owner || is_staff,
            Self::StaffOnly => is_staff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionRule {
    pub from: JobStatus,
    pub to: JobStatus,
    pub authority: TransitionAuthority,
}

const TRANSITIONS: [TransitionRule; 5] = [
    TransitionRule {
        from: JobStatus::Draft,
        to: JobStatus::Active,
        authority: TransitionAuthority::Owner,
    },
    TransitionRule {
        from: JobStatus::Active,
        to: JobStatus::Closed,
        authority: TransitionAuthority::OwnerOrStaff,
    },
    TransitionRule {
        from: JobStatus::Active,
        to: JobStatus::Removed,
        authority: TransitionAuthority::StaffOnly,
    },
    TransitionRule {
        from: JobStatus::Closed,
        to: JobStatus::Active,
        authority: TransitionAuthority::OwnerOrStaff,
    },
    TransitionRule {
        from: JobStatus::Removed,
        to: JobStatus::Active,
        authority: TransitionAuthority::StaffOnly,
    },
];

/// Every permitted (from, to) pair. Anything absent is rejected.
pub fn transitions() -> &'static [TransitionRule] {
    &TRANSITIONS
}

pub fn rule_for(from: JobStatus, to: JobStatus) -> Option<&'static TransitionRule> {
    TRANSITIONS
        .iter()
        .find(|rule| rule.from == from && rule.to == to)
}
