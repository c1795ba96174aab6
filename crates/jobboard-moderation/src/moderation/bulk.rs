use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::error::ModerationError;

/// One target action applied to a set of jobs or reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkAction {
    Remove,
    Restore,
    Close,
    MarkReviewed,
}

impl BulkAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Restore => "restore",
            Self::Close => "close",
            Self::MarkReviewed => "mark_reviewed",
        }
    }
}

#[derive(Debug)]
pub struct BulkItem<I, T> {
    pub id: I,
    pub result: Result<T, ModerationError>,
}

/// Per-item results of a batch; one failure never stops the rest.
#[derive(Debug)]
pub struct BulkOutcome<I, T> {
    pub items: Vec<BulkItem<I, T>>,
}

impl<I, T> BulkOutcome<I, T>
where
    I: Clone + Eq + Hash,
{
    /// Run `apply` once per distinct id, in first-seen order.
    pub fn collect<F>(ids: &[I], mut apply: F) -> Self
    where
        F: FnMut(&I) -> Result<T, ModerationError>,
    {
        let mut seen = HashSet::new();
        let items = ids
            .iter()
            .filter(|id| seen.insert((*id).clone()))
            .map(|id| BulkItem {
                id: id.clone(),
                result: apply(id),
            })
            .collect();
        Self { items }
    }
}

impl<I, T> BulkOutcome<I, T> {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    pub fn error_for(&self, id: &I) -> Option<&ModerationError>
    where
        I: PartialEq,
    {
        self.items
            .iter()
            .find(|item| &item.id == id)
            .and_then(|item| item.result.as_ref().err())
    }
}

impl<I: Display, T> BulkOutcome<I, T> {
    pub fn summary(&self, action: BulkAction) -> BulkSummaryView {
        let items = self
            .items
            .iter()
            .map(|item| match &item.result {
                Ok(_) => BulkItemView {
                    id: item.id.to_string(),
                    ok: true,
                    error: None,
                    error_kind: None,
                },
                Err(err) => BulkItemView {
                    id: item.id.to_string(),
                    ok: false,
                    error: Some(err.to_string()),
                    error_kind: Some(err.kind()),
                },
            })
            .collect();

        BulkSummaryView {
            action,
            succeeded: self.succeeded(),
            failed: self.failed(),
            items,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkItemView {
    pub id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkSummaryView {
    pub action: BulkAction,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<BulkItemView>,
}
