use std::future::Future;

use futures::future;

use crate::{AgentClientError, Result};

// ─── BulkOutcome ──────────────────────────────────────────────────────────

/// Outcome of a fan-out where every item may fail on its own.
///
/// The contract callers follow: all items failed is a hard error, anything
/// less keeps the succeeded subset and surfaces [`BulkOutcome::warning`].
#[derive(Debug)]
pub struct BulkOutcome<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<(String, AgentClientError)>,
}

impl<T> BulkOutcome<T> {
    pub fn is_total_failure(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }

    /// One-line summary of the failed subset, if any.
    pub fn warning(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        let labels: Vec<&str> = self.failed.iter().map(|(label, _)| label.as_str()).collect();
        Some(format!(
            "{} of {} failed: {}",
            self.failed.len(),
            self.len(),
            labels.join(", ")
        ))
    }

    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }
}

/// Run every labelled future to completion, keeping all successes and all
/// failures. Nothing is cancelled when a sibling fails.
pub async fn join_partial<T, F>(items: Vec<(String, F)>) -> BulkOutcome<T>
where
    F: Future<Output = Result<T>>,
{
    let (labels, futures): (Vec<_>, Vec<_>) = items.into_iter().unzip();
    let results = future::join_all(futures).await;

    let mut outcome = BulkOutcome {
        succeeded: Vec::new(),
        failed: Vec::new(),
    };
    for (label, result) in labels.into_iter().zip(results) {
        match result {
            Ok(value) => outcome.succeeded.push(value),
            Err(e) => {
                tracing::warn!(item = %label, error = %e, "bulk item failed");
                outcome.failed.push((label, e));
            }
        }
    }
    outcome
}

// ─── Tests ────────────────────────────────────────────────────────────────
