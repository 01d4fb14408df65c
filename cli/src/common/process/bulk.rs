//! # cmdrs Bulk Operation Runner (`common::process::bulk`)
//!
//! File: cli/src/common/process/bulk.rs
//!
//! ## Overview
//!
//! Applies one fallible async operation to every item of a batch, isolating
//! each item's failure from the rest. Nothing aborts a batch early: every item
//! is attempted, and the result is a `BulkOutcome` tallying successes,
//! failures, and failure messages.
//!
//! ## Architecture
//!
//! - `run_bulk`: strictly sequential, in input order.
//! - `run_bulk_concurrent`: up to `limit` items in flight at once (via
//!   `futures_util`'s `buffer_unordered`). The outcome is still accumulated
//!   from a single task, one result at a time; progress and error messages
//!   follow completion order.
//!
//! In both, `on_progress(completed, total)` fires once per finished item,
//! with `completed` going from 1 to `total` regardless of success.
//!
//! ## Example
//!
//! ```rust
//! use cmdrs::common::process::bulk::{no_progress, run_bulk, BulkStatus};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let outcome = rt
//!     .block_on(run_bulk(
//!         vec![1, 2, 3],
//!         |n: i32| async move {
//!             if n == 2 { Err(format!("item {} failed", n)) } else { Ok(()) }
//!         },
//!         no_progress,
//!     ))
//!     .unwrap();
//! assert_eq!(outcome.success_count, 2);
//! assert_eq!(outcome.status(), BulkStatus::PartialFailure);
//! ```
//!
use crate::core::error::BulkError;
use futures_util::stream::{self, StreamExt};
use std::fmt::Display;
use std::future::Future;
use tracing::{info, warn};

/// Message recorded for a failure whose error renders as empty text.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Three-way summary of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkStatus {
    /// Every item succeeded.
    Success,
    /// Every item failed.
    Failure,
    /// At least one item succeeded and at least one failed.
    PartialFailure,
}

/// Aggregate result of a batch.
///
/// `success_count + failure_count` equals the number of items processed and
/// `error_messages.len()` equals `failure_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub success_count: usize,
    pub failure_count: usize,
    pub error_messages: Vec<String>,
}

impl BulkOutcome {
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    pub fn status(&self) -> BulkStatus {
        match (self.success_count, self.failure_count) {
            (_, 0) => BulkStatus::Success,
            (0, _) => BulkStatus::Failure,
            _ => BulkStatus::PartialFailure,
        }
    }

    fn record<E: Display>(&mut self, result: Result<(), E>) {
        match result {
            Ok(()) => self.success_count += 1,
            Err(e) => {
                let message = e.to_string();
                let message = if message.trim().is_empty() {
                    UNKNOWN_ERROR.to_string()
                } else {
                    message
                };
                warn!("Bulk item failed: {}", message);
                self.failure_count += 1;
                self.error_messages.push(message);
            }
        }
    }
}

/// Progress callback that does nothing.
pub fn no_progress(_completed: usize, _total: usize) {}

/// Runs `operation` over `items` one at a time, in order.
///
/// # Errors
///
/// `BulkError::NoItems` when `items` is empty; no operation is invoked.
pub async fn run_bulk<T, I, F, Fut, E, P>(
    items: I,
    mut operation: F,
    mut on_progress: P,
) -> Result<BulkOutcome, BulkError>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
    P: FnMut(usize, usize),
{
    let items: Vec<T> = items.into_iter().collect();
    if items.is_empty() {
        return Err(BulkError::NoItems);
    }
    let total = items.len();
    let mut outcome = BulkOutcome::default();

    for (index, item) in items.into_iter().enumerate() {
        outcome.record(operation(item).await);
        on_progress(index + 1, total);
    }

    info!(
        "Bulk run finished: {} succeeded, {} failed",
        outcome.success_count, outcome.failure_count
    );
    Ok(outcome)
}

/// Runs `operation` over `items` with at most `limit` in flight.
///
/// A `limit` of 0 is treated as 1.
///
/// # Errors
///
/// `BulkError::NoItems` when `items` is empty.
pub async fn run_bulk_concurrent<T, I, F, Fut, E, P>(
    items: I,
    limit: usize,
    operation: F,
    mut on_progress: P,
) -> Result<BulkOutcome, BulkError>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
    P: FnMut(usize, usize),
{
    let items: Vec<T> = items.into_iter().collect();
    if items.is_empty() {
        return Err(BulkError::NoItems);
    }
    let total = items.len();
    let results = stream::iter(items)
        .map(operation)
        .buffer_unordered(limit.max(1));
    tokio::pin!(results);

    let mut outcome = BulkOutcome::default();
    let mut completed = 0;
    while let Some(result) = results.next().await {
        outcome.record(result);
        completed += 1;
        on_progress(completed, total);
    }

    info!(
        "Concurrent bulk run finished: {} succeeded, {} failed",
        outcome.success_count, outcome.failure_count
    );
    Ok(outcome)
}
