//! Batch validation with bounded concurrency.
//!
//! Addresses are independent: each runs in its own task, at most
//! `concurrency` at a time, and results come back in input order. A task
//! that dies still yields a record for its address.

mod types;

pub use types::{BatchOptions, BatchReport, BatchSummary};

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::mx::LookupMx;
use crate::smtp::MailboxProbe;
use crate::validation::{ValidationResult, Validator};

pub struct BatchRunner<L, P> {
    validator: Arc<Validator<L, P>>,
    options: BatchOptions,
}

impl<L, P> BatchRunner<L, P>
where
    L: LookupMx + 'static,
    P: MailboxProbe + 'static,
{
    pub fn new(validator: Validator<L, P>, options: BatchOptions) -> Self {
        Self::with_shared(Arc::new(validator), options)
    }

    pub fn with_shared(validator: Arc<Validator<L, P>>, options: BatchOptions) -> Self {
        Self { validator, options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Validates every address and returns exactly one result per input,
    /// in input order.
    pub async fn run<I, S>(&self, addresses: I) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let addresses: Vec<String> = addresses.into_iter().map(Into::into).collect();
        let deadline = self.options.deadline.map(|budget| Instant::now() + budget);
        let concurrency = self.options.concurrency.max(1);
        info!(count = addresses.len(), concurrency, "batch started");

        let results: Vec<ValidationResult> = stream::iter(addresses)
            .map(|email| {
                let validator = Arc::clone(&self.validator);
                async move {
                    let task = {
                        let email = email.clone();
                        tokio::spawn(async move { validator.validate_until(&email, deadline).await })
                    };
                    match task.await {
                        Ok(result) => result,
                        Err(err) => {
                            warn!(email = %email, error = %err, "validation task failed");
                            ValidationResult::task_failed(&email, &err.to_string())
                        }
                    }
                }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let report = BatchReport::new(results);
        info!(
            total = report.summary.total,
            confirmed = report.summary.confirmed,
            domain_valid_only = report.summary.domain_valid_only,
            invalid = report.summary.invalid,
            "batch finished"
        );
        report
    }
}

#[cfg(test)]
mod tests;
