use std::time::Duration;

use serde::Serialize;

use crate::validation::{ValidationResult, ValidationStatus};

/// Controls how [`BatchRunner`](crate::batch::BatchRunner) schedules work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Addresses validated at the same time.
    pub concurrency: usize,
    /// Wall-clock budget for the whole batch. In-flight probes are abandoned
    /// when it runs out.
    pub deadline: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 10,
            deadline: None,
        }
    }
}

/// Aggregate counts over a batch. The three buckets always add up to `total`.
///
/// `domain_valid_only` also holds addresses whose validation task aborted
/// after the format check. Those records are `MailboxRejected` with
/// `domain_exists() == false`: their domain was never verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub confirmed: usize,
    pub domain_valid_only: usize,
    pub invalid: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ValidationResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            summary.total += 1;
            match result.status() {
                ValidationStatus::MailboxConfirmed => summary.confirmed += 1,
                ValidationStatus::DomainValidMailboxUnknown
                | ValidationStatus::MailboxRejected => summary.domain_valid_only += 1,
                ValidationStatus::InvalidFormat | ValidationStatus::NoMxRecords => {
                    summary.invalid += 1
                }
            }
            summary
        })
    }
}

/// One result per input address, in input order, plus the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub results: Vec<ValidationResult>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn new(results: Vec<ValidationResult>) -> Self {
        let summary = BatchSummary::from_results(&results);
        Self { results, summary }
    }
}
