use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::time::Instant;

use super::{BatchOptions, BatchRunner, BatchSummary};
use crate::mx::tests::StubResolver;
use crate::mx::{MxRecord, MxResolver, ResolverOptions};
use crate::smtp::{HandshakeOutcome, MailboxProbe, ProbeOptions, ProbeStage, SmtpProbe};
use crate::validation::tests::{StubProbe, accepted};
use crate::validation::{ProbePolicy, ValidationResult, ValidationStatus, Validator};

fn resolver() -> MxResolver<StubResolver> {
    let stub = StubResolver::new(|domain| {
        if domain == "nomx.test" {
            Ok(Vec::new())
        } else {
            Ok(vec![MxRecord::new(10, format!("mx.{domain}"))])
        }
    });
    MxResolver::with_lookup(stub, ResolverOptions::default())
}

/// Sleeps for the number of milliseconds found in the local part
/// (`"30@..."`) and tracks how many probes run at once.
struct SlowProbe {
    in_flight: AtomicUsize,
    peak: Arc<AtomicUsize>,
}

#[async_trait]
impl MailboxProbe for SlowProbe {
    async fn probe(
        &self,
        candidate: &str,
        _mx_host: &str,
        _deadline: Option<Instant>,
    ) -> HandshakeOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let millis = candidate
            .split('@')
            .next()
            .and_then(|local| local.parse::<u64>().ok())
            .unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(millis)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        accepted()
    }
}

#[tokio::test]
async fn results_follow_input_order() {
    let peak = Arc::new(AtomicUsize::new(0));
    let probe = SlowProbe {
        in_flight: AtomicUsize::new(0),
        peak: Arc::clone(&peak),
    };
    let validator = Validator::new(resolver(), probe, ProbePolicy::default());
    let runner = BatchRunner::new(
        validator,
        BatchOptions {
            concurrency: 2,
            deadline: None,
        },
    );
    let input = [
        "120@example.com",
        "10@example.com",
        "not-an-email",
        "60@example.com",
        "0@example.com",
    ];
    let report = runner.run(input).await;
    let emails: Vec<&str> = report.results.iter().map(|r| r.email()).collect();
    assert_eq!(emails, input);
    assert!(peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn panicking_probe_does_not_abort_batch() {
    let probe = StubProbe::new(|candidate, _, _| {
        if candidate == "boom@example.com" {
            panic!("probe blew up");
        }
        accepted()
    });
    let validator = Validator::new(resolver(), probe, ProbePolicy::default());
    let runner = BatchRunner::new(validator, BatchOptions::default());
    let input = [
        "alice@example.com",
        "boom@example.com",
        "bob@example.com",
        "carol@nomx.test",
        "bad address",
    ];
    let report = runner.run(input).await;

    assert_eq!(report.results.len(), input.len());
    let statuses: Vec<ValidationStatus> = report.results.iter().map(|r| r.status()).collect();
    assert_eq!(
        statuses,
        [
            ValidationStatus::MailboxConfirmed,
            ValidationStatus::MailboxRejected,
            ValidationStatus::MailboxConfirmed,
            ValidationStatus::NoMxRecords,
            ValidationStatus::InvalidFormat,
        ]
    );
    assert!(report.results[1].details().starts_with("validation aborted"));
    assert_eq!(
        report.summary,
        BatchSummary {
            total: 5,
            confirmed: 2,
            domain_valid_only: 1,
            invalid: 2,
        }
    );
}

#[test]
fn aborted_record_is_counted_as_domain_valid_only() {
    let results = [
        ValidationResult::task_failed("user@example.com", "task panicked"),
        ValidationResult::task_failed("not-an-email", "task panicked"),
    ];
    assert!(!results[0].domain_exists());
    assert_eq!(
        BatchSummary::from_results(&results),
        BatchSummary {
            total: 2,
            confirmed: 0,
            domain_valid_only: 1,
            invalid: 1,
        }
    );
}

#[tokio::test]
async fn empty_batch_yields_empty_report() {
    let validator = Validator::new(
        resolver(),
        StubProbe::always(accepted()),
        ProbePolicy::default(),
    );
    let runner = BatchRunner::new(validator, BatchOptions::default());
    let report = runner.run(Vec::<String>::new()).await;
    assert!(report.results.is_empty());
    assert_eq!(report.summary, BatchSummary::default());
}

#[tokio::test]
async fn batch_deadline_abandons_in_flight_probes() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let stub = StubResolver::records(vec![MxRecord::new(10, "127.0.0.1")]);
    let probe = SmtpProbe::new(ProbeOptions {
        port,
        connect_timeout: Duration::from_secs(30),
        command_timeout: Duration::from_secs(30),
        ..ProbeOptions::default()
    });
    let validator = Validator::new(
        MxResolver::with_lookup(stub, ResolverOptions::default()),
        probe,
        ProbePolicy::default(),
    );
    let runner = BatchRunner::new(
        validator,
        BatchOptions {
            concurrency: 4,
            deadline: Some(Duration::from_millis(300)),
        },
    );

    let started = std::time::Instant::now();
    let report = runner
        .run(["a@example.com", "b@example.com", "c@example.com"])
        .await;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.results.len(), 3);
    for result in &report.results {
        assert_eq!(result.status(), ValidationStatus::MailboxRejected);
        assert_eq!(
            result.handshake(),
            Some(&HandshakeOutcome::Timeout {
                stage: ProbeStage::Greeting
            })
        );
    }
    server.abort();
}
