//! Per-address orchestration: format check, MX resolution, SMTP probe.
//!
//! Each stage short-circuits the rest. Every failure ends up in the
//! [`ValidationResult`] for that address; nothing here returns an error.

mod policy;
mod types;

pub use policy::ProbePolicy;
pub use types::{ValidationResult, ValidationStatus};

pub(crate) use types::ResultBuilder;

use tokio::time::Instant;
use tracing::debug;
use trust_dns_resolver::TokioAsyncResolver;

use crate::format::parse_address;
use crate::mx::{LookupMx, MxError, MxRecord, MxResolution, MxResolver, ResolverOptions};
use crate::smtp::{HandshakeOutcome, MailboxProbe, ProbeOptions, ProbeStage, SmtpProbe};

/// Runs the validation stages for one address at a time. Cheap to share
/// behind an `Arc` across tasks.
pub struct Validator<L = TokioAsyncResolver, P = SmtpProbe> {
    resolver: MxResolver<L>,
    probe: P,
    policy: ProbePolicy,
}

impl Validator {
    /// Builds a validator backed by the system resolver and a real SMTP
    /// probe. Fails only when the resolver configuration is unusable.
    pub fn from_options(
        resolver: ResolverOptions,
        probe: ProbeOptions,
        policy: ProbePolicy,
    ) -> Result<Self, MxError> {
        Ok(Self::new(
            MxResolver::from_options(resolver)?,
            SmtpProbe::new(probe),
            policy,
        ))
    }
}

impl<L: LookupMx, P: MailboxProbe> Validator<L, P> {
    pub fn new(resolver: MxResolver<L>, probe: P, policy: ProbePolicy) -> Self {
        Self {
            resolver,
            probe,
            policy,
        }
    }

    pub fn policy(&self) -> &ProbePolicy {
        &self.policy
    }

    pub async fn validate(&self, email: &str) -> ValidationResult {
        self.validate_until(email, None).await
    }

    /// Like [`validate`](Self::validate), but no stage runs past `deadline`.
    pub async fn validate_until(&self, email: &str, deadline: Option<Instant>) -> ValidationResult {
        let builder = ResultBuilder::new(email);
        let Some(parsed) = parse_address(email) else {
            debug!(email, "rejected by format check");
            return builder.invalid_format();
        };
        let builder = builder.format_ok();

        let records = match self.resolver.lookup(parsed.domain(), deadline).await {
            MxResolution::Records(records) => records,
            MxResolution::NoMailDomain { reason } | MxResolution::Failed { reason } => {
                debug!(email, %reason, "no usable MX records");
                return builder.no_mx(reason);
            }
        };
        let builder = builder.with_records(records);

        if !self.policy.smtp_enabled {
            return builder.smtp_skipped();
        }

        let (host, outcome) = self.probe_hosts(email, builder.records(), deadline).await;
        builder.probed(&host, outcome)
    }

    async fn probe_hosts(
        &self,
        email: &str,
        records: &[MxRecord],
        deadline: Option<Instant>,
    ) -> (String, HandshakeOutcome) {
        let mut last = None;
        for record in records.iter().take(self.policy.max_hosts.max(1)) {
            for attempt in 0..=self.policy.same_host_retries {
                let outcome = self.probe.probe(email, &record.host, deadline).await;
                if !outcome.is_transient() || deadline_passed(deadline) {
                    return (record.host.clone(), outcome);
                }
                debug!(host = %record.host, attempt, %outcome, "transient probe failure");
                last = Some((record.host.clone(), outcome));
            }
        }
        last.unwrap_or_else(|| {
            (
                String::new(),
                HandshakeOutcome::ConnectionFailed {
                    stage: ProbeStage::Connecting,
                    reason: "no MX host to probe".to_string(),
                },
            )
        })
    }
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}
