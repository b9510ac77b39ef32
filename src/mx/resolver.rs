use async_trait::async_trait;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
};

use super::{MxCache, MxError, MxRecord, MxResolution, ResolverOptions};

/// Source of raw MX answers. Implemented for the tokio resolver and by test
/// stubs.
#[async_trait]
pub trait LookupMx: Send + Sync {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

#[async_trait]
impl LookupMx for TokioAsyncResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = self.mx_lookup(domain).await?;
        Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), mx.exchange().to_utf8()))
            .collect())
    }
}

/// Resolves the mail exchangers of a domain. Never fails: every DNS fault
/// degrades to an empty answer.
pub struct MxResolver<L = TokioAsyncResolver> {
    lookup: L,
    options: ResolverOptions,
    cache: Option<MxCache>,
}

impl MxResolver<TokioAsyncResolver> {
    /// Builds a resolver from the system configuration, or from
    /// `options.nameservers` when any are given.
    pub fn from_options(options: ResolverOptions) -> Result<Self, MxError> {
        let (config, mut opts) = if options.nameservers.is_empty() {
            trust_dns_resolver::system_conf::read_system_conf().map_err(MxError::resolver_init)?
        } else {
            let group = NameServerConfigGroup::from_ips_clear(&options.nameservers, 53, true);
            (
                ResolverConfig::from_parts(None, Vec::new(), group),
                ResolverOpts::default(),
            )
        };
        opts.timeout = options.query_timeout;
        opts.attempts = options.attempts;
        let resolver = TokioAsyncResolver::tokio(config, opts);
        Ok(Self::with_lookup(resolver, options))
    }
}

impl<L: LookupMx> MxResolver<L> {
    pub fn with_lookup(lookup: L, options: ResolverOptions) -> Self {
        let cache = options.cache_ttl.map(MxCache::new);
        Self {
            lookup,
            options,
            cache,
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// MX hosts of `domain` in ascending preference order; empty when the
    /// domain cannot receive mail or the lookup failed.
    pub async fn resolve(&self, domain: &str) -> Vec<MxRecord> {
        self.lookup(domain, None).await.into_records()
    }

    /// Same as [`resolve`](Self::resolve) but keeps the reason behind an
    /// empty answer. The lookup is abandoned at `deadline` if it comes before
    /// the configured lifetime.
    pub async fn lookup(&self, domain: &str, deadline: Option<Instant>) -> MxResolution {
        let started = Instant::now();
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(domain, started)) {
            debug!(domain, "MX answer served from cache");
            return hit;
        }

        let lifetime_end = started + self.options.lifetime;
        let budget = deadline.map_or(lifetime_end, |d| d.min(lifetime_end));
        let resolution = match timeout_at(budget, self.lookup.lookup_mx(domain)).await {
            Ok(Ok(records)) => from_records(records),
            Ok(Err(err)) => from_error(domain, &err),
            Err(_) => {
                let reason = if budget < lifetime_end {
                    "batch deadline reached during DNS lookup"
                } else {
                    "DNS lookup timed out"
                };
                warn!(domain, reason, "MX lookup abandoned");
                MxResolution::Failed {
                    reason: reason.to_string(),
                }
            }
        };

        if let Some(cache) = &self.cache {
            cache.insert(domain, &resolution, Instant::now());
        }
        resolution
    }
}

fn from_records(records: Vec<MxRecord>) -> MxResolution {
    let records = sort_records(records);
    if records.is_empty() {
        MxResolution::NoMailDomain {
            reason: "no MX records".to_string(),
        }
    } else {
        MxResolution::Records(records)
    }
}

fn from_error(domain: &str, err: &ResolveError) -> MxResolution {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            let reason = if *response_code == ResponseCode::NXDomain {
                "domain does not exist"
            } else {
                "no MX records"
            };
            debug!(domain, reason, "authoritative negative MX answer");
            MxResolution::NoMailDomain {
                reason: reason.to_string(),
            }
        }
        _ => {
            warn!(domain, error = %err, "MX lookup failed");
            MxResolution::Failed {
                reason: format!("DNS lookup failed: {err}"),
            }
        }
    }
}

/// Strips the root label and orders by preference. The sort is stable, so
/// equal preferences keep resolver order.
pub(crate) fn sort_records(records: Vec<MxRecord>) -> Vec<MxRecord> {
    let mut records: Vec<MxRecord> = records
        .into_iter()
        .map(|r| MxRecord::new(r.preference, normalize_exchange(&r.host)))
        .filter(|r| !r.host.is_empty())
        .collect();
    records.sort_by_key(|r| r.preference);
    records
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_string()
}
