use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use trust_dns_resolver::error::ResolveError;

use super::{LookupMx, MxRecord, MxResolution, MxResolver, ResolverOptions, resolver};

type LookupResult = Result<Vec<MxRecord>, ResolveError>;
type LookupFn = dyn Fn(&str) -> LookupResult + Send + Sync;

pub(crate) struct StubResolver {
    pub on_lookup: Box<LookupFn>,
    pub delay: Duration,
    pub calls: Arc<AtomicUsize>,
}

impl StubResolver {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> LookupResult + Send + Sync + 'static,
    {
        Self {
            on_lookup: Box::new(f),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn records(records: Vec<MxRecord>) -> Self {
        Self::new(move |_| Ok(records.clone()))
    }
}

#[async_trait]
impl LookupMx for StubResolver {
    async fn lookup_mx(&self, domain: &str) -> LookupResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.on_lookup)(domain)
    }
}

fn hosts(records: &[MxRecord]) -> Vec<&str> {
    records.iter().map(|r| r.host.as_str()).collect()
}

#[tokio::test]
async fn resolve_sorts_by_ascending_preference() {
    let stub = StubResolver::new(|domain| {
        assert_eq!(domain, "example.com");
        Ok(vec![MxRecord::new(20, "b.mx"), MxRecord::new(10, "a.mx")])
    });
    let resolver = MxResolver::with_lookup(stub, ResolverOptions::default());
    let records = resolver.resolve("example.com").await;
    assert_eq!(hosts(&records), ["a.mx", "b.mx"]);
}

#[tokio::test]
async fn equal_preferences_keep_resolver_order() {
    let stub = StubResolver::records(vec![
        MxRecord::new(10, "second.mx."),
        MxRecord::new(5, "first.mx."),
        MxRecord::new(10, "third.mx."),
    ]);
    let resolver = MxResolver::with_lookup(stub, ResolverOptions::default());
    let records = resolver.resolve("example.com").await;
    assert_eq!(hosts(&records), ["first.mx", "second.mx", "third.mx"]);
}

#[tokio::test]
async fn empty_answer_is_no_mail_domain() {
    let resolver =
        MxResolver::with_lookup(StubResolver::records(Vec::new()), ResolverOptions::default());
    let resolution = resolver.lookup("nomx.test", None).await;
    assert!(matches!(resolution, MxResolution::NoMailDomain { .. }));
    assert!(resolver.resolve("nomx.test").await.is_empty());
}

#[tokio::test]
async fn null_mx_counts_as_no_mail_domain() {
    let stub = StubResolver::records(vec![MxRecord::new(0, ".")]);
    let resolver = MxResolver::with_lookup(stub, ResolverOptions::default());
    let resolution = resolver.lookup("nullmx.test", None).await;
    assert!(matches!(resolution, MxResolution::NoMailDomain { .. }));
}

#[tokio::test]
async fn resolver_fault_degrades_to_empty() {
    let stub = StubResolver::new(|_| Err(ResolveError::from("upstream exploded")));
    let resolver = MxResolver::with_lookup(stub, ResolverOptions::default());
    match resolver.lookup("example.com", None).await {
        MxResolution::Failed { reason } => assert!(reason.contains("upstream exploded")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(resolver.resolve("example.com").await.is_empty());
}

#[tokio::test]
async fn slow_lookup_is_cut_at_lifetime() {
    let mut stub = StubResolver::records(vec![MxRecord::new(10, "mx.example.com")]);
    stub.delay = Duration::from_secs(30);
    let options = ResolverOptions {
        lifetime: Duration::from_millis(50),
        ..ResolverOptions::default()
    };
    let resolver = MxResolver::with_lookup(stub, options);
    let started = std::time::Instant::now();
    let resolution = resolver.lookup("example.com", None).await;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(
        resolution,
        MxResolution::Failed {
            reason: "DNS lookup timed out".to_string()
        }
    );
}

#[tokio::test]
async fn cache_serves_repeated_domains() {
    let stub = StubResolver::records(vec![MxRecord::new(10, "mx.example.com")]);
    let calls = Arc::clone(&stub.calls);
    let options = ResolverOptions {
        cache_ttl: Some(Duration::from_secs(60)),
        ..ResolverOptions::default()
    };
    let resolver = MxResolver::with_lookup(stub, options);
    let first = resolver.resolve("example.com").await;
    let second = resolver.resolve("EXAMPLE.com").await;
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_nameserver_yields_empty() {
    let options = ResolverOptions {
        query_timeout: Duration::from_millis(200),
        lifetime: Duration::from_millis(500),
        attempts: 1,
        nameservers: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
        cache_ttl: None,
    };
    let resolver = MxResolver::from_options(options).expect("explicit nameservers");
    let records = resolver
        .resolve("mailverify-no-such-domain.invalid")
        .await;
    assert!(records.is_empty());
}

#[test]
fn normalize_exchange_trims_root_label() {
    assert_eq!(resolver::normalize_exchange("mail.example.com."), "mail.example.com");
    assert_eq!(resolver::normalize_exchange("mail.example.com"), "mail.example.com");
}
