use std::net::IpAddr;
use std::time::Duration;

/// Controls how [`MxResolver`](crate::mx::MxResolver) queries DNS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Budget for a single request to a nameserver.
    pub query_timeout: Duration,
    /// Budget for the whole lookup, retries included.
    pub lifetime: Duration,
    pub attempts: usize,
    /// Nameservers to query instead of the system configuration.
    pub nameservers: Vec<IpAddr>,
    /// Enables the per-domain MX cache when set.
    pub cache_ttl: Option<Duration>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(5),
            lifetime: Duration::from_secs(5),
            attempts: 2,
            nameservers: Vec::new(),
            cache_ttl: None,
        }
    }
}
