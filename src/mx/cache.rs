use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::MxResolution;

/// Short-lived per-domain cache of authoritative MX answers.
///
/// The lock only guards map access and is never held across a lookup.
/// Resolver faults are never cached.
#[derive(Debug)]
pub struct MxCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedAnswer>>,
}

#[derive(Debug, Clone)]
struct CachedAnswer {
    resolution: MxResolution,
    expires_at: Instant,
}

impl MxCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub(crate) fn get(&self, domain: &str, now: Instant) -> Option<MxResolution> {
        let key = cache_key(domain);
        let mut entries = self.entries.lock();
        match entries.get(&key) {
            Some(answer) if answer.expires_at > now => Some(answer.resolution.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub(crate) fn insert(&self, domain: &str, resolution: &MxResolution, now: Instant) {
        if matches!(resolution, MxResolution::Failed { .. }) {
            return;
        }
        let answer = CachedAnswer {
            resolution: resolution.clone(),
            expires_at: now + self.ttl,
        };
        self.entries.lock().insert(cache_key(domain), answer);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(domain: &str) -> String {
    domain.trim_end_matches('.').to_ascii_lowercase()
}
