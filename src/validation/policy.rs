/// What the orchestrator does once MX records are known.
///
/// The defaults probe only the highest-preference host, once. Transport
/// failures (`ConnectionFailed`, `Timeout`) are retried `same_host_retries`
/// times and then moved to the next host while fewer than `max_hosts` hosts
/// were tried. Rejections and protocol errors are final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbePolicy {
    pub smtp_enabled: bool,
    pub same_host_retries: u32,
    pub max_hosts: usize,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            smtp_enabled: true,
            same_host_retries: 0,
            max_hosts: 1,
        }
    }
}
