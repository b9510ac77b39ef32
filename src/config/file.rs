//! Structure mirroring the TOML configuration file. Every key is optional.

use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub(crate) dns: DnsSection,
    #[serde(default)]
    pub(crate) smtp: SmtpSection,
    #[serde(default)]
    pub(crate) policy: PolicySection,
    #[serde(default)]
    pub(crate) batch: BatchSection,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct DnsSection {
    pub(crate) query_timeout_ms: Option<u64>,
    pub(crate) lifetime_ms: Option<u64>,
    pub(crate) attempts: Option<usize>,
    pub(crate) nameservers: Option<Vec<String>>,
    pub(crate) cache_ttl_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct SmtpSection {
    pub(crate) port: Option<u16>,
    pub(crate) helo_name: Option<String>,
    pub(crate) mail_from: Option<String>,
    pub(crate) connect_timeout_ms: Option<u64>,
    pub(crate) command_timeout_ms: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct PolicySection {
    pub(crate) smtp_enabled: Option<bool>,
    pub(crate) same_host_retries: Option<u32>,
    pub(crate) max_hosts: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct BatchSection {
    pub(crate) concurrency: Option<usize>,
    pub(crate) deadline_secs: Option<u64>,
}
