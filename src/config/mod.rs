//! Runtime configuration: library defaults, optionally overlaid with a TOML
//! file. Command line flags are applied on top by the CLI.

mod error;
mod file;

pub use error::ConfigError;
pub use file::ConfigFile;

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use crate::batch::BatchOptions;
use crate::format::check_format;
use crate::mx::ResolverOptions;
use crate::smtp::ProbeOptions;
use crate::validation::ProbePolicy;

/// Every knob of the engine in one place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub resolver: ResolverOptions,
    pub probe: ProbeOptions,
    pub policy: ProbePolicy,
    pub batch: BatchOptions,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|source| ConfigError::Parse { source })?;
        let mut config = Self::default();
        config.apply_file(file)?;
        config.check()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) -> Result<(), ConfigError> {
        let ConfigFile {
            dns,
            smtp,
            policy,
            batch,
        } = file;

        if let Some(ms) = dns.query_timeout_ms {
            self.resolver.query_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = dns.lifetime_ms {
            self.resolver.lifetime = Duration::from_millis(ms);
        }
        if let Some(attempts) = dns.attempts {
            self.resolver.attempts = attempts;
        }
        if let Some(servers) = dns.nameservers {
            self.resolver.nameservers = parse_nameservers(&servers)?;
        }
        if let Some(secs) = dns.cache_ttl_secs {
            self.resolver.cache_ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(port) = smtp.port {
            self.probe.port = port;
        }
        if let Some(helo) = smtp.helo_name {
            self.probe.helo_name = helo;
        }
        if let Some(from) = smtp.mail_from {
            self.probe.mail_from = from;
        }
        if let Some(ms) = smtp.connect_timeout_ms {
            self.probe.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = smtp.command_timeout_ms {
            self.probe.command_timeout = Duration::from_millis(ms);
        }

        if let Some(enabled) = policy.smtp_enabled {
            self.policy.smtp_enabled = enabled;
        }
        if let Some(retries) = policy.same_host_retries {
            self.policy.same_host_retries = retries;
        }
        if let Some(max_hosts) = policy.max_hosts {
            self.policy.max_hosts = max_hosts;
        }

        if let Some(concurrency) = batch.concurrency {
            self.batch.concurrency = concurrency;
        }
        if let Some(secs) = batch.deadline_secs {
            self.batch.deadline = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(())
    }

    /// Rejects values the engine cannot run with.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.resolver.lifetime.is_zero() {
            return Err(ConfigError::invalid("dns.lifetime_ms", "must be positive"));
        }
        if self.resolver.attempts == 0 {
            return Err(ConfigError::invalid("dns.attempts", "must be at least 1"));
        }
        if self.probe.helo_name.trim().is_empty() {
            return Err(ConfigError::invalid("smtp.helo_name", "must not be empty"));
        }
        if !check_format(&self.probe.mail_from) {
            return Err(ConfigError::invalid(
                "smtp.mail_from",
                format!("'{}' is not a valid address", self.probe.mail_from),
            ));
        }
        if self.probe.connect_timeout.is_zero() || self.probe.command_timeout.is_zero() {
            return Err(ConfigError::invalid("smtp timeouts", "must be positive"));
        }
        if self.policy.max_hosts == 0 {
            return Err(ConfigError::invalid("policy.max_hosts", "must be at least 1"));
        }
        if self.batch.concurrency == 0 {
            return Err(ConfigError::invalid("batch.concurrency", "must be at least 1"));
        }
        Ok(())
    }
}

pub fn parse_nameservers(values: &[String]) -> Result<Vec<IpAddr>, ConfigError> {
    values
        .iter()
        .map(|value| {
            value.trim().parse::<IpAddr>().map_err(|_| {
                ConfigError::invalid("dns.nameservers", format!("'{value}' is not an IP address"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let config = Config::from_toml_str("").expect("empty config");
        assert_eq!(config, Config::default());
        assert_eq!(config.resolver.lifetime, Duration::from_secs(5));
        assert_eq!(config.probe.port, 25);
        assert_eq!(config.policy.max_hosts, 1);
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::from_toml_str(
            r#"
            [dns]
            lifetime_ms = 2500
            nameservers = ["1.1.1.1", "2606:4700:4700::1111"]
            cache_ttl_secs = 120

            [smtp]
            helo_name = "probe.example.net"
            mail_from = "verify@example.net"
            command_timeout_ms = 4000

            [policy]
            same_host_retries = 2
            max_hosts = 3

            [batch]
            concurrency = 32
            deadline_secs = 60
            "#,
        )
        .expect("valid config");
        assert_eq!(config.resolver.lifetime, Duration::from_millis(2500));
        assert_eq!(config.resolver.nameservers.len(), 2);
        assert_eq!(config.resolver.cache_ttl, Some(Duration::from_secs(120)));
        assert_eq!(config.probe.helo_name, "probe.example.net");
        assert_eq!(config.probe.command_timeout, Duration::from_secs(4));
        assert_eq!(config.policy.same_host_retries, 2);
        assert_eq!(config.batch.concurrency, 32);
        assert_eq!(config.batch.deadline, Some(Duration::from_secs(60)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[smtp]\nstarttls = true\n").expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn bad_values_are_reported_with_key() {
        let err = Config::from_toml_str("[batch]\nconcurrency = 0\n").expect_err("zero");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "batch.concurrency",
                ..
            }
        ));

        let err = Config::from_toml_str("[dns]\nnameservers = [\"dns.google\"]\n")
            .expect_err("hostname");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "dns.nameservers",
                ..
            }
        ));

        let err = Config::from_toml_str("[smtp]\nmail_from = \"nobody\"\n").expect_err("sender");
        assert!(err.to_string().contains("smtp.mail_from"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::from_file("/nonexistent/mailverify.toml").expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
