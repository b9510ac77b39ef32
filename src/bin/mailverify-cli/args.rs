use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use mailverify_lib::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Ndjson,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "mailverify-cli", version, about = "Checks e-mail addresses without sending mail")]
pub struct Cli {
    /// addresses to check
    pub emails: Vec<String>,

    /// reads addresses from a file (one per line)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// reads addresses from stdin (one per line)
    #[arg(long)]
    pub stdin: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// writes the report to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// addresses checked at the same time
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// wall-clock budget for the whole batch (seconds)
    #[arg(long = "deadline", value_name = "SECS")]
    pub deadline_secs: Option<u64>,

    /// stops after MX resolution
    #[arg(long)]
    pub no_smtp: bool,

    /// name announced in HELO
    #[arg(long)]
    pub helo: Option<String>,

    /// envelope sender used for probing
    #[arg(long)]
    pub mail_from: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// retries on the same MX host after a transport failure
    #[arg(long)]
    pub retries: Option<u32>,

    /// MX hosts tried before giving up
    #[arg(long)]
    pub max_mx: Option<usize>,

    /// caches MX answers per domain (seconds, 0 disables)
    #[arg(long = "cache-ttl", value_name = "SECS")]
    pub cache_ttl_secs: Option<u64>,

    /// TOML configuration file
    #[arg(long, env = "MAILVERIFY_CONFIG")]
    pub config: Option<PathBuf>,

    /// more logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn has_input(&self) -> bool {
        !self.emails.is_empty() || self.input.is_some() || self.stdin
    }

    /// Overlays the flags given on the command line.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(concurrency) = self.concurrency {
            config.batch.concurrency = concurrency;
        }
        if let Some(secs) = self.deadline_secs {
            config.batch.deadline = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if self.no_smtp {
            config.policy.smtp_enabled = false;
        }
        if let Some(helo) = &self.helo {
            config.probe.helo_name = helo.clone();
        }
        if let Some(from) = &self.mail_from {
            config.probe.mail_from = from.clone();
        }
        if let Some(port) = self.port {
            config.probe.port = port;
        }
        if let Some(retries) = self.retries {
            config.policy.same_host_retries = retries;
        }
        if let Some(max_mx) = self.max_mx {
            config.policy.max_hosts = max_mx;
        }
        if let Some(secs) = self.cache_ttl_secs {
            config.resolver.cache_ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
