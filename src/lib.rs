#![forbid(unsafe_code)]
//! mailverify_lib — address syntax, MX resolution and SMTP recipient probing

pub mod batch;
pub mod config;
pub mod format;
pub mod mx;
pub mod smtp;
pub mod validation;

pub use batch::{BatchOptions, BatchReport, BatchRunner, BatchSummary};
pub use config::{Config, ConfigError};
pub use format::{ParsedAddress, check_format, parse_address};
pub use mx::{LookupMx, MxCache, MxError, MxRecord, MxResolution, MxResolver, ResolverOptions};
pub use smtp::{HandshakeOutcome, MailboxProbe, ProbeOptions, ProbeStage, SmtpProbe, SmtpReply};
pub use validation::{ProbePolicy, ValidationResult, ValidationStatus, Validator};
