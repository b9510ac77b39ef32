use std::fmt;

use serde::Serialize;

use crate::format::check_format;
use crate::mx::MxRecord;
use crate::smtp::HandshakeOutcome;

/// Externally visible classification of one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    InvalidFormat,
    NoMxRecords,
    /// MX records exist but the SMTP probe was not run.
    DomainValidMailboxUnknown,
    MailboxConfirmed,
    /// The probe ran and did not confirm the mailbox, whatever the reason.
    MailboxRejected,
}

impl ValidationStatus {
    /// Stable machine-readable name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidFormat => "invalid_format",
            Self::NoMxRecords => "no_mx_records",
            Self::DomainValidMailboxUnknown => "domain_valid_mailbox_unknown",
            Self::MailboxConfirmed => "mailbox_confirmed",
            Self::MailboxRejected => "mailbox_rejected",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidFormat => "invalid format",
            Self::NoMxRecords => "no MX records",
            Self::DomainValidMailboxUnknown => "domain valid, mailbox not checked",
            Self::MailboxConfirmed => "mailbox confirmed",
            Self::MailboxRejected => "mailbox not confirmed",
        })
    }
}

/// Terminal record for one address. Only the crate builds it; callers read
/// it through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    email: String,
    valid_format: bool,
    domain_exists: bool,
    mx_records: Vec<MxRecord>,
    smtp_check: bool,
    status: ValidationStatus,
    details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    handshake: Option<HandshakeOutcome>,
}

impl ValidationResult {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn valid_format(&self) -> bool {
        self.valid_format
    }

    pub fn domain_exists(&self) -> bool {
        self.domain_exists
    }

    pub fn mx_records(&self) -> &[MxRecord] {
        &self.mx_records
    }

    pub fn smtp_check(&self) -> bool {
        self.smtp_check
    }

    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    /// The probe verdict, when a probe ran.
    pub fn handshake(&self) -> Option<&HandshakeOutcome> {
        self.handshake.as_ref()
    }

    /// Record for an address whose validation task died before producing a
    /// result.
    pub(crate) fn task_failed(email: &str, reason: &str) -> Self {
        let builder = ResultBuilder::new(email);
        if !check_format(email) {
            return builder.invalid_format();
        }
        let mut result = builder.format_ok().finish(ValidationStatus::MailboxRejected);
        result.details = format!("validation aborted: {reason}");
        result
    }
}

/// Intermediate state while an address moves through the stages.
pub(crate) struct ResultBuilder {
    email: String,
    valid_format: bool,
    mx_records: Vec<MxRecord>,
}

impl ResultBuilder {
    pub(crate) fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            valid_format: false,
            mx_records: Vec::new(),
        }
    }

    pub(crate) fn invalid_format(self) -> ValidationResult {
        let mut result = self.finish(ValidationStatus::InvalidFormat);
        result.details = "address does not match the accepted format".to_string();
        result
    }

    pub(crate) fn format_ok(mut self) -> Self {
        self.valid_format = true;
        self
    }

    pub(crate) fn no_mx(self, reason: String) -> ValidationResult {
        let mut result = self.finish(ValidationStatus::NoMxRecords);
        result.details = reason;
        result
    }

    pub(crate) fn with_records(mut self, records: Vec<MxRecord>) -> Self {
        if self.valid_format {
            self.mx_records = records;
        }
        self
    }

    pub(crate) fn records(&self) -> &[MxRecord] {
        &self.mx_records
    }

    pub(crate) fn smtp_skipped(self) -> ValidationResult {
        let mut result = self.finish(ValidationStatus::DomainValidMailboxUnknown);
        result.details = format!(
            "{} MX record(s); SMTP check not performed",
            result.mx_records.len()
        );
        result
    }

    pub(crate) fn probed(self, host: &str, outcome: HandshakeOutcome) -> ValidationResult {
        let accepted = outcome.is_accepted() && !self.mx_records.is_empty();
        let status = if accepted {
            ValidationStatus::MailboxConfirmed
        } else {
            ValidationStatus::MailboxRejected
        };
        let mut result = self.finish(status);
        result.smtp_check = accepted;
        result.details = format!("{host}: {outcome}");
        result.handshake = Some(outcome);
        result
    }

    fn finish(self, status: ValidationStatus) -> ValidationResult {
        let domain_exists = self.valid_format && !self.mx_records.is_empty();
        ValidationResult {
            email: self.email,
            valid_format: self.valid_format,
            domain_exists,
            mx_records: self.mx_records,
            smtp_check: false,
            status,
            details: String::new(),
            handshake: None,
        }
    }
}
