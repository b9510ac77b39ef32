use std::fmt;

use serde::Serialize;

/// Longest server text surfaced in outcomes and result details.
pub const MAX_DETAIL_CHARS: usize = 50;

/// Step of the probe dialogue, used to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStage {
    Connecting,
    Greeting,
    Helo,
    MailFrom,
    RcptTo,
    Quit,
}

impl fmt::Display for ProbeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "Connecting",
            Self::Greeting => "Greeting",
            Self::Helo => "HELO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Quit => "QUIT",
        })
    }
}

/// A raw SMTP reply, preserving the numeric status code and message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Message text capped to [`MAX_DETAIL_CHARS`].
    pub fn short_message(&self) -> String {
        truncate_detail(&self.message)
    }
}

/// Verdict of a single probe attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HandshakeOutcome {
    /// RCPT TO answered 250 or 251.
    Accepted { code: u16, message: String },
    /// RCPT TO answered with any other code.
    Rejected { code: u16, message: String },
    ConnectionFailed { stage: ProbeStage, reason: String },
    ProtocolError { stage: ProbeStage, reason: String },
    Timeout { stage: ProbeStage },
}

impl HandshakeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Transport-level outcomes that may succeed on another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }
}

impl fmt::Display for HandshakeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted { code, message } => write!(f, "accepted ({code} {message})"),
            Self::Rejected { code, message } => write!(f, "rejected ({code} {message})"),
            Self::ConnectionFailed { stage, reason } => {
                write!(f, "connection failed at {stage}: {reason}")
            }
            Self::ProtocolError { stage, reason } => {
                write!(f, "protocol error at {stage}: {reason}")
            }
            Self::Timeout { stage } => write!(f, "timed out at {stage}"),
        }
    }
}

pub(crate) fn truncate_detail(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX_DETAIL_CHARS) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_detail_caps_long_messages() {
        let long = "x".repeat(200);
        assert_eq!(truncate_detail(&long).chars().count(), MAX_DETAIL_CHARS);
        assert_eq!(truncate_detail("  short  "), "short");
    }

    #[test]
    fn truncate_detail_respects_char_boundaries() {
        let text = "é".repeat(60);
        assert_eq!(truncate_detail(&text), "é".repeat(MAX_DETAIL_CHARS));
    }

    #[test]
    fn timeout_display_names_stage() {
        let outcome = HandshakeOutcome::Timeout {
            stage: ProbeStage::Connecting,
        };
        assert_eq!(outcome.to_string(), "timed out at Connecting");
        assert!(outcome.is_transient());
    }
}
