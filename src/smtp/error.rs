use thiserror::Error;

use super::{HandshakeOutcome, ProbeStage};

/// Failure of a single session operation, before it is tagged with a stage.
#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("operation timed out")]
    Timeout,
    #[error("connection closed by server")]
    Closed,
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Protocol(String),
}

impl SessionError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    pub(crate) fn at(self, stage: ProbeStage) -> HandshakeOutcome {
        match self {
            Self::Timeout => HandshakeOutcome::Timeout { stage },
            Self::Closed | Self::Io { .. } => HandshakeOutcome::ConnectionFailed {
                stage,
                reason: self.to_string(),
            },
            Self::Protocol(reason) => HandshakeOutcome::ProtocolError { stage, reason },
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}
