//! SMTP recipient probing.
//!
//! [`SmtpProbe`] opens one transient connection to a mail exchanger and runs
//! greeting, `HELO`, `MAIL FROM` and `RCPT TO`, then quits. The verdict is a
//! [`HandshakeOutcome`]; nothing is ever delivered.

mod error;
mod options;
mod probe;
mod session;
mod types;

pub use options::ProbeOptions;
pub use probe::{MailboxProbe, SmtpProbe};
pub use types::{HandshakeOutcome, MAX_DETAIL_CHARS, ProbeStage, SmtpReply};

pub(crate) use types::truncate_detail;
