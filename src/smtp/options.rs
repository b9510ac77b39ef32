use std::time::Duration;

/// Controls how [`SmtpProbe`](crate::smtp::SmtpProbe) talks to a mail server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub port: u16,
    /// Name announced in `HELO`. Identifies the prober, never a third party.
    pub helo_name: String,
    /// Envelope sender dedicated to probing; never a real outbound mailbox.
    pub mail_from: String,
    pub connect_timeout: Duration,
    /// Budget for each command/reply exchange, greeting included.
    pub command_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            helo_name: "mailverify.localhost".to_string(),
            mail_from: "probe@mailverify.localhost".to_string(),
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(10),
        }
    }
}
