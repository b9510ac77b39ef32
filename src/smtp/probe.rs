use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::ProbeOptions;
use super::session::SmtpSession;
use super::types::{HandshakeOutcome, ProbeStage, SmtpReply};

/// Tests whether a mail server accepts a recipient. Implemented by
/// [`SmtpProbe`] and by test doubles.
#[async_trait]
pub trait MailboxProbe: Send + Sync {
    /// Probes `candidate` against `mx_host`. No stage may run past
    /// `deadline`; an abandoned stage yields [`HandshakeOutcome::Timeout`].
    async fn probe(
        &self,
        candidate: &str,
        mx_host: &str,
        deadline: Option<Instant>,
    ) -> HandshakeOutcome;
}

/// Truncated SMTP client: greeting, `HELO`, `MAIL FROM`, `RCPT TO`, then
/// `QUIT`. Never reaches `DATA`.
#[derive(Debug, Clone, Default)]
pub struct SmtpProbe {
    options: ProbeOptions,
}

impl SmtpProbe {
    pub fn new(options: ProbeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    pub async fn probe_host(
        &self,
        candidate: &str,
        mx_host: &str,
        deadline: Option<Instant>,
    ) -> HandshakeOutcome {
        let connect_deadline = stage_deadline(self.options.connect_timeout, deadline);
        let mut session =
            match SmtpSession::connect(mx_host, self.options.port, connect_deadline).await {
                Ok(session) => session,
                Err(err) => {
                    debug!(mx_host, error = %err, "SMTP connection failed");
                    return err.at(ProbeStage::Connecting);
                }
            };

        let outcome = self.converse(&mut session, candidate, deadline).await;
        debug!(mx_host, candidate, %outcome, "SMTP probe finished");
        self.quit(&mut session, &outcome, deadline).await;
        outcome
    }

    async fn converse(
        &self,
        session: &mut SmtpSession,
        candidate: &str,
        deadline: Option<Instant>,
    ) -> HandshakeOutcome {
        let greeting = match session.read_reply(self.command_deadline(deadline)).await {
            Ok(reply) => reply,
            Err(err) => return err.at(ProbeStage::Greeting),
        };
        if !greeting.is_positive_completion() {
            return unexpected(ProbeStage::Greeting, &greeting);
        }

        let helo = format!("HELO {}", self.options.helo_name);
        if let Err(outcome) = self
            .expect_positive(session, &helo, ProbeStage::Helo, deadline)
            .await
        {
            return outcome;
        }

        let mail_from = format!("MAIL FROM:<{}>", self.options.mail_from);
        if let Err(outcome) = self
            .expect_positive(session, &mail_from, ProbeStage::MailFrom, deadline)
            .await
        {
            return outcome;
        }

        let rcpt_to = format!("RCPT TO:<{candidate}>");
        let reply = match session
            .command(&rcpt_to, self.command_deadline(deadline))
            .await
        {
            Ok(reply) => reply,
            Err(err) => return err.at(ProbeStage::RcptTo),
        };
        match reply.code {
            250 | 251 => HandshakeOutcome::Accepted {
                code: reply.code,
                message: reply.short_message(),
            },
            code => HandshakeOutcome::Rejected {
                code,
                message: reply.short_message(),
            },
        }
    }

    async fn expect_positive(
        &self,
        session: &mut SmtpSession,
        command: &str,
        stage: ProbeStage,
        deadline: Option<Instant>,
    ) -> Result<SmtpReply, HandshakeOutcome> {
        let reply = session
            .command(command, self.command_deadline(deadline))
            .await
            .map_err(|err| err.at(stage))?;
        if reply.is_positive_completion() {
            Ok(reply)
        } else {
            Err(unexpected(stage, &reply))
        }
    }

    /// Best effort: the verdict is already fixed, so failures are only logged.
    /// After a timeout the server has stopped answering, so QUIT is sent
    /// without waiting for the reply.
    async fn quit(
        &self,
        session: &mut SmtpSession,
        outcome: &HandshakeOutcome,
        deadline: Option<Instant>,
    ) {
        let quit_deadline = self.command_deadline(deadline);
        if matches!(outcome, HandshakeOutcome::Timeout { .. }) {
            if let Err(err) = session.send_command("QUIT", quit_deadline).await {
                debug!(error = %err, "QUIT not sent");
            }
            return;
        }
        match session.command("QUIT", quit_deadline).await {
            Ok(reply) => trace!(code = reply.code, "QUIT acknowledged"),
            Err(err) => debug!(error = %err, "QUIT failed"),
        }
    }

    fn command_deadline(&self, deadline: Option<Instant>) -> Instant {
        stage_deadline(self.options.command_timeout, deadline)
    }
}

#[async_trait]
impl MailboxProbe for SmtpProbe {
    async fn probe(
        &self,
        candidate: &str,
        mx_host: &str,
        deadline: Option<Instant>,
    ) -> HandshakeOutcome {
        self.probe_host(candidate, mx_host, deadline).await
    }
}

fn stage_deadline(budget: Duration, deadline: Option<Instant>) -> Instant {
    let local = Instant::now() + budget;
    deadline.map_or(local, |d| d.min(local))
}

fn unexpected(stage: ProbeStage, reply: &SmtpReply) -> HandshakeOutcome {
    HandshakeOutcome::ProtocolError {
        stage,
        reason: format!("unexpected reply {} {}", reply.code, reply.short_message())
            .trim_end()
            .to_string(),
    }
}
