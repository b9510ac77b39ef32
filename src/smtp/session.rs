use std::future::Future;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};
use tracing::trace;

use super::error::SessionError;
use super::types::{SmtpReply, truncate_detail};

const MAX_LINE_BYTES: u64 = 1024;
const MAX_REPLY_LINES: usize = 64;

/// A plain-text SMTP connection. Every operation is bounded by the deadline
/// passed in; dropping the session closes the socket.
pub(crate) struct SmtpSession {
    host: String,
    stream: BufStream<TcpStream>,
}

impl SmtpSession {
    pub(crate) async fn connect(
        host: &str,
        port: u16,
        deadline: Instant,
    ) -> Result<Self, SessionError> {
        let stream = bounded(deadline, TcpStream::connect((host, port))).await??;
        trace!(host, port, "connected");
        Ok(Self {
            host: host.to_string(),
            stream: BufStream::new(stream),
        })
    }

    pub(crate) async fn send_command(
        &mut self,
        command: &str,
        deadline: Instant,
    ) -> Result<(), SessionError> {
        trace!(host = %self.host, "C: {command}");
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        bounded(deadline, async {
            self.stream.write_all(&line).await?;
            self.stream.flush().await
        })
        .await??;
        Ok(())
    }

    pub(crate) async fn read_reply(&mut self, deadline: Instant) -> Result<SmtpReply, SessionError> {
        bounded(deadline, self.read_reply_unbounded()).await?
    }

    pub(crate) async fn command(
        &mut self,
        command: &str,
        deadline: Instant,
    ) -> Result<SmtpReply, SessionError> {
        self.send_command(command, deadline).await?;
        self.read_reply(deadline).await
    }

    async fn read_reply_unbounded(&mut self) -> Result<SmtpReply, SessionError> {
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            if message_lines.len() >= MAX_REPLY_LINES {
                return Err(SessionError::protocol(format!(
                    "reply exceeds {MAX_REPLY_LINES} lines"
                )));
            }
            let raw = self.read_line().await?;
            trace!(host = %self.host, "S: {}", truncate_detail(&raw));

            let code_part = raw.get(..3).ok_or_else(|| {
                SessionError::protocol(format!(
                    "invalid SMTP reply: '{}'",
                    truncate_detail(&raw)
                ))
            })?;
            let parsed_code = code_part
                .parse::<u16>()
                .ok()
                .filter(|c| (100..600).contains(c))
                .ok_or_else(|| {
                    SessionError::protocol(format!("invalid SMTP status code: '{code_part}'"))
                })?;
            match code {
                Some(existing) if existing != parsed_code => {
                    return Err(SessionError::protocol(format!(
                        "inconsistent SMTP reply codes: {existing} vs {parsed_code}"
                    )));
                }
                Some(_) => {}
                None => code = Some(parsed_code),
            }

            let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
            message_lines.push(raw.get(4..).unwrap_or_default().to_string());
            if !continuation {
                break;
            }
        }
        let code = code.ok_or_else(|| SessionError::protocol("SMTP reply missing status code"))?;
        Ok(SmtpReply {
            code,
            message: message_lines.join("\n"),
        })
    }

    async fn read_line(&mut self) -> Result<String, SessionError> {
        let mut buf = Vec::new();
        let read = (&mut self.stream)
            .take(MAX_LINE_BYTES)
            .read_until(b'\n', &mut buf)
            .await?;
        if read == 0 {
            return Err(SessionError::Closed);
        }
        if buf.last() != Some(&b'\n') {
            if read as u64 >= MAX_LINE_BYTES {
                return Err(SessionError::protocol(format!(
                    "reply line exceeds {MAX_LINE_BYTES} bytes"
                )));
            }
            return Err(SessionError::Closed);
        }
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

async fn bounded<F, T>(deadline: Instant, fut: F) -> Result<T, SessionError>
where
    F: Future<Output = T>,
{
    timeout_at(deadline, fut)
        .await
        .map_err(|_| SessionError::Timeout)
}
