//! Control driver: issues SETUP/PLAY/PAUSE/TEARDOWN requests and parses
//! their replies over the control TCP stream.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{ClientError, Result};

/// A parsed control-protocol reply.
#[derive(Debug, Clone, Default)]
pub struct RtspReply {
    pub status: u16,
    pub cseq: Option<u64>,
    pub session: Option<u32>,
}

/// Parse a reply's status line and headers.
///
/// Replies from the server use bare `\n` line endings (unlike requests,
/// which the client sends `\r\n`-terminated).
fn parse_reply(text: &str) -> Option<RtspReply> {
    let mut lines = text.lines();
    let status_line = lines.next()?;
    let status: u16 = status_line.split_whitespace().nth(1)?.parse().ok()?;

    let mut reply = RtspReply {
        status,
        cseq: None,
        session: None,
    };

    for line in lines {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.eq_ignore_ascii_case("CSeq") {
            reply.cseq = value.parse().ok();
        } else if key.eq_ignore_ascii_case("Session") {
            reply.session = value.parse().ok();
        }
    }

    Some(reply)
}

/// Issues control-protocol requests over one TCP connection and tracks
/// the session id latched from the server's replies.
///
/// Per the session-id rule: the first non-zero `Session` value seen in
/// any reply is latched; a later reply carrying a *different* session id
/// is treated as [`ClientError::SessionMismatch`] rather than silently
/// overwriting it.
pub struct ControlDriver {
    reader: Mutex<BufReader<TcpStream>>,
    writer: Mutex<TcpStream>,
    media_file: String,
    cseq: AtomicU64,
    session_id: Mutex<Option<u32>>,
}

impl ControlDriver {
    pub fn connect(server_addr: &str, media_file: &str) -> Result<Self> {
        let stream = TcpStream::connect(server_addr)
            .map_err(|_| ClientError::ConnectFailed(server_addr.to_string()))?;
        stream.set_read_timeout(Some(Duration::from_secs(5)))?;
        stream.set_write_timeout(Some(Duration::from_secs(5)))?;
        let reader = stream.try_clone()?;

        Ok(Self {
            reader: Mutex::new(BufReader::new(reader)),
            writer: Mutex::new(stream),
            media_file: media_file.to_string(),
            cseq: AtomicU64::new(0),
            session_id: Mutex::new(None),
        })
    }

    pub fn session_id(&self) -> Option<u32> {
        *self.session_id.lock()
    }

    pub fn setup(&self, client_port: u16, fps: Option<u32>) -> Result<RtspReply> {
        let cseq = self.next_cseq();
        let mut request = format!(
            "SETUP {} RTSP/1.0\r\nCSeq: {cseq}\r\nTransport: RTP/UDP; client_port={client_port}\r\n",
            self.media_file
        );
        if let Some(fps) = fps {
            request.push_str(&format!("FPS: {fps}\r\n"));
        }
        request.push_str("\r\n");
        self.exchange(&request, cseq)
    }

    pub fn play(&self) -> Result<RtspReply> {
        self.session_request("PLAY")
    }

    pub fn pause(&self) -> Result<RtspReply> {
        self.session_request("PAUSE")
    }

    /// TEARDOWN is best-effort: the caller proceeds with local cleanup
    /// even if this fails, per the recovery policy.
    pub fn teardown(&self) -> Result<RtspReply> {
        let reply = self.session_request("TEARDOWN")?;
        *self.session_id.lock() = None;
        Ok(reply)
    }

    pub fn report(&self, body: &str) -> Result<RtspReply> {
        let cseq = self.next_cseq();
        let session = self.session_id().unwrap_or(0);
        let request = format!(
            "REPORT {} RTSP/1.0\r\nCSeq: {cseq}\r\nSession: {session}\r\n{body}\r\n\r\n",
            self.media_file
        );
        self.exchange(&request, cseq)
    }

    fn session_request(&self, method: &str) -> Result<RtspReply> {
        let cseq = self.next_cseq();
        let session = self.session_id().ok_or(ClientError::InvalidState)?;
        let request = format!(
            "{method} {} RTSP/1.0\r\nCSeq: {cseq}\r\nSession: {session}\r\n\r\n",
            self.media_file
        );
        self.exchange(&request, cseq)
    }

    fn next_cseq(&self) -> u64 {
        self.cseq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn exchange(&self, request: &str, cseq: u64) -> Result<RtspReply> {
        {
            let mut writer = self.writer.lock();
            writer.write_all(request.as_bytes())?;
            writer.flush()?;
        }

        let text = self.read_reply()?;
        let reply = parse_reply(&text).ok_or(ClientError::DecodeFailed)?;

        if reply.cseq != Some(cseq) {
            tracing::warn!(expected = cseq, got = ?reply.cseq, "CSeq mismatch in reply, ignoring");
            return Err(ClientError::DecodeFailed);
        }

        self.latch_session(reply.session)?;

        if reply.status != 200 {
            return Err(ClientError::RequestRejected(reply.status));
        }

        Ok(reply)
    }

    /// Apply the session-id latch rule described on [`ControlDriver`].
    fn latch_session(&self, session: Option<u32>) -> Result<()> {
        let Some(session) = session.filter(|s| *s != 0) else {
            return Ok(());
        };

        let mut latched = self.session_id.lock();
        match *latched {
            None => {
                *latched = Some(session);
                Ok(())
            }
            Some(existing) if existing == session => Ok(()),
            Some(_) => Err(ClientError::SessionMismatch),
        }
    }

    fn read_reply(&self) -> Result<String> {
        let mut reader = self.reader.lock();
        let mut text = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let is_blank = line == "\n" || line == "\r\n";
            text.push_str(&line);
            if is_blank {
                break;
            }
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reply_extracts_status_cseq_and_session() {
        let reply = parse_reply("RTSP/1.0 200 OK\nCSeq: 3\nSession: 482913\n\n").unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.cseq, Some(3));
        assert_eq!(reply.session, Some(482913));
    }

    #[test]
    fn parse_reply_handles_missing_session() {
        let reply = parse_reply("RTSP/1.0 404 Not Found\nCSeq: 1\n\n").unwrap();
        assert_eq!(reply.status, 404);
        assert_eq!(reply.session, None);
    }

    #[test]
    fn parse_reply_rejects_garbage() {
        assert!(parse_reply("not a reply at all").is_none());
    }
}
