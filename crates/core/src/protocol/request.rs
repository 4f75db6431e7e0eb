use crate::error::{CoreError, ParseErrorKind};

/// A parsed control-protocol request.
///
/// ```text
/// Method SP Target SP RTSP/1.0 CRLF
/// *(Header: Value CRLF)
/// CRLF
/// ```
///
/// Lines from client to server are `\r\n`-terminated. Header lookup is
/// case-insensitive.
#[derive(Debug)]
pub struct RtspRequest {
    /// Method (SETUP, PLAY, PAUSE, TEARDOWN, REPORT, OPTIONS, GET_PARAMETER).
    pub method: String,
    /// Requested media filename.
    pub target: String,
    /// Protocol version (expected: `RTSP/1.0`).
    pub version: String,
    /// Headers as ordered (name, value) pairs. Lookups are case-insensitive.
    pub headers: Vec<(String, String)>,
}

impl RtspRequest {
    /// Parse a request from its text representation.
    ///
    /// Expects a complete request: request line, headers, trailing blank
    /// line. Returns [`CoreError::Parse`] on malformed input.
    pub fn parse(raw: &str) -> crate::error::Result<Self> {
        let mut lines = raw.lines();

        let request_line = lines.next().ok_or(CoreError::Parse {
            kind: ParseErrorKind::EmptyRequest,
        })?;

        let parts: Vec<&str> = request_line.split_whitespace().collect();

        if parts.len() != 3 {
            return Err(CoreError::Parse {
                kind: ParseErrorKind::InvalidRequestLine,
            });
        }

        let method = parts[0].to_string();
        let target = parts[1].to_string();
        let version = parts[2].to_string();

        if version != "RTSP/1.0" {
            tracing::warn!(version, "client sent non-RTSP/1.0 version");
        }

        let mut headers = Vec::new();

        for line in lines {
            if line.is_empty() {
                break;
            }

            let colon_pos = line.find(':').ok_or(CoreError::Parse {
                kind: ParseErrorKind::InvalidHeader,
            })?;

            let name = line[..colon_pos].trim().to_string();
            let value = line[colon_pos + 1..].trim().to_string();

            headers.push((name, value));
        }

        Ok(RtspRequest {
            method,
            target,
            version,
            headers,
        })
    }

    /// Look up a header value by name (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the CSeq header value, which numbers request/reply pairs.
    pub fn cseq(&self) -> Option<&str> {
        self.get_header("CSeq")
    }
}
