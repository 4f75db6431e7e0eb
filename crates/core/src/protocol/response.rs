/// A control-protocol reply.
///
/// Serializes to:
///
/// ```text
/// RTSP/1.0 200 OK\n
/// CSeq: 1\n
/// Session: 482913\n
/// \n
/// ```
///
/// Unlike requests (client to server, `\r\n`-terminated), replies from
/// server to client use bare `\n` line endings.
///
/// Uses a builder pattern — chain [`add_header`](Self::add_header), then
/// call [`serialize`](Self::serialize).
#[must_use]
pub struct RtspResponse {
    pub status_code: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
}

pub const SERVER_AGENT: &str = "mjpegcast/0.1";

impl RtspResponse {
    pub fn new(status_code: u16, status_text: &str) -> Self {
        RtspResponse {
            status_code,
            status_text: status_text.to_string(),
            headers: vec![("Server".to_string(), SERVER_AGENT.to_string())],
        }
    }

    /// 200 OK.
    pub fn ok() -> Self {
        Self::new(200, "OK")
    }

    /// 404 Not Found — the requested media file does not exist.
    pub fn not_found() -> Self {
        Self::new(404, "Not Found")
    }

    /// 400 Bad Request — malformed or missing required header.
    pub fn bad_request() -> Self {
        Self::new(400, "Bad Request")
    }

    /// 454 Session Not Found.
    pub fn session_not_found() -> Self {
        Self::new(454, "Session Not Found")
    }

    /// 500 Internal Server Error.
    pub fn server_error() -> Self {
        Self::new(500, "Internal Server Error")
    }

    pub fn add_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Serialize to the wire format: `\n`-terminated lines, no body.
    pub fn serialize(&self) -> String {
        let mut response = format!("RTSP/1.0 {} {}\n", self.status_code, self.status_text);

        for (name, value) in &self.headers {
            response.push_str(&format!("{}: {}\n", name, value));
        }
        response.push('\n');
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_uses_lf_line_endings() {
        let resp = RtspResponse::ok().add_header("CSeq", "1");
        let s = resp.serialize();
        assert!(s.starts_with("RTSP/1.0 200 OK\n"));
        assert!(s.contains("Server: mjpegcast/0.1\n"));
        assert!(s.contains("CSeq: 1\n"));
        assert!(s.ends_with("\n\n"));
        assert!(!s.contains('\r'));
    }

    #[test]
    fn not_found_response() {
        let resp = RtspResponse::not_found().add_header("CSeq", "5");
        assert_eq!(resp.status_code, 404);
        let s = resp.serialize();
        assert!(s.starts_with("RTSP/1.0 404 Not Found\n"));
    }

    #[test]
    fn session_header_round_trips() {
        let resp = RtspResponse::ok()
            .add_header("CSeq", "3")
            .add_header("Session", "482913");
        let s = resp.serialize();
        assert!(s.contains("Session: 482913\n"));
    }
}
