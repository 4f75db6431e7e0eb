use std::net::SocketAddr;

/// Negotiated datagram transport for a session.
///
/// Created during SETUP from the client's `Transport` header. The
/// session engine sends media datagrams to `client_addr`.
#[derive(Debug, Clone)]
pub struct Transport {
    /// Client's UDP receive port, as negotiated in `client_port=N`.
    pub client_port: u16,
    /// Full socket address for datagram delivery (client IP + `client_port`).
    pub client_addr: SocketAddr,
}

/// Parsed client-side transport info from the control protocol's
/// `Transport` header.
///
/// Only the `client_port=N` parameter is recognized; unrelated
/// semicolon-separated parameters (e.g. `RTP/UDP`, `unicast`) are
/// skipped.
#[derive(Debug, Clone)]
pub struct TransportHeader {
    pub client_port: u16,
}

impl TransportHeader {
    /// Parse the `Transport` header value.
    ///
    /// ## Examples
    ///
    /// ```
    /// use mjpegcast::session::transport::TransportHeader;
    ///
    /// let th = TransportHeader::parse("RTP/UDP;client_port=6000").unwrap();
    /// assert_eq!(th.client_port, 6000);
    ///
    /// assert!(TransportHeader::parse("RTP/UDP").is_none());
    /// ```
    pub fn parse(header: &str) -> Option<Self> {
        for part in header.split(';') {
            let part = part.trim();
            if let Some(port) = part.strip_prefix("client_port=") {
                let client_port: u16 = port.parse().ok()?;
                return Some(TransportHeader { client_port });
            }
        }
        None
    }
}
