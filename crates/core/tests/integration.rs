//! Integration test: full control-plane handshake against a live
//! session engine, plus a round-trip through the emitter's media socket.
//!
//! Starts the server on a fixed loopback port, connects a TCP client,
//! and drives it through SETUP → PLAY → PAUSE → TEARDOWN, checking each
//! reply and that PLAY actually produces fragmented RTP/MJPEG datagrams
//! on the negotiated UDP port.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use mjpegcast::media::fragment::FragmentHeader;
use mjpegcast::media::rtp::RtpPacket;
use mjpegcast::{Server, ServerConfig};

fn rtsp_request(stream: &mut TcpStream, request: &str) -> std::io::Result<String> {
    stream.write_all(request.as_bytes())?;
    stream.flush()?;

    let mut reader = BufReader::new(stream.try_clone()?);
    let mut response = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let is_blank = line == "\n" || line == "\r\n";
        response.push_str(&line);
        if is_blank {
            break;
        }
    }
    Ok(response)
}

fn session_id_from(reply: &str) -> &str {
    reply
        .lines()
        .find(|l| l.to_lowercase().starts_with("session:"))
        .and_then(|l| l.split(':').nth(1))
        .map(str::trim)
        .unwrap_or("")
}

/// Write a tiny prefixed-frame file the session engine can SETUP against:
/// two small JPEG-shaped frames, each fitting in a single RTP fragment.
fn write_media_file(path: &std::path::Path) {
    let mut f = File::create(path).unwrap();
    for body in [vec![0xAAu8; 50], vec![0xBBu8; 50]] {
        let mut frame = vec![0xFF, 0xD8];
        frame.extend_from_slice(&body);
        frame.extend_from_slice(&[0xFF, 0xD9]);
        f.write_all(format!("{:05}", frame.len()).as_bytes())
            .unwrap();
        f.write_all(&frame).unwrap();
    }
}

const BIND: &str = "127.0.0.1:18554";

#[test]
fn full_handshake_setup_play_pause_teardown() {
    let dir = std::env::temp_dir().join(format!("mjpegcast-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    write_media_file(&dir.join("movie.bin"));

    let mut server = Server::with_config(ServerConfig {
        bind_addr: BIND.to_string(),
        media_root: dir.clone(),
    });
    server.start().expect("server start");
    std::thread::sleep(Duration::from_millis(50));

    let addr = BIND.to_socket_addrs().unwrap().next().unwrap();
    let mut stream =
        TcpStream::connect_timeout(&addr, Duration::from_secs(2)).expect("connect to server");
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    stream.set_write_timeout(Some(Duration::from_secs(2))).unwrap();

    let client_port = 19554u16;
    let media_socket = UdpSocket::bind(("127.0.0.1", client_port)).expect("bind media socket");
    media_socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();

    // OPTIONS
    let opt_resp = rtsp_request(&mut stream, "OPTIONS movie.bin RTSP/1.0\r\nCSeq: 1\r\n\r\n")
        .expect("OPTIONS response");
    assert!(opt_resp.starts_with("RTSP/1.0 200 OK"));
    assert!(opt_resp.contains("Public:"));

    // SETUP
    let setup_req = format!(
        "SETUP movie.bin RTSP/1.0\r\nCSeq: 2\r\nTransport: RTP/UDP; client_port={client_port}\r\nFPS: 100\r\n\r\n"
    );
    let setup_resp = rtsp_request(&mut stream, &setup_req).expect("SETUP response");
    assert!(setup_resp.starts_with("RTSP/1.0 200 OK"), "{setup_resp}");
    assert!(setup_resp.contains("Session:"));
    let session_id = session_id_from(&setup_resp);
    assert!(!session_id.is_empty());

    // PLAY
    let play_req = format!("PLAY movie.bin RTSP/1.0\r\nCSeq: 3\r\nSession: {session_id}\r\n\r\n");
    let play_resp = rtsp_request(&mut stream, &play_req).expect("PLAY response");
    assert!(play_resp.starts_with("RTSP/1.0 200 OK"), "{play_resp}");

    // Expect a fragmented RTP/MJPEG datagram for the first frame.
    let mut buf = [0u8; 2048];
    let (n, _) = media_socket.recv_from(&mut buf).expect("receive media datagram");
    let packet = RtpPacket::decode(&buf[..n]).expect("decode RTP packet");
    assert_eq!(packet.seq_num(), 0);
    assert_eq!(packet.timestamp(), 0);
    let (frag, payload) = FragmentHeader::decode(packet.payload()).expect("decode fragment header");
    assert_eq!(frag.frame_id, 1);
    assert_eq!(frag.index, 0);
    assert_eq!(frag.total, 1);
    assert!(packet.marker());
    assert_eq!(payload.len(), 54); // SOI + 50 body bytes + EOI

    // PAUSE
    let pause_req = format!("PAUSE movie.bin RTSP/1.0\r\nCSeq: 4\r\nSession: {session_id}\r\n\r\n");
    let pause_resp = rtsp_request(&mut stream, &pause_req).expect("PAUSE response");
    assert!(pause_resp.starts_with("RTSP/1.0 200 OK"));

    // TEARDOWN
    let teardown_req =
        format!("TEARDOWN movie.bin RTSP/1.0\r\nCSeq: 5\r\nSession: {session_id}\r\n\r\n");
    let teardown_resp = rtsp_request(&mut stream, &teardown_req).expect("TEARDOWN response");
    assert!(teardown_resp.starts_with("RTSP/1.0 200 OK"));

    // Session is gone: a second TEARDOWN for the same id is now "not found".
    let repeat_resp = rtsp_request(&mut stream, &teardown_req).expect("repeat TEARDOWN");
    assert!(repeat_resp.starts_with("RTSP/1.0 454"));

    server.stop();
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn setup_against_missing_file_is_404_and_creates_no_session() {
    let dir = std::env::temp_dir().join(format!("mjpegcast-it-missing-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let bind = "127.0.0.1:18555";
    let mut server = Server::with_config(ServerConfig {
        bind_addr: bind.to_string(),
        media_root: dir.clone(),
    });
    server.start().expect("server start");
    std::thread::sleep(Duration::from_millis(50));

    let addr = bind.to_socket_addrs().unwrap().next().unwrap();
    let mut stream =
        TcpStream::connect_timeout(&addr, Duration::from_secs(2)).expect("connect to server");
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    stream.set_write_timeout(Some(Duration::from_secs(2))).unwrap();

    let setup_req =
        "SETUP nonexistent.bin RTSP/1.0\r\nCSeq: 1\r\nTransport: RTP/UDP; client_port=19555\r\n\r\n";
    let setup_resp = rtsp_request(&mut stream, setup_req).expect("SETUP response");
    assert!(setup_resp.starts_with("RTSP/1.0 404"), "{setup_resp}");
    assert!(!setup_resp.contains("Session:"));

    server.stop();
    std::fs::remove_dir_all(&dir).ok();
}
