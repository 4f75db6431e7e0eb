use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use mjpegcast_client::{ClientConfig, FileFrameSink, MediaClient};

#[derive(Parser)]
#[command(
    name = "mjpegcast-client",
    about = "Demo media client: SETUP, PLAY, write decoded frames to a cache file, TEARDOWN"
)]
struct Args {
    /// Control server address (host:port).
    server: String,

    /// Requested media resource name.
    media_file: String,

    /// Local UDP port to receive media datagrams on.
    #[arg(long, default_value_t = 6000)]
    client_port: u16,

    /// Target frame rate declared to the server and used for local pacing.
    #[arg(long, default_value_t = 25)]
    fps: u32,

    /// Target prebuffer depth in milliseconds.
    #[arg(long, default_value_t = 200)]
    jitter_ms: u32,

    /// How long to play before issuing TEARDOWN, in seconds.
    #[arg(long, default_value_t = 10)]
    duration_secs: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = ClientConfig {
        server_addr: args.server.clone(),
        media_file: args.media_file.clone(),
        client_datagram_port: args.client_port,
        jitter_ms: args.jitter_ms,
        fps: args.fps,
        ..ClientConfig::default()
    };

    let client = match MediaClient::connect(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to connect to {}: {e}", args.server);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = client.setup() {
        eprintln!("SETUP failed: {e}");
        return ExitCode::FAILURE;
    }

    let session_id = client.session_id().unwrap_or(0);
    let sink = Arc::new(FileFrameSink::new(session_id));
    println!("writing decoded frames to {}", sink.path().display());

    if let Err(e) = client.play(sink) {
        eprintln!("PLAY failed: {e}");
        return ExitCode::FAILURE;
    }

    std::thread::sleep(Duration::from_secs(args.duration_secs));

    if let Err(e) = client.pause() {
        eprintln!("PAUSE failed: {e}");
    }
    client.teardown();

    println!(
        "received {} packets ({} bytes)",
        client.stats().packets_received(),
        client.stats().bytes_received()
    );

    ExitCode::SUCCESS
}
