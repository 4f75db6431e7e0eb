use std::io;
use std::path::PathBuf;

use clap::Parser;
use mjpegcast::{Server, ServerConfig};

#[derive(Parser)]
#[command(
    name = "mjpegcast-server",
    about = "Standalone session engine for a simplified RTSP/RTP MJPEG streamer"
)]
struct Args {
    /// Bind address (host:port) the control listener binds.
    #[arg(long, short, default_value = "0.0.0.0:8554")]
    bind: String,

    /// Directory prefixed-frame files are resolved against.
    #[arg(long, default_value = ".")]
    media_root: PathBuf,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut server = Server::with_config(ServerConfig {
        bind_addr: args.bind.clone(),
        media_root: args.media_root,
    });

    if let Err(e) = server.start() {
        eprintln!("failed to start server: {e}");
        return;
    }

    println!("session engine listening on {} — press Enter to stop", args.bind);
    let mut input = String::new();
    io::stdin().read_line(&mut input).ok();

    server.stop();
}
