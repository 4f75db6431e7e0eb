use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mjpegcast::source;

#[derive(Parser)]
#[command(
    name = "mjpegcast-packager",
    about = "Rewrite a concatenated MJPEG byte stream into a length-prefixed frame file"
)]
struct Args {
    /// Input file: a concatenated stream of SOI/EOI-delimited JPEG frames.
    input: PathBuf,

    /// Output file: length-prefixed records the Video Source reads sequentially.
    #[arg(default_value = "prefixed.mjpeg")]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    match source::pack(&args.input, &args.output) {
        Ok(records) => {
            println!(
                "wrote {records} record(s) to {}",
                args.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to package {}: {e}", args.input.display());
            ExitCode::FAILURE
        }
    }
}
