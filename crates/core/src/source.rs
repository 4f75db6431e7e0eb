//! Frame Packager and Video Source.
//!
//! The packager scans a concatenated JPEG byte stream for frame
//! boundaries and rewrites it as a sequence of length-prefixed records;
//! the video source reads those records back one at a time during
//! playback. Together they are the on-disk interchange format between
//! an offline preparation step and the live session engine.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{CoreError, Result};

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Width of the ASCII decimal length prefix on every record.
pub const PREFIX_WIDTH: usize = 5;

/// Largest frame length a single record can carry (`10^PREFIX_WIDTH - 1`).
pub const MAX_PREFIX_SIZE: usize = 99_999;

/// Scan `data` for consecutive SOI/EOI-delimited JPEG frames.
///
/// Returns the byte ranges (inclusive of both markers) in order found.
/// Trailing bytes after the last complete frame are silently discarded.
fn find_jpegs(data: &[u8]) -> Vec<std::ops::Range<usize>> {
    let mut frames = Vec::new();
    let mut pos = 0;

    while pos + 1 < data.len() {
        let Some(soi_offset) = find_marker(&data[pos..], &SOI) else {
            break;
        };
        let soi = pos + soi_offset;

        let Some(eoi_offset) = find_marker(&data[soi + 2..], &EOI) else {
            break;
        };
        let eoi_end = soi + 2 + eoi_offset + 2;

        frames.push(soi..eoi_end);
        pos = eoi_end;
    }

    frames
}

fn find_marker(haystack: &[u8], marker: &[u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|w| w == marker)
}

/// Write one frame as one or more length-prefixed records.
///
/// Frames longer than [`MAX_PREFIX_SIZE`] are split into consecutive
/// chunks, each its own record; the video source does not re-join them
/// (see the design notes on this being an open question resolved
/// conservatively in favor of visibility over silent data loss).
fn write_frame<W: Write>(writer: &mut W, frame: &[u8]) -> Result<usize> {
    if frame.len() <= MAX_PREFIX_SIZE {
        write_record(writer, frame)?;
        return Ok(1);
    }

    tracing::warn!(
        frame_len = frame.len(),
        max = MAX_PREFIX_SIZE,
        "frame exceeds single-record capacity, splitting across multiple records"
    );

    let mut records = 0;
    for chunk in frame.chunks(MAX_PREFIX_SIZE) {
        write_record(writer, chunk)?;
        records += 1;
    }
    Ok(records)
}

fn write_record<W: Write>(writer: &mut W, chunk: &[u8]) -> Result<()> {
    let prefix = format!("{:0width$}", chunk.len(), width = PREFIX_WIDTH);
    writer.write_all(prefix.as_bytes())?;
    writer.write_all(chunk)?;
    Ok(())
}

/// Convert a concatenated JPEG byte stream into length-prefixed records.
///
/// Returns the total number of records written.
pub fn pack(input_path: &Path, output_path: &Path) -> Result<usize> {
    let mut data = Vec::new();
    File::open(input_path)?.read_to_end(&mut data)?;

    let frames = find_jpegs(&data);
    tracing::info!(frames = frames.len(), input = %input_path.display(), "scanned source");

    let mut writer = BufWriter::new(File::create(output_path)?);
    let mut total_records = 0;
    for range in frames {
        total_records += write_frame(&mut writer, &data[range])?;
    }
    writer.flush()?;

    tracing::info!(total_records, output = %output_path.display(), "packaged frames");
    Ok(total_records)
}

/// Sequential reader over a prefixed-frame file.
///
/// Each call to [`next_frame`](Self::next_frame) reads one record: five
/// ASCII decimal digits for the length, then exactly that many bytes. A
/// short read at any point is treated as end of stream, not an error.
#[derive(Debug)]
pub struct VideoSource {
    reader: BufReader<File>,
}

impl VideoSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|_| CoreError::MissingFile(path.display().to_string()))?;
        Ok(Self {
            reader: BufReader::new(file),
        })
    }

    /// Read the next frame, or `None` at end of stream.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        let mut prefix = [0u8; PREFIX_WIDTH];
        self.reader.read_exact(&mut prefix).ok()?;

        let len: usize = std::str::from_utf8(&prefix).ok()?.parse().ok()?;
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf).ok()?;
        Some(buf)
    }
}
