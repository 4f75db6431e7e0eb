//! The [`FrameSink`] trait boundary standing in for the out-of-scope
//! external display surface, plus a demo implementation.

use std::fs;
use std::io;
use std::path::PathBuf;

/// Receives decoded frame bytes from the paced renderer.
///
/// Production callers implement this against their own display surface
/// (a window, a video widget, a frame callback into another language).
/// `render` runs on the renderer thread and should not block for long.
pub trait FrameSink: Send + Sync {
    fn render(&self, frame: &[u8]) -> io::Result<()>;
}

/// Demo sink matching the original client's cache-file behavior: each
/// frame overwrites one file named `cache-<session-id>.jpg`, removed on
/// drop (teardown).
pub struct FileFrameSink {
    path: PathBuf,
}

impl FileFrameSink {
    pub fn new(session_id: u32) -> Self {
        Self {
            path: PathBuf::from(format!("cache-{session_id}.jpg")),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl FrameSink for FileFrameSink {
    fn render(&self, frame: &[u8]) -> io::Result<()> {
        fs::write(&self.path, frame)
    }
}

impl Drop for FileFrameSink {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_removes_cache_file_on_drop() {
        let sink = FileFrameSink::new(999999);
        let path = sink.path().to_path_buf();
        sink.render(b"jpegbytes").unwrap();
        assert!(path.exists());
        drop(sink);
        assert!(!path.exists());
    }
}
