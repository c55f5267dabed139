//! 上传视频的临时文件

use log::{debug, warn};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Uploaded bytes materialized as a `.mp4` file for the decoder.
///
/// The file is removed when the value is dropped or [`cleanup`](Self::cleanup)
/// is called. Removal failures are logged, never returned.
pub struct TempVideo {
    file: Option<NamedTempFile>,
}

impl TempVideo {
    pub fn materialize(bytes: &[u8]) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("coach-upload-")
            .suffix(".mp4")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        debug!("Upload stored at {:?} ({} bytes)", file.path(), bytes.len());

        Ok(Self { file: Some(file) })
    }

    pub fn path(&self) -> &Path {
        match &self.file {
            Some(file) => file.path(),
            None => Path::new(""),
        }
    }

    pub fn cleanup(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(file) = self.file.take() {
            let path = file.path().to_path_buf();
            match file.close() {
                Ok(()) => debug!("🗑️ Removed temporary upload {:?}", path),
                Err(e) => warn!("⚠️ Could not remove temporary upload {:?}: {}", path, e),
            }
        }
    }
}

impl Drop for TempVideo {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_writes_bytes() {
        let video = TempVideo::materialize(b"not really an mp4").unwrap();
        let path = video.path().to_path_buf();

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), b"not really an mp4");

        video.cleanup();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_file() {
        let path = {
            let video = TempVideo::materialize(&[0u8; 16]).unwrap();
            video.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_already_removed_file_is_not_an_error() {
        let video = TempVideo::materialize(&[1, 2, 3]).unwrap();
        std::fs::remove_file(video.path()).unwrap();
        // close() fails with NotFound; only logged
        video.cleanup();
    }
}
