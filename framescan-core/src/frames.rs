//! Frame model and discovery of extracted frame files.
//!
//! The frame producer writes one file per sampled frame using the naming
//! convention `frame_<NNNN>.<ext>`, where `NNNN` is the 1-based ordinal
//! assigned by ffmpeg. Sorting the names lexicographically recovers the
//! ordinal order for runs of up to 9999 frames; discovery sorts by the parsed
//! ordinal so longer runs stay ordered too.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Filename prefix written by the frame producer.
pub const FRAME_PREFIX: &str = "frame_";

/// One sampled frame on disk.
///
/// The path is the frame's identity; the ordinal is its time index in the
/// source video and is used only for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    pub path: PathBuf,
    pub ordinal: u32,
}

impl Frame {
    pub fn new(path: impl Into<PathBuf>, ordinal: u32) -> Self {
        Self {
            path: path.into(),
            ordinal,
        }
    }

    /// Position of this frame in the source video for the given sampling rate
    /// (frames per second). Ordinals start at 1, which maps to the start of
    /// the video.
    #[must_use]
    pub fn timestamp(&self, sampling_rate: f64) -> Duration {
        if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
            return Duration::ZERO;
        }
        let index = f64::from(self.ordinal.saturating_sub(1));
        Duration::from_secs_f64(index / sampling_rate)
    }

    /// File name of the frame for display purposes.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Returns the ffmpeg output pattern for frames with the given extension.
#[must_use]
pub fn frame_pattern(extension: &str) -> String {
    format!("{FRAME_PREFIX}%04d.{extension}")
}

/// Parses the ordinal out of a `frame_<NNNN>.<ext>` file name.
///
/// Returns `None` when the name does not follow the convention or the
/// extension does not match (case-insensitive).
#[must_use]
pub fn parse_frame_ordinal(file_name: &str, extension: &str) -> Option<u32> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if !ext.eq_ignore_ascii_case(extension) {
        return None;
    }
    let digits = stem.strip_prefix(FRAME_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Finds the extracted frames in `dir`, ordered by ordinal.
///
/// Files that do not follow the naming convention are ignored. Returns
/// `CoreError::NoFramesFound` when the directory holds no frames at all.
pub fn discover_frames(dir: &Path, extension: &str) -> CoreResult<Vec<Frame>> {
    let mut frames: Vec<Frame> = std::fs::read_dir(dir)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if !path.is_file() {
                return None;
            }
            let ordinal = parse_frame_ordinal(path.file_name()?.to_str()?, extension)?;
            Some(Frame::new(path, ordinal))
        })
        .collect();

    if frames.is_empty() {
        return Err(CoreError::NoFramesFound(dir.to_path_buf()));
    }

    frames.sort_by(|a, b| a.ordinal.cmp(&b.ordinal).then_with(|| a.path.cmp(&b.path)));
    log::debug!("Discovered {} frames in {}", frames.len(), dir.display());
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_frame_ordinal() {
        assert_eq!(parse_frame_ordinal("frame_0001.png", "png"), Some(1));
        assert_eq!(parse_frame_ordinal("frame_0420.PNG", "png"), Some(420));
        assert_eq!(parse_frame_ordinal("frame_12345.png", "png"), Some(12345));
        assert_eq!(parse_frame_ordinal("frame_0001.jpg", "png"), None);
        assert_eq!(parse_frame_ordinal("frame_.png", "png"), None);
        assert_eq!(parse_frame_ordinal("frame_00a1.png", "png"), None);
        assert_eq!(parse_frame_ordinal("thumb_0001.png", "png"), None);
        assert_eq!(parse_frame_ordinal("frame_0001", "png"), None);
    }

    #[test]
    fn test_frame_pattern() {
        assert_eq!(frame_pattern("png"), "frame_%04d.png");
    }

    #[test]
    fn test_timestamp_from_ordinal() {
        let frame = Frame::new("frame_0001.png", 1);
        assert_eq!(frame.timestamp(1.0), Duration::ZERO);

        let frame = Frame::new("frame_0061.png", 61);
        assert_eq!(frame.timestamp(1.0), Duration::from_secs(60));
        assert_eq!(frame.timestamp(2.0), Duration::from_secs(30));
        assert_eq!(frame.timestamp(0.0), Duration::ZERO);
    }

    #[test]
    fn test_discover_frames_orders_by_ordinal() -> CoreResult<()> {
        let dir = tempdir()?;
        for name in ["frame_0003.png", "frame_0001.png", "frame_10000.png", "frame_0002.png"] {
            std::fs::write(dir.path().join(name), name)?;
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored")?;
        std::fs::create_dir(dir.path().join("frame_0004.png"))?;

        let frames = discover_frames(dir.path(), "png")?;
        let ordinals: Vec<u32> = frames.iter().map(|f| f.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 10000]);
        assert_eq!(frames[0].name(), "frame_0001.png");
        Ok(())
    }

    #[test]
    fn test_discover_frames_empty_dir() {
        let dir = tempdir().unwrap();
        let result = discover_frames(dir.path(), "png");
        assert!(matches!(result, Err(CoreError::NoFramesFound(_))));
    }
}
