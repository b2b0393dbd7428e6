mod crop;
pub mod pixel;
pub mod video_player;
pub mod video_source;

pub use pixel::{PixelFormat, RgbaFrame, convert};
pub use video_player::{Activity, VideoPlayer};
pub use video_source::{DecodedFrame, RawFrame, RawVideo};

use crate::{
    error::{RawVideoError, Result},
    project::{FrameNum, FrameRate, VideoSpec},
};
use std::{fs, path::PathBuf};

/// Geometry of a raw video as derived from its spec and its size on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLayout {
    pub format: PixelFormat,
    pub frame_size: u64,
    pub file_size: u64,
    pub total_frames: u64,
}

/// Snapshot of an open video, safe to hand out while the handle stays owned
/// elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub frame_rate: FrameRate,
    pub layout: RawLayout,
    pub current_frame: FrameNum,
}

/// Derives format and frame count for `spec` without opening the file for
/// reading. Trailing bytes that do not make up a whole frame are ignored.
pub fn probe_layout_sync(spec: &VideoSpec) -> Result<RawLayout> {
    let format = PixelFormat::from_path(&spec.path);
    format.validate_geometry(spec.width, spec.height)?;
    let frame_size = format.frame_size(spec.width, spec.height);

    let file_size = fs::metadata(&spec.path)
        .map_err(|err| RawVideoError::file_access(&spec.path, err))?
        .len();
    let total_frames = file_size / frame_size;
    if total_frames < 1 {
        return Err(RawVideoError::EmptyOrTruncatedFile {
            path: spec.path.clone(),
            size: file_size,
            frame_size,
        });
    }

    Ok(RawLayout {
        format,
        frame_size,
        file_size,
        total_frames,
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_whole_frames_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.rgb");
        testing::write_numbered_frames(&path, 12, 3, 7);

        let layout = probe_layout_sync(&VideoSpec::new(&path, 2, 2)).unwrap();
        assert_eq!(layout.format, PixelFormat::Rgb24);
        assert_eq!(layout.frame_size, 12);
        assert_eq!(layout.file_size, 43);
        assert_eq!(layout.total_frames, 3);
    }

    #[test]
    fn yuv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.yuv");
        testing::write_numbered_frames(&path, 6, 4, 0);

        let layout = probe_layout_sync(&VideoSpec::new(&path, 2, 2)).unwrap();
        assert_eq!(layout.format, PixelFormat::Yuv420P);
        assert_eq!(layout.total_frames, 4);
    }

    #[test]
    fn shorter_than_a_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.rgb");
        fs::write(&path, [0u8; 11]).unwrap();

        let err = probe_layout_sync(&VideoSpec::new(&path, 2, 2)).unwrap_err();
        assert!(matches!(
            err,
            RawVideoError::EmptyOrTruncatedFile { size: 11, frame_size: 12, .. }
        ));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = probe_layout_sync(&VideoSpec::new(dir.path().join("nope.rgb"), 2, 2))
            .unwrap_err();
        assert!(matches!(err, RawVideoError::FileAccess { .. }));
    }

    #[test]
    fn odd_yuv_geometry() {
        let err = probe_layout_sync(&VideoSpec::new("whatever.yuv", 3, 2)).unwrap_err();
        assert!(matches!(err, RawVideoError::InvalidGeometry { width: 3, .. }));
    }
}
