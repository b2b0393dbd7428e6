use super::{RawLayout, RgbaFrame, VideoInfo, pixel, probe_layout_sync};
use crate::{
    error::{RawVideoError, Result},
    project::{FrameNum, FrameRate, VideoSpec},
};
use log::{debug, info};
use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

/// Undecoded bytes of a single frame, exactly one frame long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub index: FrameNum,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub index: FrameNum,
    pub image: RgbaFrame,
}

/// An open headerless raw video. Owns its file; every frame access goes
/// through `&mut self`.
#[derive(Debug)]
pub struct RawVideo {
    pub(super) spec: VideoSpec,
    pub(super) layout: RawLayout,
    current: FrameNum,
    file: Option<File>,
    first_frame: Option<DecodedFrame>,
}

impl RawVideo {
    /// Opens `spec.path`, derives its layout and decodes frame 1 right away so
    /// there is always something to show.
    pub fn open(spec: VideoSpec) -> Result<Self> {
        let layout = probe_layout_sync(&spec)?;
        let file =
            File::open(&spec.path).map_err(|err| RawVideoError::file_access(&spec.path, err))?;

        info!(
            "opened raw video \"{}\" ({} {}x{}) with {} frames",
            spec.path.display(),
            layout.format,
            spec.width,
            spec.height,
            layout.total_frames
        );

        let mut video = Self {
            spec,
            layout,
            current: FrameNum(0),
            file: Some(file),
            first_frame: None,
        };
        video.first_frame = Some(video.decode(FrameNum::FIRST.as_request())?);
        Ok(video)
    }

    pub fn path(&self) -> &Path {
        &self.spec.path
    }

    pub fn width(&self) -> u32 {
        self.spec.width
    }

    pub fn height(&self) -> u32 {
        self.spec.height
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.spec.frame_rate
    }

    pub fn layout(&self) -> RawLayout {
        self.layout
    }

    pub fn total_frames(&self) -> u64 {
        self.layout.total_frames
    }

    pub fn current_frame(&self) -> FrameNum {
        self.current
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn info(&self) -> VideoInfo {
        VideoInfo {
            path: self.spec.path.clone(),
            width: self.spec.width,
            height: self.spec.height,
            frame_rate: self.spec.frame_rate,
            layout: self.layout,
            current_frame: self.current,
        }
    }

    /// Frame 1 as decoded by `open`, handed out once.
    pub fn take_first_frame(&mut self) -> Option<DecodedFrame> {
        self.first_frame.take()
    }

    /// Reads the frame closest to `request`: anything before the first frame
    /// reads frame 1, anything past the end reads the last frame.
    pub fn read_frame(&mut self, request: i64) -> Result<RawFrame> {
        self.ensure_open()?;
        let index = FrameNum::clamped(request, self.layout.total_frames);
        let mut data = vec![0u8; self.layout.frame_size as usize];
        self.read_into(index, &mut data)
            .map_err(|err| RawVideoError::file_access(&self.spec.path, err))?;

        self.current = index;
        Ok(RawFrame { index, data })
    }

    pub fn decode(&mut self, request: i64) -> Result<DecodedFrame> {
        let raw = self.read_frame(request)?;
        let image = pixel::convert(
            &raw.data,
            self.spec.width,
            self.spec.height,
            self.layout.format,
        )?;
        debug!("decoded frame {}/{}", raw.index, self.layout.total_frames);

        Ok(DecodedFrame {
            index: raw.index,
            image,
        })
    }

    /// Releases the file. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            self.first_frame = None;
            info!("closed raw video \"{}\"", self.spec.path.display());
        }
    }

    /// Reads exactly one frame at `index` into `buf`.
    pub(super) fn read_into(&mut self, index: FrameNum, buf: &mut [u8]) -> std::io::Result<()> {
        let offset = index.byte_offset(self.layout.frame_size);
        let file = self.file.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "video is closed")
        })?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }

    pub(super) fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(RawVideoError::Closed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_interop::{PixelFormat, testing::write_numbered_frames};

    fn open_numbered(frames: u8) -> (tempfile::TempDir, RawVideo) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.rgb");
        write_numbered_frames(&path, 12, frames, 0);
        let video = RawVideo::open(VideoSpec::new(&path, 2, 2)).unwrap();
        (dir, video)
    }

    #[test]
    fn open_shows_first_frame() {
        let (_dir, mut video) = open_numbered(5);
        assert_eq!(video.total_frames(), 5);
        assert_eq!(video.current_frame(), FrameNum(1));
        assert_eq!(video.layout().format, PixelFormat::Rgb24);

        let first = video.take_first_frame().unwrap();
        assert_eq!(first.index, FrameNum(1));
        assert_eq!(first.image.pixel(1, 1), [1, 1, 1, 255]);
        assert!(video.take_first_frame().is_none());
    }

    #[test]
    fn reads_first_and_last() {
        let (_dir, mut video) = open_numbered(5);

        let first = video.read_frame(1).unwrap();
        assert_eq!(first.data, vec![1; 12]);

        let last = video.read_frame(5).unwrap();
        assert_eq!(last.index, FrameNum(5));
        assert_eq!(last.data, vec![5; 12]);
        assert_eq!(video.current_frame(), FrameNum(5));
    }

    #[test]
    fn out_of_range_requests_clamp() {
        let (_dir, mut video) = open_numbered(5);

        let before = video.read_frame(0).unwrap();
        assert_eq!(before.index, FrameNum(1));
        assert_eq!(before.data, vec![1; 12]);

        let after = video.read_frame(5 + 5).unwrap();
        assert_eq!(after.index, FrameNum(5));
        assert_eq!(video.current_frame(), FrameNum(5));
        assert_eq!(after.data, vec![5; 12]);
    }

    #[test]
    fn decode_after_read_moves_forward() {
        let (_dir, mut video) = open_numbered(3);
        video.read_frame(2).unwrap();
        assert_eq!(video.current_frame(), FrameNum(2));

        let decoded = video.decode(video.current_frame().as_request() + 1).unwrap();
        assert_eq!(decoded.index, FrameNum(3));
        assert_eq!(decoded.image.pixel(0, 0), [3, 3, 3, 255]);
    }

    #[test]
    fn close_twice_then_read() {
        let (_dir, mut video) = open_numbered(2);
        video.close();
        video.close();
        assert!(!video.is_open());

        let err = video.read_frame(1).unwrap_err();
        assert!(matches!(err, RawVideoError::Closed));
    }

    #[test]
    fn empty_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yuv");
        std::fs::write(&path, b"").unwrap();

        let err = RawVideo::open(VideoSpec::new(&path, 4, 4)).unwrap_err();
        assert!(matches!(err, RawVideoError::EmptyOrTruncatedFile { size: 0, .. }));
    }
}
