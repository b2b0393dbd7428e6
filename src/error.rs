use crate::raw_interop::PixelFormat;
use std::{io, path::PathBuf};

pub type Result<T> = std::result::Result<T, RawVideoError>;

#[derive(thiserror::Error, Debug)]
pub enum RawVideoError {
    #[error("failed to access \"{}\": {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "\"{}\" holds {size} bytes, not enough for a single {frame_size} byte frame",
        path.display()
    )]
    EmptyOrTruncatedFile {
        path: PathBuf,
        size: u64,
        frame_size: u64,
    },

    #[error("invalid geometry {width}x{height} for {format}: {reason}")]
    InvalidGeometry {
        width: u32,
        height: u32,
        format: PixelFormat,
        reason: &'static str,
    },

    #[error("invalid crop range {start}..={end} for a video with {total} frames")]
    InvalidRange { start: u64, end: u64, total: u64 },

    /// The copy loop of a crop failed; the original file is untouched and the
    /// partially written temp file is left behind at `tmp_path`.
    #[error(
        "crop failed at frame {frame} (partial output left at \"{}\"): {source}",
        tmp_path.display()
    )]
    CropCopy {
        frame: u64,
        tmp_path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("raw frame holds {actual} bytes, expected {expected}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    #[error("video is closed")]
    Closed,
}

impl RawVideoError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}
