//! Playback and trimming of headerless raw video files.
//!
//! A raw video is nothing but fixed size frames back to back. `.yuv` files
//! hold planar YUV 4:2:0 frames, anything else packed RGB24. Frames are read
//! by index and converted to RGBA for display; [`RawVideo::crop`] rewrites a
//! file so that only a contiguous range of frames remains.

pub mod error;
pub mod playback;
pub mod project;
pub mod raw_interop;

pub use error::{RawVideoError, Result};
pub use project::{FrameNum, FrameRate, FrameSpan, VideoSpec};
pub use raw_interop::{
    Activity, DecodedFrame, PixelFormat, RawFrame, RawVideo, RgbaFrame, VideoInfo, VideoPlayer,
};
