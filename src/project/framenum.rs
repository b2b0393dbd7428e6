use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// 1-based index of a frame inside a raw video file.
#[derive(
    Debug,
    Display,
    From,
    Into,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct FrameNum(pub u64);

impl FrameNum {
    pub const FIRST: Self = Self(1);

    /// Clamps a navigation request into `[1, total]`. Requests outside the
    /// video (before the first frame, past the last) are normal and never an
    /// error.
    pub fn clamped(request: i64, total: u64) -> Self {
        let total = total.max(1);
        if request < 1 {
            Self::FIRST
        } else {
            Self((request as u64).min(total))
        }
    }

    /// Byte offset of this frame for frames of `frame_size` bytes.
    pub fn byte_offset(self, frame_size: u64) -> u64 {
        self.0.saturating_sub(1) * frame_size
    }

    pub fn as_request(self) -> i64 {
        self.0 as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_into_video() {
        assert_eq!(FrameNum::clamped(0, 5), FrameNum(1));
        assert_eq!(FrameNum::clamped(-3, 5), FrameNum(1));
        assert_eq!(FrameNum::clamped(3, 5), FrameNum(3));
        assert_eq!(FrameNum::clamped(10, 5), FrameNum(5));
    }

    #[test]
    fn offsets_are_frame_granular() {
        assert_eq!(FrameNum(1).byte_offset(12), 0);
        assert_eq!(FrameNum(4).byte_offset(12), 36);
    }
}
