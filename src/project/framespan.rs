use super::FrameNum;
use serde::{Deserialize, Serialize};
use std::ops::{Range, RangeInclusive};

/// Contiguous run of frames, `from` inclusive and `to_excl` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSpan {
    pub from: FrameNum,
    pub to_excl: FrameNum,
}

impl FrameSpan {
    /// Span covering `first..=last`.
    pub fn inclusive(first: FrameNum, last: FrameNum) -> Self {
        Self {
            from: first,
            to_excl: FrameNum(last.0 + 1),
        }
    }

    /// Every frame of a video with `total` frames.
    pub fn whole(total: u64) -> Self {
        Self::inclusive(FrameNum::FIRST, FrameNum(total))
    }

    pub fn first(&self) -> FrameNum {
        self.from
    }

    pub fn last(&self) -> FrameNum {
        FrameNum(self.to_excl.0.saturating_sub(1))
    }

    pub(crate) fn len(&self) -> u64 {
        self.to_excl.0.saturating_sub(self.from.0)
    }

    pub fn frames(&self) -> impl Iterator<Item = FrameNum> + use<> {
        Range::<u64>::from(*self).map(FrameNum)
    }
}

impl From<FrameSpan> for Range<u64> {
    fn from(value: FrameSpan) -> Self {
        value.from.0..value.to_excl.0
    }
}

impl From<Range<u64>> for FrameSpan {
    fn from(value: Range<u64>) -> Self {
        Self {
            from: FrameNum(value.start),
            to_excl: FrameNum(value.end),
        }
    }
}

impl From<RangeInclusive<u64>> for FrameSpan {
    fn from(value: RangeInclusive<u64>) -> Self {
        Self::inclusive(FrameNum(*value.start()), FrameNum(*value.end()))
    }
}
