//! Navigation and play/pause state for a player front end.
//!
//! Nothing here touches files or timers. A front end feeds it frame
//! requests and the frames it actually showed, and asks it where to go next.

use crate::project::{FrameNum, FrameSpan};
use derive_more::Display;

#[derive(Debug, Display, Default, Copy, Clone, PartialEq, Eq)]
pub enum PlayState {
    #[display("playing")]
    Playing,
    #[default]
    #[display("paused")]
    Paused,
    #[display("stopped")]
    Stopped,
}

/// A navigation request relative to the frame currently shown.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Seek {
    Current,
    Next,
    Prev,
    /// Start of the selection.
    First,
    /// End of the selection.
    Last,
    To(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    state: PlayState,
    total_frames: u64,
    selection: FrameSpan,
}

impl Playback {
    pub fn new(total_frames: u64) -> Self {
        let total_frames = total_frames.max(1);
        Self {
            state: PlayState::default(),
            total_frames,
            selection: FrameSpan::whole(total_frames),
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Frames a crop would keep.
    pub fn selection(&self) -> FrameSpan {
        self.selection
    }

    /// Selects the whole video again, e.g. after it was reopened or cropped.
    pub fn reset(&mut self, total_frames: u64) {
        self.total_frames = total_frames.max(1);
        self.selection = FrameSpan::whole(self.total_frames);
    }

    pub fn play(&mut self) {
        if self.state != PlayState::Stopped {
            self.state = PlayState::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.state != PlayState::Stopped {
            self.state = PlayState::Paused;
        }
    }

    pub fn toggle(&mut self) {
        match self.state {
            PlayState::Playing => self.state = PlayState::Paused,
            PlayState::Paused => self.state = PlayState::Playing,
            PlayState::Stopped => {}
        }
    }

    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
    }

    /// Moves the selection start, never past the selection end.
    pub fn set_selection_start(&mut self, frame: u64) {
        let last = self.selection.last();
        let first = frame.clamp(1, last.0);
        self.selection = FrameSpan::inclusive(FrameNum(first), last);
    }

    /// Moves the selection end, never before the selection start.
    pub fn set_selection_end(&mut self, frame: u64) {
        let first = self.selection.first();
        let last = frame.clamp(first.0, self.total_frames);
        self.selection = FrameSpan::inclusive(first, FrameNum(last));
    }

    /// Frame to request for `seek`, kept inside the selection.
    pub fn target(&self, seek: Seek, current: FrameNum) -> i64 {
        let current = current.as_request();
        let wanted = match seek {
            Seek::Current => current,
            Seek::Next => current + 1,
            Seek::Prev => current - 1,
            Seek::First => self.selection.first().as_request(),
            Seek::Last => self.selection.last().as_request(),
            Seek::To(frame) => frame,
        };
        wanted.clamp(
            self.selection.first().as_request(),
            self.selection.last().as_request(),
        )
    }

    /// Records that `frame` is on screen; playback pauses once it reaches the
    /// end of the selection.
    pub fn frame_shown(&mut self, frame: FrameNum) {
        if self.is_playing() && frame >= self.selection.last() {
            self.state = PlayState::Paused;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_paused_with_everything_selected() {
        let playback = Playback::new(10);
        assert_eq!(playback.state(), PlayState::Paused);
        assert_eq!(playback.selection(), FrameSpan::from(1..=10));
    }

    #[test]
    fn toggle_and_stop() {
        let mut playback = Playback::new(10);
        playback.toggle();
        assert!(playback.is_playing());
        playback.toggle();
        assert_eq!(playback.state(), PlayState::Paused);

        playback.stop();
        playback.toggle();
        playback.play();
        assert_eq!(playback.state(), PlayState::Stopped);
    }

    #[test]
    fn targets_stay_inside_selection() {
        let mut playback = Playback::new(10);
        playback.set_selection_start(3);
        playback.set_selection_end(6);

        assert_eq!(playback.target(Seek::Next, FrameNum(4)), 5);
        assert_eq!(playback.target(Seek::Next, FrameNum(6)), 6);
        assert_eq!(playback.target(Seek::Prev, FrameNum(3)), 3);
        assert_eq!(playback.target(Seek::First, FrameNum(5)), 3);
        assert_eq!(playback.target(Seek::Last, FrameNum(5)), 6);
        assert_eq!(playback.target(Seek::To(1), FrameNum(5)), 3);
        assert_eq!(playback.target(Seek::Current, FrameNum(9)), 6);
    }

    #[test]
    fn selection_marks_never_cross() {
        let mut playback = Playback::new(10);
        playback.set_selection_end(4);
        playback.set_selection_start(8);
        assert_eq!(playback.selection(), FrameSpan::from(4..=4));

        playback.set_selection_end(2);
        assert_eq!(playback.selection(), FrameSpan::from(4..=4));

        playback.set_selection_end(50);
        playback.set_selection_start(0);
        assert_eq!(playback.selection(), FrameSpan::from(1..=10));
    }

    #[test]
    fn pauses_at_selection_end() {
        let mut playback = Playback::new(10);
        playback.set_selection_end(5);
        playback.play();

        playback.frame_shown(FrameNum(4));
        assert!(playback.is_playing());
        playback.frame_shown(FrameNum(5));
        assert_eq!(playback.state(), PlayState::Paused);
    }

    #[test]
    fn reset_after_crop() {
        let mut playback = Playback::new(10);
        playback.set_selection_start(2);
        playback.set_selection_end(2);

        playback.reset(1);
        assert_eq!(playback.selection(), FrameSpan::from(1..=1));
        assert_eq!(playback.target(Seek::Next, FrameNum(1)), 1);
    }
}
