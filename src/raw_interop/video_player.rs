use super::{DecodedFrame, RawVideo, VideoInfo};
use crate::{
    error::{RawVideoError, Result},
    project::VideoSpec,
};
use derive_more::Display;
use log::debug;
use parking_lot::{Condvar, Mutex};

/// What a [`VideoPlayer`] is doing right now. Anything but `Idle` excludes
/// every other operation.
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq)]
pub enum Activity {
    #[display("idle")]
    Idle,
    #[display("decoding")]
    Decoding,
    #[display("cropping")]
    Cropping,
    #[display("reloading")]
    Reloading,
}

/// Thread safe owner of at most one open [`RawVideo`].
///
/// Decodes are "latest wins": a decode requested while anything else is in
/// flight is dropped rather than queued. Crop, open and close wait for the
/// in-flight operation and then run alone, so no decode ever observes a file
/// that is halfway through being replaced.
#[derive(Debug)]
pub struct VideoPlayer {
    activity: Mutex<Activity>,
    idle: Condvar,
    video: Mutex<Option<RawVideo>>,
}

/// Holds the player busy until dropped, on every exit path.
struct BusyGuard<'a> {
    player: &'a VideoPlayer,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.player.activity.lock() = Activity::Idle;
        self.player.idle.notify_all();
    }
}

impl Default for VideoPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoPlayer {
    pub fn new() -> Self {
        Self {
            activity: Mutex::new(Activity::Idle),
            idle: Condvar::new(),
            video: Mutex::new(None),
        }
    }

    pub fn activity(&self) -> Activity {
        *self.activity.lock()
    }

    fn try_begin(&self, activity: Activity) -> Option<BusyGuard<'_>> {
        let mut current = self.activity.lock();
        if *current != Activity::Idle {
            return None;
        }
        *current = activity;
        Some(BusyGuard { player: self })
    }

    fn begin(&self, activity: Activity) -> BusyGuard<'_> {
        let mut current = self.activity.lock();
        while *current != Activity::Idle {
            self.idle.wait(&mut current);
        }
        *current = activity;
        BusyGuard { player: self }
    }

    /// Closes whatever was open and opens `spec`, returning the first frame.
    pub fn open(&self, spec: VideoSpec) -> Result<(VideoInfo, Option<DecodedFrame>)> {
        let _busy = self.begin(Activity::Reloading);
        let mut slot = self.video.lock();
        if let Some(previous) = slot.as_mut() {
            previous.close();
        }
        *slot = None;

        let mut video = RawVideo::open(spec)?;
        let first = video.take_first_frame();
        let info = video.info();
        *slot = Some(video);
        Ok((info, first))
    }

    /// Safe to call any number of times, with or without an open video.
    pub fn close(&self) {
        let _busy = self.begin(Activity::Reloading);
        if let Some(mut video) = self.video.lock().take() {
            video.close();
        }
    }

    /// Snapshot of the open video. Blocks while a decode or crop holds the
    /// video, without taking the busy guard.
    pub fn info(&self) -> Option<VideoInfo> {
        self.video.lock().as_ref().map(RawVideo::info)
    }

    /// Decodes the frame nearest to `request`, or returns `Ok(None)` when the
    /// player is busy and the request was dropped.
    pub fn try_decode(&self, request: i64) -> Result<Option<DecodedFrame>> {
        let Some(_busy) = self.try_begin(Activity::Decoding) else {
            debug!("player busy ({}), dropped decode of frame {request}", self.activity());
            return Ok(None);
        };

        let mut slot = self.video.lock();
        let video = slot.as_mut().ok_or(RawVideoError::Closed)?;
        video.decode(request).map(Some)
    }

    /// Crops the open video to `start..=end`, waiting for an in-flight decode
    /// first. Decodes requested meanwhile are dropped.
    pub fn crop(&self, start: u64, end: u64) -> Result<VideoInfo> {
        let _busy = self.begin(Activity::Cropping);
        let mut slot = self.video.lock();
        let video = slot.as_mut().ok_or(RawVideoError::Closed)?;
        video.crop(start, end)?;
        Ok(video.info())
    }
}
