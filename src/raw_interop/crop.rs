use super::RawVideo;
use crate::{
    error::{RawVideoError, Result},
    project::{FrameNum, FrameSpan},
};
use log::{info, warn};
use std::{
    fs::{self, File},
    io::{Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

impl RawVideo {
    /// Keeps only frames `start..=end` (1-based), rewriting the file at the
    /// same path, then reopens it.
    ///
    /// The selected frames are copied into a `.tmp` sibling which replaces the
    /// original with a rename. If copying fails the original file is left as
    /// it was and the partial temp file stays on disk.
    pub fn crop(&mut self, start: u64, end: u64) -> Result<()> {
        let total = self.layout.total_frames;
        if start < 1 || start > end || end > total {
            return Err(RawVideoError::InvalidRange { start, end, total });
        }
        self.ensure_open()?;

        let span = FrameSpan::from(start..=end);
        let tmp_path = tmp_sibling(&self.spec.path);
        info!(
            "cropping \"{}\" to frames {start}..={end}, keeping {} of {total}",
            self.spec.path.display(),
            span.len()
        );

        if let Err(err) = self.copy_span(span, &tmp_path) {
            warn!(
                "crop of \"{}\" aborted, original kept: {err}",
                self.spec.path.display()
            );
            return Err(err);
        }

        let spec = self.spec.clone();
        self.close();
        if let Err(err) = fs::rename(&tmp_path, &spec.path) {
            warn!("failed to replace \"{}\": {err}", spec.path.display());
            *self = Self::open(spec)?;
            return Err(RawVideoError::file_access(tmp_path, err));
        }

        let reopened = Self::open(spec)?;
        *self = reopened;
        info!(
            "cropped \"{}\" to {} frames",
            self.spec.path.display(),
            self.layout.total_frames
        );
        Ok(())
    }

    fn copy_span(&mut self, span: FrameSpan, tmp_path: &Path) -> Result<()> {
        let frame_size = self.layout.frame_size;
        let copy_err = |frame: FrameNum, source| RawVideoError::CropCopy {
            frame: frame.0,
            tmp_path: tmp_path.to_owned(),
            source,
        };

        let mut out =
            File::create(tmp_path).map_err(|err| RawVideoError::file_access(tmp_path, err))?;
        let mut buf = vec![0u8; frame_size as usize];

        for frame in span.frames() {
            let dest = FrameNum(frame.0 - span.first().0 + 1).byte_offset(frame_size);
            self.read_into(frame, &mut buf)
                .and_then(|()| out.seek(SeekFrom::Start(dest)))
                .and_then(|_| out.write_all(&buf))
                .map_err(|err| copy_err(frame, err))?;
        }

        out.sync_all().map_err(|err| copy_err(span.last(), err))
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
