use super::FrameRate;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Everything needed to open a headerless raw video: the bytes on disk say
/// nothing about geometry, so the caller has to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSpec {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub frame_rate: FrameRate,
}

impl VideoSpec {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
            frame_rate: FrameRate::default(),
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Reads a spec from a JSON file. Relative video paths resolve against
    /// the directory holding the JSON file.
    pub fn from_json_file(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.into();
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read video spec \"{}\"", path.display()))?;
        let mut spec: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse video spec \"{}\"", path.display()))?;

        if spec.path.is_relative() {
            if let Some(dir) = path.parent() {
                spec.path = dir.join(&spec.path);
            }
        }
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rate_defaults_to_thirty() {
        let spec: VideoSpec =
            serde_json::from_str(r#"{ "path": "clip.yuv", "width": 640, "height": 480 }"#)
                .unwrap();
        assert_eq!(spec, VideoSpec::new("clip.yuv", 640, 480));
        assert_eq!(spec.frame_rate, FrameRate::new(30, 1));
    }

    #[test]
    fn frame_rate_as_plain_number() {
        let spec = |rate: &str| {
            let json = format!(r#"{{ "path": "clip.yuv", "width": 640, "height": 480, "frameRate": {rate} }}"#);
            serde_json::from_str::<VideoSpec>(&json)
        };
        assert_eq!(spec("25").unwrap().frame_rate, FrameRate::new(25, 1));
        assert_eq!(spec("29.97").unwrap().frame_rate, FrameRate::new(29970, 1000));
        assert!(spec(r#"{ "num": 0, "den": 1 }"#).is_err());
    }

    #[test]
    fn loads_relative_to_spec_file() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("clip.json");
        fs::write(
            &json,
            r#"{ "path": "clip.rgb", "width": 4, "height": 2, "frameRate": 25 }"#,
        )
        .unwrap();

        let spec = VideoSpec::from_json_file(&json).unwrap();
        assert_eq!(spec.path, dir.path().join("clip.rgb"));
        assert_eq!(spec.frame_rate, FrameRate::new(25, 1));
    }
}
