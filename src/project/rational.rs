use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{str::FromStr, time::Duration};

/// Playback rate in frames per second, kept as a fraction so NTSC style
/// rates (30000/1001) stay exact.
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[display("{num}/{den}")]
#[serde(try_from = "FrameRateRepr")]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    pub const DEFAULT: Self = Self::new(30, 1);

    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    pub fn fps(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Time one frame stays on screen.
    pub fn frame_interval(self) -> Duration {
        Duration::from_secs_f64(self.den as f64 / self.num as f64)
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Accepted JSON shapes: `25`, `29.97`, `"30000/1001"` or `{ "num": .., "den": .. }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum FrameRateRepr {
    Integer(u32),
    Decimal(f64),
    Text(String),
    Fraction { num: u32, den: u32 },
}

impl TryFrom<FrameRateRepr> for FrameRate {
    type Error = ParseFrameRateError;

    fn try_from(repr: FrameRateRepr) -> Result<Self, Self::Error> {
        match repr {
            FrameRateRepr::Integer(num) => num.to_string().parse(),
            FrameRateRepr::Decimal(fps) => fps.to_string().parse(),
            FrameRateRepr::Text(text) => text.parse(),
            FrameRateRepr::Fraction { num, den } => format!("{num}/{den}").parse(),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid frame rate \"{0}\": expected a positive number or NUM/DEN")]
pub struct ParseFrameRateError(String);

impl FromStr for FrameRate {
    type Err = ParseFrameRateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFrameRateError(s.to_owned());
        let s = s.trim();

        let rate = match s.split_once('/') {
            Some((num, den)) => Self::new(
                num.trim().parse().map_err(|_| err())?,
                den.trim().parse().map_err(|_| err())?,
            ),
            None => match s.parse::<u32>() {
                Ok(num) => Self::new(num, 1),
                Err(_) => {
                    let fps: f64 = s.parse().map_err(|_| err())?;
                    if !fps.is_finite() || fps <= 0.0 || fps > u32::MAX as f64 / 1000.0 {
                        return Err(err());
                    }
                    Self::new((fps * 1000.0).round() as u32, 1000)
                }
            },
        };

        if rate.num == 0 || rate.den == 0 {
            return Err(err());
        }
        Ok(rate)
    }
}
