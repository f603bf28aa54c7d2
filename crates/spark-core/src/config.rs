use crate::field::Position;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// What a run does once no frontier cell can be activated any more.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaturationPolicy {
    /// Keep ticking without growth, re-emitting the window around the last
    /// activated cell, so the host still receives every snapshot.
    #[default]
    Hold,
    /// End the run with [`crate::GrowthError::GridSaturated`].
    Fail,
}

impl fmt::Display for SaturationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaturationPolicy::Hold => write!(f, "hold"),
            SaturationPolicy::Fail => write!(f, "fail"),
        }
    }
}

/// Run parameters, fixed once the engine is built.
///
/// Deserializes from the inbound host message (`width`, `height`,
/// `initialSparkPositions`, `numberOfIntervals`, `exp`), all of which are
/// required. Only the engine-side fields may be omitted. [`Default`] holds the
/// values a host fills in before sending a message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparkConfig {
    pub width: i32,
    pub height: i32,
    #[serde(rename = "initialSparkPositions")]
    pub initial_position: Position,
    pub number_of_intervals: usize,
    pub exp: f64,
    /// PRNG seed; `None` draws one from the thread RNG.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_max_selection_attempts")]
    pub max_selection_attempts: usize,
    #[serde(default)]
    pub saturation: SaturationPolicy,
}

fn default_max_selection_attempts() -> usize {
    100_000
}

impl Default for SparkConfig {
    fn default() -> Self {
        Self {
            width: 250,
            height: 250,
            initial_position: Position::new(100, 100),
            number_of_intervals: 500,
            exp: 2.0,
            seed: None,
            max_selection_attempts: default_max_selection_attempts(),
            saturation: SaturationPolicy::Hold,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SparkConfigError {
    InvalidDimensions { width: i32, height: i32 },
    GridTooLarge { max: i32, width: i32, height: i32 },
    ZeroIntervals,
    TooManyIntervals { max: usize, actual: usize },
    SeedOutOfBounds { position: Position, width: i32, height: i32 },
    InvalidExponent(f64),
    ZeroSelectionAttempts,
}

impl fmt::Display for SparkConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SparkConfigError::InvalidDimensions { width, height } => {
                write!(f, "grid dimensions must be positive, got {width}x{height}")
            }
            SparkConfigError::GridTooLarge { max, width, height } => write!(
                f,
                "grid dimensions {width}x{height} exceed supported maximum ({max})"
            ),
            SparkConfigError::ZeroIntervals => write!(f, "numberOfIntervals must be positive"),
            SparkConfigError::TooManyIntervals { max, actual } => {
                write!(f, "numberOfIntervals ({actual}) exceeds supported maximum ({max})")
            }
            SparkConfigError::SeedOutOfBounds {
                position,
                width,
                height,
            } => write!(
                f,
                "initial spark position ({}, {}) lies outside 0..={width} x 0..={height}",
                position.x, position.y
            ),
            SparkConfigError::InvalidExponent(exp) => {
                write!(f, "exp must be finite and non-negative, got {exp}")
            }
            SparkConfigError::ZeroSelectionAttempts => {
                write!(f, "maxSelectionAttempts must be positive")
            }
        }
    }
}

impl Error for SparkConfigError {}

#[derive(Debug)]
pub enum ConfigParseError {
    Json(serde_json::Error),
    Invalid(SparkConfigError),
}

impl fmt::Display for ConfigParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigParseError::Json(e) => write!(f, "malformed configuration message: {e}"),
            ConfigParseError::Invalid(e) => write!(f, "invalid configuration: {e}"),
        }
    }
}

impl Error for ConfigParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigParseError::Json(e) => Some(e),
            ConfigParseError::Invalid(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ConfigParseError {
    fn from(err: serde_json::Error) -> Self {
        ConfigParseError::Json(err)
    }
}

impl From<SparkConfigError> for ConfigParseError {
    fn from(err: SparkConfigError) -> Self {
        ConfigParseError::Invalid(err)
    }
}

impl SparkConfig {
    pub const MAX_GRID_DIMENSION: i32 = 65_536;
    pub const MAX_INTERVALS: usize = 10_000_000;

    pub fn validate(&self) -> Result<(), SparkConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(SparkConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > Self::MAX_GRID_DIMENSION || self.height > Self::MAX_GRID_DIMENSION {
            return Err(SparkConfigError::GridTooLarge {
                max: Self::MAX_GRID_DIMENSION,
                width: self.width,
                height: self.height,
            });
        }
        if self.number_of_intervals == 0 {
            return Err(SparkConfigError::ZeroIntervals);
        }
        if self.number_of_intervals > Self::MAX_INTERVALS {
            return Err(SparkConfigError::TooManyIntervals {
                max: Self::MAX_INTERVALS,
                actual: self.number_of_intervals,
            });
        }
        let Position { x, y } = self.initial_position;
        if x < 0 || x > self.width || y < 0 || y > self.height {
            return Err(SparkConfigError::SeedOutOfBounds {
                position: self.initial_position,
                width: self.width,
                height: self.height,
            });
        }
        if !self.exp.is_finite() || self.exp < 0.0 {
            return Err(SparkConfigError::InvalidExponent(self.exp));
        }
        if self.max_selection_attempts == 0 {
            return Err(SparkConfigError::ZeroSelectionAttempts);
        }
        Ok(())
    }

    /// Parse and validate an inbound configuration message.
    pub fn from_json(message: &str) -> Result<Self, ConfigParseError> {
        let config: SparkConfig = serde_json::from_str(message)?;
        config.validate()?;
        Ok(config)
    }
}
