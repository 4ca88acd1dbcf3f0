//! Session and subject configuration.
//!
//! Configuration arrives as JSON (or is built in code), is parsed into a raw
//! record with string enums, and is validated exactly once when converted into
//! a [`SessionConfig`]. Every rejection names the offending field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

fn default_subject_scale() -> f64 {
    1.0
}

fn default_fps() -> u32 {
    30
}

fn default_speed() -> f64 {
    1.0
}

fn default_azimuth() -> f64 {
    90.0
}

/// Body build of the simulated actor.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Build {
    #[default]
    Light,
    Heavy,
}

/// Emotional affect of the simulated actor.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affect {
    #[default]
    Neutral,
    Happy,
    Sad,
}

/// What the emitter does with a frame that leaves the bounding box.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Raise `OutOfBounds`.
    #[default]
    Strict,
    /// Log a warning and return the frame unclipped.
    Lenient,
}

impl FromStr for Build {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Build::Light),
            "heavy" => Ok(Build::Heavy),
            other => Err(MotionError::config(
                "build",
                format!("unknown value '{other}', expected light or heavy"),
            )),
        }
    }
}

impl FromStr for Affect {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "neutral" => Ok(Affect::Neutral),
            "happy" => Ok(Affect::Happy),
            "sad" => Ok(Affect::Sad),
            other => Err(MotionError::config(
                "affect",
                format!("unknown value '{other}', expected neutral, happy or sad"),
            )),
        }
    }
}

impl FromStr for ValidationMode {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(ValidationMode::Strict),
            "lenient" => Ok(ValidationMode::Lenient),
            other => Err(MotionError::config(
                "validation",
                format!("unknown value '{other}', expected strict or lenient"),
            )),
        }
    }
}

impl fmt::Display for Build {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Build::Light => "light",
            Build::Heavy => "heavy",
        })
    }
}

impl fmt::Display for Affect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Affect::Neutral => "neutral",
            Affect::Happy => "happy",
            Affect::Sad => "sad",
        })
    }
}

/// Subject attributes the skeleton is built from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    pub build: Build,
    #[serde(default)]
    pub affect: Affect,
    #[serde(default = "default_subject_scale")]
    pub subject_scale: f64,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            build: Build::default(),
            affect: Affect::default(),
            subject_scale: default_subject_scale(),
        }
    }
}

impl Attributes {
    pub fn new(build: Build, affect: Affect, subject_scale: f64) -> Self {
        Self {
            build,
            affect,
            subject_scale,
        }
    }

    /// Parse attributes given as text, e.g. from a command line.
    pub fn parse(build: &str, affect: &str, subject_scale: f64) -> Result<Self, MotionError> {
        let attrs = Self::new(build.parse()?, affect.parse()?, subject_scale);
        attrs.validate()?;
        Ok(attrs)
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        if !self.subject_scale.is_finite() || self.subject_scale <= 0.0 {
            return Err(MotionError::config(
                "subject_scale",
                format!("must be a finite value > 0, got {}", self.subject_scale),
            ));
        }
        Ok(())
    }
}

/// Camera used to project the 3D body onto the frame plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewConfig {
    /// Rotation about the vertical axis; 0 looks at the front of the body,
    /// 90 is the classic side view with forward motion to the right.
    #[serde(default = "default_azimuth")]
    pub azimuth_deg: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            azimuth_deg: default_azimuth(),
        }
    }
}

/// Sanity box for root-relative projected marker coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundsConfig {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundsConfig {
    /// Default box: 2.5 body units around the root in every direction.
    pub fn around_root(subject_scale: f64) -> Self {
        let r = 2.5 * subject_scale;
        Self {
            min_x: -r,
            max_x: r,
            min_y: -r,
            max_y: r,
        }
    }

    fn validate(&self) -> Result<(), MotionError> {
        let all_finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite || self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(MotionError::config(
                "bounds",
                format!(
                    "expected finite min < max, got x [{}, {}] y [{}, {}]",
                    self.min_x, self.max_x, self.min_y, self.max_y
                ),
            ));
        }
        Ok(())
    }
}

/// Wire form of a session config; enums are still plain strings so rejections
/// can name the field.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSessionConfig {
    action: String,
    #[serde(default)]
    build: Option<String>,
    #[serde(default)]
    affect: Option<String>,
    #[serde(default = "default_subject_scale")]
    subject_scale: f64,
    #[serde(default = "default_fps")]
    fps: u32,
    #[serde(default)]
    duration_seconds: Option<f64>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    view: ViewConfig,
    #[serde(default)]
    bounds: Option<BoundsConfig>,
    #[serde(default)]
    validation: Option<String>,
    #[serde(default = "default_speed")]
    speed: f64,
}

/// Validated configuration for one animation session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSessionConfig", into = "RawSessionConfig")]
pub struct SessionConfig {
    pub action: String,
    pub attributes: Attributes,
    pub fps: u32,
    /// Required for one-shot actions; checked against the library at session start.
    pub duration_seconds: Option<f64>,
    pub seed: Option<u64>,
    pub view: ViewConfig,
    pub bounds: BoundsConfig,
    pub validation: ValidationMode,
    pub speed: f64,
}

impl TryFrom<RawSessionConfig> for SessionConfig {
    type Error = MotionError;

    fn try_from(raw: RawSessionConfig) -> Result<Self, Self::Error> {
        let build = match raw.build.as_deref() {
            Some(s) => s.parse()?,
            None => Build::default(),
        };
        let affect = match raw.affect.as_deref() {
            Some(s) => s.parse()?,
            None => Affect::default(),
        };
        let validation = match raw.validation.as_deref() {
            Some(s) => s.parse()?,
            None => ValidationMode::default(),
        };
        let attributes = Attributes::new(build, affect, raw.subject_scale);
        let config = SessionConfig {
            action: raw.action,
            bounds: raw
                .bounds
                .unwrap_or_else(|| BoundsConfig::around_root(attributes.subject_scale)),
            attributes,
            fps: raw.fps,
            duration_seconds: raw.duration_seconds,
            seed: raw.seed,
            view: raw.view,
            validation,
            speed: raw.speed,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<SessionConfig> for RawSessionConfig {
    fn from(cfg: SessionConfig) -> Self {
        RawSessionConfig {
            action: cfg.action,
            build: Some(cfg.attributes.build.to_string()),
            affect: Some(cfg.attributes.affect.to_string()),
            subject_scale: cfg.attributes.subject_scale,
            fps: cfg.fps,
            duration_seconds: cfg.duration_seconds,
            seed: cfg.seed,
            view: cfg.view,
            bounds: Some(cfg.bounds),
            validation: Some(
                match cfg.validation {
                    ValidationMode::Strict => "strict",
                    ValidationMode::Lenient => "lenient",
                }
                .to_string(),
            ),
            speed: cfg.speed,
        }
    }
}

impl SessionConfig {
    /// Config with defaults for everything but the action.
    pub fn new(action: impl Into<String>) -> Self {
        let attributes = Attributes::default();
        Self {
            action: action.into(),
            bounds: BoundsConfig::around_root(attributes.subject_scale),
            attributes,
            fps: default_fps(),
            duration_seconds: None,
            seed: None,
            view: ViewConfig::default(),
            validation: ValidationMode::default(),
            speed: default_speed(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, MotionError> {
        let raw: RawSessionConfig = serde_json::from_str(json)?;
        SessionConfig::try_from(raw)
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.bounds = BoundsConfig::around_root(attributes.subject_scale);
        self.attributes = attributes;
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_view(mut self, azimuth_deg: f64) -> Self {
        self.view = ViewConfig { azimuth_deg };
        self
    }

    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    pub fn with_bounds(mut self, bounds: BoundsConfig) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Rules that need no action library. Action resolution and the one-shot
    /// duration requirement are checked when a session starts.
    pub fn validate(&self) -> Result<(), MotionError> {
        if self.action.trim().is_empty() {
            return Err(MotionError::config("action", "must not be empty"));
        }
        self.attributes.validate()?;
        if self.fps == 0 {
            return Err(MotionError::config("fps", "must be a positive integer"));
        }
        if let Some(d) = self.duration_seconds {
            if !d.is_finite() || d <= 0.0 {
                return Err(MotionError::config(
                    "duration_seconds",
                    format!("must be a finite value > 0, got {d}"),
                ));
            }
        }
        if !self.view.azimuth_deg.is_finite() {
            return Err(MotionError::config("view", "azimuth_deg must be finite"));
        }
        self.bounds.validate()?;
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(MotionError::config(
                "speed",
                format!("must be a finite value >= 0, got {}", self.speed),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: MotionError) -> String {
        match err {
            MotionError::Configuration { field, .. } => field,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = SessionConfig::from_json_str(r#"{ "action": "walk" }"#).unwrap();
        assert_eq!(cfg.attributes, Attributes::default());
        assert_eq!(cfg.fps, 30);
        assert_eq!(cfg.view.azimuth_deg, 90.0);
        assert_eq!(cfg.validation, ValidationMode::Strict);
        assert_eq!(cfg.bounds, BoundsConfig::around_root(1.0));
        assert_eq!(cfg.speed, 1.0);
    }

    #[test]
    fn enum_values_are_parsed() {
        let cfg = SessionConfig::from_json_str(
            r#"{ "action": "run", "build": "heavy", "affect": "sad", "validation": "lenient" }"#,
        )
        .unwrap();
        assert_eq!(cfg.attributes.build, Build::Heavy);
        assert_eq!(cfg.attributes.affect, Affect::Sad);
        assert_eq!(cfg.validation, ValidationMode::Lenient);
    }

    #[test]
    fn unrecognized_enum_names_its_field() {
        let err = SessionConfig::from_json_str(r#"{ "action": "walk", "build": "bulky" }"#)
            .unwrap_err();
        assert_eq!(field_of(err), "build");
        let err = Attributes::parse("light", "furious", 1.0).unwrap_err();
        assert_eq!(field_of(err), "affect");
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Attributes::new(Build::Light, Affect::Neutral, scale)
                .validate()
                .unwrap_err();
            assert_eq!(field_of(err), "subject_scale");
        }
    }

    #[test]
    fn bad_duration_and_speed_are_rejected() {
        let err = SessionConfig::new("bow").with_duration(0.0).validate().unwrap_err();
        assert_eq!(field_of(err), "duration_seconds");
        let mut cfg = SessionConfig::new("walk");
        cfg.speed = -1.0;
        assert_eq!(field_of(cfg.validate().unwrap_err()), "speed");
    }

    #[test]
    fn bounds_follow_subject_scale() {
        let cfg = SessionConfig::new("walk").with_attributes(Attributes::new(
            Build::Light,
            Affect::Neutral,
            2.0,
        ));
        assert_eq!(cfg.bounds.max_x, 5.0);
        assert_eq!(cfg.bounds.min_y, -5.0);
    }

    #[test]
    fn serialized_config_reads_back() {
        let cfg = SessionConfig::new("sit_down")
            .with_duration(2.0)
            .with_seed(9)
            .with_validation(ValidationMode::Lenient);
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(SessionConfig::from_json_str(&json).unwrap(), cfg);
    }

    #[test]
    fn deserialize_validates() {
        let parsed: Result<SessionConfig, _> =
            serde_json::from_str(r#"{ "action": "walk", "fps": 0 }"#);
        assert!(parsed.is_err());
    }
}
