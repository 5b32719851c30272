//! Pipeline configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! max_frame_size = "qvga"
//! pixel_format = "grayscale"
//! cycle_delay_ms = 100
//! startup_delay_ms = 3000
//! capture_timeout_ms = 1000
//! escalate_after_provision_failures = 10
//! parallel_decode = true
//! log_filter = "camqr=debug"
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::PixelFormat;

/// Named sensor resolutions, smallest first.
///
/// Used as the frame-size ceiling: anything wider or taller than the preset
/// is discarded before a decoder is provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameSize {
    /// 96x96
    #[serde(rename = "96x96")]
    Square96,
    /// 160x120
    Qqvga,
    /// 176x144
    Qcif,
    /// 240x176
    Hqvga,
    /// 240x240
    #[serde(rename = "240x240")]
    Square240,
    /// 320x240
    Qvga,
    /// 400x296
    Cif,
    /// 480x320
    Hvga,
    /// 640x480
    #[default]
    Vga,
    /// 800x600
    Svga,
    /// 1024x768
    Xga,
    /// 1280x720
    Hd,
}

impl FrameSize {
    /// Every preset, smallest first
    pub const ALL: [FrameSize; 12] = [
        FrameSize::Square96,
        FrameSize::Qqvga,
        FrameSize::Qcif,
        FrameSize::Hqvga,
        FrameSize::Square240,
        FrameSize::Qvga,
        FrameSize::Cif,
        FrameSize::Hvga,
        FrameSize::Vga,
        FrameSize::Svga,
        FrameSize::Xga,
        FrameSize::Hd,
    ];

    /// `(width, height)` in pixels
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            FrameSize::Square96 => (96, 96),
            FrameSize::Qqvga => (160, 120),
            FrameSize::Qcif => (176, 144),
            FrameSize::Hqvga => (240, 176),
            FrameSize::Square240 => (240, 240),
            FrameSize::Qvga => (320, 240),
            FrameSize::Cif => (400, 296),
            FrameSize::Hvga => (480, 320),
            FrameSize::Vga => (640, 480),
            FrameSize::Svga => (800, 600),
            FrameSize::Xga => (1024, 768),
            FrameSize::Hd => (1280, 720),
        }
    }

    /// Whether a `width` x `height` frame fits under this ceiling
    pub fn admits(&self, width: usize, height: usize) -> bool {
        let (max_width, max_height) = self.dimensions();
        width <= max_width && height <= max_height
    }

    /// Preset name as written in config files
    pub fn name(&self) -> &'static str {
        match self {
            FrameSize::Square96 => "96x96",
            FrameSize::Qqvga => "qqvga",
            FrameSize::Qcif => "qcif",
            FrameSize::Hqvga => "hqvga",
            FrameSize::Square240 => "240x240",
            FrameSize::Qvga => "qvga",
            FrameSize::Cif => "cif",
            FrameSize::Hvga => "hvga",
            FrameSize::Vga => "vga",
            FrameSize::Svga => "svga",
            FrameSize::Xga => "xga",
            FrameSize::Hd => "hd",
        }
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FrameSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FrameSize::ALL
            .into_iter()
            .find(|size| size.name() == wanted)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown frame size preset `{s}`")))
    }
}

/// Runtime knobs of the capture/decode loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Frames larger than this preset are discarded undecoded
    pub max_frame_size: FrameSize,
    /// Pixel layout the source is expected to deliver
    pub pixel_format: PixelFormat,
    /// Pause before every capture
    pub cycle_delay_ms: u64,
    /// Pause before the first capture (sensor warm-up)
    pub startup_delay_ms: u64,
    /// Bounded wait per acquire for sources built with [`crate::source::frame_channel_for`]
    pub capture_timeout_ms: u64,
    /// Stop the loop after this many consecutive provisioning failures
    pub escalate_after_provision_failures: Option<u32>,
    /// Decode the candidates of one frame on the rayon pool
    pub parallel_decode: bool,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_frame_size: FrameSize::Vga,
            pixel_format: PixelFormat::Grayscale,
            cycle_delay_ms: 100,
            startup_delay_ms: 0,
            capture_timeout_ms: 1000,
            escalate_after_provision_failures: None,
            parallel_decode: false,
            log_filter: "info".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the loop cannot work with.
    ///
    /// # Errors
    ///
    /// - `capture_timeout_ms` is zero
    /// - `escalate_after_provision_failures` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capture_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "capture_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.escalate_after_provision_failures == Some(0) {
            return Err(ConfigError::Invalid(
                "escalate_after_provision_failures must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Render back to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// [`PipelineConfig::cycle_delay_ms`] as a duration
    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }

    /// [`PipelineConfig::startup_delay_ms`] as a duration
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    /// [`PipelineConfig::capture_timeout_ms`] as a duration
    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.max_frame_size.dimensions(), (640, 480));
        assert_eq!(config.cycle_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_full_document() {
        let config = PipelineConfig::from_toml_str(
            r#"
            max_frame_size = "240x240"
            pixel_format = "rgb565"
            cycle_delay_ms = 0
            startup_delay_ms = 3000
            capture_timeout_ms = 250
            escalate_after_provision_failures = 5
            parallel_decode = true
            log_filter = "camqr=debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_frame_size, FrameSize::Square240);
        assert_eq!(config.pixel_format, PixelFormat::Rgb565);
        assert_eq!(config.startup_delay(), Duration::from_secs(3));
        assert_eq!(config.escalate_after_provision_failures, Some(5));
        assert!(config.parallel_decode);
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = PipelineConfig::from_toml_str("capture_timeout_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_escalation() {
        let config = PipelineConfig {
            escalate_after_provision_failures: Some(0),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = PipelineConfig::from_toml_str("frame_size = \"vga\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_frame_size_names_round_trip() {
        for size in FrameSize::ALL {
            assert_eq!(size.name().parse::<FrameSize>().unwrap(), size);
        }
        assert!("uxga".parse::<FrameSize>().is_err());
    }

    #[test]
    fn test_ceiling() {
        assert!(FrameSize::Vga.admits(640, 480));
        assert!(!FrameSize::Vga.admits(641, 480));
        assert!(!FrameSize::Vga.admits(640, 481));
        assert!(FrameSize::Hd.admits(1280, 720));
    }

    #[test]
    fn test_to_toml() {
        let text = PipelineConfig::default().to_toml_string().unwrap();
        let back = PipelineConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, PipelineConfig::default());
    }
}
