//! User-tunable processing settings
//!
//! These mirror the settings panel: quality, auto-save, display toggles and
//! the webcam configuration. They are held in memory by the session and can
//! be seeded from the `[settings]` table of the config file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest accepted processing quality
pub const MIN_PROCESSING_QUALITY: u8 = 1;

/// Highest accepted processing quality
pub const MAX_PROCESSING_QUALITY: u8 = 3;

// ==================== Settings ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 1 = fast, 2 = balanced, 3 = best
    pub processing_quality: u8,

    /// Write successful inline outputs to the output directory
    pub auto_save_results: bool,

    pub show_node_labels: bool,

    pub enable_animations: bool,

    /// Use the webcam as the source when nothing is uploaded
    pub webcam_enabled: bool,

    pub webcam_resolution: WebcamResolution,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            processing_quality: 2,
            auto_save_results: false,
            show_node_labels: true,
            enable_animations: true,
            webcam_enabled: false,
            webcam_resolution: WebcamResolution::default(),
        }
    }
}

impl Settings {
    /// Set the processing quality, clamped to the supported range
    pub fn set_processing_quality(&mut self, quality: u8) {
        self.processing_quality = quality.clamp(MIN_PROCESSING_QUALITY, MAX_PROCESSING_QUALITY);
    }

    /// Bring out-of-range values loaded from disk back into range
    pub fn normalized(mut self) -> Self {
        self.set_processing_quality(self.processing_quality);
        self
    }

    pub fn quality_label(&self) -> &'static str {
        match self.processing_quality {
            1 => "Fast",
            3 => "Best",
            _ => "Balanced",
        }
    }
}

// ==================== Webcam Resolution ====================

/// Capture resolution offered for the webcam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WebcamResolution {
    #[default]
    Vga,
    Hd,
    FullHd,
}

impl WebcamResolution {
    pub fn all() -> &'static [WebcamResolution] {
        &[
            WebcamResolution::Vga,
            WebcamResolution::Hd,
            WebcamResolution::FullHd,
        ]
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            WebcamResolution::Vga => (640, 480),
            WebcamResolution::Hd => (1280, 720),
            WebcamResolution::FullHd => (1920, 1080),
        }
    }

    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.dimensions().1
    }
}

impl fmt::Display for WebcamResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "{}x{}", w, h)
    }
}

impl FromStr for WebcamResolution {
    type Err = String;

    /// Parses `"WxH"`, accepting only the offered resolutions
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WxH, got '{}'", s))?;
        let w: u32 = w.trim().parse().map_err(|_| format!("bad width in '{}'", s))?;
        let h: u32 = h.trim().parse().map_err(|_| format!("bad height in '{}'", s))?;

        WebcamResolution::all()
            .iter()
            .copied()
            .find(|r| r.dimensions() == (w, h))
            .ok_or_else(|| format!("unsupported webcam resolution {}x{}", w, h))
    }
}

impl Serialize for WebcamResolution {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WebcamResolution {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
