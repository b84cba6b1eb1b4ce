use serde::{Deserialize, Serialize};
use std::fmt;

/// Aspect ratios accepted by Gemini image generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "3:4")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Tall => "9:16",
            AspectRatio::Portrait => "3:4",
        }
    }

    /// Buckets `width / height` into the closest supported ratio.
    /// Anything outside the named buckets maps to square.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        let ratio = f64::from(width) / f64::from(height);
        if ratio == 1.0 {
            AspectRatio::Square
        } else if ratio > 1.7 {
            AspectRatio::Widescreen
        } else if ratio > 1.3 {
            AspectRatio::Landscape
        } else if ratio < 0.6 {
            AspectRatio::Tall
        } else if ratio < 0.8 {
            AspectRatio::Portrait
        } else {
            AspectRatio::Square
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
