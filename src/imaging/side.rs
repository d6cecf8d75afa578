use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::imaging::error::ImagingError;

/// Card face verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSide {
    Front,
    Back,
    Unknown,
}

impl CardSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardSide::Front => "front",
            CardSide::Back => "back",
            CardSide::Unknown => "unknown",
        }
    }

    /// Parse a stored verdict; anything unrecognized reads as unknown.
    pub fn parse(value: &str) -> Self {
        match value {
            "front" => CardSide::Front,
            "back" => CardSide::Back,
            _ => CardSide::Unknown,
        }
    }
}

/// How a side verdict was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Heuristic,
    Vision,
    Manual,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::Heuristic => "heuristic",
            DetectionMethod::Vision => "vision",
            DetectionMethod::Manual => "manual",
        }
    }
}

/// A side verdict with its confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideDetection {
    pub side: CardSide,
    pub confidence: f64,
    pub method: DetectionMethod,
}

impl SideDetection {
    /// The fallback verdict when the heuristic cannot run.
    pub fn unknown_heuristic() -> Self {
        SideDetection {
            side: CardSide::Unknown,
            confidence: 0.5,
            method: DetectionMethod::Heuristic,
        }
    }
}

/// Standard card aspect ratio, 63mm x 88mm.
const EXPECTED_ASPECT: f64 = 0.716;
const ASPECT_TOLERANCE: f64 = 0.08;

const SAMPLE_SIZE: u32 = 64;
/// Outer 10% of the downsampled image counts as border.
const BORDER_MARGIN: u32 = (SAMPLE_SIZE as f64 * 0.1) as u32;

/// Classify an image as card front or back from border colorimetry and
/// aspect ratio.
///
/// Card backs show a dominant blue border; fronts carry a yellow border or
/// a varied palette. Any internal failure degrades to an unknown verdict
/// rather than failing the job.
pub fn detect_side(bytes: &[u8], width: u32, height: u32) -> SideDetection {
    match detect_side_inner(bytes, width, height) {
        Ok(result) => result,
        Err(e) => {
            debug!("side heuristic failed, returning unknown: {}", e);
            SideDetection::unknown_heuristic()
        }
    }
}

fn detect_side_inner(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> Result<SideDetection, ImagingError> {
    let mut score = 0.0_f64;

    let aspect = f64::from(width) / f64::from(height);
    if (aspect - EXPECTED_ASPECT).abs() <= ASPECT_TOLERANCE {
        score += 0.2;
    }

    let image = image::load_from_memory(bytes)?;
    let sample = image
        .resize_exact(SAMPLE_SIZE, SAMPLE_SIZE, FilterType::Triangle)
        .to_rgb8();

    let mut blue_count = 0_usize;
    let mut yellow_count = 0_usize;
    let mut total = 0_usize;
    let mut hue_histogram = [0_usize; 12];

    for (x, y, pixel) in sample.enumerate_pixels() {
        let in_border = x < BORDER_MARGIN
            || x >= SAMPLE_SIZE - BORDER_MARGIN
            || y < BORDER_MARGIN
            || y >= SAMPLE_SIZE - BORDER_MARGIN;
        if !in_border {
            continue;
        }
        total += 1;

        let [r, g, b] = pixel.0;
        let (rf, gf, bf) = (f64::from(r), f64::from(g), f64::from(b));

        if bf > 120.0 && bf > 1.5 * rf && bf > 1.2 * gf {
            blue_count += 1;
        }
        if rf > 180.0 && gf > 150.0 && bf < 100.0 {
            yellow_count += 1;
        }

        let bucket = ((hue_degrees(rf, gf, bf) / 30.0) as usize).min(11);
        hue_histogram[bucket] += 1;
    }

    if total == 0 {
        return Ok(SideDetection::unknown_heuristic());
    }

    let total_f = total as f64;
    let blue_ratio = blue_count as f64 / total_f;
    let yellow_ratio = yellow_count as f64 / total_f;
    let max_bucket = *hue_histogram.iter().max().unwrap_or(&0);

    let is_blue_back = blue_ratio > 0.5;
    let has_yellow_border = yellow_ratio > 0.3;
    let has_varied_colors = (max_bucket as f64) < 0.4 * total_f;

    if is_blue_back {
        score -= 0.6;
    } else if has_yellow_border {
        score += 0.3;
    } else if has_varied_colors {
        score += 0.2;
    }

    let result = if score >= 0.3 {
        SideDetection {
            side: CardSide::Front,
            confidence: (0.5 + score).min(0.95),
            method: DetectionMethod::Heuristic,
        }
    } else if score <= -0.3 {
        SideDetection {
            side: CardSide::Back,
            confidence: (0.5 + score.abs()).min(0.95),
            method: DetectionMethod::Heuristic,
        }
    } else {
        SideDetection {
            side: CardSide::Unknown,
            confidence: 0.5,
            method: DetectionMethod::Heuristic,
        }
    };

    debug!(
        "side heuristic: score={:.2} blue={:.2} yellow={:.2} -> {} ({:.2})",
        score,
        blue_ratio,
        yellow_ratio,
        result.side.as_str(),
        result.confidence
    );

    Ok(result)
}

/// HSV hue in degrees `[0, 360)` from 8-bit RGB.
fn hue_degrees(r: f64, g: f64, b: f64) -> f64 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    if delta == 0.0 {
        return 0.0;
    }

    let hue = if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    if hue < 0.0 {
        hue + 360.0
    } else {
        hue
    }
}

#[cfg(test)]
mod hue_tests {
    use super::hue_degrees;

    #[test]
    fn primary_hues() {
        assert_eq!(hue_degrees(255.0, 0.0, 0.0), 0.0);
        assert_eq!(hue_degrees(0.0, 255.0, 0.0), 120.0);
        assert_eq!(hue_degrees(0.0, 0.0, 255.0), 240.0);
    }

    #[test]
    fn achromatic_pixels_have_zero_hue() {
        assert_eq!(hue_degrees(0.0, 0.0, 0.0), 0.0);
        assert_eq!(hue_degrees(128.0, 128.0, 128.0), 0.0);
    }

    #[test]
    fn negative_branch_wraps_into_range() {
        // Magenta-ish: max is red, g < b.
        let hue = hue_degrees(255.0, 0.0, 128.0);
        assert!((0.0..360.0).contains(&hue));
        assert!(hue > 300.0);
    }
}
