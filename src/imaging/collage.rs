use image::imageops::FilterType;
use image::GrayImage;
use tracing::debug;

use crate::imaging::error::ImagingError;

/// Aspect ratios beyond these bounds cannot be a single card.
const MAX_SINGLE_CARD_ASPECT: f64 = 1.5;
const MIN_SINGLE_CARD_ASPECT: f64 = 0.4;

const ANALYSIS_WIDTH: u32 = 200;
/// Mean |gradient| above this marks a column as a strong vertical edge.
const STRONG_COLUMN_THRESHOLD: f64 = 100.0;
const STRONG_COLUMN_RATIO: f64 = 0.15;

/// Decide whether an image depicts more than one card.
///
/// Extreme aspect ratios are collages outright; otherwise card boundaries
/// show up as dense vertical edges in the middle of the frame. Failures
/// degrade to `false` so an undecodable image is judged downstream instead.
pub fn detect_collage(bytes: &[u8], width: u32, height: u32) -> bool {
    match detect_collage_inner(bytes, width, height) {
        Ok(verdict) => verdict,
        Err(e) => {
            debug!("collage detection failed, assuming single card: {}", e);
            false
        }
    }
}

fn detect_collage_inner(bytes: &[u8], width: u32, height: u32) -> Result<bool, ImagingError> {
    let aspect = f64::from(width) / f64::from(height);
    if aspect > MAX_SINGLE_CARD_ASPECT || aspect < MIN_SINGLE_CARD_ASPECT {
        debug!("aspect ratio {:.2} outside single-card bounds", aspect);
        return Ok(true);
    }

    let target_height = ((f64::from(ANALYSIS_WIDTH) / aspect).round() as u32).max(1);
    let gray = image::load_from_memory(bytes)?
        .resize_exact(ANALYSIS_WIDTH, target_height, FilterType::Triangle)
        .to_luma8();

    // Middle 60% of columns; the frame edges always carry a hard gradient.
    let x_start = (f64::from(ANALYSIS_WIDTH) * 0.2) as u32;
    let x_end = (f64::from(ANALYSIS_WIDTH) * 0.8) as u32;

    let mut strong_columns = 0_u32;
    for x in x_start..x_end {
        let mut magnitude_sum = 0.0_f64;
        for y in 0..target_height {
            magnitude_sum += sobel_vertical(&gray, x, y);
        }
        if magnitude_sum / f64::from(target_height) > STRONG_COLUMN_THRESHOLD {
            strong_columns += 1;
        }
    }

    let edge_ratio = f64::from(strong_columns) / f64::from(x_end - x_start);
    debug!(
        "collage analysis: {}/{} strong columns (ratio {:.3})",
        strong_columns,
        x_end - x_start,
        edge_ratio
    );

    Ok(edge_ratio > STRONG_COLUMN_RATIO)
}

/// |Gx| of the 3x3 vertical Sobel kernel [[-1,0,1],[-2,0,2],[-1,0,1]] at
/// (x, y), clamping coordinates at the frame.
fn sobel_vertical(gray: &GrayImage, x: u32, y: u32) -> f64 {
    const KERNEL: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

    let (width, height) = gray.dimensions();
    let mut gx = 0_i32;
    for (ky, row) in KERNEL.iter().enumerate() {
        for (kx, k) in row.iter().enumerate() {
            if *k == 0 {
                continue;
            }
            let px = (x as i64 + kx as i64 - 1).clamp(0, i64::from(width) - 1) as u32;
            let py = (y as i64 + ky as i64 - 1).clamp(0, i64::from(height) - 1) as u32;
            gx += k * i32::from(gray.get_pixel(px, py).0[0]);
        }
    }
    f64::from(gx.abs())
}
