use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::pipeline::job::ImageJob;

/// Encode an RGB buffer as an in-memory PNG.
pub fn encode_png(image: &RgbImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("in-memory PNG encode");
    buffer
}

/// A solid-color image.
pub fn flat_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    encode_png(&RgbImage::from_pixel(width, height, Rgb(color)))
}

/// A card-like image: solid border color around a solid interior. The
/// border covers 20% of the smaller dimension so it fully spans the outer
/// ring the side heuristic samples.
pub fn bordered_card_png(width: u32, height: u32, border: [u8; 3], interior: [u8; 3]) -> Vec<u8> {
    let margin = (width.min(height) as f64 * 0.2) as u32;
    let mut image = RgbImage::from_pixel(width, height, Rgb(interior));
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if x < margin || x >= width - margin || y < margin || y >= height - margin {
            *pixel = Rgb(border);
        }
    }
    encode_png(&image)
}

/// A card-like image whose border cycles through six well-spread hues, so
/// no single hue bucket dominates. Bands are wide enough to survive the
/// detector's downscale without blending into gray.
pub fn varied_border_card_png(width: u32, height: u32) -> Vec<u8> {
    const HUES: [[u8; 3]; 6] = [
        [255, 0, 0],
        [255, 128, 0],
        [0, 255, 0],
        [0, 255, 255],
        [0, 0, 255],
        [255, 0, 255],
    ];
    let margin = (width.min(height) as f64 * 0.2) as u32;
    let mut image = RgbImage::from_pixel(width, height, Rgb([200, 200, 200]));
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if x < margin || x >= width - margin || y < margin || y >= height - margin {
            *pixel = Rgb(HUES[((x + y) / 64) as usize % HUES.len()]);
        }
    }
    encode_png(&image)
}

/// Alternating black/white vertical stripes, dense with vertical edges.
pub fn striped_png(width: u32, height: u32, stripe_width: u32) -> Vec<u8> {
    let mut image = RgbImage::new(width, height);
    for (x, _, pixel) in image.enumerate_pixels_mut() {
        let value = if (x / stripe_width) % 2 == 0 { 0 } else { 255 };
        *pixel = Rgb([value, value, value]);
    }
    encode_png(&image)
}

/// Yellow typical of card front borders.
pub const FRONT_BORDER: [u8; 3] = [230, 200, 40];
/// Blue typical of card backs.
pub const BACK_BORDER: [u8; 3] = [30, 50, 200];

/// A job with only the required fields set.
pub fn minimal_job(card_id: &str, url: &str) -> ImageJob {
    ImageJob {
        card_id: card_id.to_string(),
        source_url: url.to_string(),
        source_id: None,
        source_name: None,
        trust_tier: None,
        card_number: None,
        set_code: None,
        priority: None,
    }
}
