use bytes::Bytes;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hashing;
use crate::imaging::error::ImagingError;

/// The canonical size variants, generated in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivativeVariant {
    Thumb,
    Grid,
    Detail,
}

impl DerivativeVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivativeVariant::Thumb => "thumb",
            DerivativeVariant::Grid => "grid",
            DerivativeVariant::Detail => "detail",
        }
    }
}

struct VariantSpec {
    variant: DerivativeVariant,
    max_width: u32,
    quality: f32,
}

const VARIANT_SPECS: [VariantSpec; 3] = [
    VariantSpec {
        variant: DerivativeVariant::Thumb,
        max_width: 160,
        quality: 75.0,
    },
    VariantSpec {
        variant: DerivativeVariant::Grid,
        max_width: 360,
        quality: 80.0,
    },
    VariantSpec {
        variant: DerivativeVariant::Detail,
        max_width: 960,
        quality: 80.0,
    },
];

/// One encoded WebP size variant ready for upload.
#[derive(Debug, Clone)]
pub struct Derivative {
    pub variant: DerivativeVariant,
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
    pub storage_path: String,
}

/// Produce the thumb/grid/detail WebP variants for an image.
///
/// Variants are never upscaled: the target width is capped at the original
/// width. The first failing variant aborts the whole set.
pub fn generate_derivatives(bytes: &[u8], sha256: &str) -> Result<Vec<Derivative>, ImagingError> {
    let image = image::load_from_memory(bytes)?;
    let original_width = image.width();

    let mut derivatives = Vec::with_capacity(VARIANT_SPECS.len());
    for spec in &VARIANT_SPECS {
        let target_width = spec.max_width.min(original_width);
        let resized = if target_width < original_width {
            image.resize(target_width, u32::MAX, FilterType::Lanczos3)
        } else {
            image.clone()
        };

        let rgb = resized.to_rgb8();
        let encoded = webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
            .encode(spec.quality)
            .to_vec();

        debug!(
            "encoded {} derivative: {}x{} ({} bytes)",
            spec.variant.as_str(),
            rgb.width(),
            rgb.height(),
            encoded.len()
        );

        derivatives.push(Derivative {
            variant: spec.variant,
            width: rgb.width(),
            height: rgb.height(),
            bytes: encoded.len(),
            storage_path: hashing::derivative_path(sha256, spec.variant),
            data: Bytes::from(encoded),
        });
    }

    Ok(derivatives)
}
