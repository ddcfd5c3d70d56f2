use image::imageops::FilterType;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::open;

use crate::error::{ExtractError, Result};
use crate::models::{BACKGROUND, LINE, validate_threshold};

/// Resample `map` to exactly `target_width` x `target_height` with a Lanczos3 kernel.
/// Returns the map untouched when it already has the target size.
pub fn reconcile(map: GrayImage, target_width: u32, target_height: u32) -> Result<GrayImage> {
    if target_width == 0 || target_height == 0 {
        return Err(ExtractError::InvalidDimensions {
            width: target_width,
            height: target_height,
        });
    }
    if map.width() == 0 || map.height() == 0 {
        return Err(ExtractError::InvalidDimensions {
            width: map.width(),
            height: map.height(),
        });
    }

    if map.dimensions() == (target_width, target_height) {
        return Ok(map);
    }

    Ok(image::imageops::resize(
        &map,
        target_width,
        target_height,
        FilterType::Lanczos3,
    ))
}

/// Hard cutoff: values above `threshold` become background (255), the rest line (0)
pub fn binarize(map: &GrayImage, threshold: i32) -> Result<GrayImage> {
    let threshold = validate_threshold(threshold)?;
    let mut mask = map.clone();
    for pixel in mask.pixels_mut() {
        pixel[0] = if pixel[0] > threshold { BACKGROUND } else { LINE };
    }
    Ok(mask)
}

/// Morphological opening of the mask values with a 3x3 square (min filter, then max filter).
///
/// Bright specks and gaps narrower than 3 pixels are absorbed into the
/// surrounding lines; continuous dark strokes, 1-pixel lines included, keep
/// their shape. Pure and idempotent.
pub fn suppress_noise(mask: &GrayImage) -> GrayImage {
    open(mask, Norm::LInf, 1)
}

/// Apply noise suppression only when `enabled`; identity otherwise
pub fn suppress_noise_if(mask: GrayImage, enabled: bool) -> GrayImage {
    if enabled { suppress_noise(&mask) } else { mask }
}

/// Number of line pixels in a binary mask
pub fn count_line_pixels(mask: &GrayImage) -> u64 {
    mask.pixels().filter(|p| **p == Luma([LINE])).count() as u64
}

/// True if every pixel is one of the two mask values
pub fn is_binary(mask: &GrayImage) -> bool {
    mask.pixels().all(|p| p[0] == LINE || p[0] == BACKGROUND)
}
