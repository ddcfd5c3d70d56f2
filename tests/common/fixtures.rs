#![allow(dead_code)]

use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::Path;

/// White canvas with a black 5px horizontal and a black 5px vertical stroke.
/// The strokes cross at (width / 2, height / 2).
pub fn sketch_image(width: u32, height: u32) -> RgbImage {
    let (cx, cy) = (width / 2, height / 2);
    RgbImage::from_fn(width, height, |x, y| {
        let on_stroke = x.abs_diff(cx) <= 2 || y.abs_diff(cy) <= 2;
        if on_stroke {
            Rgb([0u8, 0, 0])
        } else {
            Rgb([255u8, 255, 255])
        }
    })
}

/// Horizontal gradient covering the full 0..=255 range
pub fn gradient_map(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, _| {
        Luma([(x * 255 / (width - 1).max(1)) as u8])
    })
}

/// Deterministic pseudo-random binary mask (roughly 30% line pixels)
pub fn noisy_mask(width: u32, height: u32, seed: u32) -> GrayImage {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    GrayImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        Luma([if state % 10 < 3 { 0u8 } else { 255u8 }])
    })
}

/// Solid white mask with line pixels at the given coordinates
pub fn mask_with_lines(width: u32, height: u32, lines: &[(u32, u32)]) -> GrayImage {
    let mut mask = GrayImage::from_pixel(width, height, Luma([255u8]));
    for &(x, y) in lines {
        mask.put_pixel(x, y, Luma([0u8]));
    }
    mask
}

/// Save `image` as PNG at `path`
pub fn save_png(image: &RgbImage, path: &Path) {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .expect("Failed to save test image");
}

/// Write a file of `len` zero bytes, standing in for model weights
pub fn write_dummy_weights(path: &Path, len: usize) {
    std::fs::write(path, vec![0u8; len]).expect("Failed to write dummy weights");
}
