mod common;

use common::*;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use lineart_extract::lineart::postprocess::{
    binarize, count_line_pixels, is_binary, reconcile, suppress_noise, suppress_noise_if,
};

#[test]
fn test_reconcile_same_size_is_noop() -> anyhow::Result<()> {
    let map = gradient_map(40, 30);
    let out = reconcile(map.clone(), 40, 30)?;
    assert_eq!(out, map);
    Ok(())
}

#[test]
fn test_reconcile_resamples_to_target() -> anyhow::Result<()> {
    let map = gradient_map(64, 64);
    let out = reconcile(map, 100, 200)?;
    assert_eq!(out.dimensions(), (100, 200));
    Ok(())
}

#[test]
fn test_reconcile_keeps_uniform_map_uniform() -> anyhow::Result<()> {
    let map = GrayImage::from_pixel(17, 9, Luma([200u8]));
    let out = reconcile(map, 50, 31)?;
    assert!(out.pixels().all(|p| p[0] == 200));
    Ok(())
}

#[test]
fn test_reconcile_uses_lanczos_kernel() -> anyhow::Result<()> {
    let checker = GrayImage::from_fn(8, 8, |x, y| {
        Luma([if (x / 2 + y / 2) % 2 == 0 { 0u8 } else { 255u8 }])
    });

    let out = reconcile(checker.clone(), 21, 19)?;
    let lanczos = imageops::resize(&checker, 21, 19, FilterType::Lanczos3);
    let nearest = imageops::resize(&checker, 21, 19, FilterType::Nearest);

    assert_eq!(out, lanczos);
    assert_ne!(out, nearest);
    assert!(
        out.pixels().any(|p| p[0] != 0 && p[0] != 255),
        "edges should be interpolated"
    );
    Ok(())
}

#[test]
fn test_reconcile_rejects_zero_target() {
    let map = gradient_map(8, 8);
    let err = reconcile(map, 0, 10).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::InvalidDimensions {
            width: 0,
            height: 10
        }
    ));
}

#[test]
fn test_binarize_produces_two_levels() -> anyhow::Result<()> {
    let map = gradient_map(256, 4);
    for threshold in [0, 1, 64, 127, 200, 254, 255] {
        let mask = binarize(&map, threshold)?;
        assert!(is_binary(&mask), "threshold {threshold} left intermediate values");
    }
    Ok(())
}

#[test]
fn test_binarize_threshold_boundary() -> anyhow::Result<()> {
    let map = gradient_map(256, 1);
    let mask = binarize(&map, 127)?;

    assert_eq!(mask.get_pixel(127, 0)[0], 0, "equal to threshold is line");
    assert_eq!(mask.get_pixel(128, 0)[0], 255, "threshold + 1 is background");
    assert_eq!(count_line_pixels(&mask), 128);
    Ok(())
}

#[test]
fn test_binarize_extreme_thresholds() -> anyhow::Result<()> {
    let map = gradient_map(256, 1);
    assert_eq!(count_line_pixels(&binarize(&map, 255)?), 256);
    assert_eq!(count_line_pixels(&binarize(&map, 0)?), 1);
    Ok(())
}

#[test]
fn test_binarize_rejects_out_of_range_threshold() {
    let map = gradient_map(8, 8);
    assert!(matches!(
        binarize(&map, 300),
        Err(ExtractError::InvalidThreshold(300))
    ));
    assert!(matches!(
        binarize(&map, -1),
        Err(ExtractError::InvalidThreshold(-1))
    ));
}

/// 3x3 min filter then 3x3 max filter, neighbours clipped to the image
fn reference_open(mask: &GrayImage) -> GrayImage {
    let filter = |src: &GrayImage, pick_max: bool| {
        let (w, h) = src.dimensions();
        GrayImage::from_fn(w, h, |x, y| {
            let mut acc = if pick_max { 0u8 } else { 255u8 };
            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    let v = src.get_pixel(nx, ny)[0];
                    acc = if pick_max { acc.max(v) } else { acc.min(v) };
                }
            }
            Luma([acc])
        })
    };
    filter(&filter(mask, false), true)
}

fn horizontal_stroke(width: u32, rows: std::ops::Range<u32>) -> Vec<(u32, u32)> {
    (0..width)
        .flat_map(|x| rows.clone().map(move |y| (x, y)))
        .collect()
}

#[test]
fn test_suppress_fills_bright_specks_inside_lines() {
    let mut mask = GrayImage::from_pixel(20, 20, Luma([0u8]));
    mask.put_pixel(10, 10, Luma([255u8]));
    for (x, y) in [(3, 15), (4, 15), (3, 16), (4, 16)] {
        mask.put_pixel(x, y, Luma([255u8]));
    }

    let cleaned = suppress_noise(&mask);
    assert_eq!(count_line_pixels(&cleaned), 400);
}

#[test]
fn test_suppress_keeps_thin_strokes() {
    let mut lines = horizontal_stroke(60, 5..6);
    lines.extend(horizontal_stroke(60, 12..14));
    let mask = mask_with_lines(60, 20, &lines);
    assert_eq!(count_line_pixels(&mask), 180);

    let cleaned = suppress_noise(&mask);
    assert_eq!(cleaned, mask);
    assert_eq!(count_line_pixels(&cleaned), 180);
}

#[test]
fn test_suppress_matches_min_max_opening() {
    for seed in [2, 11, 99] {
        let mask = noisy_mask(40, 25, seed);
        assert_eq!(suppress_noise(&mask), reference_open(&mask), "seed {seed}");
    }
}

#[test]
fn test_suppress_keeps_thick_stroke() {
    let mask = mask_with_lines(20, 20, &horizontal_stroke(20, 8..13));
    let cleaned = suppress_noise(&mask);
    assert_eq!(cleaned, mask);
}

#[test]
fn test_suppress_is_idempotent() {
    for seed in [1, 7, 42] {
        let mask = noisy_mask(48, 32, seed);
        let once = suppress_noise(&mask);
        let twice = suppress_noise(&once);
        assert_eq!(once, twice, "seed {seed}");
        assert!(is_binary(&once));
    }
}

#[test]
fn test_suppress_disabled_is_identity() {
    let mask = noisy_mask(16, 16, 3);
    assert_eq!(suppress_noise_if(mask.clone(), false), mask);
}
