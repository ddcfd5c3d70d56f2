use image::{DynamicImage, GrayImage, Rgb, RgbImage, Rgba, RgbaImage};

use crate::error::Result;
use crate::models::{EncodedOutput, OutputFormat};

/// Convert a binary mask into the requested channel layout
pub fn encode(mask: &GrayImage, format: OutputFormat) -> EncodedOutput {
    let image = match format {
        OutputFormat::Binary => DynamicImage::ImageLuma8(mask.clone()),
        OutputFormat::Rgb => DynamicImage::ImageRgb8(replicate_rgb(mask)),
        OutputFormat::Rgba => DynamicImage::ImageRgba8(with_inverse_alpha(mask)),
    };
    EncodedOutput { format, image }
}

/// Same as [`encode`], with the format given by name ("binary", "rgb", "rgba")
pub fn encode_named(mask: &GrayImage, format: &str) -> Result<EncodedOutput> {
    Ok(encode(mask, format.parse()?))
}

fn replicate_rgb(mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let v = mask.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

// Alpha is the inverse of the mask: line (0) is opaque, background (255) transparent
fn with_inverse_alpha(mask: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        let v = mask.get_pixel(x, y)[0];
        Rgba([v, v, v, 255 - v])
    })
}
