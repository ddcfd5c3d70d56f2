use image::{GrayImage, Luma};
use lineart_extract::{LineartExtractor, LineartParams, OutputFormat, StubLineDetector};
use std::path::Path;
use std::sync::Arc;

/// Draws a pencil-like sketch: a few dark strokes plus salt noise
fn draw_sketch(width: u32, height: u32) -> GrayImage {
    let mut img = GrayImage::from_pixel(width, height, Luma([245u8]));

    for y in 0..height {
        for x in 0..width {
            let on_circle = {
                let dx = x as f32 - width as f32 / 2.0;
                let dy = y as f32 - height as f32 / 2.0;
                ((dx * dx + dy * dy).sqrt() - height as f32 / 3.0).abs() < 2.0
            };
            let on_diagonal = (x as i64 - y as i64).abs() < 2;
            let speck = (x * 31 + y * 17) % 97 == 0;

            if on_circle || on_diagonal {
                img.put_pixel(x, y, Luma([20]));
            } else if speck {
                img.put_pixel(x, y, Luma([60]));
            }
        }
    }
    img
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let out_dir = Path::new("stub_pipeline_out");
    let (width, height) = (320u32, 240u32);

    // The stub emits a half-resolution map so the size reconciliation is exercised
    let sketch = draw_sketch(width, height);
    let half = image::imageops::resize(
        &sketch,
        width / 2,
        height / 2,
        image::imageops::FilterType::Triangle,
    );
    let extractor = LineartExtractor::new(Arc::new(StubLineDetector::fixed(half)));
    let source = image::DynamicImage::ImageLuma8(sketch);

    for format in [OutputFormat::Binary, OutputFormat::Rgb, OutputFormat::Rgba] {
        let params = LineartParams::new().with_format(format);
        let encoded = extractor.extract(source.clone(), &params)?;
        let path = out_dir.join(format!("lineart_{}.png", format));
        lineart_extract::lineart::writer::write_output(&encoded, &path)?;
        println!(
            "{}: {}x{} with {} channel(s) -> {}",
            format,
            encoded.width(),
            encoded.height(),
            encoded.channel_count(),
            path.display()
        );
    }

    Ok(())
}
