use image::ImageFormat;
use std::io;
use std::path::Path;

use crate::error::{ExtractError, Result};
use crate::models::{EncodedOutput, OutputFormat};

/// Pick a lossless encoding for `path`; the extension decides, PNG when there is none
pub fn output_encoding(path: &Path, format: OutputFormat) -> Result<ImageFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let encoding = match ext.as_deref() {
        None | Some("png") => Some(ImageFormat::Png),
        Some("tif") | Some("tiff") => Some(ImageFormat::Tiff),
        Some("bmp") if !format.has_alpha() => Some(ImageFormat::Bmp),
        _ => None,
    };

    encoding.ok_or_else(|| {
        ExtractError::write_io(
            path,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no lossless {} encoding for this file extension", format),
            ),
        )
    })
}

/// Persist `output` to `path`, creating missing parent directories first
pub fn write_output(output: &EncodedOutput, path: &Path) -> Result<()> {
    let encoding = output_encoding(path, output.format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExtractError::write_io(parent, e))?;
    }

    output
        .image
        .save_with_format(path, encoding)
        .map_err(|source| ExtractError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(
        path = %path.display(),
        format = %output.format,
        width = output.width(),
        height = output.height(),
        "lineart saved"
    );
    Ok(())
}
