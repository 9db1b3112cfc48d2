//! Image export.

use anyhow::{bail, Context, Result};
use glint_renderer::Framebuffer;
use image::{ImageFormat, RgbImage};
use std::path::Path;

/// Pick the output format from the file extension.
pub fn format_for_path(path: &Path) -> Result<ImageFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => Ok(ImageFormat::Png),
        Some("ppm") => Ok(ImageFormat::Pnm),
        Some(other) => bail!("Unsupported output format '.{other}' (expected .png or .ppm)"),
        None => bail!("Output path {} has no extension (expected .png or .ppm)", path.display()),
    }
}

/// Quantize the framebuffer to 8-bit RGB and write it to `path`.
pub fn save_image(framebuffer: &Framebuffer, path: &Path) -> Result<()> {
    let format = format_for_path(path)?;
    let image = RgbImage::from_raw(framebuffer.width(), framebuffer.height(), framebuffer.to_rgb8())
        .context("Framebuffer size does not match its dimensions")?;

    image
        .save_with_format(path, format)
        .with_context(|| format!("Failed to write image to {}", path.display()))?;

    log::info!(
        "Image saved as {} ({}x{})",
        path.display(),
        framebuffer.width(),
        framebuffer.height()
    );
    Ok(())
}
