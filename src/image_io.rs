// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Image file I/O.
//!
//! Stego images must be stored losslessly: any lossy re-encoding moves
//! coefficients off their quantization lattice and breaks extraction. Saving
//! is therefore PNG-only. Lossy inputs can still be loaded (a cover may be a
//! JPEG), but a warning is logged because extraction from one will fail.
//!
//! Alpha channels are dropped on load. Grayscale images load with one
//! channel, everything else as RGB.

use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};

use crate::stego::error::StegoError;
use crate::wavelet::pixels::PixelImage;

const LOSSY_EXTENSIONS: &[&str] = &["jpg", "jpeg", "jfif", "webp", "avif", "heic", "heif"];

/// Whether `path` names a lossy image format by extension.
pub fn is_lossy_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| LOSSY_EXTENSIONS.iter().any(|l| e.eq_ignore_ascii_case(l)))
}

fn is_lossy_format(format: ImageFormat) -> bool {
    matches!(format, ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Avif)
}

/// Load an image file.
pub fn load(path: impl AsRef<Path>) -> Result<PixelImage, StegoError> {
    let path = path.as_ref();
    if is_lossy_path(path) {
        tracing::warn!(path = %path.display(), "loading a lossy image; embedded data will not survive");
    }
    from_dynamic(image::open(path)?)
}

/// Decode an in-memory image, format detected from its contents.
pub fn load_from_memory(bytes: &[u8]) -> Result<PixelImage, StegoError> {
    let format = image::guess_format(bytes)?;
    if is_lossy_format(format) {
        tracing::warn!(?format, "loading a lossy image; embedded data will not survive");
    }
    from_dynamic(image::load_from_memory_with_format(bytes, format)?)
}

fn from_dynamic(img: DynamicImage) -> Result<PixelImage, StegoError> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let pixels = if img.color().has_color() {
        PixelImage::new(width, height, 3, img.into_rgb8().into_raw())
    } else {
        PixelImage::new(width, height, 1, img.into_luma8().into_raw())
    };
    Ok(pixels?)
}

/// Encode as PNG.
pub fn encode_png(img: &PixelImage) -> Result<Vec<u8>, StegoError> {
    let width = u32::try_from(img.width()).map_err(|_| StegoError::InvalidParameter("image too wide for PNG"))?;
    let height = u32::try_from(img.height()).map_err(|_| StegoError::InvalidParameter("image too tall for PNG"))?;
    let color = if img.is_color() { ExtendedColorType::Rgb8 } else { ExtendedColorType::L8 };
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(img.pixels(), width, height, color)?;
    Ok(buf)
}

/// Save as PNG. Fails with [`StegoError::LossyFormat`] for lossy extensions.
pub fn save_png(path: impl AsRef<Path>, img: &PixelImage) -> Result<(), StegoError> {
    let path = path.as_ref();
    if is_lossy_path(path) {
        return Err(StegoError::LossyFormat(path.display().to_string()));
    }
    std::fs::write(path, encode_png(img)?)?;
    tracing::debug!(path = %path.display(), "stego image saved");
    Ok(())
}
