// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! 8-bit pixel images and their conversion to/from floating-point planes.
//!
//! Rounding to the integer pixel type happens only in
//! [`PixelImage::from_coeffs`], i.e. once, at the very end of
//! reconstruction.

use super::array::CoeffArray;
use super::error::{Result, TransformError};

/// An 8-bit image, `height x width x channels`, channel-interleaved.
///
/// `channels` is 1 (grayscale) or 3 (RGB).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl PixelImage {
    /// Wrap a raw interleaved buffer.
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        if channels != 1 && channels != 3 {
            return Err(TransformError::UnsupportedChannels(channels));
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(TransformError::BufferLength { expected, actual: data.len() });
        }
        Ok(Self { width, height, channels, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn is_color(&self) -> bool {
        self.channels == 3
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.data
    }

    /// Widen to `f64` with the same `[H, W, C]` layout.
    pub fn to_coeffs(&self) -> CoeffArray {
        let data = self.data.iter().map(|&p| p as f64).collect();
        CoeffArray::from_vec(self.height, self.width, self.channels, data)
            .expect("pixel buffer length is checked in PixelImage::new")
    }

    /// Round and clamp a reconstructed array back to 8-bit pixels.
    pub fn from_coeffs(arr: &CoeffArray) -> Result<Self> {
        let data = arr
            .as_slice()
            .iter()
            .map(|&v| v.round().clamp(0.0, 255.0) as u8)
            .collect();
        Self::new(arr.width(), arr.height(), arr.channels(), data)
    }
}

/// Size of the working region transformed at `levels` decomposition levels:
/// the largest top-left `(height, width)` with both sides multiples of `2^levels`.
pub fn working_region(height: usize, width: usize, levels: u8) -> (usize, usize) {
    let block = 1usize << levels;
    (height / block * block, width / block * block)
}

/// Peak signal-to-noise ratio in dB between two equal-shaped images.
///
/// Returns `f64::INFINITY` for identical images, and
/// [`TransformError::ShapeMismatch`] if the shapes differ.
pub fn psnr(a: &PixelImage, b: &PixelImage) -> Result<f64> {
    if (a.width, a.height, a.channels) != (b.width, b.height, b.channels) {
        return Err(TransformError::ShapeMismatch);
    }
    if a.data.is_empty() {
        return Ok(f64::INFINITY);
    }
    let sse: f64 = a
        .data
        .iter()
        .zip(&b.data)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    if sse == 0.0 {
        return Ok(f64::INFINITY);
    }
    let mse = sse / a.data.len() as f64;
    Ok(10.0 * (255.0 * 255.0 / mse).log10())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_channels_and_length() {
        assert!(matches!(
            PixelImage::new(2, 2, 4, vec![0; 16]),
            Err(TransformError::UnsupportedChannels(4))
        ));
        assert!(matches!(
            PixelImage::new(2, 2, 1, vec![0; 3]),
            Err(TransformError::BufferLength { .. })
        ));
    }

    #[test]
    fn from_coeffs_rounds_and_clamps() {
        let arr = CoeffArray::from_vec(1, 4, 1, vec![-3.0, 12.49, 12.5, 300.0]).unwrap();
        let img = PixelImage::from_coeffs(&arr).unwrap();
        assert_eq!(img.pixels(), &[0, 12, 13, 255]);
    }

    #[test]
    fn working_region_rounds_down() {
        assert_eq!(working_region(512, 512, 2), (512, 512));
        assert_eq!(working_region(515, 303, 2), (512, 300));
        assert_eq!(working_region(3, 7, 2), (0, 4));
    }

    #[test]
    fn psnr_identical_is_infinite() {
        let img = PixelImage::new(4, 4, 1, vec![100; 16]).unwrap();
        assert!(psnr(&img, &img).unwrap().is_infinite());
    }

    #[test]
    fn psnr_rejects_shape_mismatch() {
        let a = PixelImage::new(4, 4, 1, vec![100; 16]).unwrap();
        let b = PixelImage::new(4, 4, 3, vec![100; 48]).unwrap();
        let c = PixelImage::new(8, 2, 1, vec![100; 16]).unwrap();
        assert_eq!(psnr(&a, &b), Err(TransformError::ShapeMismatch));
        assert_eq!(psnr(&a, &c), Err(TransformError::ShapeMismatch));
    }

    #[test]
    fn psnr_known_value() {
        let a = PixelImage::new(2, 2, 1, vec![0, 0, 0, 0]).unwrap();
        let b = PixelImage::new(2, 2, 1, vec![1, 1, 1, 1]).unwrap();
        // MSE = 1 -> 20*log10(255) ~= 48.13 dB
        let p = psnr(&a, &b).unwrap();
        assert!((p - 48.1308).abs() < 1e-3, "psnr = {p}");
    }
}
