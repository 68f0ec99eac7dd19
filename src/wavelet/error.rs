// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the wavelet/DCT transform layer.

use thiserror::Error;

/// Errors raised by forward/inverse transforms and coefficient storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Decomposition level outside `1..=MAX_LEVELS`.
    #[error("unsupported decomposition level count: {0}")]
    InvalidLevels(u8),
    /// The image has no working region at this level count (a side shorter than `2^levels`).
    #[error("image {width}x{height} too small for {levels} decomposition levels")]
    TooSmall { width: usize, height: usize, levels: u8 },
    /// Array dimensions are not divisible by `2^levels`.
    #[error("dimensions {width}x{height} not divisible by {divisor}")]
    NotDivisible { width: usize, height: usize, divisor: usize },
    /// Channel count other than 1 (grayscale) or 3 (RGB).
    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(usize),
    /// Pixel buffer length does not match `width * height * channels`.
    #[error("pixel buffer length {actual} does not match {expected}")]
    BufferLength { expected: usize, actual: usize },
    /// Bands handed to `inverse`, or images compared by `psnr`, disagree in shape.
    #[error("array or image shapes are inconsistent")]
    ShapeMismatch,
}

pub type Result<T> = std::result::Result<T, TransformError>;
