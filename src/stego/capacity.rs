// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Embedding capacity.
//!
//! A band of `n` coefficients holds `n / int(q)` bits. Capacity depends only
//! on band shapes, so it can be computed either from transformed bands or
//! directly from image dimensions.

use super::embedding::embedding_bands;
use super::params::CodecParams;
use crate::wavelet::pixels::working_region;
use crate::wavelet::{BandId, BandKind, CoefficientBands};

/// Coefficient stride for a quantization step: `int(q)`, at least 1.
pub fn coefficient_stride(q_factor: f64) -> usize {
    (q_factor as usize).max(1)
}

/// Total embeddable bits over `subset`: the sum of `band.len() / int(q)`.
///
/// Bands absent from `bands` contribute nothing.
pub fn capacity(bands: &CoefficientBands, subset: &[BandId], q_factor: f64) -> usize {
    let stride = coefficient_stride(q_factor);
    subset
        .iter()
        .filter_map(|&id| bands.band(id))
        .map(|band| band.len() / stride)
        .sum()
}

/// Capacity in bits over the standard surfaces for `params`.
pub fn embedding_capacity(bands: &CoefficientBands, params: &CodecParams) -> usize {
    capacity(bands, &embedding_bands(params.levels, params.use_dct), params.q_factor)
}

/// Largest payload blob, in bytes, that fits in `bands`.
///
/// This bounds the framed, compressed ciphertext; how long a message fits
/// depends on how well its ciphertext compresses.
pub fn max_payload_bytes(bands: &CoefficientBands, params: &CodecParams) -> usize {
    embedding_capacity(bands, params) / 8
}

/// Capacity in bits of a `width x height` image with `channels` channels,
/// computed from shapes alone.
///
/// Matches [`embedding_capacity`] on the bands of that image's working region.
pub fn image_capacity(width: usize, height: usize, channels: usize, params: &CodecParams) -> usize {
    let (h, w) = working_region(height, width, params.levels);
    let stride = coefficient_stride(params.q_factor);
    embedding_bands(params.levels, params.use_dct)
        .iter()
        .map(|id| {
            let level = match id.kind {
                BandKind::Ll | BandKind::LlDct => params.levels,
                _ => id.level,
            };
            ((h >> level) * (w >> level) * channels) / stride
        })
        .sum()
}
