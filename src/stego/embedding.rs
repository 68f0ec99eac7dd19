// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Quantization embedding and extraction over transform bands.
//!
//! A payload bit is written into one coefficient by snapping it onto a
//! quantization lattice. Two lattices are available:
//!
//! - [`QuantizerScheme::Remainder`]: `floor(c / q) * q + bit`. The bit is the
//!   remainder itself. Any noise of magnitude `>= 0.5` flips it, so it only
//!   survives exact (in-memory) round trips.
//! - [`QuantizerScheme::Midpoint`]: `floor(c / q) * q + q/4 + bit * q/2`. The
//!   bit is which half of the cell the value sits in, and noise below `q/4`
//!   is tolerated.
//!
//! ## Step per band
//!
//! The lattice step of a band is `q` scaled by [`band_step`]. A level-`l`
//! Haar coefficient sums `4^l` pixels with weight `2^-l`, so rounding the
//! reconstruction to integer pixels moves it by at most `2^(l-1)`. Doubling
//! the step per level keeps the `q/4` midpoint margin above that bound on
//! every detail band once `q > 4`. The approximation DCT mixes a whole band
//! and uses `q * 2^(L+1)`.
//!
//! ## Traversal
//!
//! Bands are visited in the order returned by [`embedding_bands`]. Inside a
//! band, coefficients are visited in `[H, W, C]` row-major order with a
//! stride of `int(q)`: flat indices `0, s, 2s, ...` up to `len / s` positions.
//! Skipping coefficients spreads the changes so that a pixel is touched by
//! few of them, and ties capacity to the step. The order depends only on
//! `(levels, use_dct)`; colour data interleaves its channels inside each
//! band, so grayscale and colour share one path.

use serde::{Deserialize, Serialize};

use super::capacity::{capacity, coefficient_stride};
use super::params::CodecParams;
use crate::stego::error::StegoError;
use crate::wavelet::{BandId, BandKind, CoefficientBands};

/// Quantization lattice used to carry one bit per visited coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuantizerScheme {
    /// Bit stored as the remainder of `c mod q`. Requires `q >= 2`.
    Remainder,
    /// Bit stored as the lower or upper half of the quantization cell.
    #[default]
    Midpoint,
}

impl QuantizerScheme {
    pub fn embed(self, coef: f64, bit: u8, q: f64) -> f64 {
        match self {
            Self::Remainder => quantize_embed(coef, bit, q),
            Self::Midpoint => midpoint_embed(coef, bit, q),
        }
    }

    pub fn extract(self, coef: f64, q: f64) -> u8 {
        match self {
            Self::Remainder => quantize_extract(coef, q),
            Self::Midpoint => midpoint_extract(coef, q),
        }
    }
}

/// Remainder embedding: `floor(c / q) * q + bit`.
pub fn quantize_embed(coef: f64, bit: u8, q: f64) -> f64 {
    (coef / q).floor() * q + (bit & 1) as f64
}

/// Remainder extraction.
///
/// The Euclidean remainder is folded into `(-q/2, q/2]` so that values just
/// below a lattice point read as 0, then rounded: a remainder near 0 is bit 0,
/// anything that rounds away from 0 is bit 1.
pub fn quantize_extract(coef: f64, q: f64) -> u8 {
    let mut r = coef.rem_euclid(q);
    if r > q / 2.0 {
        r -= q;
    }
    (r.round() != 0.0) as u8
}

/// Midpoint embedding: the centre of the lower (bit 0) or upper (bit 1) half cell.
pub fn midpoint_embed(coef: f64, bit: u8, q: f64) -> f64 {
    (coef / q).floor() * q + q / 4.0 + (bit & 1) as f64 * (q / 2.0)
}

pub fn midpoint_extract(coef: f64, q: f64) -> u8 {
    (coef.rem_euclid(q) >= q / 2.0) as u8
}

/// Embedding surfaces for a decomposition, in traversal order:
/// `HH1, HL1, LH1, ..., HH{L}, HL{L}, LH{L}`, then `LL{L}_DCT` if `use_dct`.
///
/// The raw approximation band is never used.
pub fn embedding_bands(levels: u8, use_dct: bool) -> Vec<BandId> {
    let mut ids = Vec::with_capacity(levels as usize * 3 + 1);
    for level in 1..=levels {
        ids.push(BandId::new(BandKind::Hh, level));
        ids.push(BandId::new(BandKind::Hl, level));
        ids.push(BandId::new(BandKind::Lh, level));
    }
    if use_dct {
        ids.push(BandId::new(BandKind::LlDct, levels));
    }
    ids
}

/// Quantization step used on band `id` for a base step `q`.
///
/// `q * 2^(l-1)` for level-`l` detail bands, `q * 2^(L+1)` for the
/// approximation at level `L`.
pub fn band_step(q: f64, id: BandId) -> f64 {
    let shift = match id.kind {
        BandKind::Ll | BandKind::LlDct => u32::from(id.level) + 1,
        BandKind::Hh | BandKind::Hl | BandKind::Lh => u32::from(id.level.max(1)) - 1,
    };
    q * f64::from(1u32 << shift)
}

/// Check that `bands` were produced with the decomposition `params` describes
/// and return the surfaces to traverse.
fn surfaces(bands: &CoefficientBands, params: &CodecParams) -> Result<Vec<BandId>, StegoError> {
    params.validate()?;
    if bands.levels() != params.levels || bands.use_dct() != params.use_dct {
        return Err(StegoError::InvalidParameter("coefficient bands do not match codec parameters"));
    }
    let ids = embedding_bands(params.levels, params.use_dct);
    if ids.iter().any(|&id| bands.band(id).is_none()) {
        return Err(StegoError::InvalidParameter("coefficient bands do not match codec parameters"));
    }
    Ok(ids)
}

/// Embed `bits` into a copy of `bands`.
///
/// # Errors
/// [`StegoError::CapacityExceeded`] if the bits do not fit; nothing is
/// embedded in that case.
pub fn embed(bits: &[u8], bands: &CoefficientBands, params: &CodecParams) -> Result<CoefficientBands, StegoError> {
    let mut out = bands.clone();
    embed_in_place(bits, &mut out, params)?;
    Ok(out)
}

/// Embed `bits` into `bands` in place.
///
/// The capacity check runs before any coefficient is touched, so on error
/// `bands` is unchanged.
pub fn embed_in_place(bits: &[u8], bands: &mut CoefficientBands, params: &CodecParams) -> Result<(), StegoError> {
    let ids = surfaces(bands, params)?;
    let q = params.q_factor;
    let stride = coefficient_stride(q);
    let available = capacity(bands, &ids, q);
    if bits.len() > available {
        return Err(StegoError::CapacityExceeded { needed: bits.len(), available });
    }

    let mut next = bits.iter().copied();
    let mut written = 0usize;
    'bands: for id in ids {
        let Some(band) = bands.band_mut(id) else { continue };
        let step = band_step(q, id);
        let data = band.as_mut_slice();
        let slots = data.len() / stride;
        let before = written;
        for k in 0..slots {
            let Some(bit) = next.next() else {
                tracing::trace!(band = %id, step, bits = written - before, "band partially filled");
                break 'bands;
            };
            let idx = k * stride;
            data[idx] = params.scheme.embed(data[idx], bit, step);
            written += 1;
        }
        tracing::trace!(band = %id, step, bits = written - before, "band filled");
    }

    tracing::debug!(bits = written, capacity = available, q, "embedded payload bits");
    Ok(())
}

/// Recover `bit_count` bits by replaying the embedding traversal.
///
/// # Errors
/// [`StegoError::CapacityExceeded`] if more bits are requested than the
/// bands can hold.
pub fn extract(bands: &CoefficientBands, bit_count: usize, params: &CodecParams) -> Result<Vec<u8>, StegoError> {
    let ids = surfaces(bands, params)?;
    let q = params.q_factor;
    let stride = coefficient_stride(q);
    let available = capacity(bands, &ids, q);
    if bit_count > available {
        return Err(StegoError::CapacityExceeded { needed: bit_count, available });
    }

    let mut bits = Vec::with_capacity(bit_count);
    for id in ids {
        if bits.len() == bit_count {
            break;
        }
        let Some(band) = bands.band(id) else { continue };
        let step = band_step(q, id);
        let take = (bit_count - bits.len()).min(band.len() / stride);
        bits.extend(
            band.as_slice()
                .iter()
                .step_by(stride)
                .take(take)
                .map(|&c| params.scheme.extract(c, step)),
        );
    }

    tracing::debug!(bits = bits.len(), capacity = available, q, "extracted payload bits");
    Ok(bits)
}

/// Fraction of differing bits between two bit sequences.
///
/// Positions present in only one sequence count as errors. Two empty
/// sequences have a rate of 0.
pub fn bit_error_rate(expected: &[u8], actual: &[u8]) -> f64 {
    let total = expected.len().max(actual.len());
    if total == 0 {
        return 0.0;
    }
    let differing = expected.iter().zip(actual).filter(|(a, b)| (*a & 1) != (*b & 1)).count();
    let missing = total - expected.len().min(actual.len());
    (differing + missing) as f64 / total as f64
}
