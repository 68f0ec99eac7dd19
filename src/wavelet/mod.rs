// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Wavelet/DCT transform engine.
//!
//! Decomposes an image region into named coefficient bands with a multi-level
//! orthonormal Haar DWT applied independently per channel, optionally
//! followed by a whole-band DCT of the final approximation band. The inverse
//! reconstructs the region exactly (up to floating-point error); rounding to
//! 8-bit pixels is left to [`pixels::PixelImage::from_coeffs`].
//!
//! Band naming follows the usual convention: `HH1`, `HL1`, `LH1` are the
//! level-1 details, `LL2` the level-2 approximation, and `LL2_DCT` its DCT.
//!
//! Every band is a [`CoeffArray`] of shape `[H / 2^level, W / 2^level, C]`,
//! so the band layout depends only on the region shape and level count.
//! Embedding changes values, never shapes.

pub mod error;
pub mod array;
pub mod haar;
pub mod dct;
pub mod pixels;

use core::fmt;

use array::CoeffArray;
use error::{Result, TransformError};
use haar::HaarLevel;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Standard decomposition depth.
pub const DEFAULT_LEVELS: u8 = 2;

/// Deepest supported decomposition.
pub const MAX_LEVELS: u8 = 6;

/// Subband kind. Combined with a level in [`BandId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BandKind {
    /// Diagonal detail.
    Hh,
    /// Horizontal high-pass detail (vertical edges).
    Hl,
    /// Vertical high-pass detail (horizontal edges).
    Lh,
    /// Approximation at the deepest level.
    Ll,
    /// DCT of the deepest approximation.
    LlDct,
}

/// Identifies one band of a [`CoefficientBands`] set, e.g. `HH1` or `LL2_DCT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BandId {
    pub kind: BandKind,
    pub level: u8,
}

impl BandId {
    pub const fn new(kind: BandKind, level: u8) -> Self {
        Self { kind, level }
    }

    /// Parse a band name such as `"HL2"` or `"LL2_DCT"`.
    pub fn parse(name: &str) -> Option<Self> {
        let (body, dct) = match name.strip_suffix("_DCT") {
            Some(body) => (body, true),
            None => (name, false),
        };
        if body.len() < 3 || !body.is_char_boundary(2) {
            return None;
        }
        let level: u8 = body[2..].parse().ok()?;
        if level == 0 {
            return None;
        }
        let kind = match (&body[..2], dct) {
            ("HH", false) => BandKind::Hh,
            ("HL", false) => BandKind::Hl,
            ("LH", false) => BandKind::Lh,
            ("LL", false) => BandKind::Ll,
            ("LL", true) => BandKind::LlDct,
            _ => return None,
        };
        Some(Self { kind, level })
    }
}

impl fmt::Display for BandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BandKind::Hh => write!(f, "HH{}", self.level),
            BandKind::Hl => write!(f, "HL{}", self.level),
            BandKind::Lh => write!(f, "LH{}", self.level),
            BandKind::Ll => write!(f, "LL{}", self.level),
            BandKind::LlDct => write!(f, "LL{}_DCT", self.level),
        }
    }
}

/// Detail bands of one decomposition level.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailBands {
    pub hh: CoeffArray,
    pub hl: CoeffArray,
    pub lh: CoeffArray,
}

/// The full set of transform coefficients for one image region.
///
/// The approximation band is held either raw (`LL{L}`) or in the DCT domain
/// (`LL{L}_DCT`), never both: they are two views of the same data, and only
/// the one selected at [`forward`] time is addressable.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientBands {
    levels: u8,
    /// Shape of the decomposed region.
    height: usize,
    width: usize,
    channels: usize,
    /// `details[l - 1]` holds level `l`.
    details: Vec<DetailBands>,
    approx: CoeffArray,
    approx_is_dct: bool,
}

impl CoefficientBands {
    pub fn levels(&self) -> u8 {
        self.levels
    }

    pub fn use_dct(&self) -> bool {
        self.approx_is_dct
    }

    /// `(height, width, channels)` of the region these bands reconstruct.
    pub fn region_shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Look up a band. Returns `None` for levels or kinds not present.
    pub fn band(&self, id: BandId) -> Option<&CoeffArray> {
        match id.kind {
            BandKind::Ll if id.level == self.levels && !self.approx_is_dct => Some(&self.approx),
            BandKind::LlDct if id.level == self.levels && self.approx_is_dct => Some(&self.approx),
            BandKind::Ll | BandKind::LlDct => None,
            BandKind::Hh | BandKind::Hl | BandKind::Lh => {
                let level = self.details.get((id.level as usize).checked_sub(1)?)?;
                Some(match id.kind {
                    BandKind::Hh => &level.hh,
                    BandKind::Hl => &level.hl,
                    _ => &level.lh,
                })
            }
        }
    }

    /// Mutable band lookup. Shapes cannot be changed through this reference
    /// because [`CoeffArray`] exposes values only.
    pub fn band_mut(&mut self, id: BandId) -> Option<&mut CoeffArray> {
        match id.kind {
            BandKind::Ll if id.level == self.levels && !self.approx_is_dct => Some(&mut self.approx),
            BandKind::LlDct if id.level == self.levels && self.approx_is_dct => {
                Some(&mut self.approx)
            }
            BandKind::Ll | BandKind::LlDct => None,
            BandKind::Hh | BandKind::Hl | BandKind::Lh => {
                let level = self.details.get_mut((id.level as usize).checked_sub(1)?)?;
                Some(match id.kind {
                    BandKind::Hh => &mut level.hh,
                    BandKind::Hl => &mut level.hl,
                    _ => &mut level.lh,
                })
            }
        }
    }

    /// All present bands: `HH1, HL1, LH1, ..., HH{L}, HL{L}, LH{L}`, then the
    /// approximation (`LL{L}` or `LL{L}_DCT`).
    pub fn band_ids(&self) -> Vec<BandId> {
        let mut ids = Vec::with_capacity(self.details.len() * 3 + 1);
        for level in 1..=self.levels {
            ids.push(BandId::new(BandKind::Hh, level));
            ids.push(BandId::new(BandKind::Hl, level));
            ids.push(BandId::new(BandKind::Lh, level));
        }
        let approx_kind = if self.approx_is_dct { BandKind::LlDct } else { BandKind::Ll };
        ids.push(BandId::new(approx_kind, self.levels));
        ids
    }

    /// Total coefficient count over all bands (equals the region's sample count).
    pub fn total_len(&self) -> usize {
        self.details
            .iter()
            .map(|d| d.hh.len() + d.hl.len() + d.lh.len())
            .sum::<usize>()
            + self.approx.len()
    }
}

/// Detail planes of one level for a single channel.
struct ChannelLevel {
    hh: Vec<f64>,
    hl: Vec<f64>,
    lh: Vec<f64>,
}

/// One channel's decomposition, before channels are interleaved into bands.
struct ChannelBands {
    levels: Vec<ChannelLevel>,
    approx: Vec<f64>,
}

fn validate_levels(levels: u8) -> Result<()> {
    if levels == 0 || levels > MAX_LEVELS {
        return Err(TransformError::InvalidLevels(levels));
    }
    Ok(())
}

fn decompose_channel(mut plane: Vec<f64>, height: usize, width: usize, levels: u8, use_dct: bool) -> ChannelBands {
    let (mut h, mut w) = (height, width);
    let mut details = Vec::with_capacity(levels as usize);
    for _ in 0..levels {
        let HaarLevel { ll, hl, lh, hh, height: h2, width: w2 } = haar::analyze(&plane, h, w);
        details.push(ChannelLevel { hh, hl, lh });
        plane = ll;
        h = h2;
        w = w2;
    }
    let approx = if use_dct { dct::dct2d(&plane, h, w) } else { plane };
    ChannelBands { levels: details, approx }
}

/// Forward transform of a region whose sides are multiples of `2^levels`.
///
/// Pixels are used as-is (no level shift). Use
/// [`pixels::working_region`] to pick the region of an arbitrary image.
pub fn forward(region: &CoeffArray, levels: u8, use_dct: bool) -> Result<CoefficientBands> {
    validate_levels(levels)?;
    let (height, width, channels) = region.shape();
    if channels == 0 {
        return Err(TransformError::UnsupportedChannels(0));
    }
    let divisor = 1usize << levels;
    if height == 0 || width == 0 {
        return Err(TransformError::TooSmall { width, height, levels });
    }
    if height % divisor != 0 || width % divisor != 0 {
        return Err(TransformError::NotDivisible { width, height, divisor });
    }

    let run = |ch: usize| decompose_channel(region.channel_plane(ch), height, width, levels, use_dct);

    #[cfg(feature = "parallel")]
    let per_channel: Vec<ChannelBands> = (0..channels).into_par_iter().map(run).collect();

    #[cfg(not(feature = "parallel"))]
    let per_channel: Vec<ChannelBands> = (0..channels).map(run).collect();

    let n_levels = levels as usize;
    let mut hh: Vec<Vec<Vec<f64>>> = vec![Vec::with_capacity(channels); n_levels];
    let mut hl: Vec<Vec<Vec<f64>>> = vec![Vec::with_capacity(channels); n_levels];
    let mut lh: Vec<Vec<Vec<f64>>> = vec![Vec::with_capacity(channels); n_levels];
    let mut approx_planes = Vec::with_capacity(channels);
    for cb in per_channel {
        for (lvl, level) in cb.levels.into_iter().enumerate() {
            hh[lvl].push(level.hh);
            hl[lvl].push(level.hl);
            lh[lvl].push(level.lh);
        }
        approx_planes.push(cb.approx);
    }

    let mut details = Vec::with_capacity(n_levels);
    for lvl in 0..n_levels {
        let (bh, bw) = (height >> (lvl + 1), width >> (lvl + 1));
        details.push(DetailBands {
            hh: CoeffArray::from_planes(bh, bw, &hh[lvl])?,
            hl: CoeffArray::from_planes(bh, bw, &hl[lvl])?,
            lh: CoeffArray::from_planes(bh, bw, &lh[lvl])?,
        });
    }

    let approx = CoeffArray::from_planes(height >> levels, width >> levels, &approx_planes)?;

    Ok(CoefficientBands {
        levels,
        height,
        width,
        channels,
        details,
        approx,
        approx_is_dct: use_dct,
    })
}

fn reconstruct_channel(bands: &CoefficientBands, ch: usize) -> Vec<f64> {
    let levels = bands.levels as usize;
    let (ah, aw) = (bands.height >> levels, bands.width >> levels);
    let mut ll = bands.approx.channel_plane(ch);
    if bands.approx_is_dct {
        ll = dct::idct2d(&ll, ah, aw);
    }
    for lvl in (0..levels).rev() {
        let d = &bands.details[lvl];
        let level = HaarLevel {
            ll,
            hl: d.hl.channel_plane(ch),
            lh: d.lh.channel_plane(ch),
            hh: d.hh.channel_plane(ch),
            height: bands.height >> (lvl + 1),
            width: bands.width >> (lvl + 1),
        };
        ll = haar::synthesize(&level);
    }
    ll
}

/// Inverse transform: IDCT of the approximation (if held in DCT form), then
/// Haar synthesis from the deepest level up. No rounding is applied.
pub fn inverse(bands: &CoefficientBands) -> Result<CoeffArray> {
    let (height, width, channels) = (bands.height, bands.width, bands.channels);
    let levels = bands.levels as usize;
    if bands.details.len() != levels || bands.approx.shape() != (height >> levels, width >> levels, channels) {
        return Err(TransformError::ShapeMismatch);
    }
    for (lvl, d) in bands.details.iter().enumerate() {
        let expected = (height >> (lvl + 1), width >> (lvl + 1), channels);
        if d.hh.shape() != expected || d.hl.shape() != expected || d.lh.shape() != expected {
            return Err(TransformError::ShapeMismatch);
        }
    }

    let run = |ch: usize| reconstruct_channel(bands, ch);

    #[cfg(feature = "parallel")]
    let planes: Vec<Vec<f64>> = (0..channels).into_par_iter().map(run).collect();

    #[cfg(not(feature = "parallel"))]
    let planes: Vec<Vec<f64>> = (0..channels).map(run).collect();

    CoeffArray::from_planes(height, width, &planes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_region(h: usize, w: usize, c: usize) -> CoeffArray {
        let data = (0..h * w * c)
            .map(|i| ((i * 7919 + i / 3) % 256) as f64)
            .collect();
        CoeffArray::from_vec(h, w, c, data).unwrap()
    }

    #[test]
    fn band_names_roundtrip() {
        for name in ["HH1", "HL1", "LH1", "HH2", "LL2", "LL2_DCT", "HL12"] {
            let id = BandId::parse(name).unwrap();
            assert_eq!(id.to_string(), name);
        }
        for bad in ["", "HH", "HH0", "XX1", "HH1_DCT", "LLx", "LL2_dct"] {
            assert!(BandId::parse(bad).is_none(), "{bad} should not parse");
        }
    }

    #[test]
    fn band_shapes_follow_levels() {
        let bands = forward(&test_region(32, 16, 3), 2, true).unwrap();
        let hh1 = bands.band(BandId::parse("HH1").unwrap()).unwrap();
        assert_eq!(hh1.shape(), (16, 8, 3));
        let lh2 = bands.band(BandId::parse("LH2").unwrap()).unwrap();
        assert_eq!(lh2.shape(), (8, 4, 3));
        let dct = bands.band(BandId::parse("LL2_DCT").unwrap()).unwrap();
        assert_eq!(dct.shape(), (8, 4, 3));
        assert!(bands.band(BandId::parse("LL2").unwrap()).is_none());
        assert!(bands.band(BandId::parse("HH3").unwrap()).is_none());
        assert_eq!(bands.total_len(), 32 * 16 * 3);
    }

    #[test]
    fn band_ids_order() {
        let bands = forward(&test_region(8, 8, 1), 2, false).unwrap();
        let names: Vec<String> = bands.band_ids().iter().map(|b| b.to_string()).collect();
        assert_eq!(names, ["HH1", "HL1", "LH1", "HH2", "HL2", "LH2", "LL2"]);
    }

    #[test]
    fn roundtrip_identity_all_configurations() {
        for &(levels, use_dct, c) in &[(1, false, 1), (2, true, 1), (2, false, 3), (3, true, 3)] {
            let region = test_region(16, 24, c);
            let bands = forward(&region, levels, use_dct).unwrap();
            let back = inverse(&bands).unwrap();
            assert_eq!(back.shape(), region.shape());
            for (a, b) in region.as_slice().iter().zip(back.as_slice()) {
                assert!((a - b).abs() < 1e-9, "levels={levels} dct={use_dct} c={c}");
            }
        }
    }

    #[test]
    fn approximation_carries_mean() {
        let region = CoeffArray::from_vec(4, 4, 1, vec![50.0; 16]).unwrap();
        let bands = forward(&region, 2, false).unwrap();
        // Two orthonormal levels scale a constant by 2 * 2.
        let ll = bands.band(BandId::new(BandKind::Ll, 2)).unwrap();
        assert!((ll.get(0, 0, 0) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_shapes_and_levels() {
        let region = test_region(12, 10, 1);
        assert!(matches!(forward(&region, 2, false), Err(TransformError::NotDivisible { .. })));
        assert!(matches!(forward(&region, 0, false), Err(TransformError::InvalidLevels(0))));
        assert!(matches!(forward(&region, 7, false), Err(TransformError::InvalidLevels(7))));
        let empty = CoeffArray::zeros(0, 8, 1);
        assert!(matches!(forward(&empty, 1, false), Err(TransformError::TooSmall { .. })));
    }

    #[test]
    fn channels_are_independent() {
        let mut region = test_region(8, 8, 3);
        let before = forward(&region, 1, false).unwrap();
        // Perturb channel 2 only.
        region.set(3, 3, 2, 999.0);
        let after = forward(&region, 1, false).unwrap();
        for id in before.band_ids() {
            let (a, b) = (before.band(id).unwrap(), after.band(id).unwrap());
            assert_eq!(a.channel_plane(0), b.channel_plane(0));
            assert_eq!(a.channel_plane(1), b.channel_plane(1));
        }
    }
}
