// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Single-level orthonormal 2D Haar transform on one channel plane.
//!
//! Each 2×2 pixel block `[a b; c d]` maps to four coefficients:
//!
//! ```text
//! LL = (a + b + c + d) / 2
//! HL = (a - b + c - d) / 2   (horizontal high-pass: vertical edges)
//! LH = (a + b - c - d) / 2   (vertical high-pass: horizontal edges)
//! HH = (a - b - c + d) / 2
//! ```
//!
//! The basis is orthonormal, so the transform preserves energy and the
//! synthesis step is its exact transpose. A coefficient change of `d` moves
//! each of its four pixels by `d / 2`.

/// The four quarter-size subbands produced by one analysis step.
#[derive(Debug, Clone, PartialEq)]
pub struct HaarLevel {
    pub ll: Vec<f64>,
    pub hl: Vec<f64>,
    pub lh: Vec<f64>,
    pub hh: Vec<f64>,
    /// Subband height (`plane height / 2`).
    pub height: usize,
    /// Subband width (`plane width / 2`).
    pub width: usize,
}

/// Decompose a `height x width` plane. Both sides must be even.
pub fn analyze(plane: &[f64], height: usize, width: usize) -> HaarLevel {
    debug_assert_eq!(plane.len(), height * width);
    debug_assert!(height % 2 == 0 && width % 2 == 0);

    let (h2, w2) = (height / 2, width / 2);
    let n = h2 * w2;
    let mut ll = vec![0.0; n];
    let mut hl = vec![0.0; n];
    let mut lh = vec![0.0; n];
    let mut hh = vec![0.0; n];

    for r in 0..h2 {
        let top = 2 * r * width;
        let bottom = top + width;
        for c in 0..w2 {
            let a = plane[top + 2 * c];
            let b = plane[top + 2 * c + 1];
            let cc = plane[bottom + 2 * c];
            let d = plane[bottom + 2 * c + 1];
            let i = r * w2 + c;
            ll[i] = (a + b + cc + d) * 0.5;
            hl[i] = (a - b + cc - d) * 0.5;
            lh[i] = (a + b - cc - d) * 0.5;
            hh[i] = (a - b - cc + d) * 0.5;
        }
    }

    HaarLevel { ll, hl, lh, hh, height: h2, width: w2 }
}

/// Reconstruct the `2*height x 2*width` plane from one level of subbands.
pub fn synthesize(level: &HaarLevel) -> Vec<f64> {
    let (h2, w2) = (level.height, level.width);
    let width = 2 * w2;
    let mut plane = vec![0.0; 4 * h2 * w2];

    for r in 0..h2 {
        let top = 2 * r * width;
        let bottom = top + width;
        for c in 0..w2 {
            let i = r * w2 + c;
            let (ll, hl, lh, hh) = (level.ll[i], level.hl[i], level.lh[i], level.hh[i]);
            plane[top + 2 * c] = (ll + hl + lh + hh) * 0.5;
            plane[top + 2 * c + 1] = (ll - hl + lh - hh) * 0.5;
            plane[bottom + 2 * c] = (ll + hl - lh - hh) * 0.5;
            plane[bottom + 2 * c + 1] = (ll - hl - lh + hh) * 0.5;
        }
    }

    plane
}
