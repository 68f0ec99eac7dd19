// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Orthonormal 2D DCT over a whole band.
//!
//! Unlike a JPEG codec's fixed 8×8 blocks, the approximation band is
//! transformed in one piece, so the basis is built for the band's own height
//! and width. Forward is DCT-II, inverse is DCT-III, both with orthonormal
//! scaling (`sqrt(1/N)` for `k = 0`, `sqrt(2/N)` otherwise), which makes the
//! inverse the exact transpose and keeps coefficient noise at pixel scale.

use std::f64::consts::PI;

/// Precomputed `N x N` orthonormal DCT-II basis.
///
/// `basis[k * n + x] = s(k) * cos((2x + 1) * k * PI / (2N))`.
#[derive(Debug, Clone)]
pub struct DctBasis {
    n: usize,
    basis: Vec<f64>,
}

impl DctBasis {
    pub fn new(n: usize) -> Self {
        let mut basis = vec![0.0; n * n];
        if n == 0 {
            return Self { n, basis };
        }
        let s0 = (1.0 / n as f64).sqrt();
        let s = (2.0 / n as f64).sqrt();
        for k in 0..n {
            let scale = if k == 0 { s0 } else { s };
            for x in 0..n {
                basis[k * n + x] =
                    scale * ((2 * x + 1) as f64 * k as f64 * PI / (2 * n) as f64).cos();
            }
        }
        Self { n, basis }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// `out[k] = sum_x basis[k][x] * input[x]` over a strided input.
    fn forward_line(&self, input: &[f64], stride: usize, out: &mut [f64]) {
        let n = self.n;
        for k in 0..n {
            let row = &self.basis[k * n..(k + 1) * n];
            let mut sum = 0.0;
            for x in 0..n {
                sum += row[x] * input[x * stride];
            }
            out[k] = sum;
        }
    }

    /// `out[x] = sum_k basis[k][x] * input[k]` over a strided input.
    fn inverse_line(&self, input: &[f64], stride: usize, out: &mut [f64]) {
        let n = self.n;
        out[..n].iter_mut().for_each(|v| *v = 0.0);
        for k in 0..n {
            let c = input[k * stride];
            if c == 0.0 {
                continue;
            }
            let row = &self.basis[k * n..(k + 1) * n];
            for x in 0..n {
                out[x] += row[x] * c;
            }
        }
    }
}

/// Forward 2D DCT-II of a `height x width` plane (rows, then columns).
pub fn dct2d(plane: &[f64], height: usize, width: usize) -> Vec<f64> {
    debug_assert_eq!(plane.len(), height * width);
    let row_basis = DctBasis::new(width);
    let col_basis = DctBasis::new(height);

    let mut temp = vec![0.0; height * width];
    for r in 0..height {
        row_basis.forward_line(&plane[r * width..], 1, &mut temp[r * width..(r + 1) * width]);
    }

    let mut out = vec![0.0; height * width];
    let mut column = vec![0.0; height];
    for c in 0..width {
        col_basis.forward_line(&temp[c..], width, &mut column);
        for r in 0..height {
            out[r * width + c] = column[r];
        }
    }
    out
}

/// Inverse 2D DCT (DCT-III) of a `height x width` coefficient plane.
pub fn idct2d(coeffs: &[f64], height: usize, width: usize) -> Vec<f64> {
    debug_assert_eq!(coeffs.len(), height * width);
    let row_basis = DctBasis::new(width);
    let col_basis = DctBasis::new(height);

    let mut temp = vec![0.0; height * width];
    let mut column = vec![0.0; height];
    for c in 0..width {
        col_basis.inverse_line(&coeffs[c..], width, &mut column);
        for r in 0..height {
            temp[r * width + c] = column[r];
        }
    }

    let mut out = vec![0.0; height * width];
    for r in 0..height {
        row_basis.inverse_line(&temp[r * width..], 1, &mut out[r * width..(r + 1) * width]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_of_constant_plane() {
        let plane = vec![3.0; 4 * 6];
        let coeffs = dct2d(&plane, 4, 6);
        // Orthonormal DC = mean * sqrt(N).
        assert!((coeffs[0] - 3.0 * (24.0f64).sqrt()).abs() < 1e-9);
        assert!(coeffs[1..].iter().all(|c| c.abs() < 1e-9));
    }

    #[test]
    fn roundtrip_non_square() {
        let plane: Vec<f64> = (0..5 * 7).map(|i| ((i * 29) % 83) as f64 - 20.0).collect();
        let back = idct2d(&dct2d(&plane, 5, 7), 5, 7);
        for (a, b) in plane.iter().zip(&back) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn energy_preserved() {
        let plane: Vec<f64> = (0..64).map(|i| ((i * 17) % 31) as f64).collect();
        let coeffs = dct2d(&plane, 8, 8);
        let e_in: f64 = plane.iter().map(|v| v * v).sum();
        let e_out: f64 = coeffs.iter().map(|v| v * v).sum();
        assert!((e_in - e_out).abs() < 1e-6 * e_in);
    }

    #[test]
    fn single_coefficient_change_is_spread() {
        let mut coeffs = vec![0.0; 16];
        coeffs[5] = 2.0;
        let plane = idct2d(&coeffs, 4, 4);
        let e: f64 = plane.iter().map(|v| v * v).sum();
        assert!((e - 4.0).abs() < 1e-9);
        assert!(plane.iter().all(|v| v.abs() < 2.0));
    }
}
