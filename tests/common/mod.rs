// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Shared helpers for integration tests.

#![allow(dead_code)]

use phasm_dwt::PixelImage;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Install a fmt subscriber once; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Smooth gradients plus seeded texture in mid-range values, `[20, 235]`.
/// See [`document_cover`] for saturated content.
pub fn synthetic_cover(width: usize, height: usize, channels: usize, seed: u64) -> PixelImage {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(width * height * channels);
    for y in 0..height {
        for x in 0..width {
            for ch in 0..channels {
                let base = 127.5 + 60.0 * (x as f64 / 37.0 + ch as f64).sin() * (y as f64 / 53.0).cos();
                let noise: f64 = rng.gen_range(-20.0..20.0);
                data.push((base + noise).clamp(20.0, 235.0).round() as u8);
            }
        }
    }
    PixelImage::new(width, height, channels, data).unwrap()
}

/// A white page with black text-like strokes: large areas at exactly 255
/// and 0, sharp edges between them.
pub fn document_cover(width: usize, height: usize, channels: usize, seed: u64) -> PixelImage {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut data = vec![255u8; width * height * channels];
    for top in (8..height.saturating_sub(8)).step_by(12) {
        let mut x = 8;
        while x + 8 < width {
            let word = rng.gen_range(6..40).min(width - 8 - x);
            if rng.gen_bool(0.8) {
                for y in top..top + 4 {
                    let row = y * width * channels;
                    data[row + x * channels..row + (x + word) * channels].fill(0);
                }
            }
            x += word + rng.gen_range(3..10);
        }
    }
    PixelImage::new(width, height, channels, data).unwrap()
}

pub fn uniform_cover(width: usize, height: usize, channels: usize, value: u8) -> PixelImage {
    PixelImage::new(width, height, channels, vec![value; width * height * channels]).unwrap()
}

pub fn random_bits(n: usize, seed: u64) -> Vec<u8> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..2u8)).collect()
}

pub fn random_key(seed: u64) -> [u8; 32] {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut key = [0u8; 32];
    rng.fill(&mut key);
    key
}
