// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Codec configuration shared by the embed and extract sides.
//!
//! Every field must be identical on both sides; the parameters are stored in
//! the sidecar metadata for that reason.

use serde::{Deserialize, Serialize};

use super::crypto::CipherSuite;
use super::embedding::QuantizerScheme;
use crate::stego::error::StegoError;
use crate::wavelet::{DEFAULT_LEVELS, MAX_LEVELS};

/// Default quantization step.
pub const DEFAULT_Q_FACTOR: f64 = 5.0;

/// Transform and quantization settings for one embedding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecParams {
    /// Haar decomposition depth.
    pub levels: u8,
    /// Quantization step `q`; `int(q)` is also the coefficient stride.
    pub q_factor: f64,
    /// Add the DCT of the deepest approximation band as an embedding surface.
    pub use_dct: bool,
    /// The cover is RGB (3 channels) rather than grayscale.
    pub color: bool,
    pub scheme: QuantizerScheme,
    pub cipher: CipherSuite,
}

impl Default for CodecParams {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS,
            q_factor: DEFAULT_Q_FACTOR,
            use_dct: true,
            color: false,
            scheme: QuantizerScheme::default(),
            cipher: CipherSuite::default(),
        }
    }
}

impl CodecParams {
    pub fn with_levels(mut self, levels: u8) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_q_factor(mut self, q_factor: f64) -> Self {
        self.q_factor = q_factor;
        self
    }

    pub fn with_use_dct(mut self, use_dct: bool) -> Self {
        self.use_dct = use_dct;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_scheme(mut self, scheme: QuantizerScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_cipher(mut self, cipher: CipherSuite) -> Self {
        self.cipher = cipher;
        self
    }

    /// Number of image channels these parameters describe.
    pub fn channels(&self) -> usize {
        if self.color {
            3
        } else {
            1
        }
    }

    /// Reject settings that cannot round-trip.
    ///
    /// # Errors
    /// [`StegoError::InvalidParameter`] if `levels` is outside
    /// `1..=MAX_LEVELS`, `q_factor` is not finite or below 1, or the
    /// remainder scheme is paired with `q_factor < 2`.
    pub fn validate(&self) -> Result<(), StegoError> {
        if self.levels == 0 || self.levels > MAX_LEVELS {
            return Err(StegoError::InvalidParameter("levels must be between 1 and 6"));
        }
        if !self.q_factor.is_finite() || self.q_factor < 1.0 {
            return Err(StegoError::InvalidParameter("q_factor must be finite and at least 1"));
        }
        if self.scheme == QuantizerScheme::Remainder && self.q_factor < 2.0 {
            return Err(StegoError::InvalidParameter("remainder quantizer needs q_factor of at least 2"));
        }
        Ok(())
    }
}
