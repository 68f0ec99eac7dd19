// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the steganography pipeline.
//!
//! [`StegoError`] covers all failure modes from parameter validation through
//! encryption, framing, embedding and extraction. Only the embed pipeline
//! retries, and only when its own stego image does not read back
//! ([`StegoError::RoundTripFailed`]); a fresh IV changes the embedded bits.

use core::fmt;

use thiserror::Error;

use crate::wavelet::error::TransformError;

/// Why a decryption attempt was rejected.
///
/// CBC mode carries no integrity tag, so a wrong key, salt or IV is only
/// noticed through invalid padding or a plaintext that is not UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptFailure {
    /// PKCS#7 padding did not validate.
    BadPadding,
    /// Decrypted bytes are not valid UTF-8.
    InvalidUtf8,
    /// AES-GCM-SIV authentication tag mismatch.
    AuthTag,
}

impl fmt::Display for DecryptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadPadding => write!(f, "invalid padding"),
            Self::InvalidUtf8 => write!(f, "plaintext is not valid UTF-8"),
            Self::AuthTag => write!(f, "authentication tag mismatch"),
        }
    }
}

/// Errors that can occur during steganographic embedding or extraction.
#[derive(Debug, Error)]
pub enum StegoError {
    /// Payload needs more bits than the selected bands can carry at this Q-factor.
    #[error("payload of {needed} bits exceeds embedding capacity of {available} bits")]
    CapacityExceeded { needed: usize, available: usize },
    /// Malformed tree serialization, truncated payload blob, or short compressed stream.
    #[error("corrupt payload: {0}")]
    CorruptPayload(&'static str),
    /// The 8-bit stego image produced by embedding does not reproduce the
    /// embedded bits, even after retrying with fresh encryption.
    #[error("stego image loses {bit_errors} of {bits} payload bits to pixel rounding; raise q_factor")]
    RoundTripFailed { bit_errors: usize, bits: usize },
    /// Bits recovered from an image do not form a valid payload.
    #[error("extracted payload does not match (image modified or wrong parameters?): {0}")]
    ExtractionMismatch(&'static str),
    /// Wrong key, salt or IV (or tampered ciphertext).
    #[error("decryption failed: {0}")]
    DecryptionFailed(DecryptFailure),
    /// A password-derived key was requested without the salt it was derived with.
    #[error("password-derived key requires the encryption salt")]
    MissingSalt,
    /// Codec parameters out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    /// The `color` flag disagrees with the image's channel count.
    #[error("expected {expected} channel(s), image has {found}")]
    ChannelMismatch { expected: usize, found: usize },
    /// Wavelet/DCT transform error.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
    /// The image codec failed to decode or encode.
    #[error("image codec error: {0}")]
    Image(String),
    /// Refusal to write a stego image in a lossy format.
    #[error("lossy image format would destroy the payload: {0}")]
    LossyFormat(String),
    /// Sidecar metadata does not describe the given image.
    #[error("metadata does not match image: {0}")]
    MetadataMismatch(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("metadata encoding error: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl StegoError {
    /// `true` for the wrong-key class of failures.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, Self::DecryptionFailed(_) | Self::MissingSalt)
    }
}

impl From<image::ImageError> for StegoError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e.to_string())
    }
}
