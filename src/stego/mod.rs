// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Message preparation and coefficient embedding.
//!
//! The embed side runs, leaf first:
//!
//! 1. [`crypto`]: AES-256-CBC under a session key or a PBKDF2-derived key.
//! 2. [`huffman`]: byte-level Huffman compression of the ciphertext.
//! 3. [`frame`]: `[length][tree][compressed]` payload blob, then bits.
//! 4. [`embedding`]: quantization embedding over the detail bands (and the
//!    DCT of the approximation band) of the cover's wavelet decomposition.
//!
//! [`pipeline`] strings these together with the transform layer, and
//! [`metadata`] persists what the receiver needs besides the key.

pub mod error;
pub mod crypto;
pub mod bitio;
pub mod huffman;
pub mod frame;
pub mod params;
pub mod embedding;
pub mod capacity;
pub mod pipeline;
pub mod metadata;

pub use capacity::{capacity, embedding_capacity, image_capacity, max_payload_bytes};
pub use crypto::{CipherSuite, KeyMaterial};
pub use embedding::{bit_error_rate, embedding_bands, QuantizerScheme};
pub use error::{DecryptFailure, StegoError};
pub use metadata::StegoMetadata;
pub use params::CodecParams;
pub use pipeline::{embed_message, extract_message, EmbedOutput};

use crate::wavelet::pixels::PixelImage;

/// Extract using sidecar metadata, after checking it belongs to `stego`.
pub fn extract_with_metadata(
    stego: &PixelImage,
    meta: &StegoMetadata,
    key: &KeyMaterial,
) -> Result<String, StegoError> {
    meta.verify_image(stego)?;
    extract_message(
        stego,
        key,
        meta.salt.as_ref(),
        &meta.iv,
        meta.payload_bits_length,
        &meta.params,
    )
}
