// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end embed and extract.
//!
//! Embed: encrypt → Huffman-compress → frame → bits → forward transform of
//! the working region → quantize → inverse transform → 8-bit stego image.
//!
//! Extract runs the same steps backwards. The salt, IV and payload bit
//! length produced by [`embed_message`] must reach the receiver out of band
//! (see [`StegoMetadata`](super::metadata::StegoMetadata)).
//!
//! The 8-bit stego image is re-decomposed and read back before it is
//! returned. Rounding is covered by the per-band steps of
//! [`embedding::band_step`]; clipping at 0 and 255 is avoided by pulling the
//! working region into `[m, 255 - m]`, where `m` grows until the
//! reconstruction stays inside the pixel range.

use super::crypto::{self, KeyMaterial, IV_LEN, SALT_LEN};
use super::embedding::{self, QuantizerScheme};
use super::error::StegoError;
use super::frame;
use super::params::CodecParams;
use crate::wavelet::pixels::{psnr, working_region, PixelImage};
use crate::wavelet::{self, array::CoeffArray, CoefficientBands};

/// Embedding attempts, each with fresh encryption, before
/// [`StegoError::RoundTripFailed`] is reported.
const MAX_EMBED_ATTEMPTS: usize = 3;

/// Reconstructions tried while searching for clip-free headroom.
const MAX_HEADROOM_PASSES: usize = 6;

/// Upper bound on the headroom; keeps `[m, 255 - m]` non-empty.
const MAX_HEADROOM: f64 = 64.0;

/// Result of [`embed_message`].
#[derive(Debug, Clone)]
pub struct EmbedOutput {
    /// Same shape as the cover.
    pub stego: PixelImage,
    /// PBKDF2 salt; `None` for session keys.
    pub salt: Option<[u8; SALT_LEN]>,
    pub iv: [u8; IV_LEN],
    /// Number of embedded bits; always a multiple of 8.
    pub payload_bits_length: usize,
    /// Cover vs. stego PSNR in dB.
    pub psnr: f64,
}

/// Hide `message` in `cover`.
///
/// # Errors
/// - [`StegoError::InvalidParameter`] for invalid `params`, including the
///   remainder quantizer, which cannot survive 8-bit pixels.
/// - [`StegoError::ChannelMismatch`] if `params.color` disagrees with the cover.
/// - [`StegoError::Transform`] if the cover has no working region.
/// - [`StegoError::CapacityExceeded`] if the payload does not fit.
/// - [`StegoError::RoundTripFailed`] if the stego image does not read back.
pub fn embed_message(
    message: &str,
    key: &KeyMaterial,
    cover: &PixelImage,
    params: &CodecParams,
) -> Result<EmbedOutput, StegoError> {
    check_params(params)?;
    check_channels(cover, params)?;

    let mut bit_errors = 0;
    let mut bit_count = 0;
    for attempt in 1..=MAX_EMBED_ATTEMPTS {
        let sealed = crypto::encrypt(message.as_bytes(), key, params.cipher);
        let blob = frame::pack(&sealed.ciphertext)?;
        let bits = frame::bytes_to_bits(&blob);
        tracing::debug!(
            attempt,
            ciphertext = sealed.ciphertext.len(),
            blob = blob.len(),
            bits = bits.len(),
            "payload prepared"
        );

        let stego = embed_bits(&bits, cover, params)?;
        bit_errors = read_back_errors(&stego, &bits, params)?;
        bit_count = bits.len();
        if bit_errors > 0 {
            tracing::warn!(attempt, bit_errors, bits = bit_count, "stego image does not read back");
            continue;
        }

        let quality = psnr(cover, &stego)?;
        tracing::debug!(psnr = quality, "stego image reconstructed");
        return Ok(EmbedOutput {
            stego,
            salt: sealed.salt,
            iv: sealed.iv,
            payload_bits_length: bit_count,
            psnr: quality,
        });
    }
    Err(StegoError::RoundTripFailed { bit_errors, bits: bit_count })
}

/// Recover a message from `stego`.
///
/// A payload that fails to parse or decompress is reported as
/// [`StegoError::ExtractionMismatch`]: the bits read back differ from the
/// ones embedded (lossy re-encoding, resizing, or mismatched parameters).
///
/// # Errors
/// Besides the parameter and shape errors of [`embed_message`]:
/// - [`StegoError::ExtractionMismatch`] for an unreadable payload.
/// - [`StegoError::DecryptionFailed`] / [`StegoError::MissingSalt`] for key
///   problems.
pub fn extract_message(
    stego: &PixelImage,
    key: &KeyMaterial,
    salt: Option<&[u8; SALT_LEN]>,
    iv: &[u8; IV_LEN],
    payload_bits_length: usize,
    params: &CodecParams,
) -> Result<String, StegoError> {
    check_params(params)?;
    check_channels(stego, params)?;

    let bands = decompose(&stego.to_coeffs(), stego, params)?;
    let bits = embedding::extract(&bands, payload_bits_length, params)?;
    let blob = frame::bits_to_bytes(&bits);

    let ciphertext = frame::unpack(&blob).map_err(|e| match e {
        StegoError::CorruptPayload(reason) => StegoError::ExtractionMismatch(reason),
        other => other,
    })?;
    tracing::debug!(blob = blob.len(), ciphertext = ciphertext.len(), "payload recovered");

    crypto::decrypt_text(&ciphertext, key, salt, iv, params.cipher)
}

/// Embed `bits` into the cover's working region and round to 8-bit pixels.
///
/// Each pass clamps the working region into `[headroom, 255 - headroom]`
/// and widens `headroom` by however far the reconstruction left the pixel
/// range. The last pass is kept even if it still clips; the read-back check
/// decides whether that matters.
fn embed_bits(bits: &[u8], cover: &PixelImage, params: &CodecParams) -> Result<PixelImage, StegoError> {
    let mut coeffs = cover.to_coeffs();
    let (h, w) = working_region(cover.height(), cover.width(), params.levels);
    let region = coeffs.crop(h, w);

    let mut headroom = 0.0f64;
    let mut pass = 1;
    let reconstructed = loop {
        let mut working = region.clone();
        if headroom > 0.0 {
            for v in working.as_mut_slice() {
                *v = v.clamp(headroom, 255.0 - headroom);
            }
        }
        let mut bands = decompose(&working, cover, params)?;
        embedding::embed_in_place(bits, &mut bands, params)?;
        let reconstructed = wavelet::inverse(&bands)?;

        let overshoot = clip_overshoot(&reconstructed);
        if overshoot == 0.0 || pass == MAX_HEADROOM_PASSES {
            break reconstructed;
        }
        headroom = (headroom + overshoot).ceil().min(MAX_HEADROOM);
        tracing::debug!(pass, overshoot, headroom, "reconstruction clips; pulling working region inward");
        pass += 1;
    };

    coeffs.paste(&reconstructed);
    Ok(PixelImage::from_coeffs(&coeffs)?)
}

/// How far past `[-0.5, 255.5]` any value lies; 0 if rounding never clamps.
fn clip_overshoot(arr: &CoeffArray) -> f64 {
    arr.as_slice()
        .iter()
        .map(|&v| (-0.5 - v).max(v - 255.5))
        .fold(0.0, f64::max)
}

/// Number of `bits` that `stego` does not reproduce.
fn read_back_errors(stego: &PixelImage, bits: &[u8], params: &CodecParams) -> Result<usize, StegoError> {
    let bands = decompose(&stego.to_coeffs(), stego, params)?;
    let read = embedding::extract(&bands, bits.len(), params)?;
    Ok(bits.iter().zip(&read).filter(|(a, b)| a != b).count())
}

/// Forward transform of the image's working region.
///
/// `coeffs` is either the whole image or an already cropped region.
fn decompose(coeffs: &CoeffArray, image: &PixelImage, params: &CodecParams) -> Result<CoefficientBands, StegoError> {
    let (h, w) = working_region(image.height(), image.width(), params.levels);
    if (h, w) != (image.height(), image.width()) {
        tracing::debug!(
            height = image.height(),
            width = image.width(),
            region_height = h,
            region_width = w,
            "border outside working region left unchanged"
        );
    }
    Ok(wavelet::forward(&coeffs.crop(h, w), params.levels, params.use_dct)?)
}

/// Parameter checks for the 8-bit pipeline on top of [`CodecParams::validate`].
fn check_params(params: &CodecParams) -> Result<(), StegoError> {
    params.validate()?;
    if params.scheme == QuantizerScheme::Remainder {
        return Err(StegoError::InvalidParameter(
            "remainder quantizer does not survive 8-bit pixels; use it with embedding::embed only",
        ));
    }
    Ok(())
}

fn check_channels(image: &PixelImage, params: &CodecParams) -> Result<(), StegoError> {
    let expected = params.channels();
    if image.channels() != expected {
        return Err(StegoError::ChannelMismatch { expected, found: image.channels() });
    }
    Ok(())
}
