// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Sidecar metadata for a stego image.
//!
//! The receiver needs the salt, IV, payload bit length and codec parameters
//! next to the stego image. They are stored as JSON:
//!
//! ```json
//! {
//!   "version": 1,
//!   "image": "stego.png",
//!   "image_crc32": 3735928559,
//!   "width": 512, "height": 512, "channels": 1,
//!   "salt": "base64...", "iv": "base64...",
//!   "payload_bits_length": 2368,
//!   "params": { "levels": 2, "q_factor": 5.0, ... }
//! }
//! ```
//!
//! The key or password is never part of the metadata.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::crypto::{IV_LEN, SALT_LEN};
use super::error::StegoError;
use super::params::CodecParams;
use super::pipeline::EmbedOutput;
use crate::wavelet::pixels::PixelImage;

/// Current metadata format version.
pub const METADATA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StegoMetadata {
    pub version: u32,
    /// File name of the stego image this metadata belongs to.
    pub image: String,
    /// CRC-32 of the stego image's interleaved pixel buffer.
    pub image_crc32: u32,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    #[serde(with = "b64_salt", default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<[u8; SALT_LEN]>,
    #[serde(with = "b64_iv")]
    pub iv: [u8; IV_LEN],
    pub payload_bits_length: usize,
    pub params: CodecParams,
}

impl StegoMetadata {
    /// Describe the result of an embedding that will be stored as `image_name`.
    pub fn from_embed(image_name: impl Into<String>, output: &EmbedOutput, params: &CodecParams) -> Self {
        let stego = &output.stego;
        Self {
            version: METADATA_VERSION,
            image: image_name.into(),
            image_crc32: crc32fast::hash(stego.pixels()),
            width: stego.width(),
            height: stego.height(),
            channels: stego.channels(),
            salt: output.salt,
            iv: output.iv,
            payload_bits_length: output.payload_bits_length,
            params: *params,
        }
    }

    pub fn to_json(&self) -> Result<String, StegoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StegoError> {
        let meta: Self = serde_json::from_str(json)?;
        if meta.version != METADATA_VERSION {
            return Err(StegoError::MetadataMismatch("unsupported metadata version"));
        }
        Ok(meta)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), StegoError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, StegoError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Check that `image` is the stego image this metadata describes.
    pub fn verify_image(&self, image: &PixelImage) -> Result<(), StegoError> {
        if (image.width(), image.height(), image.channels()) != (self.width, self.height, self.channels) {
            return Err(StegoError::MetadataMismatch("image dimensions differ from metadata"));
        }
        if crc32fast::hash(image.pixels()) != self.image_crc32 {
            return Err(StegoError::MetadataMismatch("image checksum differs from metadata"));
        }
        Ok(())
    }
}

fn decode_fixed<const N: usize, E: serde::de::Error>(s: &str) -> Result<[u8; N], E> {
    let bytes = STANDARD.decode(s).map_err(E::custom)?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| E::custom(format!("expected {N} bytes, got {}", v.len())))
}

mod b64_iv {
    use super::*;

    pub fn serialize<S: Serializer>(iv: &[u8; IV_LEN], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(iv))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; IV_LEN], D::Error> {
        let s = String::deserialize(d)?;
        decode_fixed(&s)
    }
}

mod b64_salt {
    use super::*;

    pub fn serialize<S: Serializer>(salt: &Option<[u8; SALT_LEN]>, s: S) -> Result<S::Ok, S::Error> {
        match salt {
            Some(salt) => s.serialize_str(&STANDARD.encode(salt)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<[u8; SALT_LEN]>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(s) => decode_fixed(&s).map(Some),
            None => Ok(None),
        }
    }
}
