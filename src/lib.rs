// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! # phasm-dwt
//!
//! Wavelet-domain image steganography. A text message is encrypted
//! (AES-256-CBC, or AES-256-GCM-SIV on request), Huffman-compressed, framed,
//! and written bit by bit into the detail coefficients of a 2-level Haar
//! decomposition of the cover image, plus the DCT of its approximation band.
//!
//! The transform layer (`wavelet`) is self-contained and does no I/O. The
//! steganography layer (`stego`) holds the cipher, coder, framing and
//! quantization embedding. `image_io` is the PNG boundary.
//!
//! Stego images must be stored losslessly. 8-bit rounding on save is
//! tolerated; JPEG recompression is not.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use phasm_dwt::{embed_message, extract_message, image_io, CodecParams, KeyMaterial};
//!
//! let cover = image_io::load("cover.png").unwrap();
//! let key = KeyMaterial::password("passphrase");
//! let params = CodecParams::default();
//! let out = embed_message("secret message", &key, &cover, &params).unwrap();
//! image_io::save_png("stego.png", &out.stego).unwrap();
//!
//! let stego = image_io::load("stego.png").unwrap();
//! let msg = extract_message(&stego, &key, out.salt.as_ref(), &out.iv, out.payload_bits_length, &params).unwrap();
//! assert_eq!(msg, "secret message");
//! ```

pub mod image_io;
pub mod stego;
pub mod wavelet;

pub use stego::{embed_message, extract_message, extract_with_metadata, EmbedOutput};
pub use stego::{capacity, embedding_capacity, image_capacity, max_payload_bytes};
pub use stego::{CipherSuite, CodecParams, DecryptFailure, KeyMaterial, QuantizerScheme, StegoError, StegoMetadata};
pub use wavelet::error::TransformError;
pub use wavelet::pixels::{psnr, PixelImage};
pub use wavelet::{BandId, BandKind, CoefficientBands};
