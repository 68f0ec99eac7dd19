// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Payload blob construction and parsing, and bit/byte conversion.
//!
//! The blob is the self-describing container that is turned into bits and
//! embedded into transform coefficients:
//!
//! ```text
//! [4 bytes ] original (uncompressed ciphertext) length, big-endian u32
//! [k bytes ] serialized Huffman tree (self-terminating, see `huffman`)
//! [N bytes ] Huffman-compressed ciphertext, zero-padded to a byte
//! ```
//!
//! The tree carries its own symbol count, so there is no separator between
//! the tree and the compressed stream; everything after the tree belongs to
//! the stream.

use crate::stego::error::StegoError;
use crate::stego::huffman::{self, HuffmanTree};

/// Length field size.
pub const LENGTH_BYTES: usize = 4;

/// Smallest well-formed blob: length field plus an empty tree header.
pub const MIN_PAYLOAD_BYTES: usize = LENGTH_BYTES + 2;

/// Build a payload blob.
///
/// Only the length of `original` is stored; the bytes themselves travel in
/// compressed form.
pub fn create_payload(original: &[u8], tree: &HuffmanTree, compressed: &[u8]) -> Result<Vec<u8>, StegoError> {
    let len = u32::try_from(original.len())
        .map_err(|_| StegoError::InvalidParameter("message too large for a 32-bit length field"))?;
    let tree_bytes = huffman::serialize_tree(tree);

    let mut blob = Vec::with_capacity(LENGTH_BYTES + tree_bytes.len() + compressed.len());
    blob.extend_from_slice(&len.to_be_bytes());
    blob.extend_from_slice(&tree_bytes);
    blob.extend_from_slice(compressed);
    Ok(blob)
}

/// Parsed payload blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPayload {
    /// Length of the data before compression.
    pub original_len: usize,
    pub tree: HuffmanTree,
    pub compressed: Vec<u8>,
}

/// Parse a payload blob.
///
/// # Errors
/// [`StegoError::CorruptPayload`] if the blob is shorter than
/// [`MIN_PAYLOAD_BYTES`] or the tree runs past the end of the blob.
pub fn parse_payload(blob: &[u8]) -> Result<ParsedPayload, StegoError> {
    if blob.len() < MIN_PAYLOAD_BYTES {
        return Err(StegoError::CorruptPayload("payload shorter than header"));
    }
    let original_len = u32::from_be_bytes([blob[0], blob[1], blob[2], blob[3]]) as usize;
    let (tree, used) = huffman::deserialize_tree(&blob[LENGTH_BYTES..])?;
    let compressed = blob[LENGTH_BYTES + used..].to_vec();
    Ok(ParsedPayload { original_len, tree, compressed })
}

/// Compress `data` and frame it in one step.
pub fn pack(data: &[u8]) -> Result<Vec<u8>, StegoError> {
    let (compressed, tree) = huffman::compress(data);
    create_payload(data, &tree, &compressed)
}

/// Parse a blob and decompress it back to the original bytes.
pub fn unpack(blob: &[u8]) -> Result<Vec<u8>, StegoError> {
    let ParsedPayload { original_len, tree, compressed } = parse_payload(blob)?;
    huffman::decompress(&compressed, &tree, original_len)
}

/// Expand bytes to bits, MSB first. Each element is 0 or 1.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &b in bytes {
        for i in (0..8).rev() {
            bits.push((b >> i) & 1);
        }
    }
    bits
}

/// Pack bits back into bytes, MSB first.
///
/// A trailing group of fewer than 8 bits is dropped, not padded.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit & 1)))
        .collect()
}
