// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Component-level properties: transform identity, in-memory embed/extract
//! identity, the capacity boundary and the Huffman/framing round trip.

mod common;

use common::{random_bits, synthetic_cover};
use phasm_dwt::stego::embedding::{embed, embedding_bands, extract};
use phasm_dwt::stego::frame::{bits_to_bytes, bytes_to_bits, pack, unpack};
use phasm_dwt::stego::huffman::{compress, decompress, deserialize_tree, serialize_tree};
use phasm_dwt::wavelet::{self, pixels::working_region};
use phasm_dwt::{capacity, CodecParams, PixelImage, QuantizerScheme, StegoError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn bands_of(img: &PixelImage, params: &CodecParams) -> wavelet::CoefficientBands {
    let (h, w) = working_region(img.height(), img.width(), params.levels);
    wavelet::forward(&img.to_coeffs().crop(h, w), params.levels, params.use_dct).unwrap()
}

#[test]
fn transform_identity_without_embedding() {
    for (w, h, c, levels, use_dct) in [(512, 512, 3, 2, true), (512, 512, 1, 2, false), (96, 64, 1, 4, true)] {
        let img = synthetic_cover(w, h, c, 21);
        let bands = wavelet::forward(&img.to_coeffs(), levels, use_dct).unwrap();
        let back = PixelImage::from_coeffs(&wavelet::inverse(&bands).unwrap()).unwrap();
        let max_err = img
            .pixels()
            .iter()
            .zip(back.pixels())
            .map(|(&a, &b)| (a as i16 - b as i16).abs())
            .max()
            .unwrap();
        assert!(max_err <= 1, "max pixel error {max_err}");
        assert_eq!(back, img);
    }
}

#[test]
fn embed_extract_identity_in_memory() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xC0FFEE);
    for round in 0..12 {
        let color = rng.gen_bool(0.5);
        let scheme = if rng.gen_bool(0.5) { QuantizerScheme::Midpoint } else { QuantizerScheme::Remainder };
        let params = CodecParams::default()
            .with_color(color)
            .with_use_dct(rng.gen_bool(0.5))
            .with_levels(rng.gen_range(1..=3))
            .with_q_factor(rng.gen_range(2.0..9.0))
            .with_scheme(scheme);
        let img = synthetic_cover(64, 48, params.channels(), round);
        let bands = bands_of(&img, &params);
        let cap = capacity(&bands, &embedding_bands(params.levels, params.use_dct), params.q_factor);
        let bits = random_bits(rng.gen_range(0..=cap), round);

        let stego = embed(&bits, &bands, &params).unwrap();
        assert_eq!(extract(&stego, bits.len(), &params).unwrap(), bits, "{params:?}");
    }
}

#[test]
fn capacity_boundary() {
    let params = CodecParams::default();
    let img = synthetic_cover(64, 64, 1, 31);
    let bands = bands_of(&img, &params);
    let cap = capacity(&bands, &embedding_bands(2, true), 5.0);
    assert_eq!(cap, 3 * (1024 / 5) + 3 * (256 / 5) + 256 / 5);

    let exact = random_bits(cap, 1);
    let stego = embed(&exact, &bands, &params).unwrap();
    assert_eq!(extract(&stego, cap, &params).unwrap(), exact);

    let over = random_bits(cap + 1, 2);
    match embed(&over, &bands, &params) {
        Err(StegoError::CapacityExceeded { needed, available }) => {
            assert_eq!((needed, available), (cap + 1, cap));
        }
        other => panic!("expected CapacityExceeded, got {other:?}"),
    }
}

#[test]
fn huffman_random_buffers_roundtrip() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5EED);
    let mut lengths: Vec<usize> = vec![0, 1, 2, 255, 256, 10_000];
    lengths.extend((0..40).map(|_| rng.gen_range(0..=10_000)));
    for len in lengths {
        let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let (compressed, tree) = compress(&data);
        let (tree_back, _) = deserialize_tree(&serialize_tree(&tree)).unwrap();
        assert_eq!(decompress(&compressed, &tree_back, data.len()).unwrap(), data);
    }
}

#[test]
fn framed_payload_survives_bit_conversion() {
    let mut rng = ChaCha20Rng::seed_from_u64(77);
    for _ in 0..20 {
        let len = rng.gen_range(0..2000);
        let data: Vec<u8> = (0..len).map(|_| rng.gen_range(b'a'..=b'f')).collect();
        let blob = pack(&data).unwrap();
        let bits = bytes_to_bits(&blob);
        assert_eq!(bits.len(), blob.len() * 8);
        assert_eq!(unpack(&bits_to_bytes(&bits)).unwrap(), data);
    }
}
