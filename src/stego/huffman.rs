// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Byte-oriented Huffman coder for the ciphertext.
//!
//! The tree is built from the byte frequencies of the buffer being
//! compressed. Construction is fully deterministic: nodes are merged from a
//! min-heap keyed by `(frequency, order)`, where a leaf's order is its byte
//! value and an internal node's order is `256 + creation index`. The first
//! node popped becomes the `0` (left) child.
//!
//! A tree with a single symbol is a bare leaf whose code is the one bit `0`.
//! An empty input yields an empty tree.
//!
//! ## Serialized form
//!
//! ```text
//! [2 bytes ] symbol count n (big-endian u16, 0..=256)
//! [k bytes ] preorder walk, MSB-first: 0 = internal, 1 + 8-bit symbol = leaf
//! ```
//!
//! A tree with `n` leaves has `n - 1` internal nodes, so the walk is
//! `10n - 1` bits and `k = ceil((10n - 1) / 8)`. The form is self-terminating:
//! [`deserialize_tree`] reports how many bytes it consumed.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::bitio::{BitReader, BitWriter};
use crate::stego::error::StegoError;

/// Upper bound on code length accepted from serialized trees.
pub const MAX_TREE_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(u8),
    Internal { zero: usize, one: usize },
}

/// Prefix-code tree over byte values.
///
/// Nodes live in an arena; `root` indexes into it.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl HuffmanTree {
    /// The tree for an empty input.
    pub fn empty() -> Self {
        Self { nodes: Vec::new(), root: None }
    }

    /// Build the tree for `data`.
    pub fn build(data: &[u8]) -> Self {
        let mut freq = [0u64; 256];
        for &b in data {
            freq[b as usize] += 1;
        }
        Self::from_frequencies(&freq)
    }

    /// Build from an explicit frequency table. Zero-frequency symbols are absent.
    pub fn from_frequencies(freq: &[u64; 256]) -> Self {
        let mut nodes = Vec::new();
        let mut heap = BinaryHeap::new();
        for (sym, &f) in freq.iter().enumerate() {
            if f > 0 {
                heap.push(Reverse((f, sym as u32, nodes.len())));
                nodes.push(Node::Leaf(sym as u8));
            }
        }

        let mut order = 256u32;
        while heap.len() > 1 {
            let (Some(Reverse((f0, _, zero))), Some(Reverse((f1, _, one)))) = (heap.pop(), heap.pop())
            else {
                unreachable!("heap holds at least two nodes");
            };
            heap.push(Reverse((f0 + f1, order, nodes.len())));
            nodes.push(Node::Internal { zero, one });
            order += 1;
        }

        let root = heap.pop().map(|Reverse((_, _, id))| id);
        Self { nodes, root }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of distinct symbols (leaves).
    pub fn symbol_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf(_))).count()
    }

    /// Code of every symbol as a bit vector; `None` for absent symbols.
    pub fn codes(&self) -> Vec<Option<Vec<u8>>> {
        let mut table = vec![None; 256];
        let Some(root) = self.root else {
            return table;
        };
        if let Node::Leaf(sym) = self.nodes[root] {
            table[sym as usize] = Some(vec![0]);
            return table;
        }
        let mut stack = vec![(root, Vec::new())];
        while let Some((id, path)) = stack.pop() {
            match self.nodes[id] {
                Node::Leaf(sym) => table[sym as usize] = Some(path),
                Node::Internal { zero, one } => {
                    let mut p1 = path.clone();
                    p1.push(1);
                    let mut p0 = path;
                    p0.push(0);
                    stack.push((one, p1));
                    stack.push((zero, p0));
                }
            }
        }
        table
    }

    /// Length of the longest code.
    pub fn depth(&self) -> usize {
        self.codes().iter().flatten().map(Vec::len).max().unwrap_or(0)
    }
}

/// Trees are equal when they assign the same code to every symbol.
impl PartialEq for HuffmanTree {
    fn eq(&self, other: &Self) -> bool {
        self.codes() == other.codes()
    }
}

impl Eq for HuffmanTree {}

/// Compress `data`, returning the padded code stream and its tree.
pub fn compress(data: &[u8]) -> (Vec<u8>, HuffmanTree) {
    let tree = HuffmanTree::build(data);
    let codes = tree.codes();
    let mut w = BitWriter::with_capacity(data.len() / 2 + 1);
    for &b in data {
        if let Some(code) = &codes[b as usize] {
            for &bit in code {
                w.write_bit(bit);
            }
        }
    }
    (w.finish(), tree)
}

/// Decode exactly `original_len` symbols from `compressed`.
///
/// Trailing padding bits are ignored. Running out of input, or an empty tree
/// with a nonzero length, is a [`StegoError::CorruptPayload`].
pub fn decompress(compressed: &[u8], tree: &HuffmanTree, original_len: usize) -> Result<Vec<u8>, StegoError> {
    if original_len == 0 {
        return Ok(Vec::new());
    }
    let root = tree
        .root
        .ok_or(StegoError::CorruptPayload("empty Huffman tree with nonzero length"))?;

    // A corrupted length must not trigger a huge allocation.
    let mut out = Vec::with_capacity(original_len.min(compressed.len().saturating_mul(8)));
    let mut r = BitReader::new(compressed);
    const TRUNCATED: StegoError = StegoError::CorruptPayload("compressed stream truncated");

    if let Node::Leaf(sym) = tree.nodes[root] {
        for _ in 0..original_len {
            match r.read_bit() {
                Some(0) => out.push(sym),
                Some(_) => return Err(StegoError::CorruptPayload("invalid code for single-symbol tree")),
                None => return Err(TRUNCATED),
            }
        }
        return Ok(out);
    }

    while out.len() < original_len {
        let mut id = root;
        loop {
            match tree.nodes[id] {
                Node::Leaf(sym) => {
                    out.push(sym);
                    break;
                }
                Node::Internal { zero, one } => {
                    id = match r.read_bit() {
                        Some(0) => zero,
                        Some(_) => one,
                        None => return Err(TRUNCATED),
                    };
                }
            }
        }
    }
    Ok(out)
}

/// Serialize `tree` in the self-terminating form described in the module docs.
pub fn serialize_tree(tree: &HuffmanTree) -> Vec<u8> {
    let n = tree.symbol_count();
    let mut out = Vec::with_capacity(serialized_tree_len(n));
    out.extend_from_slice(&(n as u16).to_be_bytes());
    let Some(root) = tree.root else {
        return out;
    };

    let mut w = BitWriter::with_capacity(serialized_tree_len(n) - 2);
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        match tree.nodes[id] {
            Node::Leaf(sym) => {
                w.write_bit(1);
                w.write_bits(sym as u32, 8);
            }
            Node::Internal { zero, one } => {
                w.write_bit(0);
                stack.push(one);
                stack.push(zero);
            }
        }
    }
    out.extend_from_slice(&w.finish());
    out
}

/// Serialized size in bytes of a tree with `symbols` leaves.
pub fn serialized_tree_len(symbols: usize) -> usize {
    if symbols == 0 {
        2
    } else {
        2 + (10 * symbols - 1).div_ceil(8)
    }
}

/// Parse a serialized tree from the front of `bytes`.
///
/// Returns the tree and the number of bytes it occupied.
pub fn deserialize_tree(bytes: &[u8]) -> Result<(HuffmanTree, usize), StegoError> {
    if bytes.len() < 2 {
        return Err(StegoError::CorruptPayload("truncated Huffman tree header"));
    }
    let n = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
    if n > 256 {
        return Err(StegoError::CorruptPayload("Huffman tree symbol count exceeds 256"));
    }
    if n == 0 {
        return Ok((HuffmanTree::empty(), 2));
    }

    let mut parser = TreeParser {
        reader: BitReader::new(&bytes[2..]),
        nodes: Vec::with_capacity(2 * n - 1),
        seen: [false; 256],
        leaves: 0,
        expected: n,
    };
    let root = parser.node(0)?;
    if parser.leaves != n {
        return Err(StegoError::CorruptPayload("Huffman tree leaf count mismatch"));
    }
    let consumed = 2 + parser.reader.bytes_consumed();
    Ok((HuffmanTree { nodes: parser.nodes, root: Some(root) }, consumed))
}

struct TreeParser<'a> {
    reader: BitReader<'a>,
    nodes: Vec<Node>,
    seen: [bool; 256],
    leaves: usize,
    expected: usize,
}

impl TreeParser<'_> {
    fn node(&mut self, depth: usize) -> Result<usize, StegoError> {
        const TRUNCATED: StegoError = StegoError::CorruptPayload("truncated Huffman tree");
        if depth > MAX_TREE_DEPTH {
            return Err(StegoError::CorruptPayload("Huffman tree too deep"));
        }
        let kind = self.reader.read_bit().ok_or(TRUNCATED)?;
        let node = if kind == 1 {
            let sym = self.reader.read_bits(8).ok_or(TRUNCATED)? as u8;
            if std::mem::replace(&mut self.seen[sym as usize], true) {
                return Err(StegoError::CorruptPayload("duplicate symbol in Huffman tree"));
            }
            self.leaves += 1;
            if self.leaves > self.expected {
                return Err(StegoError::CorruptPayload("Huffman tree leaf count mismatch"));
            }
            Node::Leaf(sym)
        } else {
            let zero = self.node(depth + 1)?;
            let one = self.node(depth + 1)?;
            Node::Internal { zero, one }
        };
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn roundtrip(data: &[u8]) {
        let (compressed, tree) = compress(data);
        let bytes = serialize_tree(&tree);
        let (back, used) = deserialize_tree(&bytes).unwrap();
        assert_eq!(used, bytes.len());
        assert_eq!(back, tree);
        assert_eq!(decompress(&compressed, &back, data.len()).unwrap(), data);
    }

    #[test]
    fn empty_input() {
        let (compressed, tree) = compress(&[]);
        assert!(compressed.is_empty());
        assert!(tree.is_empty());
        assert_eq!(serialize_tree(&tree), vec![0, 0]);
        assert!(decompress(&compressed, &tree, 0).unwrap().is_empty());
        assert!(decompress(&compressed, &tree, 1).is_err());
    }

    #[test]
    fn single_symbol_uses_one_bit() {
        let data = vec![b'X'; 1024];
        let (compressed, tree) = compress(&data);
        assert_eq!(tree.symbol_count(), 1);
        assert_eq!(tree.codes()[b'X' as usize], Some(vec![0]));
        assert_eq!(compressed.len(), 128);
        roundtrip(&data);
    }

    #[test]
    fn tie_break_is_by_byte_value() {
        // Equal frequencies: 'a' (lower) is popped first and gets code 0.
        let tree = HuffmanTree::build(b"ab");
        let codes = tree.codes();
        assert_eq!(codes[b'a' as usize], Some(vec![0]));
        assert_eq!(codes[b'b' as usize], Some(vec![1]));
    }

    #[test]
    fn skewed_distribution_gives_short_code_to_frequent_symbol() {
        let mut data = vec![7u8; 1000];
        data.extend_from_slice(&[1, 2, 3, 4, 5]);
        let tree = HuffmanTree::build(&data);
        let codes = tree.codes();
        let frequent = codes[7].as_ref().unwrap().len();
        for sym in 1..=5 {
            assert!(codes[sym].as_ref().unwrap().len() > frequent);
        }
        roundtrip(&data);
    }

    #[test]
    fn codes_are_prefix_free() {
        let data: Vec<u8> = (0..=255u8).flat_map(|b| vec![b; (b as usize % 7) + 1]).collect();
        let tree = HuffmanTree::build(&data);
        let codes: Vec<Vec<u8>> = tree.codes().into_iter().flatten().collect();
        assert_eq!(codes.len(), 256);
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "code {i} is a prefix of {j}");
                }
            }
        }
        roundtrip(&data);
    }

    #[test]
    fn serialized_length_formula() {
        for n in [1usize, 2, 3, 17, 255, 256] {
            let data: Vec<u8> = (0..n).map(|s| s as u8).collect();
            let tree = HuffmanTree::build(&data);
            let bytes = serialize_tree(&tree);
            assert_eq!(bytes.len(), serialized_tree_len(n));
            assert_eq!(bytes.len(), 2 + (10 * n - 1).div_ceil(8));
        }
    }

    #[test]
    fn deserialize_ignores_trailing_bytes() {
        let tree = HuffmanTree::build(b"hello world");
        let mut bytes = serialize_tree(&tree);
        let len = bytes.len();
        bytes.extend_from_slice(&[0xDE, 0xAD]);
        let (back, used) = deserialize_tree(&bytes).unwrap();
        assert_eq!(used, len);
        assert_eq!(back, tree);
    }

    #[test]
    fn malformed_trees_rejected() {
        // Too short for the header.
        assert!(deserialize_tree(&[0]).is_err());
        // n > 256.
        assert!(deserialize_tree(&[0x01, 0x01, 0xFF]).is_err());
        // Truncated walk.
        let bytes = serialize_tree(&HuffmanTree::build(b"abcdef"));
        assert!(deserialize_tree(&bytes[..bytes.len() - 1]).is_err());
        // Duplicate symbol: internal, leaf 'a', leaf 'a'.
        let mut w = BitWriter::new();
        w.write_bit(0);
        w.write_bit(1);
        w.write_bits(b'a' as u32, 8);
        w.write_bit(1);
        w.write_bits(b'a' as u32, 8);
        let mut dup = vec![0, 2];
        dup.extend(w.finish());
        assert!(matches!(deserialize_tree(&dup), Err(StegoError::CorruptPayload(_))));
        // Count says 3 but the walk has 2 leaves.
        let mut two = serialize_tree(&HuffmanTree::build(b"ab"));
        two[1] = 3;
        assert!(deserialize_tree(&two).is_err());
        // Count says 1 but the walk has 2 leaves.
        two[1] = 1;
        assert!(deserialize_tree(&two).is_err());
        // Endless chain of internal nodes.
        let mut deep = vec![1, 0];
        deep.extend(std::iter::repeat(0u8).take(64));
        assert!(deserialize_tree(&deep).is_err());
    }

    #[test]
    fn truncated_stream_rejected() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let (compressed, tree) = compress(data);
        assert!(decompress(&compressed[..compressed.len() / 2], &tree, data.len()).is_err());
    }

    #[test]
    fn random_buffers_roundtrip() {
        let mut rng = ChaCha20Rng::seed_from_u64(0x4855_4646);
        for _ in 0..60 {
            let len = rng.gen_range(0..=10_000);
            // Mix uniform and narrow alphabets.
            let alphabet = rng.gen_range(1..=256u32);
            let data: Vec<u8> = (0..len).map(|_| rng.gen_range(0..alphabet) as u8).collect();
            roundtrip(&data);
        }
    }
}
