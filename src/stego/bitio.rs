// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! MSB-first bit I/O over plain byte buffers.
//!
//! Used by the Huffman coder for both the code stream and the serialized
//! tree. There is no byte stuffing; the final partial byte is zero-padded.

/// Bit-level reader. Bits are consumed MSB-first from each byte.
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Absolute bit position.
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Read one bit. `None` once the input is exhausted.
    pub fn read_bit(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.pos / 8)?;
        let bit = (byte >> (7 - (self.pos % 8))) & 1;
        self.pos += 1;
        Some(bit)
    }

    /// Read `count` bits (at most 32), right-aligned.
    pub fn read_bits(&mut self, count: u8) -> Option<u32> {
        debug_assert!(count <= 32);
        if self.remaining() < count as usize {
            return None;
        }
        let mut val = 0u32;
        for _ in 0..count {
            val = (val << 1) | self.read_bit()? as u32;
        }
        Some(val)
    }

    /// Bits left in the buffer, padding included.
    pub fn remaining(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    /// Number of bytes touched so far (a partially read byte counts).
    pub fn bytes_consumed(&self) -> usize {
        self.pos.div_ceil(8)
    }
}

/// Bit-level writer, MSB-first.
#[derive(Debug, Default)]
pub struct BitWriter {
    out: Vec<u8>,
    acc: u8,
    /// Bits held in `acc`, 0..8.
    fill: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self { out: Vec::with_capacity(bytes), acc: 0, fill: 0 }
    }

    pub fn write_bit(&mut self, bit: u8) {
        self.acc = (self.acc << 1) | (bit & 1);
        self.fill += 1;
        if self.fill == 8 {
            self.out.push(self.acc);
            self.acc = 0;
            self.fill = 0;
        }
    }

    /// Write the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32);
        for i in (0..count).rev() {
            self.write_bit(((value >> i) & 1) as u8);
        }
    }

    /// Total bits written.
    pub fn bit_len(&self) -> usize {
        self.out.len() * 8 + self.fill as usize
    }

    /// Flush, zero-padding the last byte.
    pub fn finish(mut self) -> Vec<u8> {
        if self.fill > 0 {
            self.out.push(self.acc << (8 - self.fill));
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_mixed_widths() {
        let mut w = BitWriter::new();
        w.write_bit(1);
        w.write_bits(0b0110, 4);
        w.write_bits(0xAB, 8);
        assert_eq!(w.bit_len(), 13);
        let bytes = w.finish();
        assert_eq!(bytes, vec![0b1011_0101, 0b0101_1000]);

        let mut r = BitReader::new(&bytes);
        assert_eq!(r.read_bit(), Some(1));
        assert_eq!(r.read_bits(4), Some(0b0110));
        assert_eq!(r.read_bits(8), Some(0xAB));
        assert_eq!(r.remaining(), 3);
        assert_eq!(r.bytes_consumed(), 2);
    }

    #[test]
    fn reader_stops_at_end() {
        let data = [0xFFu8];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_bits(9), None);
        assert_eq!(r.read_bits(8), Some(0xFF));
        assert_eq!(r.read_bit(), None);
    }

    #[test]
    fn empty_writer_is_empty() {
        assert!(BitWriter::new().finish().is_empty());
    }
}
