// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Coefficient storage for transform bands.
//!
//! [`CoeffArray`] holds `f64` values in `[H, W, C]` row-major order with the
//! channel index innermost. Grayscale data is simply `C = 1`, so every band,
//! plane and image region shares one representation.

use super::error::{Result, TransformError};

/// A 3-D array of transform coefficients, shape `[height, width, channels]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoeffArray {
    height: usize,
    width: usize,
    channels: usize,
    /// Flat storage: `height * width * channels` values.
    data: Vec<f64>,
}

impl CoeffArray {
    /// Create a new array initialized to zero.
    pub fn zeros(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
            data: vec![0.0; height * width * channels],
        }
    }

    /// Wrap an existing buffer. Fails if its length disagrees with the shape.
    pub fn from_vec(height: usize, width: usize, channels: usize, data: Vec<f64>) -> Result<Self> {
        let expected = height * width * channels;
        if data.len() != expected {
            return Err(TransformError::BufferLength { expected, actual: data.len() });
        }
        Ok(Self { height, width, channels, data })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(height, width, channels)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    /// Total number of coefficients.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize, ch: usize) -> f64 {
        self.data[self.index(row, col, ch)]
    }

    pub fn set(&mut self, row: usize, col: usize, ch: usize, val: f64) {
        let idx = self.index(row, col, ch);
        self.data[idx] = val;
    }

    /// Raw read-only access in `[H, W, C]` row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Raw mutable access in `[H, W, C]` row-major order.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Copy one channel out as a contiguous `height * width` plane.
    pub fn channel_plane(&self, ch: usize) -> Vec<f64> {
        debug_assert!(ch < self.channels);
        self.data.iter().skip(ch).step_by(self.channels).copied().collect()
    }

    /// Assemble an array from per-channel planes of identical size.
    pub fn from_planes(height: usize, width: usize, planes: &[Vec<f64>]) -> Result<Self> {
        let channels = planes.len();
        let mut out = Self::zeros(height, width, channels);
        for (ch, plane) in planes.iter().enumerate() {
            if plane.len() != height * width {
                return Err(TransformError::BufferLength {
                    expected: height * width,
                    actual: plane.len(),
                });
            }
            for (i, &v) in plane.iter().enumerate() {
                out.data[i * channels + ch] = v;
            }
        }
        Ok(out)
    }

    /// Copy the top-left `height x width` region.
    pub fn crop(&self, height: usize, width: usize) -> CoeffArray {
        debug_assert!(height <= self.height && width <= self.width);
        let mut out = Self::zeros(height, width, self.channels);
        let row_len = width * self.channels;
        for r in 0..height {
            let src = r * self.width * self.channels;
            let dst = r * row_len;
            out.data[dst..dst + row_len].copy_from_slice(&self.data[src..src + row_len]);
        }
        out
    }

    /// Overwrite the top-left region with `region`. Channel counts must match.
    pub fn paste(&mut self, region: &CoeffArray) {
        debug_assert_eq!(region.channels, self.channels);
        debug_assert!(region.height <= self.height && region.width <= self.width);
        let row_len = region.width * self.channels;
        for r in 0..region.height {
            let dst = r * self.width * self.channels;
            let src = r * row_len;
            self.data[dst..dst + row_len].copy_from_slice(&region.data[src..src + row_len]);
        }
    }

    /// Sum of squared coefficients.
    pub fn energy(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum()
    }

    fn index(&self, row: usize, col: usize, ch: usize) -> usize {
        debug_assert!(row < self.height, "row {row} >= {}", self.height);
        debug_assert!(col < self.width, "col {col} >= {}", self.width);
        debug_assert!(ch < self.channels);
        (row * self.width + col) * self.channels + ch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_layout_is_channel_innermost() {
        let mut arr = CoeffArray::zeros(2, 3, 3);
        arr.set(1, 2, 1, 7.5);
        assert_eq!(arr.get(1, 2, 1), 7.5);
        assert_eq!(arr.as_slice()[(1 * 3 + 2) * 3 + 1], 7.5);
        assert_eq!(arr.len(), 18);
    }

    #[test]
    fn from_vec_rejects_bad_length() {
        assert!(CoeffArray::from_vec(2, 2, 1, vec![0.0; 3]).is_err());
        assert!(CoeffArray::from_vec(2, 2, 1, vec![0.0; 4]).is_ok());
    }

    #[test]
    fn planes_roundtrip() {
        let data: Vec<f64> = (0..24).map(|v| v as f64).collect();
        let arr = CoeffArray::from_vec(2, 4, 3, data).unwrap();
        let planes: Vec<Vec<f64>> = (0..3).map(|c| arr.channel_plane(c)).collect();
        assert_eq!(planes[1], vec![1.0, 4.0, 7.0, 10.0, 13.0, 16.0, 19.0, 22.0]);
        let back = CoeffArray::from_planes(2, 4, &planes).unwrap();
        assert_eq!(back, arr);
    }

    #[test]
    fn crop_and_paste() {
        let data: Vec<f64> = (0..20).map(|v| v as f64).collect();
        let mut arr = CoeffArray::from_vec(4, 5, 1, data).unwrap();
        let mut region = arr.crop(2, 4);
        assert_eq!(region.shape(), (2, 4, 1));
        assert_eq!(region.get(1, 3, 0), 8.0);

        region.as_mut_slice().iter_mut().for_each(|v| *v = -1.0);
        arr.paste(&region);
        assert_eq!(arr.get(1, 3, 0), -1.0);
        // Border column and lower rows untouched.
        assert_eq!(arr.get(1, 4, 0), 9.0);
        assert_eq!(arr.get(2, 0, 0), 10.0);
    }
}
