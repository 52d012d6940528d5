//! Packed pixel storage
//!
//! A [`PixelBuffer`] stores `width * height` pixels of `bits_per_pixel` bits
//! each, packed MSB-first into rows of `stride` bytes. Samples may straddle
//! byte boundaries (for example 3 or 12 bits per pixel): access gathers the
//! covering bytes into a `u32` accumulator, so the widest pixel that can be
//! addressed at any bit alignment is [`MAX_BITS_PER_PIXEL`].
//!
//! Raw value 0 is background for every packing. Rows therefore only hold
//! content when at least one of their bytes is non-zero, which makes
//! [`PixelBuffer::is_line_blank`] a plain byte scan.

use crate::error::{RasterError, RasterResult};

/// Widest pixel the `u32` accumulator can hold at the worst bit alignment
/// (a sample starting at bit 7 of its first byte).
pub const MAX_BITS_PER_PIXEL: u32 = u32::BITS - 7;

/// Packed raster of unsigned samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bit_depth: u32,
    samples_per_pixel: u32,
    bits_per_pixel: u32,
    stride: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a background-filled buffer with one sample per pixel
    pub fn new(width: u32, height: u32, bits_per_pixel: u32) -> RasterResult<Self> {
        Self::with_samples(width, height, bits_per_pixel, 1)
    }

    /// Creates a background-filled buffer with `samples_per_pixel` samples of
    /// `bit_depth` bits each
    pub fn with_samples(
        width: u32,
        height: u32,
        bit_depth: u32,
        samples_per_pixel: u32,
    ) -> RasterResult<Self> {
        let (bits_per_pixel, stride, len) =
            Self::geometry(width, height, bit_depth, samples_per_pixel)?;
        Ok(Self {
            width,
            height,
            bit_depth,
            samples_per_pixel,
            bits_per_pixel,
            stride,
            data: vec![0; len],
        })
    }

    /// Wraps packed row data. `data` must hold exactly `stride * height`
    /// bytes; padding bits at the end of each row are cleared.
    pub fn from_raw(
        width: u32,
        height: u32,
        bits_per_pixel: u32,
        mut data: Vec<u8>,
    ) -> RasterResult<Self> {
        let (bits_per_pixel, stride, len) = Self::geometry(width, height, bits_per_pixel, 1)?;
        if data.len() != len {
            return Err(RasterError::BufferLength {
                expected: len,
                actual: data.len(),
            });
        }

        let used = (width as u64 * bits_per_pixel as u64 % 8) as u32;
        if used != 0 {
            let keep = 0xFFu8 << (8 - used);
            for row in data.chunks_exact_mut(stride) {
                if let Some(last) = row.last_mut() {
                    *last &= keep;
                }
            }
        }

        Ok(Self {
            width,
            height,
            bit_depth: bits_per_pixel,
            samples_per_pixel: 1,
            bits_per_pixel,
            stride,
            data,
        })
    }

    fn geometry(
        width: u32,
        height: u32,
        bit_depth: u32,
        samples_per_pixel: u32,
    ) -> RasterResult<(u32, usize, usize)> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(RasterError::InvalidDimensions { width, height });
        }
        let bits_per_pixel = bit_depth.saturating_mul(samples_per_pixel);
        if bit_depth == 0 || samples_per_pixel == 0 || bits_per_pixel > MAX_BITS_PER_PIXEL {
            return Err(RasterError::UnsupportedBitDepth {
                bits: bits_per_pixel,
                max: MAX_BITS_PER_PIXEL,
            });
        }
        let stride = (width as u64 * bits_per_pixel as u64).div_ceil(8);
        let len = stride
            .checked_mul(height as u64)
            .and_then(|len| usize::try_from(len).ok())
            .ok_or(RasterError::InvalidDimensions { width, height })?;
        Ok((bits_per_pixel, stride as usize, len))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bits per sample
    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.bits_per_pixel
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Largest raw pixel value
    pub fn max_value(&self) -> u32 {
        (1u32 << self.bits_per_pixel) - 1
    }

    /// Packed row data
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reads pixel `(x, y)`
    pub fn get_pixel(&self, x: u32, y: u32) -> RasterResult<u32> {
        self.check(x, y)?;
        Ok(self.read(x, y))
    }

    /// Writes pixel `(x, y)` and returns its previous value.
    ///
    /// `value` is reduced modulo `2^bits_per_pixel`.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: u32) -> RasterResult<u32> {
        self.check(x, y)?;
        Ok(self.write(x, y, value))
    }

    /// Reads pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        if let Err(err) = self.check(x, y) {
            panic!("{}", err);
        }
        self.read(x, y)
    }

    /// Writes pixel `(x, y)` and returns its previous value.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    pub fn put_pixel(&mut self, x: u32, y: u32, value: u32) -> u32 {
        if let Err(err) = self.check(x, y) {
            panic!("{}", err);
        }
        self.write(x, y, value)
    }

    fn check(&self, x: u32, y: u32) -> RasterResult<()> {
        if x >= self.width || y >= self.height {
            return Err(RasterError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// First byte, bit shift inside it, and number of bytes covering `(x, y)`
    #[inline]
    fn locate(&self, x: u32, y: u32) -> (usize, u32, usize) {
        let bit = self.stride as u64 * y as u64 * 8 + x as u64 * self.bits_per_pixel as u64;
        let shift = (bit % 8) as u32;
        let span = (shift + self.bits_per_pixel).div_ceil(8) as usize;
        ((bit / 8) as usize, shift, span)
    }

    #[inline]
    fn read(&self, x: u32, y: u32) -> u32 {
        let (byte, shift, span) = self.locate(x, y);
        let mut acc = 0u32;
        for (i, b) in self.data[byte..byte + span].iter().enumerate() {
            acc |= (*b as u32) << (24 - 8 * i as u32);
        }
        (acc >> (32 - shift - self.bits_per_pixel)) & self.max_value()
    }

    fn write(&mut self, x: u32, y: u32, value: u32) -> u32 {
        let (byte, shift, span) = self.locate(x, y);
        let bytes = &mut self.data[byte..byte + span];
        let mut acc = 0u32;
        for (i, b) in bytes.iter().enumerate() {
            acc |= (*b as u32) << (24 - 8 * i as u32);
        }

        let pos = 32 - shift - self.bits_per_pixel;
        let max = (1u32 << self.bits_per_pixel) - 1;
        let previous = (acc >> pos) & max;
        acc = (acc & !(max << pos)) | ((value & max) << pos);

        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (acc >> (24 - 8 * i as u32)) as u8;
        }
        previous
    }

    /// Whether every pixel of row `y` is background.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn is_line_blank(&self, y: u32) -> bool {
        self.raw_line(y).iter().all(|b| *b == 0)
    }

    /// Whether every pixel of column `x` is background.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width`.
    pub fn is_column_blank(&self, x: u32) -> bool {
        self.topmost(x).is_none()
    }

    /// Packed bytes of row `y`, borrowed.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn raw_line(&self, y: u32) -> &[u8] {
        assert!(
            y < self.height,
            "row {} out of bounds for raster of height {}",
            y,
            self.height
        );
        let start = y as usize * self.stride;
        &self.data[start..start + self.stride]
    }

    /// Copies the packed bytes of row `y` into `out`, reusing its allocation
    pub fn copy_line_into(&self, y: u32, out: &mut Vec<u8>) {
        out.clear();
        out.extend_from_slice(self.raw_line(y));
    }

    /// Column of the first non-background pixel in row `y`
    pub fn leftmost(&self, y: u32) -> Option<u32> {
        if self.is_line_blank(y) {
            return None;
        }
        (0..self.width).find(|&x| self.read(x, y) != 0)
    }

    /// Column of the last non-background pixel in row `y`
    pub fn rightmost(&self, y: u32) -> Option<u32> {
        if self.is_line_blank(y) {
            return None;
        }
        (0..self.width).rev().find(|&x| self.read(x, y) != 0)
    }

    /// Row of the first non-background pixel in column `x`
    pub fn topmost(&self, x: u32) -> Option<u32> {
        self.check_column(x);
        (0..self.height).find(|&y| self.read(x, y) != 0)
    }

    /// Row of the last non-background pixel in column `x`
    pub fn bottommost(&self, x: u32) -> Option<u32> {
        self.check_column(x);
        (0..self.height).rev().find(|&y| self.read(x, y) != 0)
    }

    fn check_column(&self, x: u32) {
        assert!(
            x < self.width,
            "column {} out of bounds for raster of width {}",
            x,
            self.width
        );
    }

    /// Next edge to the right of edge `x` in row `y` where the pixel value
    /// changes.
    ///
    /// Edges are pixel boundaries: pixel `i` spans `[i, i + 1)`. Returns 0
    /// when `x` is left of the raster, `default` when `x >= width`, and
    /// `width` when the value does not change before the right edge.
    pub fn next_change_heading_right(&self, x: i64, y: u32, default: i64) -> i64 {
        let w = self.width as i64;
        if x < 0 {
            return 0;
        }
        if x >= w {
            return default;
        }
        let v = self.read(x as u32, y);
        ((x as u32 + 1)..self.width)
            .find(|&i| self.read(i, y) != v)
            .map_or(w, i64::from)
    }

    /// Next edge to the left of edge `x` in row `y` where the pixel value
    /// changes, comparing against the pixel just left of `x`.
    ///
    /// Returns `width` when `x` is right of the raster, `default` when
    /// `x <= 0`, and 0 when the value does not change before the left edge.
    pub fn next_change_heading_left(&self, x: i64, y: u32, default: i64) -> i64 {
        let w = self.width as i64;
        if x > w {
            return w;
        }
        if x <= 0 {
            return default;
        }
        let v = self.read(x as u32 - 1, y);
        (0..x as u32 - 1)
            .rev()
            .find(|&i| self.read(i, y) != v)
            .map_or(0, |i| i as i64 + 1)
    }

    /// Column counterpart of [`next_change_heading_left`](Self::next_change_heading_left)
    /// walking towards the top edge.
    pub fn next_change_heading_top(&self, x: u32, y: i64, default: i64) -> i64 {
        let h = self.height as i64;
        if y > h {
            return h;
        }
        if y <= 0 {
            return default;
        }
        let v = self.read(x, y as u32 - 1);
        (0..y as u32 - 1)
            .rev()
            .find(|&i| self.read(x, i) != v)
            .map_or(0, |i| i as i64 + 1)
    }

    /// Column counterpart of [`next_change_heading_right`](Self::next_change_heading_right)
    /// walking towards the bottom edge.
    pub fn next_change_heading_bottom(&self, x: u32, y: i64, default: i64) -> i64 {
        let h = self.height as i64;
        if y < 0 {
            return 0;
        }
        if y >= h {
            return default;
        }
        let v = self.read(x, y as u32);
        ((y as u32 + 1)..self.height)
            .find(|&i| self.read(x, i) != v)
            .map_or(h, i64::from)
    }

    /// Projects a raw value onto the 0 (black) ..= 255 (white) grey scale.
    ///
    /// Raw values measure darkness: 0 is white, `max_value()` is black.
    pub fn grey_of(&self, raw: u32) -> u8 {
        let max = self.max_value() as u64;
        let raw = (raw as u64).min(max);
        255 - ((raw * 255 + max / 2) / max) as u8
    }

    /// Inverse of [`grey_of`](Self::grey_of), rounded to the nearest raw value
    pub fn raw_of(&self, grey: u8) -> u32 {
        let max = self.max_value() as u64;
        (((255 - grey) as u64 * max + 127) / 255) as u32
    }
}
