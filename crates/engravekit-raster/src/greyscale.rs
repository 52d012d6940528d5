//! Greyscale images backed by a [`PixelBuffer`]
//!
//! Grey values follow the usual convention (0 is black, 255 is white) while
//! the underlying buffer stores darkness, so a white image is an all-zero
//! buffer and blank-line detection stays a byte scan.

use crate::error::{RasterError, RasterResult};
use crate::pixel_buffer::PixelBuffer;
use image::GrayImage;

/// Read/write access to an image in 0 (black) ..= 255 (white) grey values
///
/// Accessors panic when `(x, y)` lies outside the image, like
/// `image::ImageBuffer::get_pixel`.
pub trait GreyscaleImage {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Grey value of pixel `(x, y)`
    fn grey(&self, x: u32, y: u32) -> u8;

    /// Sets pixel `(x, y)` to the nearest representable grey value
    fn set_grey(&mut self, x: u32, y: u32, grey: u8);

    /// Sets every pixel from `f(x, y)`
    fn fill_with<F>(&mut self, mut f: F)
    where
        F: FnMut(u32, u32) -> u8,
        Self: Sized,
    {
        for y in 0..self.height() {
            for x in 0..self.width() {
                self.set_grey(x, y, f(x, y));
            }
        }
    }
}

/// Greyscale raster with `BITS` bits per pixel (1 to 8)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreyRaster<const BITS: u8> {
    buffer: PixelBuffer,
}

/// Two-level raster: every pixel is black or white
pub type BlackWhiteImage = GreyRaster<1>;

/// Full 8-bit greyscale raster
pub type GreyImage = GreyRaster<8>;

impl<const BITS: u8> GreyRaster<BITS> {
    const VALID_DEPTH: () = assert!(
        BITS >= 1 && BITS <= 8,
        "grey rasters support 1 to 8 bits per pixel"
    );

    /// Creates an all-white raster
    pub fn new(width: u32, height: u32) -> RasterResult<Self> {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_DEPTH;
        Ok(Self {
            buffer: PixelBuffer::new(width, height, BITS as u32)?,
        })
    }

    /// Wraps an existing buffer of matching depth
    pub fn from_buffer(buffer: PixelBuffer) -> RasterResult<Self> {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_DEPTH;
        if buffer.bits_per_pixel() != BITS as u32 {
            return Err(RasterError::BitDepthMismatch {
                expected: BITS as u32,
                actual: buffer.bits_per_pixel(),
            });
        }
        Ok(Self { buffer })
    }

    /// Quantises an 8-bit luma image to this depth
    pub fn from_luma(image: &GrayImage) -> RasterResult<Self> {
        let mut raster = Self::new(image.width(), image.height())?;
        for (x, y, pixel) in image.enumerate_pixels() {
            raster.set_grey(x, y, pixel.0[0]);
        }
        Ok(raster)
    }

    /// Renders the raster back into an 8-bit luma image
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            image::Luma([self.grey(x, y)])
        })
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }
}

impl<const BITS: u8> GreyscaleImage for GreyRaster<BITS> {
    fn width(&self) -> u32 {
        self.buffer.width()
    }

    fn height(&self) -> u32 {
        self.buffer.height()
    }

    fn grey(&self, x: u32, y: u32) -> u8 {
        self.buffer.grey_of(self.buffer.pixel(x, y))
    }

    fn set_grey(&mut self, x: u32, y: u32, grey: u8) {
        let raw = self.buffer.raw_of(grey);
        self.buffer.put_pixel(x, y, raw);
    }
}

impl GreyRaster<1> {
    pub fn is_black(&self, x: u32, y: u32) -> bool {
        self.buffer.pixel(x, y) != 0
    }

    pub fn set_black(&mut self, x: u32, y: u32, black: bool) {
        self.buffer.put_pixel(x, y, black as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_white() {
        let img = GreyImage::new(3, 2).unwrap();
        assert_eq!(img.grey(2, 1), 255);
        assert!(img.buffer().is_line_blank(0));
    }

    #[test]
    fn test_black_white_projection() {
        let mut img = BlackWhiteImage::new(4, 1).unwrap();
        img.set_black(1, 0, true);
        assert!(img.is_black(1, 0));
        assert_eq!(img.grey(1, 0), 0);
        assert_eq!(img.grey(0, 0), 255);

        img.set_grey(2, 0, 100);
        img.set_grey(3, 0, 200);
        assert!(img.is_black(2, 0));
        assert!(!img.is_black(3, 0));

        img.set_black(1, 0, false);
        assert_eq!(img.grey(1, 0), 255);
    }

    #[test]
    fn test_grey_round_trip_8bit() {
        let mut img = GreyImage::new(16, 16).unwrap();
        img.fill_with(|x, y| (y * 16 + x) as u8);
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(img.grey(x, y), (y * 16 + x) as u8);
            }
        }
    }

    #[test]
    fn test_quantised_depth() {
        let mut img = GreyRaster::<2>::new(1, 1).unwrap();
        img.set_grey(0, 0, 0);
        assert_eq!(img.grey(0, 0), 0);
        img.set_grey(0, 0, 90);
        assert_eq!(img.grey(0, 0), 85);
        img.set_grey(0, 0, 250);
        assert_eq!(img.grey(0, 0), 255);
    }

    #[test]
    fn test_from_buffer_checks_depth() {
        let buf = PixelBuffer::new(2, 2, 4).unwrap();
        assert!(matches!(
            GreyImage::from_buffer(buf.clone()),
            Err(RasterError::BitDepthMismatch {
                expected: 8,
                actual: 4
            })
        ));
        assert!(GreyRaster::<4>::from_buffer(buf).is_ok());
    }

    #[test]
    fn test_luma_conversion() {
        let luma = GrayImage::from_fn(3, 1, |x, _| image::Luma([(x * 120) as u8]));
        let img = BlackWhiteImage::from_luma(&luma).unwrap();
        assert!(img.is_black(0, 0));
        assert!(img.is_black(1, 0));
        assert!(!img.is_black(2, 0));

        let back = img.to_luma();
        assert_eq!(back.get_pixel(2, 0).0[0], 255);
        assert_eq!(back.get_pixel(0, 0).0[0], 0);
    }
}
