use image::{ImageBuffer, Rgb, RgbImage};

use crate::error::{Error, Result};

/// One RGB sample, 0–255 per channel.
pub type Color = [u8; 3];

/// Squared Euclidean distance between two colors, summed over channels.
#[inline]
pub fn squared_dist(a: Color, b: Color) -> i64 {
    let dr = a[0] as i64 - b[0] as i64;
    let dg = a[1] as i64 - b[1] as i64;
    let db = a[2] as i64 - b[2] as i64;
    dr * dr + dg * dg + db * db
}

/// Fixed-size row-major grid of RGB samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Raster {
    /// Raster of `width × height` filled with `fill`.
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_image(img: &RgbImage) -> Self {
        let pixels = img.pixels().map(|p| p.0).collect();
        Self {
            width: img.width(),
            height: img.height(),
            pixels,
        }
    }

    pub fn to_image(&self) -> RgbImage {
        ImageBuffer::from_fn(self.width, self.height, |x, y| Rgb(self.get(x, y)))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    /// Total squared error against `other`, summed over every pixel and channel.
    pub fn squared_error(&self, other: &Raster) -> Result<u64> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch {
                left: self.dimensions(),
                right: other.dimensions(),
            });
        }
        Ok(self
            .pixels
            .iter()
            .zip(&other.pixels)
            .map(|(&a, &b)| squared_dist(a, b) as u64)
            .sum())
    }
}
