use glam::Vec4;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::{GenError, Result};

/// A 2D raster of RGBA samples with components in [0, 1]
///
/// Storage is row-major with row 0 at the top, so pixel `(x, y)` lives at
/// `y * width + x`. Transforms never mutate a grid they were handed; they
/// build a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl PixelGrid {
    /// Wrap an existing pixel buffer, checking that it matches the dimensions
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Vec4>) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(GenError::InvalidDimension(format!(
                "{} pixels do not fill a {}x{} grid",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(PixelGrid { width, height, pixels })
    }

    /// Create a grid where every pixel has the same color
    pub fn filled(width: u32, height: u32, color: Vec4) -> Self {
        PixelGrid {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every pixel in row-major order
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Vec4) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        PixelGrid { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    /// Color at `(x, y)`, or `None` outside the grid
    pub fn get(&self, x: u32, y: u32) -> Option<Vec4> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Overwrite the color at `(x, y)`. Only used on grids the caller owns
    /// as scratch space; returns false when out of bounds.
    pub(crate) fn set(&mut self, x: u32, y: u32, color: Vec4) -> bool {
        if x < self.width && y < self.height {
            let index = self.index(x, y);
            self.pixels[index] = color;
            true
        } else {
            false
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Fail with `InvalidDimension` if either side is zero
    pub fn ensure_non_empty(&self, what: &str) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GenError::InvalidDimension(format!(
                "{} is {}x{}",
                what, self.width, self.height
            )));
        }
        Ok(())
    }

    /// Fail with `InvalidDimension` unless the grid is square and non-empty
    pub fn ensure_square(&self, what: &str) -> Result<()> {
        self.ensure_non_empty(what)?;
        if !self.is_square() {
            return Err(GenError::InvalidDimension(format!(
                "{} must be square, got {}x{}",
                what, self.width, self.height
            )));
        }
        Ok(())
    }

    /// Convert a decoded image into a normalized grid
    pub fn from_image(img: &DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let pixels = rgba
            .pixels()
            .map(|p| {
                Vec4::new(
                    p.0[0] as f32 / 255.0,
                    p.0[1] as f32 / 255.0,
                    p.0[2] as f32 / 255.0,
                    p.0[3] as f32 / 255.0,
                )
            })
            .collect();

        PixelGrid {
            width: rgba.width(),
            height: rgba.height(),
            pixels,
        }
    }

    /// Quantize back to 8-bit RGBA, e.g. for writing a PNG
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let c = self.pixels[self.index(x, y)].clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
            Rgba([
                c.x.round() as u8,
                c.y.round() as u8,
                c.z.round() as u8,
                c.w.round() as u8,
            ])
        })
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) into a pixel grid
pub fn decode(bytes: &[u8]) -> Result<PixelGrid> {
    let img = image::load_from_memory(bytes)?;
    let grid = PixelGrid::from_image(&img);
    grid.ensure_non_empty("decoded image")?;
    Ok(grid)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    /// Encode an RGBA image as PNG bytes
    pub(crate) fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_from_pixels_checks_length() {
        let err = PixelGrid::from_pixels(2, 2, vec![Vec4::ONE; 3]).unwrap_err();
        assert!(matches!(err, GenError::InvalidDimension(_)));

        let grid = PixelGrid::from_pixels(2, 2, vec![Vec4::ONE; 4]).unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let grid = PixelGrid::from_fn(3, 2, |x, y| Vec4::new(x as f32, y as f32, 0.0, 1.0));
        assert_eq!(grid.pixels()[1], Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(grid.pixels()[3], Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(grid.get(2, 1), Some(Vec4::new(2.0, 1.0, 0.0, 1.0)));
        assert_eq!(grid.get(3, 0), None);
    }

    #[test]
    fn test_ensure_square() {
        assert!(PixelGrid::filled(4, 4, Vec4::ONE).ensure_square("grid").is_ok());
        assert!(PixelGrid::filled(4, 3, Vec4::ONE).ensure_square("grid").is_err());
        assert!(PixelGrid::filled(0, 0, Vec4::ONE).ensure_square("grid").is_err());
    }

    #[test]
    fn test_decode_png() {
        let mut img = RgbaImage::from_pixel(3, 2, Rgba([255, 0, 0, 255]));
        img.put_pixel(2, 1, Rgba([0, 0, 255, 0]));

        let grid = decode(&png_bytes(&img)).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(0, 0), Some(Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(grid.get(2, 1), Some(Vec4::new(0.0, 0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, GenError::DecodeError(_)), "got {:?}", err);
    }

    #[test]
    fn test_rgba_image_round_trip_keeps_bytes() {
        let img = RgbaImage::from_fn(4, 4, |x, y| Rgba([x as u8 * 60, y as u8 * 60, 17, 200]));
        let grid = PixelGrid::from_image(&DynamicImage::ImageRgba8(img.clone()));
        assert_eq!(grid.to_rgba_image(), img);
    }
}
