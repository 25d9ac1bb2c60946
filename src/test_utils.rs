//! Test utilities for imageops-porosity
//!
//! Shared raster fixtures for the unit tests. Only compiled for tests.

use crate::imageops_porosity::raster::{Raster, RasterAccess};
use crate::Image;
use image::{ImageBuffer, Rgba};

/// Opaque black, the usual void color in fixtures
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Opaque white, the usual object color in fixtures
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Creates a test RGBA image with predefined pixel values for testing.
///
/// This function creates a 2x2 test image with known pixel values including alpha:
/// - (0,0): [200, 150, 100, 255] (opaque)
/// - (1,0): [100, 200, 150, 128] (semi-transparent)
/// - (0,1): [150, 100, 200, 64]  (more transparent)
/// - (1,1): [50, 75, 25, 0]      (fully transparent)
pub fn create_test_rgba_image() -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgba([200, 150, 100, 255]));
    image.put_pixel(1, 0, Rgba([100, 200, 150, 128]));
    image.put_pixel(0, 1, Rgba([150, 100, 200, 64]));
    image.put_pixel(1, 1, Rgba([50, 75, 25, 0]));
    image
}

/// Paints a `size.0`×`size.1` rectangle with its top-left corner at `origin`
///
/// Parts falling outside the raster are clipped.
pub fn fill_rect(raster: &mut Raster, origin: (u32, u32), size: (u32, u32), color: Rgba<u8>) {
    let (width, height) = raster.dimensions();
    let x_end = origin.0.saturating_add(size.0).min(width);
    let y_end = origin.1.saturating_add(size.1).min(height);
    for y in origin.1..y_end {
        for x in origin.0..x_end {
            raster.put_pixel(x, y, color);
        }
    }
}

/// Creates a white opaque raster holding one black square
///
/// The square has side `side` and its top-left corner at `origin`.
pub fn create_square_raster(width: u32, height: u32, origin: (u32, u32), side: u32) -> Raster {
    let mut raster: Raster = ImageBuffer::from_pixel(width, height, WHITE);
    fill_rect(&mut raster, origin, (side, side), BLACK);
    raster
}

/// Raster wrapper that records every erasure in call order
pub struct RecordingRaster {
    inner: Raster,
    erased: Vec<(u32, u32)>,
}

impl RecordingRaster {
    pub fn new(inner: Raster) -> Self {
        Self {
            inner,
            erased: Vec::new(),
        }
    }

    pub fn erased(&self) -> &[(u32, u32)] {
        &self.erased
    }

    pub fn into_inner(self) -> Raster {
        self.inner
    }
}

impl RasterAccess for RecordingRaster {
    fn extent(&self) -> (u32, u32) {
        self.inner.extent()
    }

    fn pixel_at(&self, x: u32, y: u32) -> Rgba<u8> {
        self.inner.pixel_at(x, y)
    }

    fn erase_at(&mut self, x: u32, y: u32) {
        self.erased.push((x, y));
        self.inner.erase_at(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_test_rgba_image_with_valid_input_creates_image() {
        let image = create_test_rgba_image();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgba([200, 150, 100, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgba([50, 75, 25, 0]));
    }

    #[test]
    fn fill_rect_clips_to_the_raster() {
        let mut raster: Raster = ImageBuffer::from_pixel(4, 4, WHITE);
        fill_rect(&mut raster, (2, 2), (5, 5), BLACK);

        assert_eq!(raster.pixels().filter(|&&p| p == BLACK).count(), 4);
        assert_eq!(*raster.get_pixel(1, 1), WHITE);
    }

    #[test]
    fn create_square_raster_places_square() {
        let raster = create_square_raster(10, 10, (4, 4), 3);
        assert_eq!(*raster.get_pixel(4, 4), BLACK);
        assert_eq!(*raster.get_pixel(6, 6), BLACK);
        assert_eq!(*raster.get_pixel(7, 7), WHITE);
        assert_eq!(raster.pixels().filter(|&&p| p == BLACK).count(), 9);
    }

    #[test]
    fn recording_raster_tracks_erasures() {
        let mut recorder = RecordingRaster::new(create_square_raster(3, 3, (0, 0), 1));
        recorder.erase_at(2, 1);
        recorder.erase_at(0, 0);

        assert_eq!(recorder.erased(), &[(2, 1), (0, 0)]);
        assert_eq!(recorder.into_inner().count_valid_pixels(), 7);
    }
}
