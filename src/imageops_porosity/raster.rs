use crate::error::{Error, PorosityResult};
use crate::Image;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, Rgba};
use itertools::iproduct;

/// RGBA raster every analysis operates on
pub type Raster = Image<Rgba<u8>>;

/// Sentinel written into erased pixels
pub const ERASED: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Channel layout of raw pixel data handed to [`raster_from_channels`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Three channels per pixel, treated as fully opaque
    Rgb,
    /// Four channels per pixel
    Rgba,
}

impl ChannelLayout {
    const fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Coordinate access to a W×H grid of RGBA pixels
///
/// The flood-fill engine only talks to rasters through this trait, so a
/// test double can observe which pixels were read or erased without the
/// engine knowing. Coordinates outside the grid are a contract violation
/// and panic, as `ImageBuffer::get_pixel` does.
pub trait RasterAccess {
    /// Width and height of the grid
    fn extent(&self) -> (u32, u32);

    /// Pixel at `(x, y)`
    fn pixel_at(&self, x: u32, y: u32) -> Rgba<u8>;

    /// Forces the pixel at `(x, y)` to the [`ERASED`] sentinel
    fn erase_at(&mut self, x: u32, y: u32);

    /// Whether the pixel at `(x, y)` has zero alpha
    fn is_transparent_at(&self, x: u32, y: u32) -> bool {
        self.pixel_at(x, y)[3] == 0
    }

    /// Number of pixels with non-zero alpha
    fn count_valid_pixels(&self) -> usize {
        let (width, height) = self.extent();
        iproduct!(0..height, 0..width)
            .filter(|&(y, x)| !self.is_transparent_at(x, y))
            .count()
    }
}

impl RasterAccess for Raster {
    #[inline]
    fn extent(&self) -> (u32, u32) {
        self.dimensions()
    }

    #[inline]
    fn pixel_at(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.get_pixel(x, y)
    }

    #[inline]
    fn erase_at(&mut self, x: u32, y: u32) {
        self.put_pixel(x, y, ERASED);
    }

    fn count_valid_pixels(&self) -> usize {
        self.pixels().filter(|pixel| pixel[3] != 0).count()
    }
}

/// Normalizes decoded images into an RGBA [`Raster`]
///
/// Three channel inputs become fully opaque.
pub trait IntoRaster {
    fn into_raster(self) -> Raster;
}

impl IntoRaster for Raster {
    fn into_raster(self) -> Raster {
        self
    }
}

impl IntoRaster for Image<Rgb<u8>> {
    fn into_raster(self) -> Raster {
        ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            let Rgb([red, green, blue]) = *self.get_pixel(x, y);
            Rgba([red, green, blue, u8::MAX])
        })
    }
}

impl IntoRaster for DynamicImage {
    fn into_raster(self) -> Raster {
        self.into_rgba8()
    }
}

/// Builds a raster from raw channel values
///
/// Values are accepted as `u16` so that out-of-range input coming from
/// wider sources is reported instead of silently truncated.
///
/// # Errors
///
/// * `Error::BufferSizeMismatch` - `channels.len()` is not `width * height * layout channels`
/// * `Error::MalformedPixel` - a channel value exceeds 255
pub fn raster_from_channels(
    width: u32,
    height: u32,
    layout: ChannelLayout,
    channels: &[u16],
) -> PorosityResult<Raster> {
    let stride = layout.channels();
    let expected = width as usize * height as usize * stride;
    if channels.len() != expected {
        return Err(Error::BufferSizeMismatch {
            expected,
            actual: channels.len(),
        });
    }

    if let Some(index) = channels.iter().position(|&value| value > u16::from(u8::MAX)) {
        let pixel_index = index / stride;
        return Err(Error::MalformedPixel {
            x: (pixel_index % width as usize) as u32,
            y: (pixel_index / width as usize) as u32,
            channel: index % stride,
            value: channels[index],
        });
    }

    let data = channels
        .chunks_exact(stride)
        .flat_map(|pixel| {
            // Every value was range checked above
            let channel = |i: usize| pixel[i] as u8;
            let alpha = if stride == 4 { channel(3) } else { u8::MAX };
            [channel(0), channel(1), channel(2), alpha]
        })
        .collect();

    ImageBuffer::from_raw(width, height, data).ok_or(Error::BufferSizeMismatch {
        expected,
        actual: channels.len(),
    })
}

/// Marks the pixels that were opaque in `before` and are transparent in `after`
///
/// Removed pixels are 255 in the returned mask, everything else 0.
///
/// # Errors
///
/// * `Error::DimensionMismatch` - the two rasters differ in size
pub fn removed_mask(before: &Raster, after: &Raster) -> PorosityResult<GrayImage> {
    if before.dimensions() != after.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: before.dimensions(),
            actual: after.dimensions(),
        });
    }

    Ok(ImageBuffer::from_fn(before.width(), before.height(), |x, y| {
        let removed = before.get_pixel(x, y)[3] != 0 && after.get_pixel(x, y)[3] == 0;
        Luma([if removed { u8::MAX } else { 0 }])
    }))
}
