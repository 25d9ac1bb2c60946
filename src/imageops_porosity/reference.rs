use crate::error::{Error, PorosityResult};
use crate::imageops_porosity::raster::RasterAccess;
use image::Rgba;
use itertools::iproduct;

/// Color assumed to represent background and voids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceColor(pub [u8; 3]);

impl ReferenceColor {
    /// Color channels of an RGBA pixel, alpha dropped
    pub fn from_pixel(pixel: Rgba<u8>) -> Self {
        let Rgba([red, green, blue, _]) = pixel;
        Self([red, green, blue])
    }

    pub const fn channels(self) -> [u8; 3] {
        self.0
    }
}

impl From<[u8; 3]> for ReferenceColor {
    fn from(channels: [u8; 3]) -> Self {
        Self(channels)
    }
}

/// Pixels sampled to estimate a [`ReferenceColor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleFootprint {
    /// The four corners, each moved `margin` pixels towards the center
    InsetCorners { margin: u32 },
    /// A `size`×`size` block anchored at the top-left corner
    CornerBlock { size: u32 },
}

impl Default for SampleFootprint {
    fn default() -> Self {
        Self::InsetCorners { margin: 2 }
    }
}

impl SampleFootprint {
    /// Smallest raster (width, height) the footprint fits in
    pub const fn required_extent(self) -> (u32, u32) {
        match self {
            Self::InsetCorners { margin } => {
                let side = margin.saturating_mul(2).saturating_add(1);
                (side, side)
            }
            Self::CornerBlock { size } => (size, size),
        }
    }

    fn coordinates(self, width: u32, height: u32) -> Vec<(u32, u32)> {
        match self {
            Self::InsetCorners { margin } => {
                let right = width - 1 - margin;
                let bottom = height - 1 - margin;
                vec![
                    (margin, margin),
                    (right, margin),
                    (margin, bottom),
                    (right, bottom),
                ]
            }
            Self::CornerBlock { size } => iproduct!(0..size, 0..size)
                .map(|(y, x)| (x, y))
                .collect(),
        }
    }
}

/// Estimates the reference color as the per-channel mean of a footprint
///
/// The mean is truncated towards zero. Alpha is ignored, so transparent
/// samples still contribute their color channels.
///
/// # Errors
///
/// * `Error::InvalidParameter` - a zero sized corner block
/// * `Error::InvalidDimensions` - the raster is smaller than the footprint
pub fn estimate_reference<R>(raster: &R, footprint: SampleFootprint) -> PorosityResult<ReferenceColor>
where
    R: RasterAccess + ?Sized,
{
    if footprint == (SampleFootprint::CornerBlock { size: 0 }) {
        return Err(Error::InvalidParameter(
            "corner block sample size must be positive".to_string(),
        ));
    }

    let (width, height) = raster.extent();
    let (required_width, required_height) = footprint.required_extent();
    if width < required_width || height < required_height {
        return Err(Error::InvalidDimensions {
            width,
            height,
            required_width,
            required_height,
        });
    }

    let samples = footprint.coordinates(width, height);
    let mut sums = [0u64; 3];
    for &(x, y) in &samples {
        let pixel = raster.pixel_at(x, y);
        for (sum, &channel) in sums.iter_mut().zip(&pixel.0[..3]) {
            *sum += u64::from(channel);
        }
    }

    let count = samples.len() as u64;
    Ok(ReferenceColor(sums.map(|sum| (sum / count) as u8)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imageops_porosity::raster::Raster;
    use image::ImageBuffer;

    fn corner_marked_raster() -> Raster {
        let mut raster: Raster = ImageBuffer::from_pixel(8, 6, Rgba([200, 200, 200, 255]));
        raster.put_pixel(2, 2, Rgba([10, 20, 30, 255]));
        raster.put_pixel(5, 2, Rgba([11, 21, 31, 255]));
        raster.put_pixel(2, 3, Rgba([12, 22, 32, 255]));
        raster.put_pixel(5, 3, Rgba([13, 23, 34, 0]));
        raster
    }

    #[test]
    fn inset_corners_average_with_truncation() {
        let raster = corner_marked_raster();
        let reference =
            estimate_reference(&raster, SampleFootprint::InsetCorners { margin: 2 }).unwrap();
        // (10+11+12+13)/4 = 11.5, (20+21+22+23)/4 = 21.5, (30+31+32+34)/4 = 31.75
        assert_eq!(reference, ReferenceColor([11, 21, 31]));
    }

    #[test]
    fn corner_block_averages_top_left_square() {
        let mut raster: Raster = ImageBuffer::from_pixel(4, 4, Rgba([100, 100, 100, 255]));
        raster.put_pixel(0, 0, Rgba([0, 50, 101, 255]));
        raster.put_pixel(1, 1, Rgba([3, 50, 100, 255]));

        let reference =
            estimate_reference(&raster, SampleFootprint::CornerBlock { size: 2 }).unwrap();
        // (0+100+100+3)/4 = 50, (50+100+100+50)/4 = 75, (101+100+100+100)/4 = 100
        assert_eq!(reference, ReferenceColor([50, 75, 100]));
    }

    #[test]
    fn footprint_larger_than_raster_is_rejected() {
        let raster: Raster = ImageBuffer::new(4, 10);
        let result = estimate_reference(&raster, SampleFootprint::InsetCorners { margin: 2 });
        assert_eq!(
            result.unwrap_err(),
            Error::InvalidDimensions {
                width: 4,
                height: 10,
                required_width: 5,
                required_height: 5,
            }
        );
    }

    #[test]
    fn zero_sized_block_is_rejected() {
        let raster: Raster = ImageBuffer::new(4, 4);
        let result = estimate_reference(&raster, SampleFootprint::CornerBlock { size: 0 });
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn single_pixel_raster_with_zero_margin() {
        let raster: Raster = ImageBuffer::from_pixel(1, 1, Rgba([7, 8, 9, 255]));
        let reference =
            estimate_reference(&raster, SampleFootprint::InsetCorners { margin: 0 }).unwrap();
        assert_eq!(reference, ReferenceColor([7, 8, 9]));
    }
}
