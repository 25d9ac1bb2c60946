use crate::imageops_porosity::raster::RasterAccess;
use crate::imageops_porosity::reference::ReferenceColor;
use image::Rgba;
use itertools::Itertools;

/// Distance of the scanned strips from the image edge
pub const BORDER_INSET: u32 = 2;

/// Border strips taking part in a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderSides {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl BorderSides {
    pub const fn all() -> Self {
        Self {
            top: true,
            bottom: true,
            left: true,
            right: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            top: false,
            bottom: false,
            left: false,
            right: false,
        }
    }

    pub const fn any(&self) -> bool {
        self.top || self.bottom || self.left || self.right
    }
}

impl Default for BorderSides {
    fn default() -> Self {
        Self::all()
    }
}

/// A non-transparent pixel found on a border strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderPixel {
    pub x: u32,
    pub y: u32,
    pub color: Rgba<u8>,
}

/// Coordinates of the enabled strips in scan order
///
/// Columns are walked first, visiting the top then the bottom strip at each
/// x; rows follow, visiting the left then the right strip at each y. Rasters
/// too small for the inset produce no coordinates.
fn strip_coordinates(width: u32, height: u32, sides: BorderSides) -> impl Iterator<Item = (u32, u32)> {
    let columns = BORDER_INSET..width.saturating_sub(BORDER_INSET);
    let rows = BORDER_INSET..height.saturating_sub(BORDER_INSET);
    let has_rows = height > BORDER_INSET;
    let has_columns = width > BORDER_INSET;
    let top = BORDER_INSET;
    let bottom = height.saturating_sub(BORDER_INSET + 1);
    let left = BORDER_INSET;
    let right = width.saturating_sub(BORDER_INSET + 1);

    let horizontal = columns.flat_map(move |x| {
        let top_strip = (sides.top && has_rows).then_some((x, top));
        let bottom_strip = (sides.bottom && has_rows).then_some((x, bottom));
        top_strip.into_iter().chain(bottom_strip)
    });
    let vertical = rows.flat_map(move |y| {
        let left_strip = (sides.left && has_columns).then_some((left, y));
        let right_strip = (sides.right && has_columns).then_some((right, y));
        left_strip.into_iter().chain(right_strip)
    });

    horizontal.chain(vertical)
}

/// First non-transparent pixel on the enabled border strips
pub fn first_border_pixel<R>(raster: &R, sides: BorderSides) -> Option<BorderPixel>
where
    R: RasterAccess + ?Sized,
{
    let (width, height) = raster.extent();
    strip_coordinates(width, height, sides).find_map(|(x, y)| {
        let color = raster.pixel_at(x, y);
        (color[3] != 0).then_some(BorderPixel { x, y, color })
    })
}

/// Distinct colors of the non-transparent pixels on the enabled strips
///
/// Colors are deduplicated by their RGB channels and returned in the order
/// they were first met.
pub fn collect_border_colors<R>(raster: &R, sides: BorderSides) -> Vec<ReferenceColor>
where
    R: RasterAccess + ?Sized,
{
    let (width, height) = raster.extent();
    strip_coordinates(width, height, sides)
        .map(|(x, y)| raster.pixel_at(x, y))
        .filter(|pixel| pixel[3] != 0)
        .map(ReferenceColor::from_pixel)
        .unique()
        .collect()
}
