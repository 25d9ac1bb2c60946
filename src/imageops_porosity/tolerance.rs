use crate::error::{Error, PorosityResult};
use crate::imageops_porosity::reference::ReferenceColor;
use image::Rgba;

/// Multiplicative tolerance fraction in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
pub struct Tolerance(f64);

impl Tolerance {
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - the fraction is NaN or outside `[0, 1]`
    pub fn new(fraction: f64) -> PorosityResult<Self> {
        if (0.0..=1.0).contains(&fraction) {
            Ok(Self(fraction))
        } else {
            Err(Error::InvalidParameter(format!(
                "tolerance must be within [0, 1], got {fraction}"
            )))
        }
    }

    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Tolerance {
    type Error = Error;

    fn try_from(fraction: f64) -> PorosityResult<Self> {
        Self::new(fraction)
    }
}

impl From<Tolerance> for f64 {
    fn from(tolerance: Tolerance) -> Self {
        tolerance.0
    }
}

/// Decides whether a pixel belongs to the cluster being grown
pub trait PixelClassifier {
    fn accepts(&self, pixel: Rgba<u8>) -> bool;

    /// Position aware variant used by the flood-fill engine
    ///
    /// Defaults to [`PixelClassifier::accepts`]; region restricted
    /// classifiers override it.
    fn accepts_at(&self, _x: u32, _y: u32, pixel: Rgba<u8>) -> bool {
        self.accepts(pixel)
    }
}

/// Inclusive per-channel color range around a reference color
///
/// Bounds are `reference * (1 - t)` and `reference * (1 + t)`, truncated
/// to integers, the upper bound saturating at 255. The width therefore
/// grows with the brightness of each reference channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToleranceBand {
    min: [u8; 3],
    max: [u8; 3],
}

impl ToleranceBand {
    pub fn new(reference: ReferenceColor, tolerance: Tolerance) -> Self {
        let t = tolerance.get();
        let scale = |factor: f64| {
            reference
                .channels()
                .map(|channel| (f64::from(channel) * factor).min(255.0) as u8)
        };
        Self {
            min: scale(1.0 - t),
            max: scale(1.0 + t),
        }
    }

    pub const fn min(&self) -> [u8; 3] {
        self.min
    }

    pub const fn max(&self) -> [u8; 3] {
        self.max
    }

    /// Whether every channel of `other` lies inside this band
    pub fn contains_band(&self, other: &Self) -> bool {
        (0..3).all(|i| self.min[i] <= other.min[i] && other.max[i] <= self.max[i])
    }
}

/// True iff all three color channels lie in `band` and alpha is non-zero
#[inline]
pub fn in_tolerance(pixel: Rgba<u8>, band: &ToleranceBand) -> bool {
    let Rgba([red, green, blue, alpha]) = pixel;
    alpha > 0
        && [red, green, blue]
            .iter()
            .zip(band.min.iter().zip(&band.max))
            .all(|(&channel, (&low, &high))| (low..=high).contains(&channel))
}

impl PixelClassifier for ToleranceBand {
    #[inline]
    fn accepts(&self, pixel: Rgba<u8>) -> bool {
        in_tolerance(pixel, self)
    }
}

/// Accepts every pixel with non-zero alpha regardless of color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Opaque;

impl PixelClassifier for Opaque {
    #[inline]
    fn accepts(&self, pixel: Rgba<u8>) -> bool {
        pixel[3] != 0
    }
}

/// Restricts an inner classifier to positions allowed by a predicate
pub struct Restricted<C, F> {
    inner: C,
    allowed: F,
}

impl<C, F> Restricted<C, F>
where
    C: PixelClassifier,
    F: Fn(u32, u32) -> bool,
{
    pub const fn new(inner: C, allowed: F) -> Self {
        Self { inner, allowed }
    }
}

impl<C, F> PixelClassifier for Restricted<C, F>
where
    C: PixelClassifier,
    F: Fn(u32, u32) -> bool,
{
    fn accepts(&self, pixel: Rgba<u8>) -> bool {
        self.inner.accepts(pixel)
    }

    fn accepts_at(&self, x: u32, y: u32, pixel: Rgba<u8>) -> bool {
        (self.allowed)(x, y) && self.inner.accepts_at(x, y, pixel)
    }
}

impl<C: PixelClassifier + ?Sized> PixelClassifier for &C {
    fn accepts(&self, pixel: Rgba<u8>) -> bool {
        (**self).accepts(pixel)
    }

    fn accepts_at(&self, x: u32, y: u32, pixel: Rgba<u8>) -> bool {
        (**self).accepts_at(x, y, pixel)
    }
}
