use thiserror::Error;

/// Result type for porosity operations
pub type PorosityResult<T> = Result<T, Error>;

/// Error type for porosity analysis
///
/// Sweeps and flood fills are total over a well-formed raster, so these
/// errors only arise while building rasters, sampling reference colors,
/// or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The raster is smaller than the region an operation needs to sample
    ///
    /// Returned by reference color estimation when the sampling footprint
    /// does not fit inside the image.
    #[error("Raster {width}x{height} is smaller than the required {required_width}x{required_height}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        required_width: u32,
        required_height: u32,
    },

    /// A channel value outside 0..=255 was supplied at raster construction
    #[error("Malformed pixel at ({x}, {y}): channel {channel} has value {value}")]
    MalformedPixel {
        x: u32,
        y: u32,
        channel: usize,
        value: u16,
    },

    /// Two rasters that must line up pixel for pixel have different sizes
    #[error("Raster dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// Raw channel data does not match the declared dimensions
    #[error("Buffer size mismatch: expected {expected} channel values, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Invalid parameter provided to the operation
    ///
    /// This error is returned when a parameter value is invalid
    /// or outside the acceptable range for the operation.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
