mod error;
mod imageops_porosity;
#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use error::{Error, PorosityResult};
pub use imageops_porosity::analyzer::{AnalysisReport, PorosityAnalyzer};
pub use imageops_porosity::border::{
    collect_border_colors, first_border_pixel, BorderPixel, BorderSides, BORDER_INSET,
};
pub use imageops_porosity::config::{AnalysisConfig, ReferenceSource, SweepKind};
pub use imageops_porosity::debris::{DebrisFilter, DebrisReport};
pub use imageops_porosity::flood_fill::{
    erase_cluster, flood_fill, Cluster, ClusterEngine, Connectivity, FillMode, FillOutcome,
    VisitedMask,
};
pub use imageops_porosity::raster::{
    raster_from_channels, removed_mask, ChannelLayout, IntoRaster, Raster, RasterAccess, ERASED,
};
pub use imageops_porosity::reference::{estimate_reference, ReferenceColor, SampleFootprint};
pub use imageops_porosity::statistics::{DensityMode, Statistics, EMPTY_DENSITY};
pub use imageops_porosity::sweep::{
    forbidden_mask, interior_mask, InteriorSweep, IterativeSweep, SeededSweep,
    SingleReferenceSweep, SweepOutcome, SweepStrategy,
};
pub use imageops_porosity::tolerance::{
    in_tolerance, Opaque, PixelClassifier, Restricted, Tolerance, ToleranceBand,
};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
