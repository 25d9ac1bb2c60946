//! End-to-end porosity analysis.
//!
//! An analysis counts the object, runs the configured sweep, reduces the
//! result into [`Statistics`] and finally strips debris. Debris removal
//! happens after the statistics are taken and never affects the density.

use crate::error::{Error, PorosityResult};
use crate::imageops_porosity::border::collect_border_colors;
use crate::imageops_porosity::config::{AnalysisConfig, ReferenceSource, SweepKind};
use crate::imageops_porosity::debris::{DebrisFilter, DebrisReport};
use crate::imageops_porosity::raster::{Raster, RasterAccess};
use crate::imageops_porosity::reference::{estimate_reference, ReferenceColor};
use crate::imageops_porosity::statistics::Statistics;
use crate::imageops_porosity::sweep::{
    InteriorSweep, IterativeSweep, SeededSweep, SingleReferenceSweep, SweepStrategy,
};
use crate::imageops_porosity::tolerance::Tolerance;

/// Everything one analysis produced besides the mutated raster
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisReport {
    pub statistics: Statistics,
    /// Pixels erased as background by the sweep
    pub background_pixels: usize,
    /// Non-transparent pixels of the source raster, when one was given
    pub source_pixels: Option<usize>,
    pub debris: DebrisReport,
}

/// Runs porosity analyses with a validated [`AnalysisConfig`]
#[derive(Debug, Clone)]
pub struct PorosityAnalyzer {
    config: AnalysisConfig,
    tolerance: Tolerance,
}

impl PorosityAnalyzer {
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - the configuration does not validate
    pub fn new(config: AnalysisConfig) -> PorosityResult<Self> {
        let tolerance = config.validate()?;
        Ok(Self { config, tolerance })
    }

    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes `raster` in place, sampling references from the raster itself
    ///
    /// # Errors
    ///
    /// * `Error::InvalidDimensions` - the raster is too small for the reference footprint
    /// * `Error::InvalidParameter` - the background seed lies outside the raster
    pub fn analyze(&self, raster: &mut Raster) -> PorosityResult<AnalysisReport> {
        let source = raster.clone();
        let mut report = self.analyze_with_source(&source, raster)?;
        report.source_pixels = None;
        Ok(report)
    }

    /// Analyzes `raster` in place, sampling references from `source`
    ///
    /// `source` is the unprocessed image the background-removed `raster`
    /// was derived from. Reference colors and border seeds are taken from
    /// it, since the border of `raster` is normally transparent.
    ///
    /// # Errors
    ///
    /// * `Error::DimensionMismatch` - `source` and `raster` differ in size
    /// * `Error::InvalidDimensions` - `source` is too small for the reference footprint
    /// * `Error::InvalidParameter` - the background seed lies outside the raster
    pub fn analyze_with_source(
        &self,
        source: &Raster,
        raster: &mut Raster,
    ) -> PorosityResult<AnalysisReport> {
        if source.dimensions() != raster.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: source.dimensions(),
                actual: raster.dimensions(),
            });
        }

        let strategy = self.build_strategy(source)?;
        let valid_pixels = raster.count_valid_pixels();
        let outcome = strategy.sweep(raster)?;
        let remaining_pixels = raster.count_valid_pixels();
        // Background erased by the sweep is not part of the object
        let object_pixels = valid_pixels.saturating_sub(outcome.background_pixels);

        let density_mode = self
            .config
            .density_mode
            .unwrap_or_else(|| strategy.density_mode());
        let statistics = Statistics::compute(
            object_pixels,
            remaining_pixels,
            outcome.cluster_sizes,
            density_mode,
        );

        let debris = DebrisFilter::new(self.config.max_debris_size)
            .with_connectivity(self.config.connectivity)
            .apply(raster);

        log::info!(
            "{} sweep: {} clusters, {} pixels removed, density {:.4}",
            strategy.name(),
            statistics.cluster_count,
            statistics.cluster_sum,
            statistics.density
        );

        Ok(AnalysisReport {
            statistics,
            background_pixels: outcome.background_pixels,
            source_pixels: Some(source.count_valid_pixels()),
            debris,
        })
    }

    fn reference(&self, source: &Raster) -> PorosityResult<ReferenceColor> {
        match self.config.reference {
            ReferenceSource::Estimated(footprint) => estimate_reference(source, footprint),
            ReferenceSource::Fixed(color) => Ok(color),
        }
    }

    fn build_strategy(&self, source: &Raster) -> PorosityResult<Box<dyn SweepStrategy>> {
        let config = &self.config;

        let strategy: Box<dyn SweepStrategy> = match config.strategy {
            SweepKind::SingleReference => {
                let mut sweep = SingleReferenceSweep::new(
                    self.reference(source)?,
                    self.tolerance,
                    config.min_cluster_size,
                    config.connectivity,
                );
                if let Some((x, y)) = config.background_seed {
                    let (width, height) = source.dimensions();
                    if x >= width || y >= height {
                        return Err(Error::InvalidParameter(format!(
                            "background seed ({x}, {y}) is outside the {width}x{height} raster"
                        )));
                    }
                    sweep = sweep.with_background_seed((x, y));
                }
                Box::new(sweep)
            }
            SweepKind::Iterative => Box::new(IterativeSweep::new(
                self.tolerance,
                config.min_cluster_size,
                config.connectivity,
                config.sides,
            )),
            SweepKind::Seeded => Box::new(
                SeededSweep::new(
                    self.tolerance,
                    config.min_cluster_size,
                    config.connectivity,
                    config.sides,
                )
                .with_seeds(collect_border_colors(source, config.sides)),
            ),
            SweepKind::Interior => Box::new(InteriorSweep::new(
                self.reference(source)?,
                self.tolerance,
                config.min_cluster_size,
                config.edge_width,
            )),
        };

        Ok(strategy)
    }
}
