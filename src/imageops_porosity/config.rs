use crate::error::{Error, PorosityResult};
use crate::imageops_porosity::border::BorderSides;
use crate::imageops_porosity::flood_fill::Connectivity;
use crate::imageops_porosity::reference::{ReferenceColor, SampleFootprint};
use crate::imageops_porosity::statistics::DensityMode;
use crate::imageops_porosity::tolerance::Tolerance;

/// Sweep strategy selected by [`AnalysisConfig`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SweepKind {
    /// One reference color, size-gated fills
    #[default]
    SingleReference,
    /// Reference re-derived from the border until it is transparent
    Iterative,
    /// Border colors as seeds, edge-guarded fills
    Seeded,
    /// Single reference restricted to the eroded object interior
    Interior,
}

/// Where the reference color comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ReferenceSource {
    /// Mean of a footprint on the source raster
    Estimated(SampleFootprint),
    /// A known color
    Fixed(ReferenceColor),
}

impl Default for ReferenceSource {
    fn default() -> Self {
        Self::Estimated(SampleFootprint::default())
    }
}

/// Parameters of one porosity analysis
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisConfig {
    /// Tolerance fraction in `[0, 1]`
    pub tolerance: f64,
    /// Clusters smaller than this are kept
    pub min_cluster_size: usize,
    /// Fragments smaller than this are removed as debris
    pub max_debris_size: usize,
    pub sides: BorderSides,
    pub connectivity: Connectivity,
    pub strategy: SweepKind,
    pub reference: ReferenceSource,
    /// Overrides the strategy's own density formula
    pub density_mode: Option<DensityMode>,
    /// Width of the outline band the interior sweep leaves alone
    pub edge_width: u8,
    /// Region erased as background before a single-reference sweep
    pub background_seed: Option<(u32, u32)>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            min_cluster_size: 30,
            max_debris_size: 50,
            sides: BorderSides::all(),
            connectivity: Connectivity::Eight,
            strategy: SweepKind::SingleReference,
            reference: ReferenceSource::default(),
            density_mode: None,
            edge_width: 35,
            background_seed: None,
        }
    }
}

impl AnalysisConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub const fn with_min_cluster_size(mut self, min_cluster_size: usize) -> Self {
        self.min_cluster_size = min_cluster_size;
        self
    }

    pub const fn with_max_debris_size(mut self, max_debris_size: usize) -> Self {
        self.max_debris_size = max_debris_size;
        self
    }

    pub const fn with_sides(mut self, sides: BorderSides) -> Self {
        self.sides = sides;
        self
    }

    pub const fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub const fn with_strategy(mut self, strategy: SweepKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub const fn with_reference(mut self, reference: ReferenceSource) -> Self {
        self.reference = reference;
        self
    }

    pub const fn with_density_mode(mut self, density_mode: DensityMode) -> Self {
        self.density_mode = Some(density_mode);
        self
    }

    pub const fn with_edge_width(mut self, edge_width: u8) -> Self {
        self.edge_width = edge_width;
        self
    }

    pub const fn with_background_seed(mut self, seed: (u32, u32)) -> Self {
        self.background_seed = Some(seed);
        self
    }

    /// Checks every parameter and returns the validated tolerance
    ///
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - the tolerance is outside `[0, 1]`, a
    ///   size threshold is zero, or the sample block is empty
    pub fn validate(&self) -> PorosityResult<Tolerance> {
        let tolerance = Tolerance::new(self.tolerance)?;

        if self.min_cluster_size == 0 {
            return Err(Error::InvalidParameter(
                "min_cluster_size must be at least 1".to_string(),
            ));
        }
        if self.max_debris_size == 0 {
            return Err(Error::InvalidParameter(
                "max_debris_size must be at least 1".to_string(),
            ));
        }
        if self.reference == ReferenceSource::Estimated(SampleFootprint::CornerBlock { size: 0 }) {
            return Err(Error::InvalidParameter(
                "reference sample block must not be empty".to_string(),
            ));
        }

        Ok(tolerance)
    }
}
