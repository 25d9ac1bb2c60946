/// Density reported when there is nothing to measure
pub const EMPTY_DENSITY: f64 = 1.0;

/// Reference count the remaining pixels are divided by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DensityMode {
    /// `remaining / object pixels before removal`
    ObjectRelative,
    /// `remaining / (remaining + sum of cluster sizes)`
    RecoveredRelative,
}

/// Summary of one analysis run, in pixel counts
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statistics {
    /// Non-transparent pixels before clusters were removed
    pub object_pixels: usize,
    /// Non-transparent pixels after clusters were removed
    pub remaining_pixels: usize,
    pub cluster_count: usize,
    pub cluster_sizes: Vec<usize>,
    pub cluster_sum: usize,
    /// Mean cluster size, 0 without clusters
    pub mean_cluster_size: f64,
    /// `object_pixels - cluster_sum`, saturating at 0
    pub net_object_size: usize,
    pub density: f64,
    pub density_mode: DensityMode,
}

impl Statistics {
    /// Reduces pixel counts and accepted cluster sizes into a summary
    ///
    /// A zero denominator yields [`EMPTY_DENSITY`].
    pub fn compute(
        object_pixels: usize,
        remaining_pixels: usize,
        cluster_sizes: Vec<usize>,
        density_mode: DensityMode,
    ) -> Self {
        let cluster_count = cluster_sizes.len();
        let cluster_sum: usize = cluster_sizes.iter().sum();
        let mean_cluster_size = if cluster_count == 0 {
            0.0
        } else {
            cluster_sum as f64 / cluster_count as f64
        };

        let denominator = match density_mode {
            DensityMode::ObjectRelative => object_pixels,
            DensityMode::RecoveredRelative => remaining_pixels + cluster_sum,
        };
        let density = if denominator == 0 {
            EMPTY_DENSITY
        } else {
            remaining_pixels as f64 / denominator as f64
        };

        Self {
            object_pixels,
            remaining_pixels,
            cluster_count,
            cluster_sizes,
            cluster_sum,
            mean_cluster_size,
            net_object_size: object_pixels.saturating_sub(cluster_sum),
            density,
            density_mode,
        }
    }

    /// Share of the object occupied by removed clusters
    pub fn porosity(&self) -> f64 {
        1.0 - self.density
    }
}
