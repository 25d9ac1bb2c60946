use crate::imageops_porosity::flood_fill::{erase_cluster, ClusterEngine, Connectivity, VisitedMask};
use crate::imageops_porosity::raster::RasterAccess;
use crate::imageops_porosity::tolerance::Opaque;
use itertools::iproduct;

/// What a debris pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebrisReport {
    pub fragments_removed: usize,
    pub pixels_removed: usize,
}

/// Erases non-transparent fragments smaller than a size floor
///
/// Components are found regardless of color. Running the filter twice
/// removes nothing the second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebrisFilter {
    max_debris_size: usize,
    connectivity: Connectivity,
}

impl DebrisFilter {
    /// Fragments with fewer than `max_debris_size` pixels are erased
    pub const fn new(max_debris_size: usize) -> Self {
        Self {
            max_debris_size,
            connectivity: Connectivity::Eight,
        }
    }

    pub const fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn apply<R>(&self, raster: &mut R) -> DebrisReport
    where
        R: RasterAccess + ?Sized,
    {
        let (width, height) = raster.extent();
        let mut engine = ClusterEngine::new(width, height, self.connectivity);
        let mut seen = VisitedMask::new(width, height);
        let mut report = DebrisReport::default();

        for (y, x) in iproduct!(0..height, 0..width) {
            if seen.is_marked(x, y) || raster.is_transparent_at(x, y) {
                continue;
            }

            let fragment = engine.discover(&*raster, (x, y), &Opaque, false);
            if fragment.size() < self.max_debris_size {
                erase_cluster(raster, &fragment);
                report.fragments_removed += 1;
                report.pixels_removed += fragment.size();
            } else {
                for &(fx, fy) in fragment.pixels() {
                    seen.mark(fx, fy);
                }
            }
        }

        if report.fragments_removed > 0 {
            log::debug!(
                "removed {} debris fragments ({} pixels)",
                report.fragments_removed,
                report.pixels_removed
            );
        }
        report
    }
}
