//! Sweep strategies.
//!
//! Every strategy walks a raster, erases the clusters it accepts and reports
//! their sizes. They share [`SweepStrategy`] so the analyzer can pick one
//! from configuration.

use crate::error::PorosityResult;
use crate::imageops_porosity::border::{collect_border_colors, first_border_pixel, BorderSides};
use crate::imageops_porosity::flood_fill::{
    erase_cluster, ClusterEngine, Connectivity, FillMode, FillOutcome, VisitedMask,
};
use crate::imageops_porosity::raster::RasterAccess;
use crate::imageops_porosity::reference::ReferenceColor;
use crate::imageops_porosity::statistics::DensityMode;
use crate::imageops_porosity::tolerance::{PixelClassifier, Restricted, Tolerance, ToleranceBand};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::erode;
use itertools::iproduct;

/// Sizes of the clusters a sweep erased
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Accepted cluster sizes in the order they were erased
    pub cluster_sizes: Vec<usize>,
    /// Pixels erased as background rather than as clusters
    pub background_pixels: usize,
}

/// A way of finding and erasing clusters over a whole raster
pub trait SweepStrategy {
    /// Runs the sweep, mutating `raster` in place
    fn sweep(&self, raster: &mut dyn RasterAccess) -> PorosityResult<SweepOutcome>;

    /// Density formula matching this sweep
    fn density_mode(&self) -> DensityMode;

    fn name(&self) -> &'static str;
}

/// Row-major pass running a size-gated fill from every matching pixel
///
/// Members of rejected clusters are remembered so that a cluster is grown at
/// most once per pass; erased pixels fail the classifier on their own.
fn size_gated_pass<C>(
    raster: &mut dyn RasterAccess,
    engine: &mut ClusterEngine,
    classifier: &C,
    min_size: usize,
) -> Vec<usize>
where
    C: PixelClassifier + ?Sized,
{
    let (width, height) = raster.extent();
    let mut rejected = VisitedMask::new(width, height);
    let mut sizes = Vec::new();

    for (y, x) in iproduct!(0..height, 0..width) {
        if rejected.is_marked(x, y) || !classifier.accepts_at(x, y, raster.pixel_at(x, y)) {
            continue;
        }

        match engine.fill(raster, (x, y), classifier, FillMode::SizeGated { min_size }) {
            FillOutcome::Accepted(cluster) => {
                log::debug!("erased cluster of {} pixels at ({x}, {y})", cluster.size());
                sizes.push(cluster.size());
            }
            FillOutcome::TooSmall(cluster) | FillOutcome::TouchesTransparent(cluster) => {
                for &(cx, cy) in cluster.pixels() {
                    rejected.mark(cx, cy);
                }
            }
            FillOutcome::Empty => {}
        }
    }

    sizes
}

/// Sweep against one reference color
#[derive(Debug, Clone)]
pub struct SingleReferenceSweep {
    band: ToleranceBand,
    min_cluster_size: usize,
    connectivity: Connectivity,
    background_seed: Option<(u32, u32)>,
}

impl SingleReferenceSweep {
    pub fn new(
        reference: ReferenceColor,
        tolerance: Tolerance,
        min_cluster_size: usize,
        connectivity: Connectivity,
    ) -> Self {
        Self {
            band: ToleranceBand::new(reference, tolerance),
            min_cluster_size,
            connectivity,
            background_seed: None,
        }
    }

    /// Erases the region connected to `seed` before sweeping
    ///
    /// The region is counted as background whatever its size.
    pub const fn with_background_seed(mut self, seed: (u32, u32)) -> Self {
        self.background_seed = Some(seed);
        self
    }

    pub const fn band(&self) -> &ToleranceBand {
        &self.band
    }
}

impl SweepStrategy for SingleReferenceSweep {
    fn sweep(&self, raster: &mut dyn RasterAccess) -> PorosityResult<SweepOutcome> {
        let mut engine = ClusterEngine::for_raster(&*raster, self.connectivity);

        let background_pixels = self.background_seed.map_or(0, |seed| {
            engine
                .fill(raster, seed, &self.band, FillMode::Unconditional)
                .accepted_size()
        });

        let cluster_sizes = size_gated_pass(raster, &mut engine, &self.band, self.min_cluster_size);
        Ok(SweepOutcome {
            cluster_sizes,
            background_pixels,
        })
    }

    fn density_mode(&self) -> DensityMode {
        DensityMode::ObjectRelative
    }

    fn name(&self) -> &'static str {
        "single-reference"
    }
}

/// Sweep that re-derives its reference color from the border until the
/// border strips are fully transparent
#[derive(Debug, Clone)]
pub struct IterativeSweep {
    tolerance: Tolerance,
    min_cluster_size: usize,
    connectivity: Connectivity,
    sides: BorderSides,
}

impl IterativeSweep {
    pub const fn new(
        tolerance: Tolerance,
        min_cluster_size: usize,
        connectivity: Connectivity,
        sides: BorderSides,
    ) -> Self {
        Self {
            tolerance,
            min_cluster_size,
            connectivity,
            sides,
        }
    }
}

impl SweepStrategy for IterativeSweep {
    fn sweep(&self, raster: &mut dyn RasterAccess) -> PorosityResult<SweepOutcome> {
        if !self.sides.any() {
            log::warn!("iterative sweep without border sides has no reference to start from");
            return Ok(SweepOutcome::default());
        }

        let mut engine = ClusterEngine::for_raster(&*raster, self.connectivity);
        let mut outcome = SweepOutcome::default();
        let mut iteration = 0usize;

        // A border pixel always matches the band built from its own color,
        // so every iteration erases at least that pixel.
        while let Some(border) = first_border_pixel(&*raster, self.sides) {
            let band = ToleranceBand::new(ReferenceColor::from_pixel(border.color), self.tolerance);

            let background = engine
                .fill(raster, (border.x, border.y), &band, FillMode::Unconditional)
                .accepted_size();
            outcome.background_pixels += background;

            let sizes = size_gated_pass(raster, &mut engine, &band, self.min_cluster_size);
            log::debug!(
                "iteration {iteration}: reference {:?}, {background} background pixels, {} clusters",
                band,
                sizes.len()
            );
            outcome.cluster_sizes.extend(sizes);
            iteration += 1;
        }

        Ok(outcome)
    }

    fn density_mode(&self) -> DensityMode {
        DensityMode::RecoveredRelative
    }

    fn name(&self) -> &'static str {
        "iterative"
    }
}

/// Pixels a seeded sweep must never erase
///
/// The mask holds every transparent pixel reachable from the image edge
/// through transparent pixels, plus the non-transparent pixels adjacent to
/// that region, which trace the object silhouette.
pub fn forbidden_mask<R>(raster: &R, connectivity: Connectivity) -> VisitedMask
where
    R: RasterAccess + ?Sized,
{
    let (width, height) = raster.extent();
    let mut closure = VisitedMask::new(width, height);
    let mut worklist: Vec<(u32, u32)> = iproduct!(0..height, 0..width)
        .filter(|&(y, x)| x == 0 || y == 0 || x + 1 == width || y + 1 == height)
        .map(|(y, x)| (x, y))
        .filter(|&(x, y)| raster.is_transparent_at(x, y))
        .filter(|&(x, y)| closure.mark(x, y))
        .collect();

    while let Some((x, y)) = worklist.pop() {
        for (nx, ny) in connectivity.neighbours(x, y, width, height) {
            if raster.is_transparent_at(nx, ny) && closure.mark(nx, ny) {
                worklist.push((nx, ny));
            }
        }
    }

    let mut forbidden = closure.clone();
    for (x, y) in closure.marked() {
        for (nx, ny) in connectivity.neighbours(x, y, width, height) {
            forbidden.mark(nx, ny);
        }
    }
    forbidden
}

/// Sweep seeded by the colors found on the border strips
///
/// Clusters are grown edge-guarded and skipped when they overlap the
/// [`forbidden_mask`]. The mask is always traced with 8-connectivity, so
/// under 4-connectivity it also rejects clusters that meet the outside only
/// at a corner.
#[derive(Debug, Clone)]
pub struct SeededSweep {
    tolerance: Tolerance,
    min_cluster_size: usize,
    connectivity: Connectivity,
    sides: BorderSides,
    seeds: Option<Vec<ReferenceColor>>,
}

impl SeededSweep {
    pub const fn new(
        tolerance: Tolerance,
        min_cluster_size: usize,
        connectivity: Connectivity,
        sides: BorderSides,
    ) -> Self {
        Self {
            tolerance,
            min_cluster_size,
            connectivity,
            sides,
            seeds: None,
        }
    }

    /// Uses `seeds` instead of the colors on the swept raster's border
    pub fn with_seeds(mut self, seeds: Vec<ReferenceColor>) -> Self {
        self.seeds = Some(seeds);
        self
    }

    fn sweep_seed(
        &self,
        raster: &mut dyn RasterAccess,
        engine: &mut ClusterEngine,
        band: &ToleranceBand,
        forbidden: &VisitedMask,
    ) -> Vec<usize> {
        let (width, height) = raster.extent();
        let mut examined = VisitedMask::new(width, height);
        let mut sizes = Vec::new();

        for (y, x) in iproduct!(0..height, 0..width) {
            if examined.is_marked(x, y) || !band.accepts(raster.pixel_at(x, y)) {
                continue;
            }

            let cluster = engine.discover(&*raster, (x, y), band, true);
            let accepted = !cluster.touches_transparent_edge()
                && cluster.size() >= self.min_cluster_size
                && !cluster
                    .pixels()
                    .iter()
                    .any(|&(cx, cy)| forbidden.is_marked(cx, cy));

            if accepted {
                log::debug!("erased seeded cluster of {} pixels at ({x}, {y})", cluster.size());
                erase_cluster(raster, &cluster);
                sizes.push(cluster.size());
            } else {
                for &(cx, cy) in cluster.pixels() {
                    examined.mark(cx, cy);
                }
            }
        }

        sizes
    }
}

impl SweepStrategy for SeededSweep {
    fn sweep(&self, raster: &mut dyn RasterAccess) -> PorosityResult<SweepOutcome> {
        let forbidden = forbidden_mask(&*raster, Connectivity::Eight);
        let seeds = match &self.seeds {
            Some(seeds) => seeds.clone(),
            None => collect_border_colors(&*raster, self.sides),
        };
        log::debug!(
            "seeded sweep: {} seeds, {} forbidden pixels",
            seeds.len(),
            forbidden.len()
        );

        let mut engine = ClusterEngine::for_raster(&*raster, self.connectivity);
        let mut outcome = SweepOutcome::default();
        for seed in seeds {
            let band = ToleranceBand::new(seed, self.tolerance);
            let sizes = self.sweep_seed(raster, &mut engine, &band, &forbidden);
            outcome.cluster_sizes.extend(sizes);
        }

        Ok(outcome)
    }

    fn density_mode(&self) -> DensityMode {
        DensityMode::ObjectRelative
    }

    fn name(&self) -> &'static str {
        "seeded"
    }
}

/// Non-transparent pixels at least `edge_width` pixels away from the
/// object outline and from the image edge
///
/// Distances use the L1 norm, matching repeated erosion with a cross
/// shaped element. Interior pixels are 255, the rest 0.
pub fn interior_mask<R>(raster: &R, edge_width: u8) -> GrayImage
where
    R: RasterAccess + ?Sized,
{
    let (width, height) = raster.extent();
    let object: GrayImage = ImageBuffer::from_fn(width, height, |x, y| {
        Luma([if raster.is_transparent_at(x, y) { 0 } else { u8::MAX }])
    });

    let mut interior = erode(&object, Norm::L1, edge_width);

    // Outside the image counts as background
    let edge = u32::from(edge_width);
    for (x, y, pixel) in interior.enumerate_pixels_mut() {
        let near_edge = x < edge
            || y < edge
            || x >= width.saturating_sub(edge)
            || y >= height.saturating_sub(edge);
        if near_edge {
            *pixel = Luma([0]);
        }
    }
    interior
}

/// Sweep restricted to the eroded interior of the object
///
/// Clusters never reach into the outline band, so dark regions along the
/// silhouette are left alone.
#[derive(Debug, Clone)]
pub struct InteriorSweep {
    band: ToleranceBand,
    min_cluster_size: usize,
    edge_width: u8,
}

impl InteriorSweep {
    pub fn new(
        reference: ReferenceColor,
        tolerance: Tolerance,
        min_cluster_size: usize,
        edge_width: u8,
    ) -> Self {
        Self {
            band: ToleranceBand::new(reference, tolerance),
            min_cluster_size,
            edge_width,
        }
    }
}

impl SweepStrategy for InteriorSweep {
    fn sweep(&self, raster: &mut dyn RasterAccess) -> PorosityResult<SweepOutcome> {
        let interior = interior_mask(&*raster, self.edge_width);
        let classifier = Restricted::new(self.band, |x, y| interior.get_pixel(x, y)[0] != 0);
        let mut engine = ClusterEngine::for_raster(&*raster, Connectivity::Four);

        let cluster_sizes =
            size_gated_pass(raster, &mut engine, &classifier, self.min_cluster_size);
        Ok(SweepOutcome {
            cluster_sizes,
            background_pixels: 0,
        })
    }

    fn density_mode(&self) -> DensityMode {
        DensityMode::ObjectRelative
    }

    fn name(&self) -> &'static str {
        "interior"
    }
}
