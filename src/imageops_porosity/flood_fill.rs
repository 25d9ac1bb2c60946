//! Connected-component discovery and erasure.
//!
//! Clusters are grown from a seed with an explicit worklist. Visitation is
//! tracked in a [`VisitedMask`] that lives beside the raster, so the pixel
//! data is only ever written when an accepted cluster is erased.

use crate::imageops_porosity::raster::RasterAccess;
use crate::imageops_porosity::tolerance::PixelClassifier;

/// Neighbourhood used when growing clusters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Connectivity {
    /// Horizontal and vertical neighbours
    Four,
    /// Horizontal, vertical and diagonal neighbours
    #[default]
    Eight,
}

const FOUR_NEIGHBOURS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const EIGHT_NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl Connectivity {
    pub const fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Self::Four => &FOUR_NEIGHBOURS,
            Self::Eight => &EIGHT_NEIGHBOURS,
        }
    }

    /// In-bounds neighbours of `(x, y)` in a `width`×`height` grid
    pub fn neighbours(
        self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> impl Iterator<Item = (u32, u32)> {
        self.offsets().iter().filter_map(move |&(dx, dy)| {
            let nx = x.checked_add_signed(dx).filter(|&nx| nx < width)?;
            let ny = y.checked_add_signed(dy).filter(|&ny| ny < height)?;
            Some((nx, ny))
        })
    }
}

/// One mark per pixel, reset in time proportional to the marks set
#[derive(Debug, Clone)]
pub struct VisitedMask {
    width: u32,
    height: u32,
    marks: Vec<bool>,
    touched: Vec<usize>,
}

impl VisitedMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            marks: vec![false; width as usize * height as usize],
            touched: Vec::new(),
        }
    }

    pub fn for_raster<R: RasterAccess + ?Sized>(raster: &R) -> Self {
        let (width, height) = raster.extent();
        Self::new(width, height)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({x}, {y}) is outside the {}x{} mask",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    /// Marks `(x, y)`, returning `false` if it was already marked
    #[inline]
    pub fn mark(&mut self, x: u32, y: u32) -> bool {
        let index = self.index(x, y);
        if self.marks[index] {
            return false;
        }
        self.marks[index] = true;
        self.touched.push(index);
        true
    }

    #[inline]
    pub fn is_marked(&self, x: u32, y: u32) -> bool {
        self.marks[self.index(x, y)]
    }

    /// Number of marked pixels
    pub fn len(&self) -> usize {
        self.touched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    /// Marked coordinates in the order they were marked
    pub fn marked(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.touched
            .iter()
            .map(move |&index| ((index % width) as u32, (index / width) as u32))
    }

    pub fn clear(&mut self) {
        for index in self.touched.drain(..) {
            self.marks[index] = false;
        }
    }
}

/// Pixels collected by one flood fill
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cluster {
    pixels: Vec<(u32, u32)>,
    touches_transparent_edge: bool,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Member coordinates in discovery order
    pub fn pixels(&self) -> &[(u32, u32)] {
        &self.pixels
    }

    /// Whether a member has a transparent neighbour the classifier rejects
    pub const fn touches_transparent_edge(&self) -> bool {
        self.touches_transparent_edge
    }
}

/// Acceptance rule applied once a cluster has been grown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    /// Accept clusters of at least `min_size` pixels
    SizeGated { min_size: usize },
    /// Like `SizeGated`, but reject any cluster touching a transparent pixel
    EdgeGuarded { min_size: usize },
    /// Accept any non-empty cluster
    Unconditional,
}

/// Result of [`ClusterEngine::fill`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// The cluster was accepted and erased
    Accepted(Cluster),
    /// The cluster was smaller than the minimum size
    TooSmall(Cluster),
    /// The cluster touched a transparent pixel in edge-guarded mode
    TouchesTransparent(Cluster),
    /// The seed itself did not match
    Empty,
}

impl FillOutcome {
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn cluster(&self) -> Option<&Cluster> {
        match self {
            Self::Accepted(cluster) | Self::TooSmall(cluster) | Self::TouchesTransparent(cluster) => {
                Some(cluster)
            }
            Self::Empty => None,
        }
    }

    /// Size of the accepted cluster, zero when rejected
    pub fn accepted_size(&self) -> usize {
        match self {
            Self::Accepted(cluster) => cluster.size(),
            _ => 0,
        }
    }
}

/// Reusable flood-fill state for one raster
///
/// The engine owns the visited mask so that repeated fills over the same
/// raster do not reallocate it.
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    connectivity: Connectivity,
    visited: VisitedMask,
}

impl ClusterEngine {
    pub fn new(width: u32, height: u32, connectivity: Connectivity) -> Self {
        Self {
            connectivity,
            visited: VisitedMask::new(width, height),
        }
    }

    pub fn for_raster<R: RasterAccess + ?Sized>(raster: &R, connectivity: Connectivity) -> Self {
        let (width, height) = raster.extent();
        Self::new(width, height, connectivity)
    }

    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Pixels visited by the most recent discovery
    pub const fn visited(&self) -> &VisitedMask {
        &self.visited
    }

    /// Grows the cluster containing `seed` without modifying the raster
    ///
    /// A neighbour enters the worklist only when it is in bounds and not yet
    /// visited, and joins the cluster only when `classifier` accepts it. With
    /// `stop_at_transparent_edge` the growth ends as soon as a member with a
    /// transparent, non-matching neighbour is found.
    pub fn discover<R, C>(
        &mut self,
        raster: &R,
        seed: (u32, u32),
        classifier: &C,
        stop_at_transparent_edge: bool,
    ) -> Cluster
    where
        R: RasterAccess + ?Sized,
        C: PixelClassifier + ?Sized,
    {
        self.visited.clear();

        let (seed_x, seed_y) = seed;
        let seed_pixel = raster.pixel_at(seed_x, seed_y);
        if seed_pixel[3] == 0 || !classifier.accepts_at(seed_x, seed_y, seed_pixel) {
            return Cluster::default();
        }

        let (width, height) = raster.extent();
        let mut cluster = Cluster::default();
        let mut worklist = vec![seed];
        self.visited.mark(seed_x, seed_y);
        cluster.pixels.push(seed);

        while let Some((x, y)) = worklist.pop() {
            for (nx, ny) in self.connectivity.neighbours(x, y, width, height) {
                let neighbour = raster.pixel_at(nx, ny);
                if neighbour[3] == 0 && !classifier.accepts_at(nx, ny, neighbour) {
                    cluster.touches_transparent_edge = true;
                    if stop_at_transparent_edge {
                        return cluster;
                    }
                }

                if !self.visited.mark(nx, ny) {
                    continue;
                }
                if classifier.accepts_at(nx, ny, neighbour) {
                    cluster.pixels.push((nx, ny));
                    worklist.push((nx, ny));
                }
            }
        }

        cluster
    }

    /// Grows the cluster at `seed`, erasing it when `mode` accepts it
    pub fn fill<R, C>(
        &mut self,
        raster: &mut R,
        seed: (u32, u32),
        classifier: &C,
        mode: FillMode,
    ) -> FillOutcome
    where
        R: RasterAccess + ?Sized,
        C: PixelClassifier + ?Sized,
    {
        let edge_guarded = matches!(mode, FillMode::EdgeGuarded { .. });
        let cluster = self.discover(raster, seed, classifier, edge_guarded);
        if cluster.is_empty() {
            return FillOutcome::Empty;
        }

        let outcome = match mode {
            FillMode::EdgeGuarded { .. } if cluster.touches_transparent_edge() => {
                FillOutcome::TouchesTransparent(cluster)
            }
            FillMode::SizeGated { min_size } | FillMode::EdgeGuarded { min_size }
                if cluster.size() < min_size =>
            {
                FillOutcome::TooSmall(cluster)
            }
            _ => {
                erase_cluster(raster, &cluster);
                FillOutcome::Accepted(cluster)
            }
        };

        if !outcome.is_accepted() {
            log::trace!(
                "rejected cluster at {:?}: {} pixels",
                seed,
                outcome.cluster().map_or(0, Cluster::size)
            );
        }
        outcome
    }
}

/// Grows the cluster containing `seed` with a fresh visited mask
///
/// Returns the member coordinates together with the transparent-edge flag.
/// The raster is left untouched.
pub fn flood_fill<R, C>(
    raster: &R,
    seed: (u32, u32),
    classifier: &C,
    connectivity: Connectivity,
) -> Cluster
where
    R: RasterAccess + ?Sized,
    C: PixelClassifier + ?Sized,
{
    ClusterEngine::for_raster(raster, connectivity).discover(raster, seed, classifier, false)
}

/// Erases every member of `cluster`
pub fn erase_cluster<R: RasterAccess + ?Sized>(raster: &mut R, cluster: &Cluster) {
    for &(x, y) in cluster.pixels() {
        raster.erase_at(x, y);
    }
}
