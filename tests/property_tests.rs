//! Property-based tests for imageops-porosity
//!
//! These tests use proptest to check invariants of flood filling, sweeping
//! and debris removal over randomly generated rasters.

use image::{ImageBuffer, Rgba};
use imageops_porosity::{
    flood_fill, forbidden_mask, in_tolerance, AnalysisConfig, ClusterEngine, Connectivity,
    DebrisFilter, FillMode, PorosityAnalyzer, Raster, RasterAccess, ReferenceColor,
    ReferenceSource, SingleReferenceSweep, SweepStrategy, Tolerance, ToleranceBand,
};
use proptest::prelude::*;

/// Strategy for generating small but valid raster dimensions
fn raster_dimensions() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=16, 1u32..=16)
}

/// Strategy for generating a connectivity
fn connectivity() -> impl Strategy<Value = Connectivity> {
    prop_oneof![Just(Connectivity::Four), Just(Connectivity::Eight)]
}

/// Strategy for rasters drawn from a small palette
///
/// A small palette produces clusters of every size; about a quarter of the
/// pixels are transparent.
fn palette_raster() -> impl Strategy<Value = Raster> {
    raster_dimensions().prop_flat_map(|(width, height)| {
        prop::collection::vec(0u8..4, (width * height) as usize).prop_map(move |indices| {
            let palette = [
                Rgba([0, 0, 0, 0]),
                Rgba([20, 20, 20, 255]),
                Rgba([200, 200, 200, 255]),
                Rgba([24, 22, 18, 255]),
            ];
            let data = indices
                .iter()
                .flat_map(|&i| palette[usize::from(i)].0)
                .collect();
            ImageBuffer::from_raw(width, height, data).unwrap()
        })
    })
}

fn dark_band(tolerance: f64) -> ToleranceBand {
    ToleranceBand::new(ReferenceColor([20, 20, 20]), Tolerance::new(tolerance).unwrap())
}

fn changed_pixels(before: &Raster, after: &Raster) -> Vec<(u32, u32)> {
    before
        .enumerate_pixels()
        .filter(|&(x, y, pixel)| after.get_pixel(x, y) != pixel)
        .map(|(x, y, _)| (x, y))
        .collect()
}

proptest! {
    #[test]
    fn accepted_fill_erases_exactly_its_members(
        raster in palette_raster(),
        connectivity in connectivity(),
        seed_x in 0u32..16,
        seed_y in 0u32..16,
    ) {
        let (width, height) = raster.dimensions();
        let seed = (seed_x % width, seed_y % height);
        let mut filled = raster.clone();
        let mut engine = ClusterEngine::for_raster(&filled, connectivity);

        let outcome = engine.fill(&mut filled, seed, &dark_band(0.25), FillMode::Unconditional);
        let erased = outcome.accepted_size();

        let changed = changed_pixels(&raster, &filled);
        prop_assert_eq!(changed.len(), erased);
        prop_assert_eq!(raster.count_valid_pixels() - filled.count_valid_pixels(), erased);
        for (x, y) in changed {
            prop_assert_eq!(filled.get_pixel(x, y)[3], 0);
        }
    }

    #[test]
    fn cluster_members_match_and_are_distinct(
        raster in palette_raster(),
        connectivity in connectivity(),
        seed_x in 0u32..16,
        seed_y in 0u32..16,
    ) {
        let (width, height) = raster.dimensions();
        let band = dark_band(0.25);
        let cluster = flood_fill(&raster, (seed_x % width, seed_y % height), &band, connectivity);

        let mut members = cluster.pixels().to_vec();
        for &(x, y) in &members {
            prop_assert!(in_tolerance(*raster.get_pixel(x, y), &band));
        }
        members.sort_unstable();
        members.dedup();
        prop_assert_eq!(members.len(), cluster.size());
    }

    #[test]
    fn wider_tolerance_never_shrinks_a_cluster(
        raster in palette_raster(),
        seed_x in 0u32..16,
        seed_y in 0u32..16,
        narrow in 0.0f64..0.5,
        extra in 0.0f64..0.5,
    ) {
        let (width, height) = raster.dimensions();
        let seed = (seed_x % width, seed_y % height);
        let small = flood_fill(&raster, seed, &dark_band(narrow), Connectivity::Eight);
        let large = flood_fill(&raster, seed, &dark_band(narrow + extra), Connectivity::Eight);

        prop_assert!(dark_band(narrow + extra).contains_band(&dark_band(narrow)));
        prop_assert!(large.size() >= small.size());
        for member in small.pixels() {
            prop_assert!(large.pixels().contains(member));
        }
    }

    #[test]
    fn edge_guarded_fills_never_touch_the_forbidden_region(
        raster in palette_raster(),
        connectivity in connectivity(),
    ) {
        let forbidden = forbidden_mask(&raster, connectivity);
        let (width, height) = raster.dimensions();
        let mut swept = raster.clone();
        let mut engine = ClusterEngine::for_raster(&swept, connectivity);

        for y in 0..height {
            for x in 0..width {
                engine.fill(&mut swept, (x, y), &dark_band(0.25), FillMode::EdgeGuarded { min_size: 1 });
            }
        }

        for (x, y) in changed_pixels(&raster, &swept) {
            prop_assert!(!forbidden.is_marked(x, y));
        }
    }

    #[test]
    fn debris_filter_is_idempotent(
        raster in palette_raster(),
        max_debris_size in 1usize..10,
        connectivity in connectivity(),
    ) {
        let filter = DebrisFilter::new(max_debris_size).with_connectivity(connectivity);
        let mut once = raster.clone();
        filter.apply(&mut once);
        let mut twice = once.clone();
        let report = filter.apply(&mut twice);

        prop_assert_eq!(report.fragments_removed, 0);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn debris_filter_only_erases(
        raster in palette_raster(),
        max_debris_size in 1usize..10,
    ) {
        let mut filtered = raster.clone();
        let report = DebrisFilter::new(max_debris_size).apply(&mut filtered);

        let changed = changed_pixels(&raster, &filtered);
        prop_assert_eq!(changed.len(), report.pixels_removed);
        for (x, y) in changed {
            prop_assert_eq!(filtered.get_pixel(x, y)[3], 0);
        }
    }

    #[test]
    fn sweep_sizes_respect_the_minimum_and_add_up(
        raster in palette_raster(),
        min_cluster_size in 1usize..8,
        connectivity in connectivity(),
    ) {
        let mut swept = raster.clone();
        let sweep = SingleReferenceSweep::new(
            ReferenceColor([20, 20, 20]),
            Tolerance::new(0.25).unwrap(),
            min_cluster_size,
            connectivity,
        );
        let outcome = sweep.sweep(&mut swept).unwrap();

        prop_assert!(outcome.cluster_sizes.iter().all(|&size| size >= min_cluster_size));
        let removed: usize = outcome.cluster_sizes.iter().sum();
        prop_assert_eq!(raster.count_valid_pixels() - swept.count_valid_pixels(), removed);
    }

    #[test]
    fn density_stays_in_unit_interval(
        raster in palette_raster(),
        min_cluster_size in 1usize..8,
    ) {
        let analyzer = PorosityAnalyzer::new(
            AnalysisConfig::default()
                .with_tolerance(0.25)
                .with_min_cluster_size(min_cluster_size)
                .with_reference(ReferenceSource::Fixed(ReferenceColor([20, 20, 20]))),
        )
        .unwrap();
        let mut swept = raster;
        let report = analyzer.analyze(&mut swept).unwrap();

        prop_assert!((0.0..=1.0).contains(&report.statistics.density));
    }
}
