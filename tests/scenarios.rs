use std::collections::BTreeSet;
use std::ops::ControlFlow;

use hex_vcells::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const RED: Vec3 = Vec3::new(255.0, 0.0, 0.0);
const BLUE: Vec3 = Vec3::new(0.0, 0.0, 255.0);

fn config(cell_size: f32, weight: f32) -> VCellsConfig {
    VCellsConfigBuilder::new()
        .cell_size(cell_size)
        .unwrap()
        .weight(weight)
        .unwrap()
        .max_iterations(500)
        .build()
}

fn split_image(width: u32, height: u32, seam: u32) -> SourceImage {
    SourceImage::from_fn(width, height, |x, _| if x < seam { RED } else { BLUE }).unwrap()
}

fn noise_image(width: u32, height: u32, seed: u64) -> SourceImage {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let data: Vec<u8> = (0..width * height * 3).map(|_| rng.gen()).collect();
    SourceImage::from_rgb8(width, height, &data).unwrap()
}

fn gradient_image(width: u32, height: u32) -> SourceImage {
    SourceImage::from_fn(width, height, |x, y| {
        Vec3::new(
            (x * 255 / width) as f32,
            (y * 255 / height) as f32,
            ((x * y) % 256) as f32,
        )
    })
    .unwrap()
}

#[test]
fn test_solid_image_at_zero_weight_converges_without_moves() {
    let image = SourceImage::from_fn(20, 20, |_, _| Vec3::new(12.0, 200.0, 77.0)).unwrap();
    let mut engine = RelaxationEngine::new(image, &config(6.0, 0.0)).unwrap();

    let report = engine.run().unwrap();

    assert_eq!(report.termination, Termination::Converged);
    assert_eq!(report.moved_per_iteration, vec![0]);
    assert_eq!(engine.state(), RelaxationState::Converged);
}

#[test]
fn test_two_halves_converge_to_vertical_seam() {
    let mut engine = RelaxationEngine::new(split_image(40, 40, 20), &config(6.0, 1.0)).unwrap();

    let report = engine.run().unwrap();
    assert_eq!(report.termination, Termination::Converged);
    assert!(report.total_moved() > 0);

    let tessellation = engine.tessellation();
    for segment in tessellation.occupied() {
        let sides: BTreeSet<bool> = segment.pixels().iter().map(|p| p.x < 20).collect();
        assert_eq!(sides.len(), 1, "segment {} straddles the seam", segment.id());
    }

    for y in 0..40 {
        let left = Pixel::new(19, y);
        let right = Pixel::new(20, y);
        assert_ne!(tessellation.owner(left), tessellation.owner(right));
        assert!(tessellation.index().is_edge(left));
        assert!(tessellation.index().is_edge(right));
    }
}

#[test]
fn test_seam_found_wherever_it_cuts_the_grid() {
    for seam in [14, 17, 23, 26] {
        let mut engine =
            RelaxationEngine::new(split_image(40, 40, seam), &config(6.0, 1.0)).unwrap();
        let report = engine.run().unwrap();
        assert_eq!(report.termination, Termination::Converged, "seam at {}", seam);

        for segment in engine.tessellation().occupied() {
            let centroid = segment.centroid().unwrap();
            assert!(
                centroid == RED || centroid == BLUE,
                "seam at {}: segment {} has mixed centroid {:?}",
                seam,
                segment.id(),
                centroid
            );
        }
    }
}

#[test]
fn test_invariants_at_every_iteration_boundary() {
    let image = noise_image(31, 23, 7);
    let mut engine = RelaxationEngine::new(image.clone(), &config(4.0, 30.0)).unwrap();
    assert_eq!(engine.tessellation().check_invariants(&image), Ok(()));

    engine
        .run_with(15, |report, tessellation| {
            assert_eq!(
                tessellation.check_invariants(&image),
                Ok(()),
                "after iteration {}",
                report.iteration
            );
            ControlFlow::Continue(())
        })
        .unwrap();
}

#[test]
fn test_retired_segments_stay_retired() {
    let image = gradient_image(24, 24);
    let mut engine = RelaxationEngine::new(image.clone(), &config(3.0, 5.0)).unwrap();
    let mut retired: BTreeSet<SegmentId> = BTreeSet::new();

    let report = engine
        .run_with(200, |report, tessellation| {
            let now: BTreeSet<SegmentId> = tessellation
                .segments()
                .iter()
                .filter(|s| s.is_empty())
                .map(|s| s.id())
                .collect();
            assert!(retired.is_subset(&now), "a retired segment regained pixels");
            assert_eq!(now.len() - retired.len(), report.retired);
            for id in &now {
                let segment = tessellation.segment(*id).unwrap();
                assert_eq!(segment.centroid(), None);
                assert!(segment.edges().is_empty());
            }
            retired = now;
            ControlFlow::Continue(())
        })
        .unwrap();

    assert!(report.iterations() > 0);
    assert!(!retired.is_empty());
    assert_eq!(engine.tessellation().check_invariants(&image), Ok(()));
}

#[test]
fn test_deterministic_replay() {
    let config = config(5.0, 40.0);
    let run = || {
        let mut engine = RelaxationEngine::new(noise_image(36, 28, 99), &config).unwrap();
        let report = engine.run_for(30).unwrap();
        (report, engine.into_parts().1)
    };

    let (report_a, tessellation_a) = run();
    let (report_b, tessellation_b) = run();

    assert_eq!(report_a, report_b);
    assert_eq!(tessellation_a, tessellation_b);
}

#[test]
fn test_converged_engine_stays_idle() {
    let mut engine = RelaxationEngine::new(split_image(30, 30, 15), &config(5.0, 1.0)).unwrap();
    assert_eq!(engine.run().unwrap().termination, Termination::Converged);

    let snapshot = engine.tessellation().clone();
    for _ in 0..5 {
        let report = engine.iterate().unwrap();
        assert!(report.is_idle());
    }
    assert_eq!(engine.tessellation(), &snapshot);
}

#[test]
fn test_overlay_after_relaxation() {
    let mut engine = RelaxationEngine::new(split_image(40, 40, 20), &config(6.0, 1.0)).unwrap();
    engine.run().unwrap();

    let buffer = render::boundary_overlay(engine.image(), engine.tessellation(), [0, 255, 0]);
    // seam columns are boundaries on every row
    for y in 0..40usize {
        for x in [19usize, 20] {
            let offset = (y * 40 + x) * 3;
            assert_eq!(buffer[offset..offset + 3], [0, 255, 0]);
        }
    }

    let mosaic = render::mean_color_fill(engine.image(), engine.tessellation());
    assert_eq!(mosaic[..3], [255, 0, 0]);
    let last = mosaic.len() - 3;
    assert_eq!(mosaic[last..], [0, 0, 255]);
}
