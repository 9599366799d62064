//! Hexagonal seeding of the initial segmentation
//!
//! Every pixel is assigned to its nearest hexagon center on the seed lattice.
//! Segment ids follow the lattice scan order of the occupied centers, so an id
//! depends only on grid position and never on pixel iteration order.

mod lattice;

pub use lattice::HexLattice;

use std::collections::BTreeMap;

use glam::{DVec2, DVec3, I64Vec2, Vec2, Vec3};
use log::trace;

use crate::error::{Result, VCellsError};
use crate::geometry::{self, RowSpan};
use crate::image::SourceImage;
use crate::index::PixelIndex;
use crate::pixel::{Pixel, SegmentId};
use crate::segment::Segment;

/// The pixel index together with the segment records it is mirrored into
///
/// Produced once by [`Tessellation::new`] and then mutated in place by the
/// relaxation engine. Between iterations every structure is consistent:
/// the index and the segment bodies agree, edge sets match
/// [`PixelIndex::is_edge`], and centroids match the members.
#[derive(Debug, Clone, PartialEq)]
pub struct Tessellation {
    index: PixelIndex,
    segments: Vec<Segment>,
    /// Lattice point each segment was seeded from, indexed by segment id
    seeds: Vec<I64Vec2>,
    lattice: HexLattice,
}

impl Tessellation {
    /// Seed segments on a hexagonal lattice with the given edge length
    ///
    /// # Errors
    ///
    /// Returns `InvalidGeometry` if `cell_size` is not a positive finite number.
    pub fn new(image: &SourceImage, cell_size: f32) -> Result<Self> {
        let (width, height) = (image.width(), image.height());
        let lattice = HexLattice::new(width, height, cell_size as f64)?;
        let mut index = PixelIndex::new(width, height);

        // Nearest center of every pixel, then a dense renumbering of the
        // occupied centers in scan order. Keys order like `hex_index`.
        let pixels: Vec<Pixel> = index.pixels().collect();
        let centers: Vec<I64Vec2> = pixels.iter().map(|&p| lattice.nearest_center(p)).collect();
        let mut occupied: BTreeMap<(i64, i64), SegmentId> =
            centers.iter().map(|c| ((c.x, c.y), SegmentId::NONE)).collect();

        let mut seeds = Vec::with_capacity(occupied.len());
        for (&(i, j), id) in occupied.iter_mut() {
            *id = SegmentId::new(seeds.len() as u32);
            seeds.push(I64Vec2::new(i, j));
        }

        let mut segments: Vec<Segment> = (0..seeds.len())
            .map(|id| Segment::new(SegmentId::new(id as u32)))
            .collect();

        for (&pixel, center) in pixels.iter().zip(centers.iter()) {
            let id = occupied[&(center.x, center.y)];
            let color = image.color(pixel).unwrap_or_default();
            segments[id.index()].insert(pixel, color);
            index.set(pixel, id);
        }

        // Edges can only be decided once every neighbor is known.
        for &pixel in &pixels {
            if index.is_edge(pixel) {
                let owner = index.get(pixel);
                segments[owner.index()].set_edge(pixel, true);
            }
        }

        trace!(
            "seeded {} segments on a {}x{} image (edge {}, {:?} lattice slots)",
            segments.len(),
            width,
            height,
            cell_size,
            lattice.capacity()
        );

        Ok(Self {
            index,
            segments,
            seeds,
            lattice,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.index.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.index.height()
    }

    #[inline]
    pub fn index(&self) -> &PixelIndex {
        &self.index
    }

    #[inline]
    pub fn lattice(&self) -> &HexLattice {
        &self.lattice
    }

    /// All segments, indexed by id (retired ones included)
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        if id.is_none() {
            return None;
        }
        self.segments.get(id.index())
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segments that still own at least one pixel
    pub fn occupied(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| !s.is_empty())
    }

    /// Owner of `pixel`, the sentinel outside the image
    #[inline]
    pub fn owner(&self, pixel: Pixel) -> SegmentId {
        self.index.get(pixel)
    }

    /// Image-space lattice point a segment was seeded from
    pub fn seed_center(&self, id: SegmentId) -> Option<Vec2> {
        self.segment(id)?;
        Some(self.lattice.center(self.seeds[id.index()]).as_vec2())
    }

    /// Scanlines of the ideal hexagon around a segment's seed center
    ///
    /// Useful for drawing the initial grid. The hexagons of all segments tile
    /// the image without overlap; the seeded body itself comes from
    /// nearest-center assignment and is clipped to the image.
    pub fn seed_hexagon(&self, id: SegmentId) -> Option<Vec<RowSpan>> {
        self.segment(id)?;
        let edge = self.lattice.edge_length();
        let center = self.lattice.center(self.seeds[id.index()]);
        Some(geometry::hexagon_row_spans(edge, center - DVec2::new(edge, 0.0)))
    }

    /// Every edge pixel, grouped by segment id and row-major within a segment
    pub fn edge_pixels(&self) -> Vec<Pixel> {
        self.segments
            .iter()
            .flat_map(|s| s.edges().iter().copied())
            .collect()
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut PixelIndex, &mut [Segment]) {
        (&mut self.index, &mut self.segments)
    }

    /// Audit all cross-structure invariants
    ///
    /// Checks that the index and segment bodies agree, that the neighbor cache
    /// is fresh, that edge sets match [`PixelIndex::is_edge`] and that every
    /// centroid matches its members' mean color.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` describing the first violation found.
    pub fn check_invariants(&self, image: &SourceImage) -> Result<()> {
        self.audit(image).map_err(VCellsError::InvariantViolation)
    }

    fn audit(&self, image: &SourceImage) -> std::result::Result<(), String> {
        let mut members = 0;
        let mut edges = 0;

        for pixel in self.index.pixels() {
            let owner = self.index.get(pixel);
            let segment = self
                .segment(owner)
                .ok_or_else(|| format!("pixel {:?} has no valid owner ({})", pixel, owner))?;
            if !segment.contains(pixel) {
                return Err(format!("pixel {:?} missing from segment {}", pixel, owner));
            }
            if Some(self.index.neighbors(pixel)) != self.index.expected_neighbors(pixel) {
                return Err(format!("stale neighbor cache at {:?}", pixel));
            }
            if self.index.is_edge(pixel) != segment.is_edge(pixel) {
                return Err(format!(
                    "edge flag of {:?} disagrees with the index (segment {})",
                    pixel, owner
                ));
            }
        }

        for segment in &self.segments {
            members += segment.len();
            edges += segment.edges().len();
            if segment.edges().iter().any(|p| !segment.contains(*p)) {
                return Err(format!("segment {} flags a non-member edge", segment.id()));
            }

            let expected = mean_color(image, segment.pixels().iter().copied());
            match (segment.centroid(), expected) {
                (None, None) => {}
                (Some(actual), Some(expected)) if actual.abs_diff_eq(expected, 1e-3) => {}
                (actual, expected) => {
                    return Err(format!(
                        "segment {} centroid {:?}, members average {:?}",
                        segment.id(),
                        actual,
                        expected
                    ))
                }
            }
        }

        let total = self.index.pixels().count();
        if members != total {
            return Err(format!("segments hold {} pixels, image has {}", members, total));
        }
        let flagged = self.index.pixels().filter(|&p| self.index.is_edge(p)).count();
        if edges != flagged {
            return Err(format!("{} edge flags for {} edge pixels", edges, flagged));
        }

        Ok(())
    }
}

fn mean_color(image: &SourceImage, pixels: impl Iterator<Item = Pixel>) -> Option<Vec3> {
    let mut count = 0usize;
    let mut sum = DVec3::ZERO;
    for pixel in pixels {
        sum += image.color(pixel)?.as_dvec3();
        count += 1;
    }
    (count > 0).then(|| (sum / count as f64).as_vec3())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn solid(width: u32, height: u32) -> SourceImage {
        SourceImage::from_fn(width, height, |_, _| Vec3::new(80.0, 120.0, 200.0)).unwrap()
    }

    #[test]
    fn test_invalid_cell_size() {
        let image = solid(10, 10);
        assert!(Tessellation::new(&image, 0.0).is_err());
        assert!(Tessellation::new(&image, -1.0).is_err());
    }

    #[test]
    fn test_every_pixel_assigned() {
        let image = solid(20, 20);
        let tessellation = Tessellation::new(&image, 6.0).unwrap();

        assert_eq!(tessellation.segment_count(), 8);
        for pixel in tessellation.index().pixels() {
            assert!(tessellation.owner(pixel).is_some());
        }
        let total: usize = tessellation.segments().iter().map(|s| s.len()).sum();
        assert_eq!(total, 400);
        assert!(tessellation.check_invariants(&image).is_ok());
    }

    #[test]
    fn test_seed_layout_20x20() {
        let image = solid(20, 20);
        let tessellation = Tessellation::new(&image, 6.0).unwrap();
        let owner = |x, y| tessellation.owner(Pixel::new(x, y)).index();

        // first lattice column holds ids 0..=2 top to bottom
        assert_eq!(owner(0, 0), 0);
        assert_eq!(owner(0, 10), 1);
        assert_eq!(owner(0, 19), 2);
        // the shifted second column
        assert_eq!(owner(9, 9), 3);
        assert_eq!(owner(9, 15), 4);
        // third column
        assert_eq!(owner(19, 0), 5);
        assert_eq!(owner(19, 10), 6);
        assert_eq!(owner(19, 19), 7);
    }

    #[test]
    fn test_segments_are_never_seeded_empty() {
        let image = solid(40, 40);
        let tessellation = Tessellation::new(&image, 6.0).unwrap();
        assert_eq!(tessellation.occupied().count(), tessellation.segment_count());
    }

    #[test]
    fn test_border_pixels_are_edges() {
        let image = solid(15, 9);
        let tessellation = Tessellation::new(&image, 4.0).unwrap();
        for x in 0..15 {
            for y in [0, 8] {
                let p = Pixel::new(x, y);
                let owner = tessellation.owner(p);
                assert!(tessellation.segment(owner).unwrap().is_edge(p));
            }
        }
    }

    #[test]
    fn test_centroids_seeded() {
        let image = solid(12, 12);
        let tessellation = Tessellation::new(&image, 3.0).unwrap();
        for segment in tessellation.segments() {
            assert_eq!(segment.centroid(), Some(Vec3::new(80.0, 120.0, 200.0)));
        }
    }

    #[test]
    fn test_seed_center_and_hexagon() {
        let image = solid(20, 20);
        let tessellation = Tessellation::new(&image, 6.0).unwrap();

        let center = tessellation.seed_center(SegmentId::new(3)).unwrap();
        assert!((center.x - 9.0).abs() < 1e-4);
        assert!((center.y - 5.196).abs() < 1e-3);

        let spans = tessellation.seed_hexagon(SegmentId::new(3)).unwrap();
        // apex (3, 5.196): row 5 lies closest to the apex
        assert_eq!(spans.first().map(|s| s.y), Some(0));
        assert_eq!(spans.last().map(|s| s.y), Some(10));
        let widest = spans.iter().find(|s| s.y == 5).unwrap();
        assert_eq!((widest.x_start, widest.x_end), (4, 14));

        assert!(tessellation.seed_center(SegmentId::NONE).is_none());
        assert!(tessellation.seed_hexagon(SegmentId::new(99)).is_none());
    }

    #[test]
    fn test_seed_hexagons_tile_the_image() {
        let image = solid(20, 20);
        let tessellation = Tessellation::new(&image, 6.0).unwrap();
        let mut claims: HashMap<Pixel, Vec<SegmentId>> = HashMap::new();

        for segment in tessellation.segments() {
            for span in tessellation.seed_hexagon(segment.id()).unwrap() {
                for x in span.x_start..=span.x_end {
                    let pixel = Pixel::new(x, span.y);
                    if tessellation.index().contains(pixel) {
                        claims.entry(pixel).or_default().push(segment.id());
                    }
                }
            }
        }

        for pixel in tessellation.index().pixels() {
            let owners = claims.get(&pixel).map_or(0, |o| o.len());
            assert_eq!(owners, 1, "{:?} claimed by {:?}", pixel, claims.get(&pixel));
        }
    }

    #[test]
    fn test_tiny_cell_size_gives_one_segment_per_pixel() {
        let image = SourceImage::from_fn(64, 64, |x, y| Vec3::new(x as f32, y as f32, 0.0)).unwrap();
        for cell_size in [0.001, 1e-9] {
            let tessellation = Tessellation::new(&image, cell_size).unwrap();

            assert_eq!(tessellation.segment_count(), 64 * 64);
            assert!(tessellation.segments().iter().all(|s| s.len() == 1));
            assert_eq!(tessellation.owner(Pixel::new(0, 0)), SegmentId::new(0));
            assert_eq!(tessellation.check_invariants(&image), Ok(()));
        }
    }

    #[test]
    fn test_invariant_violation_reported() {
        let image = solid(10, 10);
        let mut tessellation = Tessellation::new(&image, 3.0).unwrap();
        let pixel = Pixel::new(4, 4);
        let owner = tessellation.owner(pixel);
        let (_, segments) = tessellation.parts_mut();
        segments[owner.index()].remove(pixel, Vec3::new(80.0, 120.0, 200.0));

        assert!(matches!(
            tessellation.check_invariants(&image),
            Err(VCellsError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_single_pixel_image() {
        let image = solid(1, 1);
        let tessellation = Tessellation::new(&image, 1.0).unwrap();
        assert_eq!(tessellation.segment_count(), 1);
        assert_eq!(tessellation.edge_pixels(), vec![Pixel::new(0, 0)]);
    }
}
