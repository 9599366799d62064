//! Fitness scoring of a pixel against a candidate segment

use glam::{IVec2, Vec3};

use crate::index::PixelIndex;
use crate::pixel::{Pixel, SegmentId};

/// Score of assigning a pixel to a segment; lower is better
///
/// Implementations must be pure and deterministic: the same arguments always
/// produce the same non-negative score.
pub trait FitnessMetric {
    /// * `color` - source color of the pixel
    /// * `centroid` - mean color of the candidate segment
    /// * `outside` - pixels of the compactness disk around the pixel that the
    ///   candidate does not own (off-image positions included)
    fn score(&self, color: Vec3, centroid: Vec3, outside: usize) -> f32;
}

/// Color distance with a compactness penalty
///
/// `sqrt(|color - centroid|² + 2 · weight · outside)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompactnessMetric {
    pub weight: f32,
}

impl CompactnessMetric {
    pub fn new(weight: f32) -> Self {
        Self { weight }
    }
}

impl FitnessMetric for CompactnessMetric {
    #[inline]
    fn score(&self, color: Vec3, centroid: Vec3, outside: usize) -> f32 {
        let color_dist_sq = color.distance_squared(centroid);
        (color_dist_sq + 2.0 * self.weight * outside as f32).sqrt()
    }
}

/// Integer offsets within distance `radius` of the origin
#[derive(Debug, Clone, PartialEq)]
pub struct Disk {
    radius: u32,
    offsets: Vec<IVec2>,
}

impl Disk {
    pub fn new(radius: u32) -> Self {
        let r = radius as i32;
        let offsets = (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| IVec2::new(dx, dy)))
            .filter(|o| o.length_squared() <= r * r)
            .collect();
        Self { radius, offsets }
    }

    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    #[inline]
    pub fn offsets(&self) -> &[IVec2] {
        &self.offsets
    }

    /// Disk positions around `center` not owned by `segment`
    pub fn outside(&self, index: &PixelIndex, center: Pixel, segment: SegmentId) -> usize {
        let inside = self
            .offsets
            .iter()
            .filter(|&&o| index.get(center + o) == segment)
            .count();
        self.offsets.len() - inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_sizes() {
        assert_eq!(Disk::new(0).len(), 1);
        assert_eq!(Disk::new(1).len(), 5);
        assert_eq!(Disk::new(2).len(), 13);
        assert_eq!(Disk::new(3).len(), 29);
    }

    #[test]
    fn test_disk_outside_counts_off_image() {
        let mut index = PixelIndex::new(3, 3);
        let pixels: Vec<Pixel> = index.pixels().collect();
        for p in pixels {
            index.set(p, SegmentId::new(0));
        }
        let disk = Disk::new(1);

        assert_eq!(disk.outside(&index, Pixel::new(1, 1), SegmentId::new(0)), 0);
        // corner: two of the five disk positions are off-image
        assert_eq!(disk.outside(&index, Pixel::new(0, 0), SegmentId::new(0)), 2);
        assert_eq!(disk.outside(&index, Pixel::new(1, 1), SegmentId::new(1)), 5);
    }

    #[test]
    fn test_compactness_metric() {
        let metric = CompactnessMetric::new(2.0);
        let score = metric.score(Vec3::new(3.0, 4.0, 0.0), Vec3::ZERO, 0);
        assert!((score - 5.0).abs() < 1e-6);

        // 9 + 2 * 2 * 4 = 25
        let score = metric.score(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, 4);
        assert!((score - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_weight_ignores_shape() {
        let metric = CompactnessMetric::new(0.0);
        let a = metric.score(Vec3::splat(10.0), Vec3::splat(10.0), 0);
        let b = metric.score(Vec3::splat(10.0), Vec3::splat(10.0), 29);
        assert_eq!(a, b);
    }
}
