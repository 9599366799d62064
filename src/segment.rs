//! Segment records
//!
//! A segment holds pixel coordinates only, never references into the index.
//! Membership is mirrored from the [`PixelIndex`](crate::index::PixelIndex),
//! which stays the source of truth for ownership.

use std::collections::BTreeSet;

use glam::{DVec3, Vec3};

use crate::error::{Result, VCellsError};
use crate::pixel::{Pixel, SegmentId};

/// One region of the segmentation
///
/// # Design Notes
///
/// The color centroid is kept as running per-channel sums in `f64` so adding or
/// removing a pixel is O(1). For 8-bit channel values the sums are exact, so
/// the mean equals a full recompute over the members.
///
/// Pixel sets are ordered (row-major), which makes every iteration over a
/// segment deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    id: SegmentId,
    pixels: BTreeSet<Pixel>,
    edges: BTreeSet<Pixel>,
    color_sum: DVec3,
}

impl Segment {
    pub fn new(id: SegmentId) -> Self {
        Self {
            id,
            pixels: BTreeSet::new(),
            edges: BTreeSet::new(),
            color_sum: DVec3::ZERO,
        }
    }

    #[inline]
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Member pixels (the body)
    #[inline]
    pub fn pixels(&self) -> &BTreeSet<Pixel> {
        &self.pixels
    }

    /// Members that border another segment or the image edge
    #[inline]
    pub fn edges(&self) -> &BTreeSet<Pixel> {
        &self.edges
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// A segment that lost its last pixel is retired for good
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn contains(&self, pixel: Pixel) -> bool {
        self.pixels.contains(&pixel)
    }

    #[inline]
    pub fn is_edge(&self, pixel: Pixel) -> bool {
        self.edges.contains(&pixel)
    }

    /// Mean member color, `None` once the segment is empty
    pub fn centroid(&self) -> Option<Vec3> {
        if self.pixels.is_empty() {
            return None;
        }
        Some((self.color_sum / self.pixels.len() as f64).as_vec3())
    }

    /// Mean member color for distance queries
    ///
    /// # Errors
    ///
    /// Returns `EmptySegmentAccess` for a retired segment.
    pub fn try_centroid(&self) -> Result<Vec3> {
        self.centroid()
            .ok_or(VCellsError::EmptySegmentAccess(self.id))
    }

    /// Add `pixel` with source color `color` to the body
    ///
    /// Returns false (and changes nothing) if it was already a member.
    pub fn insert(&mut self, pixel: Pixel, color: Vec3) -> bool {
        if !self.pixels.insert(pixel) {
            return false;
        }
        self.color_sum += color.as_dvec3();
        true
    }

    /// Remove `pixel` from the body and the edge set
    ///
    /// Returns false (and changes nothing) if it was not a member.
    pub fn remove(&mut self, pixel: Pixel, color: Vec3) -> bool {
        if !self.pixels.remove(&pixel) {
            return false;
        }
        self.edges.remove(&pixel);
        if self.pixels.is_empty() {
            self.color_sum = DVec3::ZERO;
        } else {
            self.color_sum -= color.as_dvec3();
        }
        true
    }

    /// Flag or unflag a member as an edge pixel
    ///
    /// Non-members are never flagged.
    pub fn set_edge(&mut self, pixel: Pixel, edge: bool) {
        if edge && self.pixels.contains(&pixel) {
            self.edges.insert(pixel);
        } else {
            self.edges.remove(&pixel);
        }
    }
}
