//! Dense pixel → segment index with a cardinal-neighbor cache
//!
//! The index is the single source of truth for pixel ownership. Next to the
//! owner map it keeps, for every pixel, the owners of the four pixels one step
//! away (top, right, bottom, left). Writes push the new owner into the cache
//! entries of the four adjacent pixels, so a neighbor lookup is a single array
//! read and the cache is never stale once [`PixelIndex::set`] returns.

use crate::pixel::{Direction, Pixel, SegmentId};

/// Owner map plus neighbor cache for a `width` x `height` image
#[derive(Debug, Clone, PartialEq)]
pub struct PixelIndex {
    width: u32,
    height: u32,
    owners: Vec<SegmentId>,
    neighbors: Vec<[SegmentId; 4]>,
}

impl PixelIndex {
    /// Create an index with every pixel unassigned
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            owners: vec![SegmentId::NONE; len],
            neighbors: vec![[SegmentId::NONE; 4]; len],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn contains(&self, pixel: Pixel) -> bool {
        pixel.x >= 0
            && pixel.y >= 0
            && (pixel.x as u32) < self.width
            && (pixel.y as u32) < self.height
    }

    #[inline]
    fn offset(&self, pixel: Pixel) -> Option<usize> {
        self.contains(pixel)
            .then(|| pixel.y as usize * self.width as usize + pixel.x as usize)
    }

    /// Owner of `pixel`; the sentinel outside the image or when unassigned
    #[inline]
    pub fn get(&self, pixel: Pixel) -> SegmentId {
        self.offset(pixel)
            .map_or(SegmentId::NONE, |i| self.owners[i])
    }

    /// Assign `pixel` to `id`
    ///
    /// Silently ignored outside the image. Updates the cache entries of the
    /// four adjacent pixels (not the cache entry of `pixel` itself).
    pub fn set(&mut self, pixel: Pixel, id: SegmentId) {
        let Some(i) = self.offset(pixel) else {
            return;
        };
        self.owners[i] = id;

        for direction in Direction::ALL {
            if let Some(j) = self.offset(pixel.step(direction)) {
                // seen from that neighbor, `pixel` lies in the opposite direction
                self.neighbors[j][direction.opposite().slot()] = id;
            }
        }
    }

    /// Cached owners of the pixels above, right of, below and left of `pixel`
    ///
    /// All four are the sentinel when `pixel` is outside the image.
    #[inline]
    pub fn neighbors(&self, pixel: Pixel) -> [SegmentId; 4] {
        self.offset(pixel)
            .map_or([SegmentId::NONE; 4], |i| self.neighbors[i])
    }

    /// Whether any cardinal neighbor has a different owner
    ///
    /// The sentinel counts as different, so every pixel on the image border
    /// is an edge. Always false outside the image.
    pub fn is_edge(&self, pixel: Pixel) -> bool {
        let Some(i) = self.offset(pixel) else {
            return false;
        };
        let owner = self.owners[i];
        self.neighbors[i].iter().any(|&n| n != owner)
    }

    /// Iterate all in-bounds pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        let width = self.width as i32;
        (0..self.height as i32).flat_map(move |y| (0..width).map(move |x| Pixel::new(x, y)))
    }

    /// Recompute the cache entry of `pixel` from the owner map
    ///
    /// Returns `None` outside the image. Used to audit the cache.
    pub fn expected_neighbors(&self, pixel: Pixel) -> Option<[SegmentId; 4]> {
        self.contains(pixel)
            .then(|| pixel.neighbors().map(|n| self.get(n)))
    }
}
