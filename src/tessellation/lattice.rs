//! Hexagonal seed lattice
//!
//! Hexagon centers sit on a rectangular lattice of pitch
//! `(1.5 * edge, edge * sin(60°))` at the points `(i, j)` with `i + j` even, so
//! odd columns are shifted down by one half-height. Every lattice cell has
//! exactly two candidate centers on opposite corners, and a pixel belongs to
//! the nearer one.
//!
//! Lattice coordinates are 64-bit: with a sub-pixel edge length a small image
//! already spans billions of columns.

use glam::{DVec2, I64Vec2};

use crate::error::{Result, VCellsError};
use crate::geometry;
use crate::pixel::Pixel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLattice {
    edge_length: f64,
    pitch: DVec2,
    /// Highest lattice column that can own a pixel
    max_column: i64,
    /// Centers per even column (even rows `0..=rows`)
    even_column_len: u64,
    /// Centers per odd column (odd rows `1..=rows`)
    odd_column_len: u64,
}

impl HexLattice {
    /// # Errors
    ///
    /// Returns `InvalidGeometry` for a non-positive (or non-finite) edge length
    /// or a zero image dimension.
    pub fn new(width: u32, height: u32, edge_length: f64) -> Result<Self> {
        if !(edge_length > 0.0) || !edge_length.is_finite() {
            return Err(VCellsError::InvalidGeometry(format!(
                "hexagon edge length must be positive (got {})",
                edge_length
            )));
        }
        if width == 0 || height == 0 {
            return Err(VCellsError::InvalidGeometry(format!(
                "image dimensions must be positive (got {}x{})",
                width, height
            )));
        }

        let pitch = DVec2::new(1.5 * edge_length, geometry::half_height(edge_length));
        // float to int casts saturate
        let rows = (height as f64 / pitch.y).ceil() as u64;
        let max_column = (((width - 1) as f64 / pitch.x).floor() as i64).saturating_add(1);

        Ok(Self {
            edge_length,
            pitch,
            max_column,
            even_column_len: rows / 2 + 1,
            odd_column_len: rows / 2 + rows % 2,
        })
    }

    #[inline]
    pub fn edge_length(&self) -> f64 {
        self.edge_length
    }

    #[inline]
    pub fn pitch(&self) -> DVec2 {
        self.pitch
    }

    /// Number of lattice centers touching the image, `None` past `u64`
    ///
    /// Only occupied centers become segments, so this is a bound, not an
    /// allocation size.
    pub fn capacity(&self) -> Option<u64> {
        let columns = (self.max_column as u64).checked_add(1)?;
        (columns / 2)
            .checked_mul(self.even_column_len.checked_add(self.odd_column_len)?)?
            .checked_add((columns % 2) * self.even_column_len)
    }

    /// Lattice cell containing `pixel`
    #[inline]
    pub fn cell_of(&self, pixel: Pixel) -> I64Vec2 {
        I64Vec2::new(
            (pixel.x as f64 / self.pitch.x).floor() as i64,
            (pixel.y as f64 / self.pitch.y).floor() as i64,
        )
    }

    /// Image-space position of the lattice point `(i, j)`
    #[inline]
    pub fn center(&self, point: I64Vec2) -> DVec2 {
        point.as_dvec2() * self.pitch
    }

    /// The hexagon center nearest to `pixel`
    ///
    /// Of the two candidate corners of the pixel's lattice cell, the one with
    /// the smaller squared distance wins; on a tie the one with the lower
    /// [`hex_index`](Self::hex_index) wins.
    pub fn nearest_center(&self, pixel: Pixel) -> I64Vec2 {
        let I64Vec2 { x: i, y: j } = self.cell_of(pixel);
        let (i1, j1) = (i.saturating_add(1), j.saturating_add(1));
        // candidates listed lower hex index first
        let (first, second) = if (i ^ j) & 1 == 0 {
            (I64Vec2::new(i, j), I64Vec2::new(i1, j1))
        } else {
            (I64Vec2::new(i, j1), I64Vec2::new(i1, j))
        };

        let p = DVec2::new(pixel.x as f64, pixel.y as f64);
        if p.distance_squared(self.center(first)) <= p.distance_squared(self.center(second)) {
            first
        } else {
            second
        }
    }

    /// Column-major scan position of the center `(i, j)`, `None` past `u64`
    ///
    /// Ordering centers by `(i, j)` gives the same order as this index.
    pub fn hex_index(&self, point: I64Vec2) -> Option<u64> {
        let I64Vec2 { x: i, y: j } = point;
        debug_assert!((i ^ j) & 1 == 0, "({}, {}) is not a hexagon center", i, j);
        debug_assert!(i >= 0 && j >= 0, "({}, {}) is off the lattice", i, j);

        let column_pair = self.even_column_len.checked_add(self.odd_column_len)?;
        let mut past = (i as u64 / 2).checked_mul(column_pair)?;
        if i % 2 == 1 {
            past = past.checked_add(self.even_column_len)?;
        }
        past.checked_add(j as u64 / 2)
    }
}
