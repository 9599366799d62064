//! Flat-top hexagon rasterization
//!
//! A hexagon is anchored at its left apex `p1` and described clockwise (in
//! image coordinates, y down):
//!
//! ```text
//!     p2 ---- p3
//!    /          \
//!  p1            p4
//!    \          /
//!     p6 ---- p5
//! ```
//!
//! The apex is a real-valued point, usually a lattice center minus one edge
//! length. Every derived coordinate is rounded with `ceil`, and the hexagon
//! covers the half-open area `top <= y < bottom`, `left(y) <= x < right(y)`.
//! Hexagons anchored on the same lattice therefore claim every pixel along a
//! shared seam exactly once.

use glam::{DVec2, IVec2};

/// Half-height factor of a flat-top hexagon: sin(60°)
const SIN_60: f64 = 0.866_025_403_784_438_6;

/// Horizontal run per unit of vertical run along a slanted edge: 1 / tan(60°)
const INV_TAN_60: f64 = 0.577_350_269_189_625_8;

/// Values this close to an integer round as that integer
const SNAP: f64 = 1e-9;

/// Inclusive column range covered by one scanline of a hexagon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub y: i32,
    pub x_start: i32,
    pub x_end: i32,
}

impl RowSpan {
    /// Number of pixels in the span
    #[inline]
    pub fn len(&self) -> usize {
        (self.x_end - self.x_start + 1).max(0) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x_end < self.x_start
    }

    #[inline]
    pub fn contains(&self, x: i32) -> bool {
        x >= self.x_start && x <= self.x_end
    }
}

/// Vertical half-height of a hexagon with the given edge length
#[inline]
pub fn half_height(edge_length: f64) -> f64 {
    edge_length * SIN_60
}

/// `ceil` that absorbs floating error on lattice multiples
#[inline]
fn ceil_px(v: f64) -> i32 {
    (v - SNAP).ceil() as i32
}

/// The five vertices following `apex` clockwise: `[p2, p3, p4, p5, p6]`
pub fn hexagon_vertices(edge_length: f64, apex: DVec2) -> [IVec2; 5] {
    let h = half_height(edge_length);
    let (x1, y1) = (apex.x, apex.y);
    let top = ceil_px(y1 - h);
    let bottom = ceil_px(y1 + h);
    let near = ceil_px(x1 + 0.5 * edge_length);
    let far = ceil_px(x1 + 1.5 * edge_length);

    let p2 = IVec2::new(near, top);
    let p3 = IVec2::new(far, top);
    let p4 = IVec2::new(ceil_px(x1 + 2.0 * edge_length), ceil_px(y1));
    let p5 = IVec2::new(far, bottom);
    let p6 = IVec2::new(near, bottom);

    [p2, p3, p4, p5, p6]
}

/// Filled scanlines of a hexagon, top to bottom
///
/// Rows run from `p2.y` up to but excluding `p6.y`. Each row covers the
/// columns from the upper-left slanted edge up to but excluding the
/// right-hand one; rows left empty by a sub-pixel hexagon are skipped.
pub fn hexagon_row_spans(edge_length: f64, apex: DVec2) -> Vec<RowSpan> {
    let h = half_height(edge_length);
    let (left, right) = (apex.x, apex.x + 2.0 * edge_length);

    (ceil_px(apex.y - h)..ceil_px(apex.y + h))
        .map(|y| {
            let inset = (y as f64 - apex.y).abs() * INV_TAN_60;
            RowSpan {
                y,
                x_start: ceil_px(left + inset),
                x_end: ceil_px(right - inset) - 1,
            }
        })
        .filter(|span| !span.is_empty())
        .collect()
}

/// Boundary pixels of a hexagon
///
/// The full top and bottom rows plus both ends of every row in between.
pub fn hexagon_outline(edge_length: f64, apex: DVec2) -> Vec<IVec2> {
    let spans = hexagon_row_spans(edge_length, apex);
    let last = spans.len().saturating_sub(1);
    let mut outline = Vec::new();

    for (row, span) in spans.iter().enumerate() {
        if row == 0 || row == last {
            outline.extend((span.x_start..=span.x_end).map(|x| IVec2::new(x, span.y)));
        } else {
            outline.push(IVec2::new(span.x_start, span.y));
            if span.x_end != span.x_start {
                outline.push(IVec2::new(span.x_end, span.y));
            }
        }
    }

    outline
}
