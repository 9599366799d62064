//! Pixel coordinates, cardinal directions and segment identifiers

use std::cmp::Ordering;
use std::fmt;

use glam::IVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a segment
///
/// Ids are handed out in increasing order from 0 when the tessellation is
/// seeded and are never reused. [`SegmentId::NONE`] is the sentinel for
/// out-of-bounds or unassigned pixels.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(u32);

impl SegmentId {
    /// The "no segment" sentinel
    pub const NONE: SegmentId = SegmentId(u32::MAX);

    #[inline]
    pub const fn new(id: u32) -> Self {
        SegmentId(id)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Position of this segment in the segment list
    ///
    /// Must not be called on the sentinel.
    #[inline]
    pub fn index(self) -> usize {
        debug_assert!(self.is_some(), "sentinel has no index");
        self.0 as usize
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "none")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// The four cardinal directions, in the fixed order used by the neighbor cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    /// All directions in cache order: top, right, bottom, left
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    /// Slot of this direction in a neighbor-cache entry
    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Unit step in image coordinates (y grows downwards)
    #[inline]
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Top => IVec2::new(0, -1),
            Direction::Right => IVec2::new(1, 0),
            Direction::Bottom => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }
}

/// Integer pixel coordinate
///
/// Coordinates may lie outside the image; every index operation treats such
/// pixels as belonging to [`SegmentId::NONE`]. Pixels order row-major
/// (by `y`, then `x`), which fixes the scan order of edge snapshots.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
}

impl Pixel {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The pixel one step away in `direction`
    #[inline]
    pub fn step(self, direction: Direction) -> Pixel {
        self + direction.offset()
    }

    /// The four cardinal neighbors in cache order
    #[inline]
    pub fn neighbors(self) -> [Pixel; 4] {
        Direction::ALL.map(|d| self.step(d))
    }
}

impl std::ops::Add<IVec2> for Pixel {
    type Output = Pixel;

    #[inline]
    fn add(self, offset: IVec2) -> Pixel {
        Pixel::new(self.x + offset.x, self.y + offset.y)
    }
}

impl From<IVec2> for Pixel {
    fn from(v: IVec2) -> Self {
        Pixel::new(v.x, v.y)
    }
}

impl From<Pixel> for IVec2 {
    fn from(p: Pixel) -> Self {
        IVec2::new(p.x, p.y)
    }
}

impl Ord for Pixel {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Pixel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
