//! Error types for tessellation and relaxation

use std::fmt;

use crate::pixel::SegmentId;

/// Errors that can occur while seeding or relaxing segments
#[derive(Debug, Clone, PartialEq)]
pub enum VCellsError {
    /// Non-positive hexagon edge length or image dimensions
    InvalidGeometry(String),
    /// Configuration validation failed
    InvalidConfig(String),
    /// Pixel buffer does not match the declared dimensions
    InvalidImage(String),
    /// Centroid or body of a segment with zero members was requested
    ///
    /// This is an internal invariant violation: the relaxation loop never
    /// lists an emptied segment as a candidate.
    EmptySegmentAccess(SegmentId),
    /// An audit found the index and segment records out of sync
    InvariantViolation(String),
}

impl fmt::Display for VCellsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VCellsError::InvalidGeometry(msg) => write!(f, "invalid geometry: {}", msg),
            VCellsError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            VCellsError::InvalidImage(msg) => write!(f, "invalid image: {}", msg),
            VCellsError::EmptySegmentAccess(id) => {
                write!(f, "segment {} has no pixels left", id)
            }
            VCellsError::InvariantViolation(msg) => write!(f, "invariant violated: {}", msg),
        }
    }
}

impl std::error::Error for VCellsError {}

/// Result type alias for segmentation operations
pub type Result<T> = std::result::Result<T, VCellsError>;
