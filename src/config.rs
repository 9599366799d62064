//! Segmentation configuration and builder

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VCellsError};

/// Largest accepted compactness disk radius
pub const MAX_RADIUS: u32 = 64;

/// Parameters of one segmentation run
///
/// The same configuration and image always produce the identical segmentation.
///
/// # Example
///
/// ```rust
/// use hex_vcells::*;
///
/// let config = VCellsConfigBuilder::new()
///     .cell_size(10.0)
///     .unwrap()
///     .weight(300.0)
///     .unwrap()
///     .build();
///
/// assert_eq!(config.radius, 3);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VCellsConfig {
    /// Edge length of the seed hexagons, in pixels
    ///
    /// Each seed covers roughly `2.6 * cell_size²` pixels.
    pub cell_size: f32,

    /// Compactness weight
    ///
    /// - 0: pure color clustering, segment shape is ignored
    /// - 100: default, balanced
    /// - larger: boundaries stay close to the hexagon grid
    pub weight: f32,

    /// Radius of the disk over which compactness is measured
    pub radius: u32,

    /// Iteration budget for [`RelaxationEngine::run`](crate::RelaxationEngine::run)
    pub max_iterations: usize,
}

impl Default for VCellsConfig {
    fn default() -> Self {
        VCellsConfigBuilder::new().build()
    }
}

/// Builder for [`VCellsConfig`] with validation
#[derive(Debug, Clone)]
pub struct VCellsConfigBuilder {
    cell_size: f32,
    weight: f32,
    radius: u32,
    max_iterations: usize,
}

impl VCellsConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - cell_size: 15
    /// - weight: 100
    /// - radius: 3 (29-pixel disk)
    /// - max_iterations: 10,000
    pub fn new() -> Self {
        Self {
            cell_size: 15.0,
            weight: 100.0,
            radius: 3,
            max_iterations: 10_000,
        }
    }

    /// Set the seed hexagon edge length
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless the size is positive and finite
    pub fn cell_size(mut self, cell_size: f32) -> Result<Self> {
        if !(cell_size > 0.0) || !cell_size.is_finite() {
            return Err(VCellsError::InvalidConfig(format!(
                "cell size must be positive (got {})",
                cell_size
            )));
        }
        self.cell_size = cell_size;
        Ok(self)
    }

    /// Set the compactness weight
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the weight is negative or not finite
    pub fn weight(mut self, weight: f32) -> Result<Self> {
        if !(weight >= 0.0) || !weight.is_finite() {
            return Err(VCellsError::InvalidConfig(format!(
                "weight must be >= 0 (got {})",
                weight
            )));
        }
        self.weight = weight;
        Ok(self)
    }

    /// Set the compactness disk radius
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if radius > [`MAX_RADIUS`]
    pub fn radius(mut self, radius: u32) -> Result<Self> {
        if radius > MAX_RADIUS {
            return Err(VCellsError::InvalidConfig(format!(
                "radius must be <= {} (got {})",
                MAX_RADIUS, radius
            )));
        }
        self.radius = radius;
        Ok(self)
    }

    /// Set the iteration budget
    ///
    /// A budget of 0 makes every run end immediately as exhausted.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn build(self) -> VCellsConfig {
        VCellsConfig {
            cell_size: self.cell_size,
            weight: self.weight,
            radius: self.radius,
            max_iterations: self.max_iterations,
        }
    }
}

impl Default for VCellsConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
