//! Hexagonally seeded superpixel segmentation
//!
//! Partitions an image into contiguous segments seeded on a hexagonal grid,
//! then relaxes segment boundaries pixel by pixel toward color-homogeneous,
//! compact regions.
//!
//! # Quick Start
//!
//! ```rust
//! use hex_vcells::*;
//!
//! // Decoding is up to the caller; any packed RGB8 buffer will do
//! let (width, height) = (32u32, 24u32);
//! let pixels: Vec<u8> = (0..width * height)
//!     .flat_map(|i| {
//!         let x = i % width;
//!         if x < width / 2 { [220u8, 40, 40] } else { [40, 40, 220] }
//!     })
//!     .collect();
//! let image = SourceImage::from_rgb8(width, height, &pixels).unwrap();
//!
//! let config = VCellsConfigBuilder::new()
//!     .cell_size(5.0)
//!     .unwrap()
//!     .weight(10.0)
//!     .unwrap()
//!     .build();
//!
//! let mut engine = RelaxationEngine::new(image, &config).unwrap();
//! let report = engine.run().unwrap();
//! println!("{:?} after {} iterations", report.termination, report.iterations());
//!
//! for segment in engine.tessellation().occupied() {
//!     let _ = (segment.id(), segment.pixels().len(), segment.centroid());
//! }
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization of the configuration, pixels and ids

// Modules
pub mod error;
pub mod config;
pub mod pixel;
pub mod image;
pub mod geometry;
pub mod index;
pub mod segment;
pub mod tessellation;
pub mod relaxation;
pub mod render;

// Re-export core types for convenience
pub use error::{VCellsError, Result};
pub use config::{VCellsConfig, VCellsConfigBuilder};
pub use pixel::{Direction, Pixel, SegmentId};
pub use image::SourceImage;
pub use geometry::RowSpan;
pub use index::PixelIndex;
pub use segment::Segment;
pub use tessellation::{HexLattice, Tessellation};
pub use relaxation::{
    CompactnessMetric, Disk, FitnessMetric, IterationReport, RelaxationEngine, RelaxationState,
    RunReport, Termination,
};

// Re-export glam::Vec3 for convenience
pub use glam::Vec3;
