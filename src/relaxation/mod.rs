//! Boundary relaxation
//!
//! Repeatedly moves boundary pixels to the neighboring segment that fits them
//! best, repairing the pixel index, segment bodies, edge sets and centroids in
//! place after every single move.
//!
//! # Algorithm
//!
//! For each iteration:
//! 1. Snapshot all edge pixels. Pixels that become edges during the pass wait
//!    for the next one.
//! 2. For each snapshot pixel, score its current owner and each distinct
//!    neighboring segment with the [`FitnessMetric`]. The owner is scored
//!    first and a neighbor only wins on a strictly lower score, so ties keep
//!    the pixel where it is; among neighbors the first in top, right, bottom,
//!    left order wins.
//! 3. Move the pixel if a neighbor won, then refresh the edge flags of the
//!    pixel and its four neighbors.
//!
//! Moves are visible to later pixels of the same pass; only the candidate set
//! is frozen. An iteration that moves nothing converges the run.

mod metric;

pub use metric::{CompactnessMetric, Disk, FitnessMetric};

use std::ops::ControlFlow;
use std::time::Instant;

use glam::Vec3;
use log::{debug, info};

use crate::config::VCellsConfig;
use crate::error::{Result, VCellsError};
use crate::image::SourceImage;
use crate::pixel::{Pixel, SegmentId};
use crate::tessellation::Tessellation;

/// Lifecycle of a relaxation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxationState {
    /// More iterations may move pixels
    Running,
    /// An iteration moved nothing; further iterations are no-ops
    Converged,
    /// The last run used its whole iteration budget without converging
    BudgetExhausted,
}

/// Why a call to [`RelaxationEngine::run_with`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Converged,
    BudgetExhausted,
    /// The observer asked to stop; the run can be resumed
    Interrupted,
}

/// Outcome of a single iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationReport {
    /// 1-based number of this iteration over the engine's lifetime
    pub iteration: usize,
    /// Edge pixels in the snapshot
    pub candidates: usize,
    /// Pixels reassigned to another segment
    pub moved: usize,
    /// Segments that lost their last pixel during this iteration
    pub retired: usize,
}

impl IterationReport {
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.moved == 0
    }
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub termination: Termination,
    /// Pixels moved by each iteration of this run, in order
    pub moved_per_iteration: Vec<usize>,
}

impl RunReport {
    /// Iterations executed by this run
    #[inline]
    pub fn iterations(&self) -> usize {
        self.moved_per_iteration.len()
    }

    pub fn total_moved(&self) -> usize {
        self.moved_per_iteration.iter().sum()
    }
}

/// Relaxation engine owning the source image and the tessellation it refines
///
/// Generic over the [`FitnessMetric`]; [`RelaxationEngine::new`] uses
/// [`CompactnessMetric`] with the configured weight.
///
/// # Example
///
/// ```rust
/// use hex_vcells::*;
/// use glam::Vec3;
///
/// let image = SourceImage::from_fn(40, 40, |x, _| {
///     if x < 20 { Vec3::new(255.0, 0.0, 0.0) } else { Vec3::new(0.0, 0.0, 255.0) }
/// })
/// .unwrap();
/// let config = VCellsConfigBuilder::new()
///     .cell_size(6.0)
///     .unwrap()
///     .weight(1.0)
///     .unwrap()
///     .build();
///
/// let mut engine = RelaxationEngine::new(image, &config).unwrap();
/// let report = engine.run().unwrap();
/// assert_eq!(report.termination, Termination::Converged);
/// ```
#[derive(Debug, Clone)]
pub struct RelaxationEngine<M = CompactnessMetric> {
    config: VCellsConfig,
    image: SourceImage,
    tessellation: Tessellation,
    metric: M,
    disk: Disk,
    state: RelaxationState,
    iterations: usize,
}

impl RelaxationEngine<CompactnessMetric> {
    /// Seed a tessellation for `image` and prepare to relax it
    ///
    /// # Errors
    ///
    /// Returns `InvalidGeometry` if the configured cell size is not positive.
    pub fn new(image: SourceImage, config: &VCellsConfig) -> Result<Self> {
        Self::with_metric(image, config, CompactnessMetric::new(config.weight))
    }
}

impl<M: FitnessMetric> RelaxationEngine<M> {
    /// Seed a tessellation and relax it with a custom fitness metric
    ///
    /// `config.weight` is only used by the default metric.
    pub fn with_metric(image: SourceImage, config: &VCellsConfig, metric: M) -> Result<Self> {
        let tessellation = Tessellation::new(&image, config.cell_size)?;
        Ok(Self {
            config: *config,
            image,
            tessellation,
            metric,
            disk: Disk::new(config.radius),
            state: RelaxationState::Running,
            iterations: 0,
        })
    }

    #[inline]
    pub fn config(&self) -> &VCellsConfig {
        &self.config
    }

    #[inline]
    pub fn image(&self) -> &SourceImage {
        &self.image
    }

    /// Current segmentation; consistent whenever no iteration is in progress
    #[inline]
    pub fn tessellation(&self) -> &Tessellation {
        &self.tessellation
    }

    #[inline]
    pub fn metric(&self) -> &M {
        &self.metric
    }

    #[inline]
    pub fn disk(&self) -> &Disk {
        &self.disk
    }

    #[inline]
    pub fn state(&self) -> RelaxationState {
        self.state
    }

    /// Iterations executed over the engine's lifetime
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Give up the engine, keeping the image and the final segmentation
    pub fn into_parts(self) -> (SourceImage, Tessellation) {
        (self.image, self.tessellation)
    }

    /// Run one pass over the current edge pixels
    ///
    /// After convergence this returns an idle report without touching
    /// anything.
    ///
    /// # Errors
    ///
    /// `EmptySegmentAccess` signals a broken internal invariant; the
    /// segmentation should be discarded.
    pub fn iterate(&mut self) -> Result<IterationReport> {
        if self.state == RelaxationState::Converged {
            return Ok(IterationReport {
                iteration: self.iterations,
                candidates: 0,
                moved: 0,
                retired: 0,
            });
        }

        let candidates = self.tessellation.edge_pixels();
        let mut moved = 0;
        let mut retired = 0;

        for &pixel in &candidates {
            let Some(color) = self.image.color(pixel) else {
                continue;
            };
            let owner = self.tessellation.owner(pixel);
            let best = self.best_fit(pixel, color, owner)?;
            if best != owner && best.is_some() {
                if self.reassign(pixel, color, owner, best) {
                    retired += 1;
                }
                moved += 1;
            }
        }

        self.iterations += 1;
        if moved == 0 {
            self.state = RelaxationState::Converged;
        }

        let report = IterationReport {
            iteration: self.iterations,
            candidates: candidates.len(),
            moved,
            retired,
        };
        debug!(
            "iteration {}: {} candidates, {} moved, {} retired",
            report.iteration, report.candidates, report.moved, report.retired
        );
        Ok(report)
    }

    /// Iterate until convergence or the configured `max_iterations`
    pub fn run(&mut self) -> Result<RunReport> {
        self.run_for(self.config.max_iterations)
    }

    /// Iterate until convergence or `max_iterations` more iterations
    pub fn run_for(&mut self, max_iterations: usize) -> Result<RunReport> {
        self.run_with(max_iterations, |_, _| ControlFlow::Continue(()))
    }

    /// Iterate with an observer called after every iteration
    ///
    /// The observer sees the iteration report and the consistent segmentation
    /// (for rendering or progress), and may return `ControlFlow::Break` to stop
    /// the run before the next iteration. A run that ends by exhausting its
    /// budget or by interruption can be resumed by calling any run method again.
    pub fn run_with<F>(&mut self, max_iterations: usize, mut observer: F) -> Result<RunReport>
    where
        F: FnMut(&IterationReport, &Tessellation) -> ControlFlow<()>,
    {
        let mut moved_per_iteration = Vec::new();
        if self.state == RelaxationState::Converged {
            return Ok(RunReport {
                termination: Termination::Converged,
                moved_per_iteration,
            });
        }

        self.state = RelaxationState::Running;
        let started = Instant::now();
        info!(
            "relaxing {} segments: weight {}, radius {}, budget {} iterations",
            self.tessellation.segment_count(),
            self.config.weight,
            self.config.radius,
            max_iterations
        );

        for _ in 0..max_iterations {
            let report = self.iterate()?;
            moved_per_iteration.push(report.moved);
            let flow = observer(&report, &self.tessellation);

            if report.is_idle() {
                info!(
                    "converged after {} iterations ({} pixels moved, {:?})",
                    moved_per_iteration.len(),
                    moved_per_iteration.iter().sum::<usize>(),
                    started.elapsed()
                );
                return Ok(RunReport {
                    termination: Termination::Converged,
                    moved_per_iteration,
                });
            }
            if flow.is_break() {
                info!(
                    "interrupted after {} iterations ({:?})",
                    moved_per_iteration.len(),
                    started.elapsed()
                );
                return Ok(RunReport {
                    termination: Termination::Interrupted,
                    moved_per_iteration,
                });
            }
        }

        self.state = RelaxationState::BudgetExhausted;
        info!(
            "iteration budget of {} exhausted ({} pixels moved, {:?})",
            max_iterations,
            moved_per_iteration.iter().sum::<usize>(),
            started.elapsed()
        );
        Ok(RunReport {
            termination: Termination::BudgetExhausted,
            moved_per_iteration,
        })
    }

    /// Best-scoring segment for `pixel` among its owner and its neighbors
    fn best_fit(&self, pixel: Pixel, color: Vec3, owner: SegmentId) -> Result<SegmentId> {
        let neighbors = self.tessellation.index().neighbors(pixel);
        let mut best = owner;
        let mut best_score = self.score(pixel, color, owner)?;

        for (slot, &candidate) in neighbors.iter().enumerate() {
            if candidate.is_none() || candidate == owner || neighbors[..slot].contains(&candidate) {
                continue;
            }
            let score = self.score(pixel, color, candidate)?;
            if score < best_score {
                best = candidate;
                best_score = score;
            }
        }

        Ok(best)
    }

    fn score(&self, pixel: Pixel, color: Vec3, id: SegmentId) -> Result<f32> {
        let segment = self
            .tessellation
            .segment(id)
            .ok_or(VCellsError::EmptySegmentAccess(id))?;
        debug_assert!(!segment.is_empty(), "segment {} scored after retirement", id);
        let centroid = segment.try_centroid()?;
        let outside = self.disk.outside(self.tessellation.index(), pixel, id);
        Ok(self.metric.score(color, centroid, outside))
    }

    /// Move `pixel` from `from` to `to` and repair every structure
    ///
    /// Returns true if `from` lost its last pixel.
    fn reassign(&mut self, pixel: Pixel, color: Vec3, from: SegmentId, to: SegmentId) -> bool {
        let (index, segments) = self.tessellation.parts_mut();

        segments[from.index()].remove(pixel, color);
        segments[to.index()].insert(pixel, color);
        index.set(pixel, to);

        // only the moved pixel and its four neighbors can change edge status
        for p in std::iter::once(pixel).chain(pixel.neighbors()) {
            let owner = index.get(p);
            if owner.is_some() {
                segments[owner.index()].set_edge(p, index.is_edge(p));
            }
        }

        let retired = segments[from.index()].is_empty();
        if retired {
            debug!(
                "segment {} retired during iteration {}",
                from,
                self.iterations + 1
            );
        }
        retired
    }
}
