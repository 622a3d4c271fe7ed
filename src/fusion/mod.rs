pub mod candidates;
pub mod kernels;

pub use self::candidates::{Candidate, CarbonCandidateSet, FALLBACK_FOCUS};
pub use self::kernels::FusionKernels;

use crate::config::FusionParams;
use crate::error::{GpResult, GridPickError};
use crate::grid::{convolve3x3, Cell, CellClass, ClassScoreGrid, QualityMap, GRID_SIZE};
use strum::IntoEnumIterator;
use tracing::{debug, warn};

/// Everything the searcher needs from one classified image.
#[derive(Debug, Clone)]
pub struct FusionOutput {
    pub quality: QualityMap,
    pub candidates: CarbonCandidateSet,
}

/// Turns per-class probabilities into a single quality map plus the
/// weighted list of carbon cells that seed the focus point.
#[derive(Debug, Clone)]
pub struct ScoreFuser {
    pub kernels: FusionKernels,
    pub carbon_threshold: f64,
    pub center_offset: f64,
}

impl Default for ScoreFuser {
    fn default() -> Self {
        Self {
            kernels: FusionKernels::default(),
            carbon_threshold: 0.8,
            center_offset: 6.5,
        }
    }
}

impl ScoreFuser {
    pub fn from_params(params: &FusionParams) -> GpResult<Self> {
        if !params.carbon_threshold.is_finite() {
            return Err(GridPickError::Config(
                "carbon_threshold must be finite".to_string(),
            ));
        }
        if !params.center_offset.is_finite() {
            return Err(GridPickError::Config(
                "center_offset must be finite".to_string(),
            ));
        }

        Ok(Self {
            kernels: FusionKernels::from_params(params)?,
            carbon_threshold: params.carbon_threshold,
            center_offset: params.center_offset,
        })
    }

    /// Convolves each class slice with its kernel and sums the results.
    pub fn fuse(&self, grid: &ClassScoreGrid) -> QualityMap {
        let mut total = [[0.0; GRID_SIZE]; GRID_SIZE];
        for class in CellClass::iter() {
            let conv = convolve3x3(&grid.plane(class), self.kernels.get(class));
            for (acc_row, conv_row) in total.iter_mut().zip(conv.iter()) {
                for (acc, v) in acc_row.iter_mut().zip(conv_row.iter()) {
                    *acc += v;
                }
            }
        }

        let map = QualityMap::from_plane_unchecked(total);
        let (lo, hi) = map.min_max();
        debug!("Fused quality map: min {:.3}, max {:.3}", lo, hi);
        map
    }

    /// Cells whose carbon score is strictly above the threshold, in row-major order.
    pub fn carbon_cells(&self, grid: &ClassScoreGrid) -> Vec<Cell> {
        let mut cells = Vec::new();
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let cell = Cell::new(row, col);
                if grid.score(cell, CellClass::Carbon) > self.carbon_threshold {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    pub fn carbon_candidates(&self, grid: &ClassScoreGrid) -> CarbonCandidateSet {
        let cells = self.carbon_cells(grid);
        if cells.is_empty() {
            warn!(
                "No carbon above {:.2}; focusing on fallback cell {}",
                self.carbon_threshold, FALLBACK_FOCUS
            );
        } else {
            debug!("{} carbon candidates above {:.2}", cells.len(), self.carbon_threshold);
        }
        CarbonCandidateSet::from_cells(&cells, self.center_offset)
    }

    pub fn run(&self, grid: &ClassScoreGrid) -> FusionOutput {
        FusionOutput {
            quality: self.fuse(grid),
            candidates: self.carbon_candidates(grid),
        }
    }
}
