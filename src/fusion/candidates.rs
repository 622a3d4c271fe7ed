use crate::error::{GpResult, GridPickError};
use crate::grid::{Cell, GRID_SIZE};
use serde::Serialize;

/// Focus cell used when the classifier finds no carbon at all.
pub const FALLBACK_FOCUS: Cell = Cell::new(GRID_SIZE / 2, GRID_SIZE / 2);

// Guards a user-supplied integer centre from producing an infinite weight
const MIN_DISTANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub cell: Cell,
    pub weight: f64,
}

/// Weighted list of cells the focus point may be drawn from.
///
/// Never empty, and the weights always sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarbonCandidateSet {
    entries: Vec<Candidate>,
    fallback: bool,
}

impl CarbonCandidateSet {
    /// Weights each cell by the inverse of its distance from `(center, center)`.
    /// An empty slice yields the fallback set.
    pub fn from_cells(cells: &[Cell], center: f64) -> Self {
        if cells.is_empty() {
            return Self::fallback();
        }

        let raw: Vec<f64> = cells
            .iter()
            .map(|cell| {
                let dr = cell.row as f64 - center;
                let dc = cell.col as f64 - center;
                1.0 / (dr * dr + dc * dc).sqrt().max(MIN_DISTANCE)
            })
            .collect();
        let total: f64 = raw.iter().sum();

        let entries = cells
            .iter()
            .zip(raw)
            .map(|(&cell, w)| Candidate {
                cell,
                weight: w / total,
            })
            .collect();

        Self {
            entries,
            fallback: false,
        }
    }

    /// Builds a set from explicit weights, normalising them to sum to 1.
    pub fn from_weighted(entries: &[(Cell, f64)]) -> GpResult<Self> {
        if entries.is_empty() {
            return Err(GridPickError::MalformedGrid(
                "candidate set must not be empty".to_string(),
            ));
        }
        for (cell, w) in entries {
            if !cell.is_on_grid() {
                return Err(GridPickError::MalformedGrid(format!(
                    "candidate {} is off the grid",
                    cell
                )));
            }
            if !w.is_finite() || *w <= 0.0 {
                return Err(GridPickError::MalformedGrid(format!(
                    "candidate {} has non-positive weight {}",
                    cell, w
                )));
            }
        }

        let total: f64 = entries.iter().map(|(_, w)| w).sum();
        Ok(Self {
            entries: entries
                .iter()
                .map(|&(cell, w)| Candidate {
                    cell,
                    weight: w / total,
                })
                .collect(),
            fallback: false,
        })
    }

    pub fn single(cell: Cell) -> Self {
        Self {
            entries: vec![Candidate { cell, weight: 1.0 }],
            fallback: false,
        }
    }

    pub fn fallback() -> Self {
        Self {
            entries: vec![Candidate {
                cell: FALLBACK_FOCUS,
                weight: 1.0,
            }],
            fallback: true,
        }
    }

    /// True when no carbon cell passed the threshold.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    pub fn cell(&self, idx: usize) -> Cell {
        self.entries[idx].cell
    }

    pub fn weights(&self) -> Vec<f64> {
        self.entries.iter().map(|c| c.weight).collect()
    }
}
