use crate::error::{GpResult, GridPickError};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter};

/// Side length of the square sampling grid (cells per row and per column).
pub const GRID_SIZE: usize = 14;

/// Number of classifier channels per cell.
pub const CLASS_COUNT: usize = 4;

/// Total number of cells on the grid.
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// One scalar per grid cell, indexed `[row][col]`.
pub type Plane = [[f64; GRID_SIZE]; GRID_SIZE];

/// A 3x3 weighting kernel, indexed `[row][col]`.
pub type Kernel = [[f64; 3]; 3];

/// Classifier channels, in the order the classifier emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum CellClass {
    #[strum(to_string = "film")]
    Film,
    #[strum(to_string = "aggregate")]
    Aggregate,
    #[strum(to_string = "ice")]
    Ice,
    #[strum(to_string = "carbon")]
    Carbon,
}

impl CellClass {
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            CellClass::Film => 0,
            CellClass::Aggregate => 1,
            CellClass::Ice => 2,
            CellClass::Carbon => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major position of the cell.
    #[inline(always)]
    pub fn flat_index(self) -> usize {
        self.row * GRID_SIZE + self.col
    }

    #[inline(always)]
    pub fn from_flat_index(idx: usize) -> Self {
        Self {
            row: idx / GRID_SIZE,
            col: idx % GRID_SIZE,
        }
    }

    /// Returns the cell shifted by `(dr, dc)`, or `None` if it leaves the grid.
    #[inline(always)]
    pub fn offset(self, dr: isize, dc: isize) -> Option<Cell> {
        let r = self.row as isize + dr;
        let c = self.col as isize + dc;
        if r < 0 || c < 0 || r >= GRID_SIZE as isize || c >= GRID_SIZE as isize {
            None
        } else {
            Some(Cell::new(r as usize, c as usize))
        }
    }

    pub fn is_on_grid(self) -> bool {
        self.row < GRID_SIZE && self.col < GRID_SIZE
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell::new(row, col)
    }
}

/// Per-cell, per-class probabilities produced by the external classifier.
///
/// Every value is finite and within `[0, 1]`; the constructors reject
/// anything else with [`GridPickError::MalformedGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScoreGrid {
    cells: [[[f64; CLASS_COUNT]; GRID_SIZE]; GRID_SIZE],
}

impl ClassScoreGrid {
    pub fn new(cells: [[[f64; CLASS_COUNT]; GRID_SIZE]; GRID_SIZE]) -> GpResult<Self> {
        for (r, row) in cells.iter().enumerate() {
            for (c, scores) in row.iter().enumerate() {
                for (k, &v) in scores.iter().enumerate() {
                    check_probability(v, r, c, k)?;
                }
            }
        }
        Ok(Self { cells })
    }

    /// A grid where every cell carries the same four class scores.
    pub fn uniform(scores: [f64; CLASS_COUNT]) -> GpResult<Self> {
        Self::new([[scores; GRID_SIZE]; GRID_SIZE])
    }

    /// Builds a grid from a `[row][col][class]` nested vector, checking the shape.
    pub fn from_nested(nested: &[Vec<Vec<f64>>]) -> GpResult<Self> {
        if nested.len() != GRID_SIZE {
            return Err(GridPickError::MalformedGrid(format!(
                "expected {} rows, found {}",
                GRID_SIZE,
                nested.len()
            )));
        }

        let mut cells = [[[0.0; CLASS_COUNT]; GRID_SIZE]; GRID_SIZE];
        for (r, row) in nested.iter().enumerate() {
            if row.len() != GRID_SIZE {
                return Err(GridPickError::MalformedGrid(format!(
                    "row {} has {} columns, expected {}",
                    r,
                    row.len(),
                    GRID_SIZE
                )));
            }
            for (c, scores) in row.iter().enumerate() {
                if scores.len() != CLASS_COUNT {
                    return Err(GridPickError::MalformedGrid(format!(
                        "cell ({}, {}) has {} class scores, expected {}",
                        r,
                        c,
                        scores.len(),
                        CLASS_COUNT
                    )));
                }
                cells[r][c].copy_from_slice(scores);
            }
        }
        Self::new(cells)
    }

    /// Builds a grid from the classifier's flat output: row-major cells,
    /// class channel innermost (`14 * 14 * 4` values).
    pub fn from_flat(values: &[f64]) -> GpResult<Self> {
        if values.len() != CELL_COUNT * CLASS_COUNT {
            return Err(GridPickError::MalformedGrid(format!(
                "expected {} values, found {}",
                CELL_COUNT * CLASS_COUNT,
                values.len()
            )));
        }

        let mut cells = [[[0.0; CLASS_COUNT]; GRID_SIZE]; GRID_SIZE];
        for (i, chunk) in values.chunks_exact(CLASS_COUNT).enumerate() {
            let cell = Cell::from_flat_index(i);
            cells[cell.row][cell.col].copy_from_slice(chunk);
        }
        Self::new(cells)
    }

    #[inline(always)]
    pub fn score(&self, cell: Cell, class: CellClass) -> f64 {
        self.cells[cell.row][cell.col][class.index()]
    }

    /// The 14x14 slice of a single class.
    pub fn plane(&self, class: CellClass) -> Plane {
        let k = class.index();
        let mut out = [[0.0; GRID_SIZE]; GRID_SIZE];
        for (r, row) in self.cells.iter().enumerate() {
            for (c, scores) in row.iter().enumerate() {
                out[r][c] = scores[k];
            }
        }
        out
    }
}

fn check_probability(v: f64, row: usize, col: usize, class: usize) -> GpResult<()> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(GridPickError::MalformedGrid(format!(
            "cell ({}, {}) class {} has score {} outside [0, 1]",
            row, col, class, v
        )));
    }
    Ok(())
}

/// Fused per-cell desirability. Values may be negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityMap {
    values: Plane,
}

impl QualityMap {
    /// Wraps precomputed values; rejects non-finite entries.
    pub fn new(values: Plane) -> GpResult<Self> {
        for (r, row) in values.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if !v.is_finite() {
                    return Err(GridPickError::MalformedGrid(format!(
                        "quality value at ({}, {}) is not finite",
                        r, c
                    )));
                }
            }
        }
        Ok(Self { values })
    }

    pub fn zeros() -> Self {
        Self {
            values: [[0.0; GRID_SIZE]; GRID_SIZE],
        }
    }

    pub(crate) fn from_plane_unchecked(values: Plane) -> Self {
        Self { values }
    }

    #[inline(always)]
    pub fn get(&self, cell: Cell) -> f64 {
        self.values[cell.row][cell.col]
    }

    pub fn values(&self) -> &Plane {
        &self.values
    }

    pub fn min_max(&self) -> (f64, f64) {
        self.values
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

/// Same-size 2D convolution of a grid plane with a 3x3 kernel.
///
/// Cells beyond the border are treated as zero. The kernel is flipped, so
/// asymmetric kernels behave like a true convolution rather than a
/// correlation.
pub fn convolve3x3(input: &Plane, kernel: &Kernel) -> Plane {
    let mut out = [[0.0; GRID_SIZE]; GRID_SIZE];
    for (r, out_row) in out.iter_mut().enumerate() {
        for (c, out_val) in out_row.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (i, k_row) in kernel.iter().enumerate() {
                // Source row is r + 1 - i
                let sr = r as isize + 1 - i as isize;
                if sr < 0 || sr >= GRID_SIZE as isize {
                    continue;
                }
                for (j, &w) in k_row.iter().enumerate() {
                    let sc = c as isize + 1 - j as isize;
                    if sc < 0 || sc >= GRID_SIZE as isize {
                        continue;
                    }
                    acc += w * input[sr as usize][sc as usize];
                }
            }
            *out_val = acc;
        }
    }
    out
}

/// Sum over each cell's 3x3 neighbourhood (all-ones kernel, zero padding).
pub fn neighbourhood_sum(input: &Plane) -> Plane {
    convolve3x3(input, &[[1.0; 3]; 3])
}
