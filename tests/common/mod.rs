#![allow(dead_code)]

use gridpick::grid::{Cell, ClassScoreGrid, QualityMap, CLASS_COUNT, GRID_SIZE};
use gridpick::optimizer::burn::in_footprint;

/// Builder for class score grids, starting from all-zero scores.
pub struct GridBuilder {
    cells: [[[f64; CLASS_COUNT]; GRID_SIZE]; GRID_SIZE],
}

impl GridBuilder {
    pub fn new() -> Self {
        Self {
            cells: [[[0.0; CLASS_COUNT]; GRID_SIZE]; GRID_SIZE],
        }
    }

    pub fn fill(mut self, scores: [f64; CLASS_COUNT]) -> Self {
        self.cells = [[scores; GRID_SIZE]; GRID_SIZE];
        self
    }

    pub fn set(mut self, row: usize, col: usize, scores: [f64; CLASS_COUNT]) -> Self {
        self.cells[row][col] = scores;
        self
    }

    pub fn carbon(mut self, row: usize, col: usize, p: f64) -> Self {
        self.cells[row][col][3] = p;
        self
    }

    pub fn build(self) -> ClassScoreGrid {
        ClassScoreGrid::new(self.cells).expect("test grid must be valid")
    }
}

pub fn quality_with(cells: &[(usize, usize, f64)]) -> QualityMap {
    let mut values = [[0.0; GRID_SIZE]; GRID_SIZE];
    for &(r, c, v) in cells {
        values[r][c] = v;
    }
    QualityMap::new(values).expect("test map must be finite")
}

/// Panics if any later point lies inside an earlier point's burn footprint.
pub fn assert_no_overlap(points: &[Cell]) {
    for (i, &earlier) in points.iter().enumerate() {
        for &later in &points[i + 1..] {
            assert!(
                !in_footprint(earlier, later),
                "{} lies inside the burn of {} in {:?}",
                later,
                earlier,
                points
            );
        }
    }
}

/// Replays the running total and checks no acquisition fell below the cutoff.
/// Returns the replayed total.
pub fn assert_gain_cutoff(quality: &QualityMap, points: &[Cell], cutoff: f64) -> f64 {
    let mut total = 0.0;
    for &p in points.iter().skip(1) {
        let raw = quality.get(p);
        total += raw;
        assert!(
            !(raw / total < cutoff),
            "point {} added {} to reach {} (ratio below {})",
            p,
            raw,
            total,
            cutoff
        );
    }
    total
}
