pub mod burn;
pub mod runner;
pub mod sampling;

pub use self::runner::{BestResult, NoProgress, ProgressCallback, SearchOptions, Searcher};

use self::burn::apply_burn;
use self::sampling::sample_weighted;
use crate::fusion::CarbonCandidateSet;
use crate::grid::{neighbourhood_sum, Cell, Plane, QualityMap, CELL_COUNT};
use serde::Serialize;

/// Knobs for a single randomized construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialParams {
    /// How many top-ranked cells the next point is drawn from.
    pub shortlist_size: usize,
    /// Cap on the sequence length, focus point included.
    pub max_points: usize,
    /// Minimum share of the new total a point must contribute.
    pub gain_cutoff: f64,
    /// Sentinel written into burned cells.
    pub burn_value: f64,
}

impl Default for TrialParams {
    fn default() -> Self {
        Self {
            shortlist_size: 5,
            max_points: 16,
            gain_cutoff: 0.1,
            burn_value: -100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StopReason {
    /// No shortlisted cell had a positive neighbourhood sum.
    Exhausted,
    /// The drawn cell would have added less than the gain cutoff.
    DiminishingReturns,
    /// The sequence reached `max_points`.
    PointCap,
    /// The candidate set had nothing to draw from.
    NoFocus,
}

/// Outcome of one trial. `total_score` excludes the focus point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialResult {
    pub total_score: f64,
    pub points: Vec<Cell>,
    #[serde(skip)]
    pub stop: StopReason,
}

/// One randomized greedy construction over a private copy of the quality map.
pub struct Trial<'a> {
    candidates: &'a CarbonCandidateSet,
    params: &'a TrialParams,
    working: Plane,
    points: Vec<Cell>,
    total: f64,
    rng: fastrand::Rng,
}

impl<'a> Trial<'a> {
    pub fn new(
        quality: &QualityMap,
        candidates: &'a CarbonCandidateSet,
        params: &'a TrialParams,
        seed: u64,
    ) -> Self {
        Self {
            candidates,
            params,
            working: *quality.values(),
            points: Vec::with_capacity(params.max_points),
            total: 0.0,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn run(mut self) -> TrialResult {
        let stop = self.build();
        TrialResult {
            total_score: self.total,
            points: self.points,
            stop,
        }
    }

    fn build(&mut self) -> StopReason {
        // 1. Focus point (contributes nothing to the score)
        let Some(idx) = sample_weighted(&self.candidates.weights(), &mut self.rng) else {
            return StopReason::NoFocus;
        };
        self.accept(self.candidates.cell(idx));

        // 2. Acquisition points
        while self.points.len() < self.params.max_points {
            let shortlist = self.shortlist();
            if shortlist.is_empty() {
                return StopReason::Exhausted;
            }

            let weights: Vec<f64> = shortlist.iter().map(|&(_, s)| s).collect();
            let Some(pick) = sample_weighted(&weights, &mut self.rng) else {
                return StopReason::Exhausted;
            };
            let cell = shortlist[pick].0;

            let raw = self.working[cell.row][cell.col];
            let tentative = self.total + raw;
            if !passes_gain_cutoff(raw, tentative, self.params.gain_cutoff) {
                return StopReason::DiminishingReturns;
            }

            self.total = tentative;
            self.accept(cell);
        }

        StopReason::PointCap
    }

    fn accept(&mut self, cell: Cell) {
        self.points.push(cell);
        apply_burn(&mut self.working, cell, self.params.burn_value);
    }

    /// Top cells by neighbourhood sum, keeping only positive sums.
    /// Ties rank the lower row-major index first.
    fn shortlist(&self) -> Vec<(Cell, f64)> {
        let smoothed = neighbourhood_sum(&self.working);
        let flat: Vec<f64> = smoothed.iter().flatten().copied().collect();

        let mut order: Vec<usize> = (0..CELL_COUNT).collect();
        order.sort_by(|&a, &b| flat[b].total_cmp(&flat[a]).then(a.cmp(&b)));

        order
            .into_iter()
            .take(self.params.shortlist_size)
            .filter(|&i| flat[i] > 0.0)
            .map(|i| (Cell::from_flat_index(i), flat[i]))
            .collect()
    }
}

/// A point is rejected when it would supply less than `cutoff` of the new
/// running total. A ratio of exactly `cutoff` passes, as does the 0/0 ratio
/// of a zero-valued point on a zero total.
#[inline(always)]
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn passes_gain_cutoff(raw: f64, tentative_total: f64, cutoff: f64) -> bool {
    !(raw / tentative_total < cutoff)
}
