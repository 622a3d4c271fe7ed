use crate::config::SearchParams;
use crate::error::{GpResult, GridPickError};
use crate::fusion::CarbonCandidateSet;
use crate::grid::{Cell, QualityMap};
use crate::optimizer::{StopReason, Trial, TrialParams, TrialResult};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

pub struct SearchOptions {
    pub trials: usize,
    pub batch_size: usize,
    pub threads: usize,
    pub trial: TrialParams,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            trials: 5000,
            batch_size: 500,
            threads: 0,
            trial: TrialParams::default(),
        }
    }
}

impl SearchOptions {
    pub fn from_params(params: &SearchParams) -> GpResult<Self> {
        let trials = validate_trial_count(params.trials)?;

        if params.shortlist_size == 0 {
            return Err(GridPickError::Config(
                "shortlist_size must be at least 1".to_string(),
            ));
        }
        if params.max_points == 0 {
            return Err(GridPickError::Config(
                "max_points must be at least 1".to_string(),
            ));
        }
        if params.batch_size == 0 {
            return Err(GridPickError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&params.gain_cutoff) {
            return Err(GridPickError::Config(format!(
                "gain_cutoff must lie in [0, 1], got {}",
                params.gain_cutoff
            )));
        }
        // A non-negative sentinel would let burned cells be picked again
        if !params.burn_value.is_finite() || params.burn_value >= 0.0 {
            return Err(GridPickError::Config(format!(
                "burn_value must be negative, got {}",
                params.burn_value
            )));
        }

        Ok(Self {
            trials,
            batch_size: params.batch_size,
            threads: params.threads,
            trial: TrialParams {
                shortlist_size: params.shortlist_size,
                max_points: params.max_points,
                gain_cutoff: params.gain_cutoff,
                burn_value: params.burn_value,
            },
        })
    }
}

pub fn validate_trial_count(trials: i64) -> GpResult<usize> {
    if trials <= 0 {
        return Err(GridPickError::InvalidTrialCount(trials));
    }
    usize::try_from(trials).map_err(|_| GridPickError::InvalidTrialCount(trials))
}

/// The best trial found over a whole search.
///
/// Trials that ended with a negative total never win. If every trial did,
/// the result is empty with a score of zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestResult {
    pub total_score: f64,
    /// Focus point first, then acquisition points in the order they were chosen.
    pub points: Vec<Cell>,
    /// Index of the winning trial, if any trial was eligible.
    pub trial: Option<usize>,
    /// Trials actually run (fewer than requested if a callback aborted).
    pub trials_run: usize,
    pub seed: u64,
}

impl BestResult {
    pub fn focus(&self) -> Option<Cell> {
        self.points.first().copied()
    }

    pub fn acquisitions(&self) -> &[Cell] {
        self.points.get(1..).unwrap_or(&[])
    }
}

/// Receives updates between batches of trials.
/// Boolean return value indicates if the search should continue (true) or abort (false).
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize, best_score: f64) -> bool;
}

impl<T: ProgressCallback + ?Sized> ProgressCallback for &T {
    fn on_progress(&self, completed: usize, total: usize, best_score: f64) -> bool {
        (**self).on_progress(completed, total, best_score)
    }
}

pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_progress(&self, _completed: usize, _total: usize, _best_score: f64) -> bool {
        true
    }
}

/// Derives an independent stream for each trial from the top-level seed.
#[inline(always)]
pub fn trial_seed(seed: u64, trial: usize) -> u64 {
    // splitmix64 finaliser, so adjacent top-level seeds don't share streams
    let mut z = seed.wrapping_add((trial as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[derive(Debug, Default, Clone, Copy)]
struct StopCounts {
    exhausted: usize,
    diminishing: usize,
    capped: usize,
    no_focus: usize,
    negative: usize,
}

impl StopCounts {
    fn record(&mut self, stop: StopReason) {
        match stop {
            StopReason::Exhausted => self.exhausted += 1,
            StopReason::DiminishingReturns => self.diminishing += 1,
            StopReason::PointCap => self.capped += 1,
            StopReason::NoFocus => self.no_focus += 1,
        }
    }

    fn merge(mut self, other: StopCounts) -> Self {
        self.exhausted += other.exhausted;
        self.diminishing += other.diminishing;
        self.capped += other.capped;
        self.no_focus += other.no_focus;
        self.negative += other.negative;
        self
    }
}

/// Partial reduction over a range of trials.
#[derive(Debug, Default)]
struct Summary {
    best: Option<(usize, TrialResult)>,
    stops: StopCounts,
}

impl Summary {
    fn absorb(mut self, idx: usize, result: TrialResult) -> Self {
        self.stops.record(result.stop);
        // Negative totals sit below the empty result
        if result.total_score < 0.0 {
            self.stops.negative += 1;
            return self;
        }
        self.best = pick_better(self.best, Some((idx, result)));
        self
    }

    fn merge(self, other: Summary) -> Self {
        Summary {
            best: pick_better(self.best, other.best),
            stops: self.stops.merge(other.stops),
        }
    }
}

/// Higher score wins; equal scores go to the lower trial index, so the
/// reduction does not depend on the order trials finish in.
fn pick_better(
    a: Option<(usize, TrialResult)>,
    b: Option<(usize, TrialResult)>,
) -> Option<(usize, TrialResult)> {
    match (a, b) {
        (None, x) | (x, None) => x,
        (Some(a), Some(b)) => {
            let b_wins = b.1.total_score > a.1.total_score
                || (b.1.total_score == a.1.total_score && b.0 < a.0);
            if b_wins {
                Some(b)
            } else {
                Some(a)
            }
        }
    }
}

pub struct Searcher {
    options: SearchOptions,
}

impl Searcher {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn run<CB: ProgressCallback>(
        &self,
        quality: &QualityMap,
        candidates: &CarbonCandidateSet,
        seed: u64,
        callback: CB,
    ) -> GpResult<BestResult> {
        if self.options.trials == 0 {
            return Err(GridPickError::InvalidTrialCount(0));
        }
        if self.options.batch_size == 0 {
            return Err(GridPickError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }

        if self.options.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.threads)
                .build()
                .map_err(|e| GridPickError::Config(format!("Thread pool: {}", e)))?;
            pool.install(|| self.run_batches(quality, candidates, seed, &callback))
        } else {
            self.run_batches(quality, candidates, seed, &callback)
        }
    }

    fn run_batches<CB: ProgressCallback>(
        &self,
        quality: &QualityMap,
        candidates: &CarbonCandidateSet,
        seed: u64,
        callback: &CB,
    ) -> GpResult<BestResult> {
        let opts = &self.options;
        let params = &opts.trial;
        let start_time = Instant::now();

        let mut summary = Summary::default();
        let mut completed = 0;

        while completed < opts.trials {
            let end = (completed + opts.batch_size).min(opts.trials);

            let batch = (completed..end)
                .into_par_iter()
                .map(|i| {
                    let result = Trial::new(quality, candidates, params, trial_seed(seed, i)).run();
                    (i, result)
                })
                .fold(Summary::default, |acc, (i, r)| acc.absorb(i, r))
                .reduce(Summary::default, Summary::merge);

            summary = summary.merge(batch);
            completed = end;

            let best_score = summary.best.as_ref().map_or(0.0, |(_, r)| r.total_score);
            debug!(
                "Trials {:>6}/{} | Best: {:.3}",
                completed, opts.trials, best_score
            );

            if !callback.on_progress(completed, opts.trials, best_score) {
                info!("Search aborted after {} trials", completed);
                break;
            }
        }

        let stops = summary.stops;
        debug!(
            "Stop reasons: exhausted {}, diminishing {}, capped {}, no focus {}, negative total {}",
            stops.exhausted, stops.diminishing, stops.capped, stops.no_focus, stops.negative
        );

        let Some((trial, best)) = summary.best else {
            info!(
                "Best of {} trials: every trial ended below zero, no targets ({:.2?})",
                completed,
                start_time.elapsed()
            );
            return Ok(BestResult {
                total_score: 0.0,
                points: Vec::new(),
                trial: None,
                trials_run: completed,
                seed,
            });
        };
        info!(
            "Best of {} trials: score {:.3} with {} points (trial #{}, {:.2?})",
            completed,
            best.total_score,
            best.points.len(),
            trial,
            start_time.elapsed()
        );

        Ok(BestResult {
            total_score: best.total_score,
            points: best.points,
            trial: Some(trial),
            trials_run: completed,
            seed,
        })
    }
}
