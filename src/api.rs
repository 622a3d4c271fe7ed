use crate::config::Config;
use crate::error::GpResult;
use crate::fusion::{FusionOutput, ScoreFuser};
use crate::grid::{Cell, ClassScoreGrid};
use crate::optimizer::runner::validate_trial_count;
use crate::optimizer::{BestResult, NoProgress, ProgressCallback, SearchOptions, Searcher};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TRIALS: i64 = 5000;

/// Fuses `grid` with the default kernels and runs `trial_count` trials.
///
/// Fails with `InvalidTrialCount` for `trial_count <= 0`. Identical inputs and
/// seed always give an identical result.
pub fn select_targets(grid: &ClassScoreGrid, trial_count: i64, seed: u64) -> GpResult<BestResult> {
    let trials = validate_trial_count(trial_count)?;
    let fused = ScoreFuser::default().run(grid);
    let options = SearchOptions {
        trials,
        ..Default::default()
    };
    Searcher::new(options).run(&fused.quality, &fused.candidates, seed, NoProgress)
}

/// Same as [`select_targets`], with every constant taken from `config`.
pub fn select_targets_with<CB: ProgressCallback>(
    grid: &ClassScoreGrid,
    config: &Config,
    seed: u64,
    callback: CB,
) -> GpResult<(FusionOutput, BestResult)> {
    let options = SearchOptions::from_params(&config.search)?;
    let fused = ScoreFuser::from_params(&config.fusion)?.run(grid);
    let best = Searcher::new(options).run(&fused.quality, &fused.candidates, seed, callback)?;
    Ok((fused, best))
}

/// Targets ready to hand to an instrument, in grid coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetPlan {
    pub focus: Vec<Cell>,
    pub acquisition: Vec<Cell>,
    pub total_score: f64,
}

impl From<&BestResult> for TargetPlan {
    fn from(best: &BestResult) -> Self {
        let acquisition = best.acquisitions().to_vec();
        // Focusing is pointless with nothing to acquire afterwards
        let focus = match best.focus() {
            Some(cell) if !acquisition.is_empty() => vec![cell],
            _ => Vec::new(),
        };
        Self {
            focus,
            acquisition,
            total_score: best.total_score,
        }
    }
}
