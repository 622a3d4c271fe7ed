pub mod api;
pub mod config;
pub mod error;
pub mod fusion;
pub mod grid;
pub mod loader;
pub mod optimizer;
// cmd and reports are binary modules (see main.rs).

pub use self::api::{select_targets, select_targets_with, TargetPlan};
pub use self::error::{GpResult, GridPickError};
pub use self::grid::{Cell, CellClass, ClassScoreGrid, QualityMap};
pub use self::optimizer::BestResult;
