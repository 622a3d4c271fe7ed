use crate::error::{GpResult, GridPickError};
use crate::grid::{ClassScoreGrid, CLASS_COUNT, GRID_SIZE};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One CSV record: `row,col,film,aggregate,ice,carbon`.
#[derive(Debug, Deserialize)]
struct CellRecord {
    row: usize,
    col: usize,
    film: f64,
    aggregate: f64,
    ice: f64,
    carbon: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GridFile {
    Nested(Vec<Vec<Vec<f64>>>),
    Wrapped { scores: Vec<Vec<Vec<f64>>> },
}

/// Loads a grid, choosing the format by extension (`.csv`, otherwise JSON).
pub fn load_grid<P: AsRef<Path>>(path: P) -> GpResult<ClassScoreGrid> {
    let path = path.as_ref();
    debug!("Loading class scores from: {}", path.display());

    let file = File::open(path)?;
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        load_grid_csv(file)
    } else {
        load_grid_json(file)
    }
}

/// Every cell must appear exactly once.
pub fn load_grid_csv<R: Read>(reader: R) -> GpResult<ClassScoreGrid> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut cells = [[[0.0; CLASS_COUNT]; GRID_SIZE]; GRID_SIZE];
    let mut seen = [[false; GRID_SIZE]; GRID_SIZE];

    for (line, result) in rdr.deserialize::<CellRecord>().enumerate() {
        let rec = result?;
        if rec.row >= GRID_SIZE || rec.col >= GRID_SIZE {
            return Err(GridPickError::MalformedGrid(format!(
                "record {} points at ({}, {}), outside the {}x{} grid",
                line + 1,
                rec.row,
                rec.col,
                GRID_SIZE,
                GRID_SIZE
            )));
        }
        if seen[rec.row][rec.col] {
            return Err(GridPickError::MalformedGrid(format!(
                "cell ({}, {}) appears more than once",
                rec.row, rec.col
            )));
        }
        seen[rec.row][rec.col] = true;
        cells[rec.row][rec.col] = [rec.film, rec.aggregate, rec.ice, rec.carbon];
    }

    let missing = seen.iter().flatten().filter(|&&s| !s).count();
    if missing > 0 {
        return Err(GridPickError::MalformedGrid(format!(
            "{} cells missing from CSV",
            missing
        )));
    }

    ClassScoreGrid::new(cells)
}

/// Accepts a bare `[row][col][class]` array or `{"scores": [...]}`.
pub fn load_grid_json<R: Read>(reader: R) -> GpResult<ClassScoreGrid> {
    let parsed: GridFile = serde_json::from_reader(reader)?;
    let nested = match parsed {
        GridFile::Nested(n) => n,
        GridFile::Wrapped { scores } => scores,
    };
    ClassScoreGrid::from_nested(&nested)
}
