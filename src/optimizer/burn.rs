use crate::grid::{Cell, Plane};

/// Cells damaged by focusing on or acquiring a cell, as `(row, col)` offsets:
/// the 3x3 block around it plus one cell two steps out along each axis.
pub const BURN_FOOTPRINT: [(isize, isize); 13] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
    (-2, 0),
    (0, 2),
    (2, 0),
    (0, -2),
];

/// On-grid cells covered by a burn centred on `center`.
pub fn footprint(center: Cell) -> impl Iterator<Item = Cell> {
    BURN_FOOTPRINT
        .iter()
        .filter_map(move |&(dr, dc)| center.offset(dr, dc))
}

pub fn in_footprint(center: Cell, other: Cell) -> bool {
    let dr = other.row as isize - center.row as isize;
    let dc = other.col as isize - center.col as isize;
    BURN_FOOTPRINT.contains(&(dr, dc))
}

/// Writes `value` over every on-grid cell of the footprint. Off-grid cells are skipped.
pub fn apply_burn(map: &mut Plane, center: Cell, value: f64) {
    for cell in footprint(center) {
        map[cell.row][cell.col] = value;
    }
}
