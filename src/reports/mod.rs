use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use gridpick::api::TargetPlan;
use gridpick::fusion::CarbonCandidateSet;
use gridpick::grid::{Cell as GridCell, QualityMap, GRID_SIZE};

/// Converts grid cells into image pixels for the operator's benefit.
pub struct PixelMapping {
    pub patch_size: usize,
    pub patch_offset: usize,
}

impl PixelMapping {
    pub fn to_pixels(&self, cell: GridCell) -> (usize, usize) {
        (
            cell.row * self.patch_size + self.patch_offset,
            cell.col * self.patch_size + self.patch_offset,
        )
    }
}

pub fn print_quality_map(name: &str, map: &QualityMap, picks: &[GridCell]) {
    println!("\n{}", name);
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("")];
    header.extend((0..GRID_SIZE).map(|c| Cell::new(c).set_alignment(CellAlignment::Center)));
    table.set_header(header);

    for row in 0..GRID_SIZE {
        let mut cells = vec![Cell::new(row).add_attribute(Attribute::Bold)];
        for col in 0..GRID_SIZE {
            let here = GridCell::new(row, col);
            let value = map.get(here);
            let cell = match picks.iter().position(|&p| p == here) {
                Some(0) => Cell::new(format!("F {:.0}", value))
                    .fg(Color::Cyan)
                    .add_attribute(Attribute::Bold),
                Some(n) => Cell::new(format!("#{} {:.0}", n, value))
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold),
                None if value < 0.0 => Cell::new(format!("{:.1}", value)).fg(Color::Red),
                None => Cell::new(format!("{:.1}", value)),
            };
            cells.push(cell.set_alignment(CellAlignment::Right));
        }
        table.add_row(cells);
    }
    println!("{}", table);
}

pub fn print_candidates(set: &CarbonCandidateSet) {
    println!("\nFOCUS CANDIDATES");
    if set.is_fallback() {
        println!("(no carbon above threshold, using fallback cell)");
    }

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_header(vec!["Cell", "Weight"]);
    for candidate in set.entries() {
        table.add_row(vec![
            Cell::new(candidate.cell),
            Cell::new(format!("{:.4}", candidate.weight)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", table);
}

pub fn print_plan(plan: &TargetPlan, mapping: &PixelMapping) {
    println!("\nTARGETS");
    if plan.acquisition.is_empty() {
        println!("(no acquisition targets found; nothing to submit)");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_header(vec!["Role", "Cell", "Pixel"]);

    let rows = plan
        .focus
        .iter()
        .map(|c| ("focus".to_string(), c))
        .chain(
            plan.acquisition
                .iter()
                .enumerate()
                .map(|(i, c)| (format!("acquisition #{}", i + 1), c)),
        );

    for (role, &cell) in rows {
        let (px, py) = mapping.to_pixels(cell);
        table.add_row(vec![
            Cell::new(role),
            Cell::new(cell),
            Cell::new(format!("({}, {})", px, py)),
        ]);
    }
    println!("{}", table);
}
