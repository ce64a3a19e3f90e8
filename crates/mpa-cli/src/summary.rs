use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use mpa_cli::join::JoinOutcome;

pub fn print_summary(outcome: &JoinOutcome) {
    println!("Output: {}", outcome.outfile.display());
    let summary = &outcome.summary;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Sample"),
        header_cell("Variant"),
        header_cell("Database"),
        header_cell("Taxa"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);

    let mixed_variants = summary.has_mixed_variants();
    let mixed_databases = summary.shared_database().is_none();
    for record in &summary.tables {
        table.add_row(vec![
            Cell::new(record.path.display()),
            Cell::new(&record.sample_id).fg(Color::Cyan),
            flagged_cell(record.variant.number(), mixed_variants),
            flagged_cell(&record.database, mixed_databases),
            Cell::new(record.rows),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} samples", outcome.samples.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(outcome.rows).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}

/// Highlights values that disagree across inputs.
fn flagged_cell<T: ToString>(value: T, mismatch: bool) -> Cell {
    let cell = Cell::new(value.to_string());
    if mismatch {
        cell.fg(Color::Yellow).add_attribute(Attribute::Bold)
    } else {
        cell
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
