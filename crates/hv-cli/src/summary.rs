//! Tables and JSON reports printed by the subcommands.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use hv_model::{
    CategoricalField, CategoryStats, FilterKey, HospitalStats, KpiScalars, TestResult,
    TestResultCounts,
};
use hv_query::DatasetStore;
use hv_session::{Publication, SessionCacheStats};

use crate::format::{
    MISSING, format_avg_stay, format_count, format_date_range, format_money, format_percent,
};

/// Machine-readable form of `healthviz summary`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport<'a> {
    pub selection: &'a str,
    pub filter_key: &'a FilterKey,
    pub scalars: &'a KpiScalars,
    pub test_results: TestResultCounts,
    pub hospitals: &'a [HospitalStats],
}

impl<'a> SummaryReport<'a> {
    /// Report over a publication, keeping at most `top` hospitals.
    pub fn new(publication: &'a Publication, test_results: TestResultCounts, top: usize) -> Self {
        let hospitals = &publication.hospitals[..top.min(publication.hospitals.len())];
        Self {
            selection: &publication.label,
            filter_key: publication.rows.key(),
            scalars: &publication.scalars,
            test_results,
            hospitals,
        }
    }
}

/// Machine-readable form of `healthviz options`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsReport<'a> {
    pub rows: usize,
    pub fields: Vec<FieldOptions<'a>>,
    pub admission_date_min: Option<String>,
    pub admission_date_max: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FieldOptions<'a> {
    pub field: &'static str,
    pub values: &'a [String],
}

impl<'a> OptionsReport<'a> {
    pub fn new(store: &'a DatasetStore) -> Self {
        let bounds = store.date_bounds();
        Self {
            rows: store.len(),
            fields: CategoricalField::ALL
                .iter()
                .map(|field| FieldOptions {
                    field: field.as_str(),
                    values: store.distinct_values(*field),
                })
                .collect(),
            admission_date_min: bounds.map(|(min, _)| min.to_string()),
            admission_date_max: bounds.map(|(_, max)| max.to_string()),
        }
    }
}

/// KPI strip as a two-column table.
pub fn kpi_table(label: &str, scalars: &KpiScalars) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Selection"), Cell::new(label)]);
    table.add_row(vec![
        Cell::new("Patients"),
        Cell::new(format_count(scalars.count)).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Total billing"),
        Cell::new(format_money(Some(scalars.total_billing))),
    ]);
    table.add_row(vec![
        Cell::new("Avg billing"),
        Cell::new(format_money(Some(scalars.avg_billing))),
    ]);
    table.add_row(vec![
        Cell::new("Avg stay"),
        Cell::new(format_avg_stay(scalars.avg_length_of_stay)),
    ]);
    table.add_row(vec![
        Cell::new("Hospitals"),
        Cell::new(format_count(scalars.distinct_hospitals)),
    ]);
    table
}

pub fn test_result_table(counts: &TestResultCounts) -> Table {
    let total = counts.total();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Test result"),
        header_cell("Patients"),
        header_cell("Share"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for (result, count) in counts.iter() {
        table.add_row(vec![
            Cell::new(result.as_str()).fg(result_color(result)),
            Cell::new(format_count(count)),
            Cell::new(format_percent(count, total)),
        ]);
    }
    table
}

/// The `top` busiest hospitals, in published order.
pub fn hospital_table(hospitals: &[HospitalStats], top: usize) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Hospital"),
        header_cell("Patients"),
        header_cell("Avg billing"),
        header_cell("Dominant result"),
    ]);
    apply_wide_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for stats in hospitals.iter().take(top) {
        table.add_row(vec![
            Cell::new(&stats.hospital)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(format_count(stats.count)),
            Cell::new(format_money(Some(stats.avg_billing))),
            Cell::new(stats.dominant_test_result.as_str())
                .fg(result_color(stats.dominant_test_result)),
        ]);
    }
    if hospitals.len() > top {
        table.add_row(vec![
            dim_cell(format!("... {} more", hospitals.len() - top)),
            dim_cell(""),
            dim_cell(""),
            dim_cell(""),
        ]);
    }
    table
}

pub fn category_table(field: CategoricalField, stats: &[CategoryStats]) -> Table {
    let total: usize = stats.iter().map(|s| s.count).sum();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(field.as_str()),
        header_cell("Patients"),
        header_cell("Share"),
        header_cell("Total billing"),
        header_cell("Avg billing"),
        header_cell("Avg stay"),
    ]);
    apply_wide_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for row in stats {
        table.add_row(vec![
            Cell::new(&row.value).add_attribute(Attribute::Bold),
            Cell::new(format_count(row.count)),
            Cell::new(format_percent(row.count, total)),
            Cell::new(format_money(Some(row.total_billing))),
            Cell::new(format_money(Some(row.avg_billing))),
            Cell::new(format_avg_stay(row.avg_length_of_stay)),
        ]);
    }
    table
}

/// Option lists of every categorical field.
pub fn options_table(store: &DatasetStore) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Distinct"),
        header_cell("Values"),
    ]);
    apply_wide_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for field in CategoricalField::ALL {
        let values = store.distinct_values(field);
        let listed = if values.is_empty() {
            dim_cell(MISSING)
        } else {
            Cell::new(preview(values, 8))
        };
        table.add_row(vec![
            Cell::new(field.as_str()).fg(Color::Blue),
            Cell::new(format_count(values.len())),
            listed,
        ]);
    }
    table.add_row(vec![
        Cell::new("admissionDate").fg(Color::Blue),
        dim_cell("-"),
        Cell::new(format_date_range(store.date_bounds())),
    ]);
    table
}

pub fn cache_table(stats: &SessionCacheStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Cache"),
        header_cell("Hits"),
        header_cell("Misses"),
        header_cell("Evictions"),
        header_cell("Hit rate"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (name, counters) in [("filter", stats.filter), ("aggregate", stats.aggregate)] {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(counters.hits),
            Cell::new(counters.misses),
            Cell::new(counters.evictions),
            Cell::new(format!("{:.1}%", counters.hit_rate() * 100.0)),
        ]);
    }
    table
}

/// Joins up to `limit` values, noting how many were left out.
pub fn preview(values: &[String], limit: usize) -> String {
    let shown = values
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if values.len() > limit {
        format!("{shown}, … (+{})", values.len() - limit)
    } else {
        shown
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_wide_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn result_color(result: TestResult) -> Color {
    match result {
        TestResult::Normal => Color::Green,
        TestResult::Abnormal => Color::Red,
        TestResult::Inconclusive => Color::Yellow,
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
