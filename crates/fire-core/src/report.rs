//! Display-ready summary table: fixed projection, multi-key descending sort,
//! human-readable headers.

use std::cmp::Ordering;

use serde::Serialize;

use crate::loader::DatasetVariant;
use crate::record::{FireRecord, PercentField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKey {
    Name,
    Year,
    Area,
    Percent(PercentField),
}

impl ColumnKey {
    pub fn header(self) -> &'static str {
        match self {
            ColumnKey::Name => "Fire Name",
            ColumnKey::Year => "Year",
            ColumnKey::Area => "Acres",
            ColumnKey::Percent(f) => f.label(),
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, ColumnKey::Name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Text(String),
    Integer(i64),
    /// Percentage, already scaled to 0–100.
    Percent(f64),
    Missing,
}

impl Cell {
    /// Text shown in a rendered table. Missing values render empty.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Integer(n) => n.to_string(),
            Cell::Percent(p) => format!("{p:.1}"),
            Cell::Missing => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub id: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub columns: Vec<ColumnKey>,
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sort keys, most significant first. Every key sorts descending.
pub fn sort_keys(variant: &DatasetVariant) -> Vec<PercentField> {
    let mut keys = Vec::with_capacity(5);
    if variant.contains(PercentField::GediCoverage) {
        keys.push(PercentField::GediCoverage);
    }
    keys.extend([PercentField::Lodgepole, PercentField::Ponderosa, PercentField::SpruceFir]);
    if variant.contains(PercentField::DisturbedBurned) {
        keys.push(PercentField::DisturbedBurned);
    }
    keys
}

/// Descending, with missing values after every present value.
fn desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn compare_records(a: &FireRecord, b: &FireRecord, keys: &[PercentField]) -> Ordering {
    keys.iter()
        .map(|&k| desc_nulls_last(a.percent(k), b.percent(k)))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Build the summary table. Records without a dominant forest type are left
/// out; full ties keep input order.
pub fn build_report(records: &[FireRecord], variant: &DatasetVariant) -> ReportTable {
    let mut columns = vec![ColumnKey::Name, ColumnKey::Year, ColumnKey::Area];
    columns.extend(variant.fields().map(ColumnKey::Percent));

    let keys = sort_keys(variant);
    let mut selected: Vec<&FireRecord> = records.iter().filter(|r| r.dominant.is_some()).collect();
    selected.sort_by(|a, b| compare_records(a, b, &keys));

    let rows = selected
        .into_iter()
        .map(|r| ReportRow {
            id: r.id.clone(),
            cells: columns.iter().map(|&c| cell(r, c)).collect(),
        })
        .collect();

    ReportTable { columns, rows }
}

fn cell(r: &FireRecord, column: ColumnKey) -> Cell {
    match column {
        ColumnKey::Name => Cell::Text(r.name.clone()),
        ColumnKey::Year => r.year.map_or(Cell::Missing, |y| Cell::Integer(y as i64)),
        ColumnKey::Area => r.area_acres.map_or(Cell::Missing, |a| Cell::Integer(a as i64)),
        ColumnKey::Percent(f) => r.percent(f).map_or(Cell::Missing, Cell::Percent),
    }
}
