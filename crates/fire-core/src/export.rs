//! Enriched records as JSON.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::record::{FireRecord, ForestType};

#[derive(Debug, Serialize)]
struct ExportedRecord<'a> {
    id: &'a str,
    name: &'a str,
    year: Option<i32>,
    area_acres: Option<u64>,
    area_hectares: Option<f64>,
    dominant_forest_type: Option<ForestType>,
    /// Column name → percentage; missing values are `null`.
    percentages: BTreeMap<&'static str, Option<f64>>,
    /// `[lon, lat]`
    centroid: Option<[f64; 2]>,
}

impl<'a> From<&'a FireRecord> for ExportedRecord<'a> {
    fn from(r: &'a FireRecord) -> Self {
        Self {
            id: &r.id,
            name: &r.name,
            year: r.year,
            area_acres: r.area_acres,
            area_hectares: r.area_hectares(),
            dominant_forest_type: r.dominant,
            percentages: r.percent_fields().map(|f| (f.column(), r.percent(f))).collect(),
            centroid: r.centroid().map(|c| [c.x(), c.y()]),
        }
    }
}

pub fn records_to_json(records: &[FireRecord]) -> Result<String> {
    let exported: Vec<ExportedRecord<'_>> = records.iter().map(ExportedRecord::from).collect();
    Ok(serde_json::to_string_pretty(&exported)?)
}
