//! Raw attribute values → canonical numbers.
//!
//! Rounding rule: percentages are rounded to one decimal place, half away from
//! zero. A scaled value within `TIE_EPSILON` of `.5` counts as an exact tie, so
//! that decimal fractions like 0.6245 (stored as 0.62449999…) round the way they
//! read: 62.5, not 62.4.

use geojson::JsonValue;
use tracing::warn;

use crate::error::FieldParseError;
use crate::loader::{RawRecord, ACRES_COLUMN, YEAR_COLUMN};
use crate::record::{FireRecord, ForestPercentages};

const TIE_EPSILON: f64 = 1e-9;

/// Plausible fire years. Anything outside is treated as a typo.
pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 2999;

fn round_half_away(x: f64) -> f64 {
    let floor = x.floor();
    if (x - floor - 0.5).abs() < TIE_EPSILON {
        if x >= 0.0 {
            floor + 1.0
        } else {
            floor
        }
    } else {
        x.round()
    }
}

/// Round a percentage to one decimal place. Idempotent.
pub fn round_tenth(percent: f64) -> f64 {
    round_half_away(percent * 10.0) / 10.0
}

/// Stored fraction in [0, 1] → percentage with one decimal.
pub fn fraction_to_percent(fraction: f64) -> f64 {
    // Scale straight to tenths of a percent so only one rounding step happens.
    round_half_away(fraction * 1000.0) / 10.0
}

/// Read a JSON number or numeric text. `Ok(None)` for null, empty text and NaN.
fn parse_number(value: &JsonValue) -> Result<Option<f64>, String> {
    let v = match value {
        JsonValue::Null => return Ok(None),
        JsonValue::Number(n) => n.as_f64().ok_or_else(|| "number out of range".to_string())?,
        JsonValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>().map_err(|_| "not a number".to_string())?
        }
        JsonValue::Bool(_) => return Err("boolean is not a number".into()),
        JsonValue::Array(_) | JsonValue::Object(_) => return Err("nested value is not a number".into()),
    };
    if v.is_nan() {
        Ok(None)
    } else if v.is_infinite() {
        Err("infinite".into())
    } else {
        Ok(Some(v))
    }
}

/// Burned area in whole acres, truncated.
pub fn parse_area(value: &JsonValue) -> Result<Option<u64>, String> {
    match parse_number(value)? {
        Some(v) if v < 0.0 => Err("negative area".into()),
        Some(v) => Ok(Some(v.trunc() as u64)),
        None => Ok(None),
    }
}

pub fn parse_year(value: &JsonValue) -> Result<Option<i32>, String> {
    match parse_number(value)? {
        Some(v) if v.fract() != 0.0 => Err("year is not a whole number".into()),
        Some(v) if !(MIN_YEAR as f64..=MAX_YEAR as f64).contains(&v) => {
            Err(format!("year {v} outside {MIN_YEAR}..={MAX_YEAR}"))
        }
        Some(v) => Ok(Some(v as i32)),
        None => Ok(None),
    }
}

/// Stored fraction → percentage. Fractions outside [0, 1] are rejected.
pub fn parse_percent(value: &JsonValue) -> Result<Option<f64>, String> {
    match parse_number(value)? {
        Some(v) if !(0.0..=1.0).contains(&v) => Err(format!("fraction {v} outside [0, 1]")),
        Some(v) => Ok(Some(fraction_to_percent(v))),
        None => Ok(None),
    }
}

/// Normalize one record. Fields that fail to parse come back as `None`, with
/// the reason pushed onto `errors`.
pub fn normalize_record(raw: &RawRecord, errors: &mut Vec<FieldParseError>) -> FireRecord {
    let mut field = |name: &'static str, value: &JsonValue, reason: String| {
        errors.push(FieldParseError {
            record_id: raw.id.clone(),
            field: name,
            raw: value.to_string(),
            reason,
        });
    };

    let year = parse_year(&raw.year).unwrap_or_else(|reason| {
        field(YEAR_COLUMN, &raw.year, reason);
        None
    });
    let area_acres = parse_area(&raw.acres).unwrap_or_else(|reason| {
        field(ACRES_COLUMN, &raw.acres, reason);
        None
    });

    let mut forest = ForestPercentages::default();
    let mut disturbance = std::collections::BTreeMap::new();
    for (&pf, value) in &raw.percentages {
        let pct = parse_percent(value).unwrap_or_else(|reason| {
            field(pf.column(), value, reason);
            None
        });
        match pf.forest_type() {
            Some(ft) => forest.set(ft, pct),
            None => {
                disturbance.insert(pf, pct);
            }
        }
    }

    FireRecord {
        id: raw.id.clone(),
        name: raw.name.clone(),
        year,
        area_acres,
        forest,
        disturbance,
        geometry: raw.geometry.clone(),
        dominant: None,
    }
}

/// Normalize every record, logging each field that failed to parse.
pub fn normalize_all(raw: &[RawRecord]) -> (Vec<FireRecord>, Vec<FieldParseError>) {
    let mut errors = Vec::new();
    let records = raw.iter().map(|r| normalize_record(r, &mut errors)).collect();
    for e in &errors {
        warn!(record = %e.record_id, field = e.field, raw = %e.raw, "{}; field set to missing", e.reason);
    }
    (records, errors)
}
