//! Loader → normalizer → resolver → report, in one call.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::charts::YearBounds;
use crate::error::{FieldParseError, Result};
use crate::loader::{load_path, Dataset, DatasetVariant};
use crate::normalize::normalize_all;
use crate::record::{acres_to_hectares, FireRecord};
use crate::report::{build_report, ReportTable};
use crate::resolve::{resolve_dominant, DominantCounts};

/// Headline numbers for the report header and the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub records: usize,
    pub with_dominant: usize,
    pub total_acres: u64,
    pub total_hectares: f64,
    pub year_bounds: Option<YearBounds>,
    pub parse_errors: usize,
}

/// Everything downstream consumers need. Read-only once built.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub source: PathBuf,
    pub variant: DatasetVariant,
    pub records: Vec<FireRecord>,
    pub parse_errors: Vec<FieldParseError>,
    pub counts: DominantCounts,
    pub report: ReportTable,
    pub summary: DatasetSummary,
}

impl Analysis {
    pub fn year_bounds(&self) -> Option<YearBounds> {
        self.summary.year_bounds
    }
}

pub fn analyze(dataset: Dataset) -> Analysis {
    let (mut records, parse_errors) = normalize_all(&dataset.records);
    resolve_dominant(&mut records);

    let counts = DominantCounts::from_records(&records);
    let report = build_report(&records, &dataset.variant);

    let total_acres = records.iter().filter_map(|r| r.area_acres).fold(0, u64::saturating_add);
    let summary = DatasetSummary {
        records: records.len(),
        with_dominant: counts.total(),
        total_acres,
        total_hectares: acres_to_hectares(total_acres as f64),
        year_bounds: YearBounds::from_records(&records),
        parse_errors: parse_errors.len(),
    };
    info!(
        records = summary.records,
        with_dominant = summary.with_dominant,
        total_acres = summary.total_acres,
        parse_errors = summary.parse_errors,
        "analysis complete"
    );

    Analysis {
        source: dataset.source,
        variant: dataset.variant,
        records,
        parse_errors,
        counts,
        report,
        summary,
    }
}

pub fn analyze_path(path: &Path) -> Result<Analysis> {
    Ok(analyze(load_path(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;

    fn dataset(acres: &[&str]) -> Dataset {
        let features: Vec<String> = acres
            .iter()
            .enumerate()
            .map(|(i, a)| {
                format!(
                    r#"{{"type":"Feature","geometry":{{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}},
                        "properties":{{"id":"f{i}","Fire_Name":"Fire {i}","Year":2000,"Acres":{a},"lodgepole":0.5}}}}"#
                )
            })
            .collect();
        let text = format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","));
        load_str(&text, Path::new("summary.geojson")).unwrap()
    }

    #[test]
    fn summary_totals_areas() {
        let analysis = analyze(dataset(&["1000", "500.9", "null"]));
        assert_eq!(analysis.summary.total_acres, 1500);
        assert_eq!(analysis.summary.records, 3);
        assert_eq!(analysis.summary.with_dominant, 3);
        assert_eq!(analysis.source, PathBuf::from("summary.geojson"));
    }

    #[test]
    fn huge_areas_saturate_instead_of_overflowing() {
        let analysis = analyze(dataset(&["1e20", "1e20"]));
        assert_eq!(analysis.records[0].area_acres, Some(u64::MAX));
        assert_eq!(analysis.summary.total_acres, u64::MAX);
        assert!(analysis.summary.total_hectares.is_finite());
    }
}
