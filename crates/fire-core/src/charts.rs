//! Chart inputs: everything a renderer needs, already ordered, binned and
//! unit-converted. Renderers only draw.

use std::collections::BTreeMap;

use geo::{MultiPolygon, Point};
use serde::Serialize;

use crate::palette::{ramp, Palette, Rgb};
use crate::record::{FireRecord, ForestType};

/// Year span shared by every chart so axes line up across artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}

impl YearBounds {
    /// `None` when no record has a year.
    pub fn from_records(records: &[FireRecord]) -> Option<Self> {
        let mut years = records.iter().filter_map(|r| r.year);
        let first = years.next()?;
        let (min, max) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
        Some(Self { min, max })
    }

    /// Position of `year` in [0, 1]; 0.5 for a single-year span.
    pub fn fraction(&self, year: i32) -> f64 {
        if self.max == self.min {
            0.5
        } else {
            (f64::from(year) - f64::from(self.min)) / (f64::from(self.max) - f64::from(self.min))
        }
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.min..=self.max
    }
}

// ── Timeline ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub id: String,
    pub name: String,
    pub year: i32,
    /// Slot on the categorical axis, 0-based.
    pub position: usize,
    /// ≥ 1, monotone in area; 1 for the smallest fire.
    pub marker_size: f64,
    pub dominant: Option<ForestType>,
}

/// One point per record with both year and area, ordered by name within year.
///
/// Marker size is `ln(area / max_area)` shifted so the smallest fire sits at 1.
/// Zero-acre records are treated as one acre to keep the log finite.
pub fn timeline_points(records: &[FireRecord]) -> Vec<TimelinePoint> {
    let mut usable: Vec<(&FireRecord, i32, f64)> = records
        .iter()
        .filter_map(|r| Some((r, r.year?, r.area_acres?.max(1) as f64)))
        .collect();
    usable.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.name.cmp(&b.0.name)));

    let max_area = usable.iter().map(|u| u.2).fold(1.0, f64::max);
    let logs: Vec<f64> = usable.iter().map(|u| (u.2 / max_area).ln()).collect();
    let min_log = logs.iter().copied().fold(0.0, f64::min);

    usable
        .into_iter()
        .zip(logs)
        .enumerate()
        .map(|(position, ((r, year, _), log))| TimelinePoint {
            id: r.id.clone(),
            name: r.name.clone(),
            year,
            position,
            marker_size: log - min_log + 1.0,
            dominant: r.dominant,
        })
        .collect()
}

// ── Histograms ────────────────────────────────────────────────────────────────

/// One histogram bar, split by dominant type (`None` = unresolved).
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBin {
    pub lower: f64,
    pub upper: f64,
    pub counts: BTreeMap<Option<ForestType>, usize>,
}

impl StackedBin {
    fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper, counts: BTreeMap::new() }
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// `(dominant, bottom, top)` segments, unresolved first then canonical order.
    pub fn segments(&self) -> Vec<(Option<ForestType>, usize, usize)> {
        let mut bottom = 0;
        self.counts
            .iter()
            .map(|(&k, &n)| {
                let seg = (k, bottom, bottom + n);
                bottom += n;
                seg
            })
            .collect()
    }
}

/// One bin per integer year in `bounds`, including empty years.
pub fn year_histogram(records: &[FireRecord], bounds: YearBounds) -> Vec<StackedBin> {
    let mut bins: Vec<StackedBin> =
        bounds.years().map(|y| StackedBin::new(f64::from(y), f64::from(y) + 1.0)).collect();
    for r in records {
        let Some(y) = r.year else { continue };
        if y < bounds.min || y > bounds.max {
            continue;
        }
        let offset = (i64::from(y) - i64::from(bounds.min)) as usize;
        *bins[offset].counts.entry(r.dominant).or_insert(0) += 1;
    }
    bins
}

/// `bins` equal-width bins over [0, max hectares]. Empty when no record has an area.
pub fn size_histogram(records: &[FireRecord], bins: usize) -> Vec<StackedBin> {
    let sizes: Vec<(f64, Option<ForestType>)> =
        records.iter().filter_map(|r| Some((r.area_hectares()?, r.dominant))).collect();
    if sizes.is_empty() || bins == 0 {
        return Vec::new();
    }
    let max = sizes.iter().map(|s| s.0).fold(0.0, f64::max);
    let width = if max > 0.0 { max / bins as f64 } else { 1.0 };

    let mut out: Vec<StackedBin> =
        (0..bins).map(|i| StackedBin::new(i as f64 * width, (i + 1) as f64 * width)).collect();
    for (ha, dominant) in sizes {
        let i = ((ha / width) as usize).min(bins - 1);
        *out[i].counts.entry(dominant).or_insert(0) += 1;
    }
    out
}

// ── Scatter ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub name: String,
    pub year: i32,
    pub log2_hectares: f64,
    pub dominant: Option<ForestType>,
}

/// Size vs. year. Records with zero or missing area have no log and are skipped.
pub fn size_vs_year(records: &[FireRecord]) -> Vec<ScatterPoint> {
    records
        .iter()
        .filter_map(|r| {
            let ha = r.area_hectares().filter(|&ha| ha > 0.0)?;
            Some(ScatterPoint { name: r.name.clone(), year: r.year?, log2_hectares: ha.log2(), dominant: r.dominant })
        })
        .collect()
}

// ── Map ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MapFeature<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub year: Option<i32>,
    /// Year-scale fill; the palette's unresolved colour when the year is missing.
    pub fill: Rgb,
    pub centroid: Option<Point<f64>>,
    /// "Name (Year)", or just the name.
    pub label: String,
    pub geometry: &'a MultiPolygon<f64>,
}

pub fn map_features<'a>(records: &'a [FireRecord], bounds: Option<YearBounds>, palette: &Palette) -> Vec<MapFeature<'a>> {
    records
        .iter()
        .map(|r| {
            let fill = match (r.year, bounds) {
                (Some(y), Some(b)) => ramp(b.fraction(y)),
                _ => palette.unresolved,
            };
            let label = match r.year {
                Some(y) => format!("{} ({y})", r.name),
                None => r.name.clone(),
            };
            MapFeature {
                id: &r.id,
                name: &r.name,
                year: r.year,
                fill,
                centroid: r.centroid(),
                label,
                geometry: &r.geometry,
            }
        })
        .collect()
}
