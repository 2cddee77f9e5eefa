//! Fire perimeter records and the fixed attribute vocabulary they carry.

use std::collections::BTreeMap;
use std::fmt;

use geo::{Centroid, MultiPolygon, Point};
use serde::{Deserialize, Serialize};

/// Acres → hectares.
pub const ACRES_TO_HECTARES: f64 = 0.404686;

pub fn acres_to_hectares(acres: f64) -> f64 {
    acres * ACRES_TO_HECTARES
}

// ── Forest types ──────────────────────────────────────────────────────────────

/// Forest categories, declared in canonical order.
/// The derived `Ord` follows declaration order and is relied on for tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ForestType {
    Lodgepole,
    Ponderosa,
    SpruceFir,
}

impl ForestType {
    pub const ALL: [ForestType; 3] = [ForestType::Lodgepole, ForestType::Ponderosa, ForestType::SpruceFir];

    /// Attribute column name in the source data.
    pub fn column(self) -> &'static str {
        match self {
            ForestType::Lodgepole => "lodgepole",
            ForestType::Ponderosa => "ponderosa",
            ForestType::SpruceFir => "spruceFir",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ForestType::Lodgepole => "Lodgepole",
            ForestType::Ponderosa => "Ponderosa",
            ForestType::SpruceFir => "Spruce/Fir",
        }
    }
}

impl fmt::Display for ForestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ── Percentage columns ────────────────────────────────────────────────────────

/// Every percentage column a dataset variant may carry, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PercentField {
    Lodgepole,
    Ponderosa,
    SpruceFir,
    DisturbedBurned,
    DisturbedUnspecific,
    DisturbedLogged,
    RegeneratingDisturbed,
    RegeneratingHarvested,
    GediCoverage,
}

impl PercentField {
    pub const ALL: [PercentField; 9] = [
        PercentField::Lodgepole,
        PercentField::Ponderosa,
        PercentField::SpruceFir,
        PercentField::DisturbedBurned,
        PercentField::DisturbedUnspecific,
        PercentField::DisturbedLogged,
        PercentField::RegeneratingDisturbed,
        PercentField::RegeneratingHarvested,
        PercentField::GediCoverage,
    ];

    pub fn column(self) -> &'static str {
        match self {
            PercentField::Lodgepole => "lodgepole",
            PercentField::Ponderosa => "ponderosa",
            PercentField::SpruceFir => "spruceFir",
            PercentField::DisturbedBurned => "disturbed_burned",
            PercentField::DisturbedUnspecific => "disturbed_unspecific",
            PercentField::DisturbedLogged => "disturbed_logged",
            PercentField::RegeneratingDisturbed => "regenerating_disturbed",
            PercentField::RegeneratingHarvested => "regenerating_harvested",
            PercentField::GediCoverage => "gedi_coverage",
        }
    }

    /// Human-readable column header, always ending in `%`.
    pub fn label(self) -> &'static str {
        match self {
            PercentField::Lodgepole => "Lodgepole %",
            PercentField::Ponderosa => "Ponderosa %",
            PercentField::SpruceFir => "Spruce/Fir %",
            PercentField::DisturbedBurned => "Disturbed (burned) %",
            PercentField::DisturbedUnspecific => "Disturbed (unspecific) %",
            PercentField::DisturbedLogged => "Disturbed (logged) %",
            PercentField::RegeneratingDisturbed => "Regenerating (disturbed) %",
            PercentField::RegeneratingHarvested => "Regenerating (harvested) %",
            PercentField::GediCoverage => "GEDI coverage %",
        }
    }

    pub fn forest_type(self) -> Option<ForestType> {
        match self {
            PercentField::Lodgepole => Some(ForestType::Lodgepole),
            PercentField::Ponderosa => Some(ForestType::Ponderosa),
            PercentField::SpruceFir => Some(ForestType::SpruceFir),
            _ => None,
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == column)
    }
}

impl From<ForestType> for PercentField {
    fn from(ft: ForestType) -> Self {
        match ft {
            ForestType::Lodgepole => PercentField::Lodgepole,
            ForestType::Ponderosa => PercentField::Ponderosa,
            ForestType::SpruceFir => PercentField::SpruceFir,
        }
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// Forest cover percentages (0–100, one decimal). `None` = missing or unparseable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ForestPercentages {
    pub lodgepole: Option<f64>,
    pub ponderosa: Option<f64>,
    pub spruce_fir: Option<f64>,
}

impl ForestPercentages {
    pub fn get(&self, ft: ForestType) -> Option<f64> {
        match ft {
            ForestType::Lodgepole => self.lodgepole,
            ForestType::Ponderosa => self.ponderosa,
            ForestType::SpruceFir => self.spruce_fir,
        }
    }

    pub fn set(&mut self, ft: ForestType, value: Option<f64>) {
        match ft {
            ForestType::Lodgepole => self.lodgepole = value,
            ForestType::Ponderosa => self.ponderosa = value,
            ForestType::SpruceFir => self.spruce_fir = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        ForestType::ALL.iter().all(|&ft| self.get(ft).is_none())
    }
}

/// One normalized wildfire perimeter.
#[derive(Debug, Clone)]
pub struct FireRecord {
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
    /// Burned area in whole acres.
    pub area_acres: Option<u64>,
    pub forest: ForestPercentages,
    /// Non-forest percentage columns present in this dataset variant.
    /// A key with a `None` value means the column exists but this record's value is missing.
    pub disturbance: BTreeMap<PercentField, Option<f64>>,
    pub geometry: MultiPolygon<f64>,
    /// Filled in by [`crate::resolve::resolve_dominant`].
    pub dominant: Option<ForestType>,
}

impl FireRecord {
    /// Value of any percentage column, forest or not.
    pub fn percent(&self, field: PercentField) -> Option<f64> {
        match field.forest_type() {
            Some(ft) => self.forest.get(ft),
            None => self.disturbance.get(&field).copied().flatten(),
        }
    }

    pub fn area_hectares(&self) -> Option<f64> {
        self.area_acres.map(|a| acres_to_hectares(a as f64))
    }

    pub fn centroid(&self) -> Option<Point<f64>> {
        self.geometry.centroid()
    }

    /// Percentage columns this record carries: the forest columns always, the
    /// others when the dataset variant has them. Canonical order.
    pub fn percent_fields(&self) -> impl Iterator<Item = PercentField> + '_ {
        PercentField::ALL
            .into_iter()
            .filter(|f| f.forest_type().is_some() || self.disturbance.contains_key(f))
    }
}
