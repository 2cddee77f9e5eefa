//! GeoJSON FeatureCollection → raw fire records.
//!
//! Attribute values are kept as raw JSON here; the normalizer decides what
//! parses. The loader only fails on structural problems: unreadable file, not a
//! FeatureCollection, missing required column, bad geometry, duplicate id.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use geo::{MultiPolygon, Polygon};
use geojson::{feature::Id, GeoJson, JsonObject, JsonValue};
use tracing::{debug, info};

use crate::error::{FireError, Result};
use crate::record::PercentField;

pub const ID_COLUMN: &str = "id";
pub const NAME_COLUMN: &str = "Fire_Name";
pub const YEAR_COLUMN: &str = "Year";
pub const ACRES_COLUMN: &str = "Acres";

/// A feature as read from disk, before any numeric coercion.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub id: String,
    pub name: String,
    pub year: JsonValue,
    pub acres: JsonValue,
    /// Only columns of the active variant appear here.
    pub percentages: BTreeMap<PercentField, JsonValue>,
    pub geometry: MultiPolygon<f64>,
}

/// Which optional percentage columns a dataset carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetVariant {
    fields: BTreeSet<PercentField>,
}

impl DatasetVariant {
    pub fn new(fields: impl IntoIterator<Item = PercentField>) -> Self {
        Self { fields: fields.into_iter().collect() }
    }

    pub fn contains(&self, field: PercentField) -> bool {
        self.fields.contains(&field)
    }

    /// Present columns in canonical display order.
    pub fn fields(&self) -> impl Iterator<Item = PercentField> + '_ {
        self.fields.iter().copied()
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.fields().map(PercentField::column).collect()
    }
}

/// The loaded input: raw records plus the variant they belong to.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: PathBuf,
    pub variant: DatasetVariant,
    pub records: Vec<RawRecord>,
}

/// Read and parse a GeoJSON FeatureCollection from disk.
pub fn load_path(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(FireError::data_source(path, "file does not exist"));
    }
    let text = fs::read_to_string(path)
        .map_err(|e| FireError::data_source(path, format!("cannot read file: {e}")))?;
    let dataset = load_str(&text, path)?;
    info!(
        path = %path.display(),
        records = dataset.records.len(),
        columns = ?dataset.variant.columns(),
        "loaded fire perimeters"
    );
    Ok(dataset)
}

/// Parse GeoJSON text. `source` is only used in diagnostics.
pub fn load_str(text: &str, source: &Path) -> Result<Dataset> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e| FireError::data_source(source, format!("malformed GeoJSON: {e}")))?;
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) => {
            return Err(FireError::data_source(source, "expected a FeatureCollection, found a single Feature"))
        }
        GeoJson::Geometry(_) => {
            return Err(FireError::data_source(source, "expected a FeatureCollection, found a bare Geometry"))
        }
    };

    let variant = DatasetVariant::new(PercentField::ALL.into_iter().filter(|f| {
        collection
            .features
            .iter()
            .any(|feat| feat.properties.as_ref().is_some_and(|p| p.contains_key(f.column())))
    }));
    debug!(columns = ?variant.columns(), "detected dataset variant");

    let mut seen_ids = HashSet::new();
    let mut records = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let empty = JsonObject::new();
        let props = feature.properties.as_ref().unwrap_or(&empty);

        // `id` may also come from the feature's own id member; checked below.
        for column in [NAME_COLUMN, YEAR_COLUMN, ACRES_COLUMN] {
            if !props.contains_key(column) {
                return Err(FireError::data_source(
                    source,
                    format!("feature {index} is missing required column `{column}`"),
                ));
            }
        }

        let id = match props.get(ID_COLUMN) {
            Some(v) => id_text(v),
            None => feature.id.as_ref().map(|id| match id {
                Id::String(s) => s.clone(),
                Id::Number(n) => n.to_string(),
            }),
        }
        .ok_or_else(|| {
            FireError::data_source(source, format!("feature {index} is missing required column `{ID_COLUMN}`"))
        })?;
        if !seen_ids.insert(id.clone()) {
            return Err(FireError::data_source(source, format!("duplicate id `{id}` at feature {index}")));
        }

        let geometry = feature
            .geometry
            .as_ref()
            .ok_or_else(|| FireError::data_source(source, format!("feature `{id}` has no geometry")))?;
        let geometry = to_multi_polygon(&geometry.value)
            .map_err(|reason| FireError::data_source(source, format!("feature `{id}`: {reason}")))?;

        let name = match &props[NAME_COLUMN] {
            JsonValue::String(s) => s.trim().to_string(),
            JsonValue::Null => String::new(),
            other => other.to_string(),
        };

        let percentages = variant
            .fields()
            .map(|f| (f, props.get(f.column()).cloned().unwrap_or(JsonValue::Null)))
            .collect();

        records.push(RawRecord {
            id,
            name,
            year: props[YEAR_COLUMN].clone(),
            acres: props[ACRES_COLUMN].clone(),
            percentages,
            geometry,
        });
    }

    Ok(Dataset { source: source.to_path_buf(), variant, records })
}

fn id_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

fn to_multi_polygon(value: &geojson::Value) -> std::result::Result<MultiPolygon<f64>, String> {
    let converted = match value {
        geojson::Value::Polygon(_) => Polygon::<f64>::try_from(value).map(|p| MultiPolygon::new(vec![p])),
        geojson::Value::MultiPolygon(_) => MultiPolygon::try_from(value),
        other => return Err(format!("expected Polygon or MultiPolygon geometry, found {}", other.type_name())),
    };
    converted.map_err(|e| e.to_string())
}
