use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use approx::assert_relative_eq;
use fire_core::charts::{size_histogram, timeline_points, year_histogram};
use fire_core::{analyze_path, FireError, ForestType, PercentField};

const FIXTURE: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature",
     "geometry": {"type": "Polygon", "coordinates": [[[-105.6, 40.5], [-105.4, 40.5], [-105.4, 40.7], [-105.6, 40.7], [-105.6, 40.5]]]},
     "properties": {"id": "CO4065310561020120609", "Fire_Name": "HIGH PARK", "Year": 2012, "Acres": 87415.6,
                    "lodgepole": 0.623, "ponderosa": 0.201, "spruceFir": 0.05, "disturbed_burned": "0.12"}},
    {"type": "Feature",
     "geometry": {"type": "Polygon", "coordinates": [[[-105.3, 39.1], [-105.1, 39.1], [-105.1, 39.3], [-105.3, 39.1]]]},
     "properties": {"id": "CO3922010527920020608", "Fire_Name": "HAYMAN", "Year": "2002", "Acres": "137759",
                    "lodgepole": "bad", "ponderosa": "0.81", "spruceFir": 0.02, "disturbed_burned": null}},
    {"type": "Feature",
     "geometry": {"type": "MultiPolygon", "coordinates": [[[[-106.0, 37.5], [-105.9, 37.5], [-105.9, 37.6], [-106.0, 37.5]]]]},
     "properties": {"id": "CO3749010598020130605", "Fire_Name": "WEST FORK", "Year": 2013, "Acres": 1000,
                    "lodgepole": 0.1, "ponderosa": 0.1, "spruceFir": 0.7, "disturbed_burned": 0.3}},
    {"type": "Feature",
     "geometry": {"type": "Polygon", "coordinates": [[[-104.9, 38.9], [-104.8, 38.9], [-104.8, 39.0], [-104.9, 38.9]]]},
     "properties": {"id": "CO3890010484020120623", "Fire_Name": "WALDO CANYON", "Year": 2012, "Acres": 18247,
                    "lodgepole": null, "ponderosa": null, "spruceFir": null, "disturbed_burned": 0.5}}
  ]
}"#;

/// The directory must outlive the returned path.
fn write_fixture(name: &str, text: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    (dir, path)
}

#[test]
fn full_pipeline_on_fixture() {
    let (_dir, path) = write_fixture("perimeters.geojson", FIXTURE);
    let analysis = analyze_path(&path).unwrap();

    assert_eq!(analysis.records.len(), 4);
    assert!(analysis.variant.contains(PercentField::DisturbedBurned));
    assert!(!analysis.variant.contains(PercentField::GediCoverage));

    let high_park = &analysis.records[0];
    assert_eq!(high_park.forest.lodgepole, Some(62.3));
    assert_eq!(high_park.forest.ponderosa, Some(20.1));
    assert_eq!(high_park.forest.spruce_fir, Some(5.0));
    assert_eq!(high_park.area_acres, Some(87415));
    assert_eq!(high_park.dominant, Some(ForestType::Lodgepole));

    // Unparseable lodgepole does not compete.
    let hayman = &analysis.records[1];
    assert_eq!(hayman.forest.lodgepole, None);
    assert_eq!(hayman.year, Some(2002));
    assert_eq!(hayman.dominant, Some(ForestType::Ponderosa));
    assert_eq!(analysis.parse_errors.len(), 1);
    assert_eq!(analysis.parse_errors[0].field, "lodgepole");

    // No forest values at all: kept, but not in the summary table.
    let waldo = &analysis.records[3];
    assert_eq!(waldo.dominant, None);
    assert_eq!(analysis.summary.records, 4);
    assert_eq!(analysis.summary.with_dominant, 3);
    assert_eq!(analysis.counts.total(), 3);
    assert_eq!(analysis.counts.get(ForestType::SpruceFir), 1);

    let ids: Vec<_> = analysis.report.rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["CO4065310561020120609", "CO3749010598020130605", "CO3922010527920020608"]);
    assert_eq!(analysis.report.headers()[3], "Lodgepole %");

    // Charts still see the record without a dominant type.
    let bounds = analysis.year_bounds().unwrap();
    assert_eq!((bounds.min, bounds.max), (2002, 2013));
    let years = year_histogram(&analysis.records, bounds);
    assert_eq!(years.iter().map(|b| b.total()).sum::<usize>(), 4);
    assert_eq!(timeline_points(&analysis.records).len(), 4);

    let sizes = size_histogram(&analysis.records, 10);
    assert_relative_eq!(sizes.last().unwrap().upper, 137759.0 * 0.404686, epsilon = 1e-6);
}

#[test]
fn missing_required_column_is_fatal() {
    let text = FIXTURE.replace("\"Acres\": 1000,", "");
    let (_dir, path) = write_fixture("no-acres.geojson", &text);
    match analyze_path(&path) {
        Err(FireError::DataSource { reason, .. }) => assert!(reason.contains("Acres"), "{reason}"),
        other => panic!("expected a data source error, got {other:?}"),
    }
}
