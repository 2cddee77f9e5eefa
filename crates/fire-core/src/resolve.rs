//! Dominant forest type per record, and the count table built from it.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use crate::record::{FireRecord, ForestPercentages, ForestType};

/// Argmax over the forest percentages.
///
/// Missing values never compete. Exact ties go to the earliest type in
/// canonical order. `None` only when every value is missing.
pub fn dominant_forest_type(forest: &ForestPercentages) -> Option<ForestType> {
    let mut best: Option<(ForestType, f64)> = None;
    for ft in ForestType::ALL {
        let Some(v) = forest.get(ft) else { continue };
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((ft, v)),
        }
    }
    best.map(|(ft, _)| ft)
}

/// Attach `dominant` to every record.
pub fn resolve_dominant(records: &mut [FireRecord]) {
    for r in records.iter_mut() {
        r.dominant = dominant_forest_type(&r.forest);
        if r.dominant.is_none() {
            debug!(record = %r.id, "no forest percentages; dominant type undefined");
        }
    }
    let dupes = duplicate_names(records);
    if !dupes.is_empty() {
        warn!(names = ?dupes, "fire names are not unique; name-keyed joins downstream would be ambiguous");
    }
}

/// Names that appear on more than one record, sorted.
pub fn duplicate_names(records: &[FireRecord]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *seen.entry(r.name.as_str()).or_default() += 1;
    }
    let mut dupes: Vec<String> = seen.into_iter().filter(|&(_, n)| n > 1).map(|(name, _)| name.to_string()).collect();
    dupes.sort();
    dupes
}

/// Forest type → number of records it dominates. Types with no records are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DominantCounts(BTreeMap<ForestType, usize>);

impl DominantCounts {
    pub fn from_records(records: &[FireRecord]) -> Self {
        let mut counts = BTreeMap::new();
        for ft in records.iter().filter_map(|r| r.dominant) {
            *counts.entry(ft).or_insert(0) += 1;
        }
        Self(counts)
    }

    pub fn get(&self, ft: ForestType) -> usize {
        self.0.get(&ft).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Entries in canonical forest order.
    pub fn iter(&self) -> impl Iterator<Item = (ForestType, usize)> + '_ {
        self.0.iter().map(|(&ft, &n)| (ft, n))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;

    fn forest(l: Option<f64>, p: Option<f64>, s: Option<f64>) -> ForestPercentages {
        ForestPercentages { lodgepole: l, ponderosa: p, spruce_fir: s }
    }

    fn record(name: &str, f: ForestPercentages) -> FireRecord {
        FireRecord {
            id: name.to_lowercase(),
            name: name.into(),
            year: Some(2000),
            area_acres: Some(100),
            forest: f,
            disturbance: Default::default(),
            geometry: MultiPolygon::new(vec![]),
            dominant: None,
        }
    }

    #[test]
    fn strict_maximum_wins() {
        assert_eq!(dominant_forest_type(&forest(Some(62.3), Some(20.1), Some(5.0))), Some(ForestType::Lodgepole));
        assert_eq!(dominant_forest_type(&forest(Some(1.0), Some(20.1), Some(5.0))), Some(ForestType::Ponderosa));
        assert_eq!(dominant_forest_type(&forest(Some(1.0), Some(2.0), Some(3.0))), Some(ForestType::SpruceFir));
    }

    #[test]
    fn ties_go_to_canonical_first() {
        assert_eq!(dominant_forest_type(&forest(Some(30.0), Some(30.0), Some(30.0))), Some(ForestType::Lodgepole));
        assert_eq!(dominant_forest_type(&forest(Some(10.0), Some(30.0), Some(30.0))), Some(ForestType::Ponderosa));
        assert_eq!(dominant_forest_type(&forest(Some(0.0), Some(0.0), Some(0.0))), Some(ForestType::Lodgepole));
    }

    #[test]
    fn missing_values_never_compete() {
        assert_eq!(dominant_forest_type(&forest(None, Some(40.0), Some(35.0))), Some(ForestType::Ponderosa));
        assert_eq!(dominant_forest_type(&forest(None, None, Some(0.0))), Some(ForestType::SpruceFir));
        assert_eq!(dominant_forest_type(&forest(None, None, None)), None);
    }

    #[test]
    fn argmax_matches_brute_force() {
        let vals = [None, Some(0.0), Some(12.5), Some(50.0), Some(99.9)];
        for &l in &vals {
            for &p in &vals {
                for &s in &vals {
                    let f = forest(l, p, s);
                    let got = dominant_forest_type(&f);
                    let max = [l, p, s].into_iter().flatten().fold(None, |m: Option<f64>, v| Some(m.map_or(v, |m| m.max(v))));
                    match max {
                        None => assert_eq!(got, None),
                        Some(max) => {
                            let expected = ForestType::ALL.into_iter().find(|&ft| f.get(ft) == Some(max));
                            assert_eq!(got, expected, "{f:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn three_ponderosa_records_count() {
        let mut records: Vec<_> = ["A", "B", "C"]
            .iter()
            .map(|n| record(n, forest(Some(1.0), Some(90.0), Some(2.0))))
            .collect();
        resolve_dominant(&mut records);
        let counts = DominantCounts::from_records(&records);
        assert_eq!(counts.get(ForestType::Ponderosa), 3);
        assert_eq!(counts.get(ForestType::Lodgepole), 0);
        assert_eq!(counts.iter().collect::<Vec<_>>(), vec![(ForestType::Ponderosa, 3)]);
    }

    #[test]
    fn counts_sum_to_resolved_records() {
        let mut records = vec![
            record("A", forest(Some(60.0), Some(10.0), Some(1.0))),
            record("B", forest(None, None, None)),
            record("C", forest(Some(1.0), None, Some(70.0))),
            record("D", forest(Some(5.0), Some(5.0), Some(5.0))),
        ];
        resolve_dominant(&mut records);
        let counts = DominantCounts::from_records(&records);
        let resolved = records.iter().filter(|r| r.dominant.is_some()).count();
        assert_eq!(resolved, 3);
        assert_eq!(counts.total(), resolved);
        assert_eq!(counts.get(ForestType::Lodgepole), 2);
    }

    #[test]
    fn duplicate_names_are_reported() {
        let f = forest(Some(1.0), None, None);
        let records = vec![record("Fern", f), record("Lake", f), record("Fern", f)];
        assert_eq!(duplicate_names(&records), vec!["Fern".to_string()]);
    }
}
