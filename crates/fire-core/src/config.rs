use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FireError, Result};

/// Run configuration. Every field has a default, so a config file may set any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// GeoJSON FeatureCollection of fire perimeters. Picks the dataset variant.
    pub input: PathBuf,
    /// Created if absent.
    pub output_dir: PathBuf,
    /// Artifact filename prefix. Defaults to the input file stem.
    pub label: Option<String>,
    /// Chart size in pixels.
    pub figure_width: u32,
    pub figure_height: u32,
    /// Bins in the fire-size histogram.
    pub size_bins: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/mtbs_perimeters.geojson"),
            output_dir: PathBuf::from("figures"),
            label: None,
            figure_width: 1000,
            figure_height: 600,
            size_bins: 20,
        }
    }
}

impl ReportConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| FireError::Io { path: path.to_path_buf(), source })?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.figure_width == 0 || self.figure_height == 0 {
            return Err(FireError::Config(format!(
                "figure size must be non-zero, got {}x{}",
                self.figure_width, self.figure_height
            )));
        }
        if self.size_bins == 0 {
            return Err(FireError::Config("size_bins must be at least 1".into()));
        }
        if let Some(label) = &self.label {
            if label.is_empty() || label.contains(['/', '\\']) {
                return Err(FireError::Config(format!("label `{label}` is not usable in a file name")));
            }
        }
        Ok(())
    }

    /// The explicit label, else the input file stem, else `fires`.
    pub fn label(&self) -> String {
        self.label
            .clone()
            .or_else(|| self.input.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "fires".to_string())
    }

    /// `{output_dir}/{label}-{suffix}`
    pub fn artifact_path(&self, suffix: &str) -> PathBuf {
        self.output_dir.join(format!("{}-{suffix}", self.label()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_defaults_to_input_stem() {
        let cfg = ReportConfig { input: PathBuf::from("data/mtbs_southern_rockies.geojson"), ..Default::default() };
        assert_eq!(cfg.label(), "mtbs_southern_rockies");
        assert_eq!(
            cfg.artifact_path("fire_timeline.png"),
            PathBuf::from("figures/mtbs_southern_rockies-fire_timeline.png")
        );

        let cfg = ReportConfig { label: Some("gedi".into()), ..cfg };
        assert_eq!(cfg.artifact_path("fire_hist_years.png"), PathBuf::from("figures/gedi-fire_hist_years.png"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: ReportConfig = serde_json::from_str(r#"{"label":"x","figure_height":300}"#).unwrap();
        assert_eq!(cfg.label.as_deref(), Some("x"));
        assert_eq!(cfg.figure_height, 300);
        assert_eq!(cfg.figure_width, ReportConfig::default().figure_width);
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        assert!(ReportConfig::default().validate().is_ok());
        assert!(ReportConfig { figure_width: 0, ..Default::default() }.validate().is_err());
        assert!(ReportConfig { size_bins: 0, ..Default::default() }.validate().is_err());
        assert!(ReportConfig { label: Some("a/b".into()), ..Default::default() }.validate().is_err());
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let err = ReportConfig::from_json_file(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, FireError::Io { .. }));
    }
}
