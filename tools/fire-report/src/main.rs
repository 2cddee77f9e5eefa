//! Fire perimeter report: summary tables, charts and map artifacts for one
//! GeoJSON dataset of fire perimeters.
//!
//! Outputs land in `{output_dir}/{label}-*`. A failed chart or map is logged and
//! skipped; only an unusable input aborts the run.

mod charts;
mod map;
mod table;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use fire_core::charts::map_features;
use fire_core::export::records_to_json;
use fire_core::palette::Palette;
use fire_core::{analyze_path, Analysis, ReportConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::charts::{Chart, ChartContext};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "fire-report", version, about = "Summarise fire perimeters by dominant forest type and render charts")]
struct Args {
    /// GeoJSON FeatureCollection of fire perimeters (overrides the config file).
    input: Option<PathBuf>,

    /// JSON config file; flags given on the command line take precedence.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory (created if absent).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Artifact filename prefix [default: input file stem].
    #[arg(short, long)]
    label: Option<String>,

    /// Figure width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Figure height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Number of bins in the fire-size histogram.
    #[arg(long)]
    size_bins: Option<usize>,

    /// Skip the four PNG charts.
    #[arg(long)]
    skip_charts: bool,

    /// Skip the map artifacts.
    #[arg(long)]
    skip_map: bool,

    /// Debug-level logging (RUST_LOG overrides).
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Defaults, then the config file, then command-line flags.
    fn resolve_config(&self) -> Result<ReportConfig> {
        let mut cfg = match &self.config {
            Some(path) => ReportConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ReportConfig::default(),
        };
        if let Some(input) = &self.input {
            cfg.input = input.clone();
        }
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = dir.clone();
        }
        if let Some(label) = &self.label {
            cfg.label = Some(label.clone());
        }
        if let Some(w) = self.width {
            cfg.figure_width = w;
        }
        if let Some(h) = self.height {
            cfg.figure_height = h;
        }
        if let Some(n) = self.size_bins {
            cfg.size_bins = n;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

// ── Artifacts ─────────────────────────────────────────────────────────────────

fn write_text(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Write failed: {}", path.display()))
}

/// Log and swallow a per-artifact failure.
fn soft(artifact: &str, path: &Path, result: Result<()>) -> bool {
    match result {
        Ok(()) => {
            info!(path = %path.display(), "wrote {artifact}");
            true
        }
        Err(e) => {
            warn!(artifact, "skipped: {e:#}");
            false
        }
    }
}

fn write_tables(analysis: &Analysis, cfg: &ReportConfig, palette: &Palette) -> usize {
    println!("{}", table::report_text(&analysis.report));
    println!("{}", table::counts_text(&analysis.counts));

    let title = format!("{} fire perimeters", cfg.label());
    let html = table::report_html(&title, &analysis.summary, &analysis.report, &analysis.counts, palette);
    let html_path = cfg.artifact_path("fire_table.html");
    let records_path = cfg.artifact_path("fire_records.json");
    let records = records_to_json(&analysis.records)
        .context("Cannot serialise records")
        .and_then(|json| write_text(&records_path, &json));
    [
        soft("summary table", &html_path, write_text(&html_path, &html)),
        soft("records", &records_path, records),
    ]
    .into_iter()
    .filter(|&ok| ok)
    .count()
}

fn render_charts(analysis: &Analysis, cfg: &ReportConfig, palette: &Palette) -> usize {
    let ctx = ChartContext {
        palette,
        year_bounds: analysis.year_bounds(),
        width: cfg.figure_width,
        height: cfg.figure_height,
        size_bins: cfg.size_bins,
    };
    Chart::ALL
        .into_iter()
        .filter(|&chart| {
            let path = cfg.artifact_path(chart.file_suffix());
            soft(chart.file_suffix(), &path, charts::render(chart, &analysis.records, &ctx, &path))
        })
        .count()
}

fn render_map(analysis: &Analysis, cfg: &ReportConfig, palette: &Palette) -> usize {
    let features = map_features(&analysis.records, analysis.year_bounds(), palette);
    let geojson_path = cfg.artifact_path("fire_map.geojson");
    let png_path = cfg.artifact_path("fire_map.png");
    [
        soft("map", &geojson_path, map::write_geojson(&features, &geojson_path)),
        soft(
            "map preview",
            &png_path,
            map::write_png(&features, cfg.figure_width, cfg.figure_height, &png_path),
        ),
    ]
    .into_iter()
    .filter(|&ok| ok)
    .count()
}

fn run(args: &Args) -> Result<()> {
    let cfg = args.resolve_config()?;
    let palette = Palette::default();

    let analysis = analyze_path(&cfg.input).with_context(|| format!("Cannot analyse {}", cfg.input.display()))?;
    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("Cannot create output directory {}", cfg.output_dir.display()))?;

    let mut rendered = write_tables(&analysis, &cfg, &palette);
    if !args.skip_charts {
        rendered += render_charts(&analysis, &cfg, &palette);
    }
    if !args.skip_map {
        rendered += render_map(&analysis, &cfg, &palette);
    }
    info!(
        source = %analysis.source.display(),
        label = %cfg.label(),
        output_dir = %cfg.output_dir.display(),
        rendered,
        "done"
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    run(&args)
}
