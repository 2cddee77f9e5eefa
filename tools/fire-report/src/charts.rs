//! PNG charts. Each renderer draws one prepared series from `fire_core::charts`.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use fire_core::charts::{
    size_histogram, size_vs_year, timeline_points, year_histogram, ScatterPoint, StackedBin, TimelinePoint, YearBounds,
};
use fire_core::palette::{Palette, Rgb};
use fire_core::{FireRecord, ForestType};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;

/// DejaVu Sans, registered as plotters' "sans-serif" family.
static SANS_SERIF: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Marker radius range in pixels for the timeline.
const MIN_MARKER_PX: f64 = 3.0;
const MAX_MARKER_PX: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chart {
    Timeline,
    YearHistogram,
    SizeHistogram,
    SizeVsYear,
}

impl Chart {
    pub const ALL: [Chart; 4] = [Chart::Timeline, Chart::YearHistogram, Chart::SizeHistogram, Chart::SizeVsYear];

    /// Filename suffix, appended to `{label}-`.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Chart::Timeline => "fire_timeline.png",
            Chart::YearHistogram => "fire_hist_years.png",
            Chart::SizeHistogram => "fire_hist_size.png",
            Chart::SizeVsYear => "fire_size_vs_year_scatterplot.png",
        }
    }
}

/// What every chart needs besides the records.
#[derive(Debug, Clone, Copy)]
pub struct ChartContext<'a> {
    pub palette: &'a Palette,
    pub year_bounds: Option<YearBounds>,
    pub width: u32,
    pub height: u32,
    pub size_bins: usize,
}

fn color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

/// Stacking order and legend entries: unresolved first, then canonical forest order.
const STACK_KEYS: [Option<ForestType>; 4] =
    [None, Some(ForestType::Lodgepole), Some(ForestType::Ponderosa), Some(ForestType::SpruceFir)];

fn legend_label(key: Option<ForestType>) -> &'static str {
    key.map_or("Unresolved", ForestType::label)
}

/// Register the embedded face once per process. Every caption, tick label and
/// legend entry resolves to it.
fn register_fonts() -> Result<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| register_font("sans-serif", FontStyle::Normal, SANS_SERIF).is_ok());
    if !ok {
        bail!("embedded chart font could not be loaded");
    }
    Ok(())
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn canvas<'a>(path: &'a Path, ctx: &ChartContext<'_>) -> Area<'a> {
    BitMapBackend::new(path, (ctx.width, ctx.height)).into_drawing_area()
}

/// Render one chart to `path`. Errors mean "skip this artifact"; nothing is
/// written when the input has nothing to draw.
pub fn render(chart: Chart, records: &[FireRecord], ctx: &ChartContext<'_>, path: &Path) -> Result<()> {
    register_fonts()?;
    let years = || ctx.year_bounds.context("no record has a year");
    let root = match chart {
        Chart::Timeline => {
            let bounds = years()?;
            let points = timeline_points(records);
            if points.is_empty() {
                bail!("no record has both a year and an area");
            }
            let root = canvas(path, ctx);
            draw_timeline(&root, &points, bounds, ctx.palette)?;
            root
        }
        Chart::YearHistogram => {
            let bins = year_histogram(records, years()?);
            let root = canvas(path, ctx);
            draw_stacked(&root, "Fires per year", "Year", &bins, ctx.palette, 0.8)?;
            root
        }
        Chart::SizeHistogram => {
            let bins = size_histogram(records, ctx.size_bins);
            if bins.is_empty() {
                bail!("no record has an area");
            }
            let root = canvas(path, ctx);
            draw_stacked(&root, "Fire size distribution", "Area (ha)", &bins, ctx.palette, 1.0)?;
            root
        }
        Chart::SizeVsYear => {
            let bounds = years()?;
            let points = size_vs_year(records);
            if points.is_empty() {
                bail!("no record has both a year and a positive area");
            }
            let root = canvas(path, ctx);
            draw_scatter(&root, &points, bounds, ctx.palette)?;
            root
        }
    };
    root.present()?;
    Ok(())
}

fn draw_timeline(root: &Area<'_>, points: &[TimelinePoint], bounds: YearBounds, palette: &Palette) -> Result<()> {
    let max_size = points.iter().map(|p| p.marker_size).fold(1.0, f64::max);
    let radius = |size: f64| -> i32 {
        let t = if max_size > 1.0 { (size - 1.0) / (max_size - 1.0) } else { 0.5 };
        (MIN_MARKER_PX + t * (MAX_MARKER_PX - MIN_MARKER_PX)).round() as i32
    };

    root.fill(&WHITE)?;
    let names: Vec<&str> = points.iter().map(|p| p.name.as_str()).collect();
    let mut chart = ChartBuilder::on(root)
        .caption("Fire timeline", ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(
            -0.5f64..(points.len() as f64 - 0.5),
            (bounds.min as f64 - 1.0)..(bounds.max as f64 + 1.0),
        )?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(points.len().min(40))
        .x_label_formatter(&|x: &f64| {
            let i = x.round();
            if i >= 0.0 && (i as usize) < names.len() && (x - i).abs() < 1e-6 {
                names[i as usize].to_string()
            } else {
                String::new()
            }
        })
        .y_label_formatter(&|y| format!("{y:.0}"))
        .y_desc("Year")
        .draw()?;

    for key in STACK_KEYS {
        let style = color(palette.color(key)).mix(0.8).filled();
        let series: Vec<&TimelinePoint> = points.iter().filter(|p| p.dominant == key).collect();
        if series.is_empty() {
            continue;
        }
        chart
            .draw_series(
                series.iter().map(|p| Circle::new((p.position as f64, p.year as f64), radius(p.marker_size), style)),
            )?
            .label(legend_label(key))
            .legend(move |(x, y)| Circle::new((x + 5, y), 5, style));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_stacked(
    root: &Area<'_>,
    title: &str,
    x_desc: &str,
    bins: &[StackedBin],
    palette: &Palette,
    bar_fraction: f64,
) -> Result<()> {
    let total: usize = bins.iter().map(StackedBin::total).sum();
    if total == 0 {
        bail!("all bins are empty");
    }
    let x_min = bins.first().map_or(0.0, |b| b.lower);
    let x_max = bins.last().map_or(1.0, |b| b.upper);
    let y_max = bins.iter().map(StackedBin::total).max().unwrap_or(1) as f64;

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0f64..(y_max * 1.1))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Fires")
        .x_label_formatter(&|x| format!("{x:.0}"))
        .y_label_formatter(&|y| format!("{y:.0}"))
        .draw()?;

    for key in STACK_KEYS {
        let style = color(palette.color(key)).filled();
        let bars: Vec<Rectangle<(f64, f64)>> = bins
            .iter()
            .flat_map(|bin| {
                let pad = (bin.upper - bin.lower) * (1.0 - bar_fraction) / 2.0;
                bin.segments()
                    .into_iter()
                    .filter(move |seg| seg.0 == key)
                    .map(move |(_, lo, hi)| {
                        Rectangle::new([(bin.lower + pad, lo as f64), (bin.upper - pad, hi as f64)], style)
                    })
            })
            .collect();
        if bars.is_empty() {
            continue;
        }
        chart
            .draw_series(bars)?
            .label(legend_label(key))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], style));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_scatter(root: &Area<'_>, points: &[ScatterPoint], bounds: YearBounds, palette: &Palette) -> Result<()> {
    let y_lo = points.iter().map(|p| p.log2_hectares).fold(f64::INFINITY, f64::min).floor() - 1.0;
    let y_hi = points.iter().map(|p| p.log2_hectares).fold(f64::NEG_INFINITY, f64::max).ceil() + 1.0;

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .caption("Fire size vs. year", ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((bounds.min as f64 - 1.0)..(bounds.max as f64 + 1.0), y_lo..y_hi)?;
    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("log2(area, ha)")
        .x_label_formatter(&|x| format!("{x:.0}"))
        .draw()?;

    for key in STACK_KEYS {
        let style = color(palette.color(key)).filled();
        let series: Vec<&ScatterPoint> = points.iter().filter(|p| p.dominant == key).collect();
        if series.is_empty() {
            continue;
        }
        chart
            .draw_series(series.iter().map(|p| {
                EmptyElement::at((p.year as f64, p.log2_hectares))
                    + Circle::new((0, 0), 5, style)
                    + Text::new(p.name.clone(), (7, -7), ("sans-serif", 12).into_font())
            }))?
            .label(legend_label(key))
            .legend(move |(x, y)| Circle::new((x + 5, y), 5, style));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fire_core::record::ForestPercentages;
    use geo::MultiPolygon;

    fn rec(name: &str, year: Option<i32>, acres: Option<u64>, dominant: Option<ForestType>) -> FireRecord {
        FireRecord {
            id: name.to_lowercase(),
            name: name.into(),
            year,
            area_acres: acres,
            forest: ForestPercentages::default(),
            disturbance: Default::default(),
            geometry: MultiPolygon::new(vec![]),
            dominant,
        }
    }

    fn ctx<'a>(palette: &'a Palette, records: &[FireRecord]) -> ChartContext<'a> {
        ChartContext {
            palette,
            year_bounds: YearBounds::from_records(records),
            width: 640,
            height: 400,
            size_bins: 10,
        }
    }

    #[test]
    fn suffixes_match_artifact_names() {
        let suffixes: Vec<_> = Chart::ALL.iter().map(|c| c.file_suffix()).collect();
        assert_eq!(
            suffixes,
            vec![
                "fire_timeline.png",
                "fire_hist_years.png",
                "fire_hist_size.png",
                "fire_size_vs_year_scatterplot.png"
            ]
        );
    }

    #[test]
    fn every_chart_renders_a_png() {
        let records = vec![
            rec("Alpha", Some(2002), Some(137759), Some(ForestType::Ponderosa)),
            rec("Bravo", Some(2012), Some(87415), Some(ForestType::Lodgepole)),
            rec("Charlie", Some(2013), Some(1000), Some(ForestType::SpruceFir)),
            rec("Delta", Some(2012), Some(18247), None),
        ];
        let palette = Palette::default();
        let ctx = ctx(&palette, &records);
        let dir = tempfile::tempdir().unwrap();
        for chart in Chart::ALL {
            let path = dir.path().join(chart.file_suffix());
            render(chart, &records, &ctx, &path).unwrap();
            let bytes = std::fs::read(&path).unwrap();
            assert_eq!(&bytes[1..4], b"PNG", "{chart:?}");
        }
    }

    #[test]
    fn caption_text_is_drawn() {
        let records = vec![rec("Alpha", Some(2002), Some(137759), Some(ForestType::Ponderosa))];
        let palette = Palette::default();
        let ctx = ctx(&palette, &records);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timeline.png");
        render(Chart::Timeline, &records, &ctx, &path).unwrap();

        // The caption sits centred in the top margin on an otherwise white band.
        let img = image::open(&path).unwrap().to_rgb8();
        let (w, _) = img.dimensions();
        let inked = (w / 4..3 * w / 4)
            .flat_map(|x| (15..50).map(move |y| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y).0.iter().all(|&c| c < 128))
            .count();
        assert!(inked > 20, "only {inked} dark pixels in the caption band");
    }

    #[test]
    fn size_histogram_does_not_need_years() {
        let records = vec![rec("Undated", None, Some(1000), Some(ForestType::Lodgepole))];
        let palette = Palette::default();
        let ctx = ctx(&palette, &records);
        assert!(ctx.year_bounds.is_none());
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join(Chart::SizeHistogram.file_suffix());
        render(Chart::SizeHistogram, &records, &ctx, &path).unwrap();
        assert!(path.exists());

        for chart in [Chart::Timeline, Chart::YearHistogram, Chart::SizeVsYear] {
            let path = dir.path().join(chart.file_suffix());
            let err = render(chart, &records, &ctx, &path).unwrap_err();
            assert!(err.to_string().contains("year"), "{chart:?}: {err}");
            assert!(!path.exists());
        }
    }

    #[test]
    fn empty_input_is_an_error_not_a_panic() {
        let records = vec![rec("NoYear", None, None, None)];
        let palette = Palette::default();
        let ctx = ctx(&palette, &records);
        let dir = tempfile::tempdir().unwrap();
        for chart in Chart::ALL {
            let path = dir.path().join(chart.file_suffix());
            assert!(render(chart, &records, &ctx, &path).is_err(), "{chart:?}");
            assert!(!path.exists(), "{chart:?} left a file behind");
        }
    }
}
