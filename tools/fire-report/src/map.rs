//! Map artifacts: a styled GeoJSON for web map viewers and a raster preview.
//!
//! The GeoJSON uses simplestyle properties (`fill`, `stroke`, `title`,
//! `marker-color`), so perimeters show up coloured by year and centroids carry
//! a "Name (Year)" label in most viewers without extra configuration.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use fire_core::charts::MapFeature;
use fire_core::palette::Rgb;
use geo::{BoundingRect, MultiPolygon, Rect};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue, Value};

const PAD_FRACTION: f64 = 0.05;
const MARKER_HALF_PX: i64 = 3;

// ── GeoJSON ───────────────────────────────────────────────────────────────────

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// One perimeter feature per fire plus one labelled centroid point per fire.
pub fn map_geojson(features: &[MapFeature<'_>]) -> GeoJson {
    let mut out = Vec::with_capacity(features.len() * 2);
    for f in features {
        let mut props = JsonObject::new();
        props.insert("id".into(), f.id.into());
        props.insert("name".into(), f.name.into());
        props.insert("year".into(), f.year.map_or(JsonValue::Null, JsonValue::from));
        props.insert("fill".into(), f.fill.hex().into());
        props.insert("fill-opacity".into(), 0.6.into());
        props.insert("stroke".into(), f.fill.hex().into());
        props.insert("stroke-width".into(), 1.into());
        out.push(feature(Value::from(f.geometry), props));
    }
    for f in features {
        let Some(c) = f.centroid else { continue };
        let mut props = JsonObject::new();
        props.insert("id".into(), f.id.into());
        props.insert("title".into(), f.label.clone().into());
        props.insert("marker-color".into(), f.fill.hex().into());
        props.insert("marker-size".into(), "small".into());
        out.push(feature(Value::Point(vec![c.x(), c.y()]), props));
    }
    GeoJson::FeatureCollection(FeatureCollection { bbox: None, features: out, foreign_members: None })
}

pub fn write_geojson(features: &[MapFeature<'_>], path: &Path) -> Result<()> {
    if features.is_empty() {
        bail!("no perimeters to map");
    }
    fs::write(path, map_geojson(features).to_string()).with_context(|| format!("Write failed: {}", path.display()))
}

// ── Raster preview ────────────────────────────────────────────────────────────

/// Lon/lat → pixel mapping with equal ground scale on both axes at the mid latitude.
struct Projection {
    min_x: f64,
    max_y: f64,
    scale_x: f64,
    scale_y: f64,
}

impl Projection {
    fn fit(bounds: Rect<f64>, width: u32, height: u32) -> Self {
        let (w, h) = (bounds.width().max(1e-9), bounds.height().max(1e-9));
        let (pad_x, pad_y) = (w * PAD_FRACTION, h * PAD_FRACTION);
        let (min_x, max_x) = (bounds.min().x - pad_x, bounds.max().x + pad_x);
        let (min_y, max_y) = (bounds.min().y - pad_y, bounds.max().y + pad_y);

        let cos_lat = ((min_y + max_y) / 2.0).to_radians().cos().abs().max(0.1);
        let ground_w = (max_x - min_x) * cos_lat;
        let ground_h = max_y - min_y;
        let px_per_unit = (width as f64 / ground_w).min(height as f64 / ground_h);
        Self { min_x, max_y, scale_x: px_per_unit * cos_lat, scale_y: px_per_unit }
    }

    fn to_px(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.min_x) * self.scale_x, (self.max_y - y) * self.scale_y)
    }
}

fn blend(under: image::Rgb<u8>, over: Rgb, alpha: f64) -> image::Rgb<u8> {
    let mix = |a: u8, b: u8| (a as f64 * (1.0 - alpha) + b as f64 * alpha).round() as u8;
    let over = over.to_array();
    image::Rgb([mix(under[0], over[0]), mix(under[1], over[1]), mix(under[2], over[2])])
}

/// Even-odd scanline fill of every ring of `mp`.
fn fill_multipolygon(img: &mut image::RgbImage, mp: &MultiPolygon<f64>, proj: &Projection, fill: Rgb) {
    let rings: Vec<Vec<(f64, f64)>> = mp
        .iter()
        .flat_map(|poly| std::iter::once(poly.exterior()).chain(poly.interiors()))
        .map(|ls| ls.coords().map(|c| proj.to_px(c.x, c.y)).collect())
        .collect();
    let (w, h) = img.dimensions();

    let mut crossings = Vec::new();
    for row in 0..h {
        let y = row as f64 + 0.5;
        crossings.clear();
        for pts in &rings {
            for seg in pts.windows(2) {
                let ((x0, y0), (x1, y1)) = (seg[0], seg[1]);
                if (y0 <= y) != (y1 <= y) {
                    crossings.push(x0 + (y - y0) / (y1 - y0) * (x1 - x0));
                }
            }
        }
        crossings.sort_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let start = pair[0].round().max(0.0) as u32;
            let end = (pair[1].round().max(0.0) as u32).min(w);
            for col in start..end {
                let under = *img.get_pixel(col, row);
                img.put_pixel(col, row, blend(under, fill, 0.75));
            }
        }
    }
}

fn draw_marker(img: &mut image::RgbImage, cx: f64, cy: f64) {
    let (w, h) = img.dimensions();
    let (cx, cy) = (cx.round() as i64, cy.round() as i64);
    for dy in -MARKER_HALF_PX..=MARKER_HALF_PX {
        for dx in -MARKER_HALF_PX..=MARKER_HALF_PX {
            let (x, y) = (cx + dx, cy + dy);
            if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
                continue;
            }
            let edge = dx.abs() == MARKER_HALF_PX || dy.abs() == MARKER_HALF_PX;
            let px = if edge { image::Rgb([255u8, 255, 255]) } else { image::Rgb([20u8, 20, 20]) };
            img.put_pixel(x as u32, y as u32, px);
        }
    }
}

/// Paint perimeters (year colour) and centroid markers onto a light background.
pub fn map_image(features: &[MapFeature<'_>], width: u32, height: u32) -> Result<image::RgbImage> {
    let bounds = features
        .iter()
        .filter_map(|f| f.geometry.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
            )
        });
    let Some(bounds) = bounds else { bail!("no perimeter has any coordinates") };
    let proj = Projection::fit(bounds, width, height);

    let mut img = image::RgbImage::from_pixel(width, height, image::Rgb([245, 243, 238]));
    for f in features {
        fill_multipolygon(&mut img, f.geometry, &proj, f.fill);
    }
    for c in features.iter().filter_map(|f| f.centroid) {
        let (x, y) = proj.to_px(c.x(), c.y());
        draw_marker(&mut img, x, y);
    }
    Ok(img)
}

pub fn write_png(features: &[MapFeature<'_>], width: u32, height: u32, path: &Path) -> Result<()> {
    let img = map_image(features, width, height)?;
    img.save(path).with_context(|| format!("failed to save {}", path.display()))
}
