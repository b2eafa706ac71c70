//! Coastlines, borders and other geographic overlays.
//!
//! Features are read from GeoJSON files named after the feature
//! (`coastline.json`, `land.json`, ...) in the features directory. A missing
//! file is logged and skipped so a map still renders without it.

use std::path::Path;

use renderer::{Canvas, Color, StrokeStyle};
use serde_json::Value;
use tracing::{debug, warn};

use emc_common::{EmcError, EmcResult};

use crate::context::{break_jumps, RenderContext};
use crate::decorations::MapFeature;
use crate::maps::MapAxes;

/// Water color shared by oceans, lakes and rivers.
pub const WATER: Color = Color::rgb(152, 183, 226);
pub const LAND: Color = Color::rgb(240, 240, 220);

type Ring = Vec<(f64, f64)>;

/// Lines and polygons of one feature file, in degrees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureGeometry {
    pub lines: Vec<Ring>,
    /// Outer ring first, then holes
    pub polygons: Vec<Vec<Ring>>,
}

fn ring(value: &Value) -> Ring {
    value
        .as_array()
        .map(|coords| {
            coords
                .iter()
                .filter_map(|c| {
                    let c = c.as_array()?;
                    Some((c.first()?.as_f64()?, c.get(1)?.as_f64()?))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn rings(value: &Value) -> Vec<Ring> {
    value
        .as_array()
        .map(|r| r.iter().map(ring).collect())
        .unwrap_or_default()
}

impl FeatureGeometry {
    /// Collect geometry from a FeatureCollection, Feature or bare geometry.
    pub fn from_geojson(value: &Value) -> Self {
        let mut out = Self::default();
        out.collect(value);
        out
    }

    fn collect(&mut self, value: &Value) {
        let coords = &value["coordinates"];
        match value["type"].as_str() {
            Some("FeatureCollection") => {
                for feature in value["features"].as_array().into_iter().flatten() {
                    self.collect(feature);
                }
            }
            Some("Feature") => self.collect(&value["geometry"]),
            Some("GeometryCollection") => {
                for geometry in value["geometries"].as_array().into_iter().flatten() {
                    self.collect(geometry);
                }
            }
            Some("LineString") => self.lines.push(ring(coords)),
            Some("MultiLineString") => self.lines.extend(rings(coords)),
            Some("Polygon") => self.polygons.push(rings(coords)),
            Some("MultiPolygon") => {
                for polygon in coords.as_array().into_iter().flatten() {
                    self.polygons.push(rings(polygon));
                }
            }
            other => debug!(kind = ?other, "Skipping unsupported GeoJSON object"),
        }
    }

    /// Polygon outlines as lines, for stroking area features.
    pub fn outlines(&self) -> impl Iterator<Item = &Ring> {
        self.polygons.iter().flatten().chain(&self.lines)
    }
}

/// Read one feature file. `Ok(None)` when the file does not exist.
pub fn load_feature(dir: &Path, feature: MapFeature) -> EmcResult<Option<FeatureGeometry>> {
    let path = dir.join(format!("{}.json", feature.file_stem()));
    if !path.exists() {
        warn!(path = %path.display(), "Map feature file not found, skipping");
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path)?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| EmcError::Config(format!("invalid GeoJSON in {}: {}", path.display(), e)))?;
    let geometry = FeatureGeometry::from_geojson(&value);
    debug!(
        feature = feature.file_stem(),
        lines = geometry.lines.len(),
        polygons = geometry.polygons.len(),
        "Loaded map feature"
    );
    Ok(Some(geometry))
}

fn line_style(ctx: &RenderContext<'_>, feature: MapFeature) -> StrokeStyle {
    match feature {
        MapFeature::States => ctx.stroke(Color::rgb(128, 128, 128), 0.5),
        MapFeature::Rivers => ctx.stroke(WATER, 0.8),
        MapFeature::Lakes => ctx.stroke(Color::BLACK, 0.5),
        _ => ctx.stroke(Color::BLACK, 0.8),
    }
}

fn project_ring(map: &MapAxes, ring: &Ring) -> Vec<(f32, f32)> {
    let pts: Vec<(f32, f32)> = ring
        .iter()
        .map(|&(lon, lat)| map.project(lon, lat).unwrap_or((f32::NAN, f32::NAN)))
        .collect();
    if map.proj.is_cylindrical() {
        break_jumps(&pts, map.rect.width / 2.0)
    } else {
        pts
    }
}

/// Draw the filled features (ocean, land, lakes) under the data.
pub fn draw_filled_features(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    map: &MapAxes,
    features: &[MapFeature],
) -> EmcResult<()> {
    if features.contains(&MapFeature::Ocean) {
        canvas.fill_polygon(&map.outline(), WATER, None);
    }
    for &feature in features.iter().filter(|f| matches!(f, MapFeature::Land | MapFeature::Lakes)) {
        let Some(dir) = ctx.features_dir else {
            warn!(feature = feature.file_stem(), "No features directory configured");
            continue;
        };
        let Some(geometry) = load_feature(dir, feature)? else {
            continue;
        };
        let fill = if feature == MapFeature::Land { LAND } else { WATER };
        for polygon in &geometry.polygons {
            let Some(outer) = polygon.first() else {
                continue;
            };
            let pts = project_ring(map, outer);
            // rings cut by the map seam or the hidden hemisphere are not filled
            if pts.iter().any(|p| p.0.is_nan()) {
                continue;
            }
            canvas.fill_polygon(&pts, fill, None);
        }
    }
    Ok(())
}

/// Stroke line features and the outlines of lakes over the data.
pub fn draw_line_features(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    map: &MapAxes,
    features: &[MapFeature],
) -> EmcResult<()> {
    for &feature in features
        .iter()
        .filter(|f| !matches!(f, MapFeature::Land | MapFeature::Ocean))
    {
        let Some(dir) = ctx.features_dir else {
            warn!(feature = feature.file_stem(), "No features directory configured");
            continue;
        };
        let Some(geometry) = load_feature(dir, feature)? else {
            continue;
        };
        let stroke = line_style(ctx, feature);
        for ring in geometry.outlines() {
            canvas.stroke_polyline(&project_ring(map, ring), &stroke);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_collection_geometry() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [10, 5]]}},
                {"type": "Feature", "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                    [[[5, 5], [6, 5], [6, 6], [5, 5]], [[5.2, 5.2], [5.4, 5.2], [5.4, 5.4], [5.2, 5.2]]]
                ]}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [3, 3]}}
            ]
        });
        let g = FeatureGeometry::from_geojson(&doc);
        assert_eq!(g.lines, vec![vec![(0.0, 0.0), (10.0, 5.0)]]);
        assert_eq!(g.polygons.len(), 2);
        assert_eq!(g.polygons[1].len(), 2);
        assert_eq!(g.outlines().count(), 4);
    }

    #[test]
    fn test_missing_feature_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_feature(dir.path(), MapFeature::Rivers).unwrap().is_none());
        std::fs::write(dir.path().join("rivers.json"), "{\"type\": \"LineString\", \"coordinates\": [[1, 2], [3, 4]]}")
            .unwrap();
        let g = load_feature(dir.path(), MapFeature::Rivers).unwrap().unwrap();
        assert_eq!(g.lines.len(), 1);
    }

    #[test]
    fn test_invalid_geojson_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("states.json"), "not json").unwrap();
        assert!(matches!(load_feature(dir.path(), MapFeature::States), Err(EmcError::Config(_))));
    }
}
