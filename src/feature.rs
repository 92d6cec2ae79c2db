use geo::{LineString, Polygon};
use serde::Serialize;
use serde_json::{json, Value};

use crate::color::ColorRamp;
use crate::vectorize::Shape;

/// 色付け済みのポリゴン
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFeature {
    /// ポリゴン化の出力における通し番号
    pub id: usize,
    pub geometry: Polygon<f64>,
    pub raster_val: f64,
    pub color: String,
}

#[derive(Serialize)]
struct Properties<'a> {
    id: usize,
    raster_val: f64,
    color: &'a str,
}

impl PolygonFeature {
    /// GeoJSON Feature として出力
    pub fn to_geojson(&self) -> Value {
        let rings: Vec<Vec<[f64; 2]>> = std::iter::once(self.geometry.exterior())
            .chain(self.geometry.interiors())
            .map(ring_coords)
            .collect();

        json!({
            "type": "Feature",
            "id": self.id,
            "properties": Properties {
                id: self.id,
                raster_val: self.raster_val,
                color: &self.color,
            },
            "geometry": {
                "type": "Polygon",
                "coordinates": rings,
            },
        })
    }
}

fn ring_coords(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

/// `raster_val > 0` のものだけを残す。元の通し番号を保持する
pub fn filter_valid(shapes: Vec<Shape>) -> Vec<(usize, Shape)> {
    let total = shapes.len();
    let valid: Vec<(usize, Shape)> = shapes
        .into_iter()
        .enumerate()
        .filter(|(_, shape)| shape.value > 0.0)
        .collect();

    tracing::info!("Kept {} of {} shapes with raster_val > 0", valid.len(), total);
    valid
}

/// 各ポリゴンに色を割り当てた新しいコレクションを作る
pub fn colorize(shapes: Vec<(usize, Shape)>, ramp: &ColorRamp) -> Vec<PolygonFeature> {
    shapes
        .into_iter()
        .map(|(id, shape)| PolygonFeature {
            id,
            color: ramp.hex(shape.value),
            raster_val: shape.value,
            geometry: shape.geometry,
        })
        .collect()
}
