use geo::Centroid;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::feature::PolygonFeature;

const LEAFLET_CSS: &str = "https://cdn.jsdelivr.net/npm/leaflet@1.9.3/dist/leaflet.css";
const LEAFLET_JS: &str = "https://cdn.jsdelivr.net/npm/leaflet@1.9.3/dist/leaflet.js";
const OSM_TILES: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// ポリゴンごとのスタイル（Leaflet の Path options）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStyle {
    pub fill_color: String,
    pub color: String,
    pub weight: u32,
    pub fill_opacity: f64,
}

impl OverlayStyle {
    pub fn for_feature(feature: &PolygonFeature) -> Self {
        Self {
            fill_color: format!("#{}", feature.color),
            color: "black".to_string(),
            weight: 1,
            fill_opacity: 0.7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapRenderer {
    pub zoom_start: u8,
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self { zoom_start: 10 }
    }
}

impl MapRenderer {
    pub fn new(zoom_start: u8) -> Self {
        Self { zoom_start }
    }

    /// 各ポリゴンの重心の単純平均 (lat, lon)。面積で重み付けしない
    pub fn map_center(features: &[PolygonFeature]) -> Result<(f64, f64)> {
        let centroids: Vec<_> = features
            .iter()
            .filter_map(|f| f.geometry.centroid())
            .collect();

        if centroids.is_empty() {
            return Err(Error::NoValidRegions);
        }

        let n = centroids.len() as f64;
        let lat = centroids.iter().map(|p| p.y()).sum::<f64>() / n;
        let lon = centroids.iter().map(|p| p.x()).sum::<f64>() / n;
        Ok((lat, lon))
    }

    pub fn render(&self, features: &[PolygonFeature]) -> Result<String> {
        let (lat, lon) = Self::map_center(features)?;

        let mut overlays = String::new();
        for feature in features {
            let geojson = serde_json::to_string(&feature.to_geojson())?;
            let style = serde_json::to_string(&OverlayStyle::for_feature(feature))?;
            overlays.push_str(&format!(
                "    L.geoJson({}, {{style: function (feature) {{ return {}; }}}}).addTo(map);\n",
                geojson, style
            ));
        }

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("    <meta http-equiv=\"content-type\" content=\"text/html; charset=UTF-8\" />\n");
        html.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no\" />\n",
        );
        html.push_str(&format!("    <link rel=\"stylesheet\" href=\"{}\"/>\n", LEAFLET_CSS));
        html.push_str(&format!("    <script src=\"{}\"></script>\n", LEAFLET_JS));
        html.push_str(
            "    <style>html, body {width: 100%; height: 100%; margin: 0; padding: 0;} \
             #map {position: absolute; top: 0; bottom: 0; right: 0; left: 0;}</style>\n",
        );
        html.push_str("</head>\n<body>\n    <div id=\"map\"></div>\n<script>\n");
        html.push_str(&format!(
            "    var map = L.map(\"map\", {{center: [{}, {}], zoom: {}}});\n",
            lat, lon, self.zoom_start
        ));
        html.push_str(&format!(
            "    L.tileLayer(\"{}\", {{maxZoom: 19, attribution: {}}}).addTo(map);\n",
            OSM_TILES,
            serde_json::to_string(OSM_ATTRIBUTION)?
        ));
        html.push_str(&overlays);
        html.push_str("</script>\n</body>\n</html>\n");

        Ok(html)
    }

    /// HTMLを書き出す。既存のファイルは確認なしで上書きする
    pub fn save(&self, features: &[PolygonFeature], output_path: &Path) -> Result<()> {
        let html = self.render(features)?;
        fs::write(output_path, html)?;
        tracing::info!(
            "Written map with {} overlays: {:?}",
            features.len(),
            output_path
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::polygon;
    use tempfile::TempDir;

    fn square(x: f64, y: f64, size: f64, color: &str) -> PolygonFeature {
        PolygonFeature {
            id: 0,
            geometry: polygon![
                (x: x, y: y),
                (x: x + size, y: y),
                (x: x + size, y: y + size),
                (x: x, y: y + size),
            ],
            raster_val: 1.0,
            color: color.to_string(),
        }
    }

    #[test]
    fn test_map_center_is_unweighted_mean() {
        let features = vec![
            square(0.0, 0.0, 2.0, "ff0000"),
            square(10.0, 20.0, 0.5, "00ff00"),
        ];

        let (lat, lon) = MapRenderer::map_center(&features).unwrap();

        assert_relative_eq!(lat, (1.0 + 20.25) / 2.0);
        assert_relative_eq!(lon, (1.0 + 10.25) / 2.0);
    }

    #[test]
    fn test_empty_features() {
        let renderer = MapRenderer::default();
        assert!(matches!(renderer.render(&[]), Err(Error::NoValidRegions)));
    }

    #[test]
    fn test_render_overlays() {
        let features = vec![
            square(139.0, 35.0, 1.0, "ff0000"),
            square(140.0, 35.0, 1.0, "ffff00"),
        ];

        let html = MapRenderer::new(8).render(&features).unwrap();

        assert_eq!(html.matches("L.geoJson(").count(), 2);
        assert!(html.contains("\"fillColor\":\"#ff0000\""));
        assert!(html.contains("\"fillColor\":\"#ffff00\""));
        assert!(html.contains("\"fillOpacity\":0.7"));
        assert!(html.contains("\"color\":\"black\""));
        assert!(html.contains("\"weight\":1"));
        assert!(html.contains("zoom: 8"));
        assert!(html.contains(LEAFLET_JS));
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("map_output.html");
        fs::write(&output_path, "stale").unwrap();

        let features = vec![square(0.0, 0.0, 1.0, "ff0000")];
        MapRenderer::default().save(&features, &output_path).unwrap();

        let html = fs::read_to_string(&output_path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("L.geoJson(").count(), 1);
    }
}
