use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use geo::{Coord, LineString, Polygon};

use crate::error::{Error, Result};
use crate::feature::PolygonFeature;
use crate::raster::{Crs, WGS84_EPSG};

fn spatial_ref(crs: &Crs) -> Result<SpatialRef> {
    let mut srs = match crs.epsg {
        Some(code) => SpatialRef::from_epsg(code)?,
        None => SpatialRef::from_wkt(&crs.wkt)?,
    };
    // 経度・緯度の順で扱う
    srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    Ok(srs)
}

/// 全ポリゴンを EPSG:4326 に変換する。既に EPSG:4326 ならそのまま返す
pub fn to_wgs84(features: Vec<PolygonFeature>, crs: &Crs) -> Result<Vec<PolygonFeature>> {
    if crs.is_wgs84() {
        return Ok(features);
    }

    tracing::info!(
        "Reprojecting {} features from {} to EPSG:{}",
        features.len(),
        crs.identifier(),
        WGS84_EPSG
    );

    let source = spatial_ref(crs)?;
    let target = spatial_ref(&Crs::wgs84())?;
    let transform = CoordTransform::new(&source, &target)?;

    features
        .into_iter()
        .map(|feature| {
            let geometry = transform_polygon(&transform, &feature.geometry)?;
            Ok(PolygonFeature {
                geometry,
                ..feature
            })
        })
        .collect()
}

fn transform_polygon(transform: &CoordTransform, polygon: &Polygon<f64>) -> Result<Polygon<f64>> {
    let exterior = transform_ring(transform, polygon.exterior())?;
    let interiors = polygon
        .interiors()
        .iter()
        .map(|ring| transform_ring(transform, ring))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn transform_ring(transform: &CoordTransform, ring: &LineString<f64>) -> Result<LineString<f64>> {
    let mut xs: Vec<f64> = ring.coords().map(|c| c.x).collect();
    let mut ys: Vec<f64> = ring.coords().map(|c| c.y).collect();
    let mut zs = vec![0.0; xs.len()];

    transform
        .transform_coords(&mut xs, &mut ys, &mut zs)
        .map_err(|e| Error::Reproject(e.to_string()))?;

    Ok(xs
        .into_iter()
        .zip(ys)
        .map(|(x, y)| Coord { x, y })
        .collect())
}
