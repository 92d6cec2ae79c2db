use gdal::spatial_ref::SpatialRef;
use gdal::Dataset;
use std::path::Path;

use crate::error::{Error, Result};
use crate::raster::{Crs, GeoTransform, Raster};

/// GeoTIFFの1バンド目を読み込む
///
/// データセットはこの関数のスコープ内でのみ保持され、エラー時も含めて必ずクローズされる。
pub fn read_raster(path: &Path) -> Result<Raster> {
    tracing::info!("Reading raster: {:?}", path);

    let dataset = Dataset::open(path)?;
    let (cols, rows) = dataset.raster_size();

    // 座標系がないラスタは扱わない
    let srs = dataset
        .spatial_ref()
        .map_err(|_| Error::MissingCrs(path.to_path_buf()))?;
    let crs = crs_from_spatial_ref(&srs)?;

    let transform = GeoTransform(dataset.geo_transform()?);

    let band = dataset.rasterband(1)?;
    let buffer = band.read_as::<f64>((0, 0), (cols, rows), (cols, rows), None)?;
    let values = buffer.data().to_vec();

    tracing::debug!(
        "Raster {} x {} pixels, CRS {}",
        cols,
        rows,
        crs.identifier()
    );

    Raster::new(cols, rows, values, transform, crs)
}

/// EPSG 以外の機関コード（ESRI など）は EPSG コードとして扱わず、WKT のみを保持する
pub fn crs_from_spatial_ref(srs: &SpatialRef) -> Result<Crs> {
    let epsg = if srs.auth_name().as_deref() == Some("EPSG") {
        srs.auth_code().ok().map(|code| code as u32)
    } else {
        None
    };
    Ok(Crs {
        wkt: srs.to_wkt()?,
        epsg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::PolygonFeature;
    use crate::reproject::to_wgs84;
    use gdal::raster::Buffer;
    use geo::polygon;
    use gdal::DriverManager;
    use tempfile::TempDir;

    fn gtiff_available() -> bool {
        DriverManager::get_driver_by_name("GTiff").is_ok()
    }

    const ESRI_ALBERS_WKT: &str = concat!(
        "PROJCS[\"USA_Contiguous_Albers_Equal_Area_Conic\",",
        "GEOGCS[\"GCS_North_American_1983\",DATUM[\"North_American_Datum_1983\",",
        "SPHEROID[\"GRS 1980\",6378137,298.257222101]],PRIMEM[\"Greenwich\",0],",
        "UNIT[\"degree\",0.0174532925199433]],PROJECTION[\"Albers_Conic_Equal_Area\"],",
        "PARAMETER[\"latitude_of_center\",37.5],PARAMETER[\"longitude_of_center\",-96],",
        "PARAMETER[\"standard_parallel_1\",29.5],PARAMETER[\"standard_parallel_2\",45.5],",
        "PARAMETER[\"false_easting\",0],PARAMETER[\"false_northing\",0],",
        "UNIT[\"metre\",1],AUTHORITY[\"ESRI\",\"102003\"]]"
    );

    fn write_test_tiff(path: &Path, with_crs: bool) {
        let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
        let mut dataset = driver
            .create_with_band_type::<f64, _>(path, 3, 2, 1)
            .unwrap();
        dataset
            .set_geo_transform(&[135.0, 0.001, 0.0, 35.0, 0.0, -0.001])
            .unwrap();
        if with_crs {
            let wkt = SpatialRef::from_epsg(4326).unwrap().to_wkt().unwrap();
            dataset.set_projection(&wkt).unwrap();
        }

        let mut band = dataset.rasterband(1).unwrap();
        let mut buffer = Buffer::new((3, 2), vec![1.0, 1.0, 2.0, 0.0, 3.0, 3.0]);
        band.write((0, 0), (3, 2), &mut buffer).unwrap();
    }

    #[test]
    fn test_read_raster() {
        if !gtiff_available() {
            eprintln!("Skipping test: GTiff driver not available");
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.tif");
        write_test_tiff(&path, true);

        let raster = read_raster(&path).unwrap();

        assert_eq!(raster.shape(), (2, 3));
        assert_eq!(raster.values, vec![1.0, 1.0, 2.0, 0.0, 3.0, 3.0]);
        assert_eq!(
            raster.transform.coefficients(),
            [135.0, 0.001, 0.0, 35.0, 0.0, -0.001]
        );
        assert!(raster.crs.is_wgs84());
    }

    #[test]
    fn test_read_raster_without_crs() {
        if !gtiff_available() {
            eprintln!("Skipping test: GTiff driver not available");
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no_crs.tif");
        write_test_tiff(&path, false);

        let result = read_raster(&path);
        assert!(matches!(result, Err(Error::MissingCrs(_))));
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_raster(&temp_dir.path().join("missing.tif"));
        assert!(matches!(result, Err(Error::Gdal(_))));
    }

    #[test]
    fn test_epsg_authority_is_kept() {
        let srs = SpatialRef::from_epsg(6677).unwrap();
        let crs = crs_from_spatial_ref(&srs).unwrap();
        assert_eq!(crs.epsg, Some(6677));
    }

    #[test]
    fn test_non_epsg_authority_is_not_an_epsg_code() {
        let srs = SpatialRef::from_wkt(ESRI_ALBERS_WKT).unwrap();

        let crs = crs_from_spatial_ref(&srs).unwrap();

        assert_eq!(crs.epsg, None);
        assert!(!crs.wkt.is_empty());

        // WKT から EPSG:4326 へ変換できる
        let feature = PolygonFeature {
            id: 0,
            geometry: polygon![
                (x: 0.0, y: 0.0),
                (x: 1000.0, y: 0.0),
                (x: 1000.0, y: 1000.0),
                (x: 0.0, y: 1000.0),
            ],
            raster_val: 1.0,
            color: "ff0000".to_string(),
        };
        let output = to_wgs84(vec![feature], &crs).unwrap();
        let corner = output[0].geometry.exterior().0[0];
        assert!((corner.x - -96.0).abs() < 1e-6, "lon = {}", corner.x);
        assert!((corner.y - 37.5).abs() < 1e-6, "lat = {}", corner.y);
    }

    #[test]
    fn test_read_raster_with_non_epsg_crs() {
        if !gtiff_available() {
            eprintln!("Skipping test: GTiff driver not available");
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("esri.tif");
        {
            let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
            let mut dataset = driver
                .create_with_band_type::<f64, _>(&path, 2, 1, 1)
                .unwrap();
            dataset
                .set_geo_transform(&[0.0, 1000.0, 0.0, 1000.0, 0.0, -1000.0])
                .unwrap();
            dataset.set_projection(ESRI_ALBERS_WKT).unwrap();
            let mut band = dataset.rasterband(1).unwrap();
            let mut buffer = Buffer::new((2, 1), vec![1.0, 2.0]);
            band.write((0, 0), (2, 1), &mut buffer).unwrap();
        }

        let raster = read_raster(&path).unwrap();

        assert_ne!(raster.crs.epsg, Some(102003));
        assert!(!raster.crs.is_wgs84());
    }
}
