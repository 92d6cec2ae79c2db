use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("raster has no coordinate reference system: {}", .0.display())]
    MissingCrs(PathBuf),

    #[error("raster shape mismatch: {width}x{height} grid with {len} values")]
    InvalidShape {
        width: usize,
        height: usize,
        len: usize,
    },

    #[error("invalid color range: min={min}, max={max}")]
    InvalidColorRange { min: f64, max: f64 },

    #[error("no valid regions found")]
    NoValidRegions,

    #[error("reprojection to EPSG:4326 failed: {0}")]
    Reproject(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
