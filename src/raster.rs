use crate::error::{Error, Result};

pub const WGS84_EPSG: u32 = 4326;

/// GDAL形式のアフィン変換 `[c0, c1, c2, c3, c4, c5]`
///
/// `x = c0 + col * c1 + row * c2`, `y = c3 + col * c4 + row * c5`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform(pub [f64; 6]);

impl GeoTransform {
    /// 回転なし（北が上）の変換
    pub fn north_up(origin_x: f64, origin_y: f64, x_res: f64, y_res: f64) -> Self {
        Self([origin_x, x_res, 0.0, origin_y, 0.0, -y_res])
    }

    /// ピクセル角 (col, row) を地理座標に変換
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let c = &self.0;
        (
            c[0] + col * c[1] + row * c[2],
            c[3] + col * c[4] + row * c[5],
        )
    }

    pub fn coefficients(&self) -> [f64; 6] {
        self.0
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self([0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Crs {
    pub wkt: String,
    pub epsg: Option<u32>,
}

impl Crs {
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: String::new(),
            epsg: Some(code),
        }
    }

    pub fn wgs84() -> Self {
        Self::from_epsg(WGS84_EPSG)
    }

    pub fn is_wgs84(&self) -> bool {
        self.epsg == Some(WGS84_EPSG)
    }

    pub fn identifier(&self) -> String {
        match self.epsg {
            Some(code) => format!("EPSG:{}", code),
            None => format!("WKT:{}", &self.wkt[..self.wkt.len().min(50)]),
        }
    }
}

/// 1バンド分のラスタ（行優先）
#[derive(Debug, Clone)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
    pub transform: GeoTransform,
    pub crs: Crs,
}

impl Raster {
    pub fn new(
        width: usize,
        height: usize,
        values: Vec<f64>,
        transform: GeoTransform,
        crs: Crs,
    ) -> Result<Self> {
        if values.len() != width * height {
            return Err(Error::InvalidShape {
                width,
                height,
                len: values.len(),
            });
        }
        Ok(Self {
            width,
            height,
            values,
            transform,
            crs,
        })
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}
