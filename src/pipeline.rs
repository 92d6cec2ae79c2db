use std::path::PathBuf;

use crate::color::ColorRamp;
use crate::error::{Error, Result};
use crate::feature::{colorize, filter_valid, PolygonFeature};
use crate::raster::Raster;
use crate::reader::read_raster;
use crate::render::MapRenderer;
use crate::reproject::to_wgs84;
use crate::vectorize::shapes;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub ramp: ColorRamp,
    pub zoom_start: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("Drought_Map_r.tif"),
            output: PathBuf::from("map_output.html"),
            ramp: ColorRamp::default(),
            zoom_start: 10,
        }
    }
}

/// ポリゴン化 → 絞り込み → 色付け → EPSG:4326 への変換
pub fn build_features(raster: &Raster, ramp: &ColorRamp) -> Result<Vec<PolygonFeature>> {
    let all = shapes(raster);
    tracing::info!("Polygonized raster into {} shapes", all.len());

    let valid = filter_valid(all);
    if valid.is_empty() {
        return Err(Error::NoValidRegions);
    }

    let features = colorize(valid, ramp);
    to_wgs84(features, &raster.crs)
}

/// 読み込み済みのラスタから地図HTMLを書き出し、オーバーレイ数を返す
pub fn render_raster(raster: &Raster, config: &PipelineConfig) -> Result<usize> {
    let features = build_features(raster, &config.ramp)?;
    MapRenderer::new(config.zoom_start).save(&features, &config.output)?;
    Ok(features.len())
}

/// 入力ファイルから出力HTMLまでを一括で実行する。ブラウザは起動しない
pub fn run(config: &PipelineConfig) -> Result<usize> {
    let raster = read_raster(&config.input)?;
    render_raster(&raster, config)
}
