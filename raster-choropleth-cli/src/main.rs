use anyhow::{Context, Result};
use clap::Parser;
use raster_choropleth::pipeline::render_raster;
use raster_choropleth::reader::read_raster;
use raster_choropleth::viewer::open_in_browser;
use raster_choropleth::{ColorRamp, PipelineConfig, RampPolicy};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 入力GeoTIFFファイル（1バンド目を使用）
    #[arg(value_name = "INPUT", default_value = "Drought_Map_r.tif")]
    input: PathBuf,

    /// 出力HTMLファイル（既存のファイルは上書き）
    #[arg(short, long, value_name = "FILE", default_value = "map_output.html")]
    output: PathBuf,

    /// 赤に対応する値
    #[arg(long, default_value_t = 1.0)]
    min_value: f64,

    /// 緑に対応する値
    #[arg(long, default_value_t = 5.0)]
    max_value: f64,

    /// 範囲外の値を線形に外挿する（デフォルトは範囲内に丸める）
    #[arg(long)]
    extrapolate: bool,

    /// 地図の初期ズームレベル
    #[arg(long, default_value_t = 10)]
    zoom: u8,

    /// ブラウザを起動しない
    #[arg(long)]
    no_open: bool,
}

fn main() -> Result<()> {
    // ログの初期化
    tracing_subscriber::fmt::init();

    // CLI引数の解析
    let args = Args::parse();

    // 処理開始時間を記録
    let start_time = std::time::Instant::now();

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {:?}", args.input);
    }

    let policy = if args.extrapolate {
        RampPolicy::Extrapolate
    } else {
        RampPolicy::Clamp
    };
    let ramp = ColorRamp::new(args.min_value, args.max_value, policy)
        .context("Invalid color range")?;

    let config = PipelineConfig {
        input: args.input,
        output: args.output,
        ramp,
        zoom_start: args.zoom,
    };

    info!("Processing raster: {:?}", config.input);
    let raster = read_raster(&config.input)
        .with_context(|| format!("Failed to read raster: {:?}", config.input))?;

    let overlays = render_raster(&raster, &config)
        .with_context(|| format!("Failed to render map: {:?}", config.output))?;
    info!("Written {} polygons to {:?}", overlays, config.output);

    // ブラウザの起動失敗は警告のみ
    if !args.no_open {
        open_in_browser(&config.output);
    }

    // 処理時間を表示
    let elapsed = start_time.elapsed();
    info!("Total processing time: {:?}", elapsed);

    Ok(())
}
