pub mod color;
pub mod error;
pub mod feature;
pub mod pipeline;
pub mod raster;
pub mod reader;
pub mod render;
pub mod reproject;
pub mod vectorize;
pub mod viewer;

pub use color::{ColorRamp, RampPolicy, Rgb};
pub use error::{Error, Result};
pub use feature::PolygonFeature;
pub use pipeline::PipelineConfig;
pub use raster::{Crs, GeoTransform, Raster};
pub use render::MapRenderer;
