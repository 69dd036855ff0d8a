use std::path::PathBuf;
use std::thread;

use clap::{Parser, ValueEnum};
use image::ImageFormat;

use crate::errors::{ChiliQualityError, Result};
use crate::imageops::HsvRange;
use crate::loader::{FileImageLoader, MAX_WORKING_DIMENSION};
use crate::predictor::{LinearModel, QualityPredictor};
use crate::segmentation::{
    ColorThresholdSegmenter, EdgeSegmenter, COLOR_AREA_THRESHOLD, EDGE_AREA_THRESHOLD,
};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// HSV range threshold
    #[default]
    Color,
    /// Sobel gradient threshold (incomplete, single channel only)
    Edge,
}

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Photo or directory of photos to analyze
    pub input: PathBuf,

    /// Save segmented images into this directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Write a CSV report of features and estimates
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    #[arg(short, long, default_value = "png", value_parser = check_format)]
    pub format: String,

    #[arg(short, long, value_enum, default_value_t = Strategy::Color)]
    pub strategy: Strategy,

    #[arg(long, default_value_t = MAX_WORKING_DIMENSION)]
    pub max_dimension: u32,

    #[arg(long, default_value_t = COLOR_AREA_THRESHOLD)]
    pub color_area_threshold: f64,

    #[arg(long, default_value_t = EDGE_AREA_THRESHOLD)]
    pub edge_area_threshold: f64,

    /// Channel whose gradient the edge strategy thresholds
    #[arg(long, default_value_t = 2)]
    pub edge_channel: usize,

    /// Lower HSV bound as `h,s,v`
    #[arg(long, value_delimiter = ',', default_values_t = [0u8, 100, 0])]
    pub hsv_lower: Vec<u8>,

    /// Upper HSV bound as `h,s,v`
    #[arg(long, value_delimiter = ',', default_values_t = [255u8, 255, 240])]
    pub hsv_upper: Vec<u8>,

    /// Median blur radius before color thresholding (0 disables)
    #[arg(long, default_value_t = 0)]
    pub median_radius: u32,

    /// Smooth retained contours with a Savitzky-Golay filter
    #[arg(long)]
    pub smooth_contours: bool,

    /// Vitamin C model as `intercept,red,green,blue`
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        default_values_t = LinearModel::VITAMIN_C.row()
    )]
    pub vitamin_c_coefficients: Vec<f64>,

    /// Carotene model as `intercept,red,green,blue`
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        default_values_t = LinearModel::CAROTENE.row()
    )]
    pub carotene_coefficients: Vec<f64>,

    #[arg(
        short, long, default_value_t = thread::available_parallelism().map_or(1, |n| n.get())
    )]
    pub num_threads: usize,
}

impl Config {
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let config = PipelineConfig {
            max_dimension: self.max_dimension,
            strategy: self.strategy,
            color_area_threshold: self.color_area_threshold,
            edge_area_threshold: self.edge_area_threshold,
            edge_channel: self.edge_channel,
            hsv_range: HsvRange::new(
                hsv_bound("hsv_lower", &self.hsv_lower)?,
                hsv_bound("hsv_upper", &self.hsv_upper)?,
            ),
            median_radius: self.median_radius,
            smooth_contours: self.smooth_contours,
            vitamin_c: LinearModel::from_slice(
                "vitamin_c_coefficients",
                &self.vitamin_c_coefficients,
            )?,
            carotene: LinearModel::from_slice("carotene_coefficients", &self.carotene_coefficients)?,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Tunable constants of the analysis pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub max_dimension: u32,
    pub strategy: Strategy,
    pub color_area_threshold: f64,
    pub edge_area_threshold: f64,
    pub edge_channel: usize,
    pub hsv_range: HsvRange,
    pub median_radius: u32,
    pub smooth_contours: bool,
    pub vitamin_c: LinearModel,
    pub carotene: LinearModel,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_dimension: MAX_WORKING_DIMENSION,
            strategy: Strategy::Color,
            color_area_threshold: COLOR_AREA_THRESHOLD,
            edge_area_threshold: EDGE_AREA_THRESHOLD,
            edge_channel: 2,
            hsv_range: HsvRange::default(),
            median_radius: 0,
            smooth_contours: false,
            vitamin_c: LinearModel::VITAMIN_C,
            carotene: LinearModel::CAROTENE,
        }
    }
}

impl PipelineConfig {
    /// Build every component once so invalid values surface before any photo is read.
    pub fn validate(&self) -> Result<()> {
        self.loader()?;
        self.color_segmenter()?;
        self.edge_segmenter()?;
        self.predictor()?;
        Ok(())
    }

    pub fn loader(&self) -> Result<FileImageLoader> {
        FileImageLoader::new(self.max_dimension)
    }

    pub fn color_segmenter(&self) -> Result<ColorThresholdSegmenter> {
        Ok(
            ColorThresholdSegmenter::new(self.hsv_range, self.color_area_threshold)?
                .with_median_radius(self.median_radius)
                .with_contour_smoothing(self.smooth_contours),
        )
    }

    pub fn edge_segmenter(&self) -> Result<EdgeSegmenter> {
        EdgeSegmenter::new(self.edge_channel, self.edge_area_threshold)
    }

    pub fn predictor(&self) -> Result<QualityPredictor> {
        QualityPredictor::new(self.vitamin_c, self.carotene)
    }
}

fn hsv_bound(field: &str, values: &[u8]) -> Result<[u8; 3]> {
    values.try_into().map_err(|_| {
        ChiliQualityError::validation(
            field,
            format!("expects 3 values, got {}", values.len()),
        )
    })
}

fn check_format(s: &str) -> std::result::Result<String, String> {
    let supported: Vec<_> = ImageFormat::all()
        .filter(|f| f.writing_enabled())
        .flat_map(|f| f.extensions_str())
        .map(|s| format!("`{}`", s))
        .collect();
    let supported_message = format!("Supported formats: {}", supported.join(", "));

    let format = ImageFormat::from_extension(s)
        .ok_or(format!("{} is not supported. {}", s, supported_message))?;
    if !format.writing_enabled() {
        return Err(format!("{} is not supported. {}", s, supported_message));
    }

    Ok(s.to_string())
}
