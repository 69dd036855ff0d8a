pub mod compositor;
pub mod config;
pub mod contour;
pub mod errors;
pub mod features;
pub mod imageops;
pub mod loader;
pub mod natural_sort;
pub mod pipeline;
pub mod predictor;
pub mod segmentation;
pub mod traits;

pub mod mocks;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};
use walkdir::WalkDir;

pub use config::{Config, PipelineConfig, Strategy};
pub use errors::{ChiliQualityError, Result};
pub use features::Descriptor;
pub use loader::FileImageLoader;
pub use pipeline::{Analysis, Pipeline};
pub use predictor::{LinearModel, QualityEstimate, QualityPredictor};
pub use segmentation::{ColorThresholdSegmenter, EdgeSegmenter, SegmentationResult};
pub use traits::*;

/// Working image of the pipeline.
///
/// Channels are always ordered red, green, blue. Thresholding reads them in this
/// order, and the feature means are bound to the names red, green and blue by
/// position, so every loader must hand over pixels in this order.
pub type Image = image::RgbImage;

/// Where and how segmented images are written.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub output_dir: PathBuf,
    pub format: String,
}

impl OutputOptions {
    fn image_format(&self) -> ImageFormat {
        ImageFormat::from_extension(&self.format).unwrap_or(ImageFormat::Png)
    }
}

/// Result row for one analyzed photo.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub path: PathBuf,
    pub features: Descriptor,
    pub estimate: QualityEstimate,
}

pub struct QualityAnalyzer<L: ImageLoader, S: SegmentationStrategy> {
    loader: L,
    pipeline: Pipeline<S>,
}

impl<L: ImageLoader, S: SegmentationStrategy> QualityAnalyzer<L, S> {
    pub const fn new(loader: L, pipeline: Pipeline<S>) -> Self {
        Self { loader, pipeline }
    }

    pub fn analyze_file(&self, path: &Path) -> Result<Analysis> {
        let image = self.loader.load(path)?;
        self.pipeline.analyze(&image)
    }

    /// Analyze one photo and optionally save its segmented image as
    /// `<output_dir>/<file stem>.<format>`.
    pub fn process_file(&self, path: &Path, output: Option<&OutputOptions>) -> Result<Record> {
        let analysis = self.analyze_file(path)?;
        let file_name = path.file_name().map(PathBuf::from).unwrap_or_default();

        if let Some(output) = output {
            save_segmented(&analysis, &output.output_dir.join(&file_name), output)?;
        }

        Ok(Record {
            path: file_name,
            features: analysis.features,
            estimate: analysis.estimate,
        })
    }

    /// Analyze every supported photo below `input_dir` in parallel.
    ///
    /// Photos that fail to load or save are logged and skipped. Records come back
    /// in natural file name order with paths relative to `input_dir`.
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output: Option<&OutputOptions>,
    ) -> Result<Vec<Record>> {
        if !input_dir.is_dir() {
            return Err(ChiliQualityError::FileSystem {
                path: input_dir.to_path_buf(),
                operation: "read input directory".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "input directory does not exist",
                ),
            });
        }

        if let Some(output) = output {
            fs::create_dir_all(&output.output_dir).map_err(|e| ChiliQualityError::FileSystem {
                path: output.output_dir.clone(),
                operation: "create output directory".to_string(),
                source: e,
            })?;
        }

        let image_files = collect_image_files(input_dir);
        if image_files.is_empty() {
            info!(dir = %input_dir.display(), "no supported images found");
            return Ok(Vec::new());
        }
        info!(count = image_files.len(), "analyzing photos");

        let progress_bar = ProgressBar::new(image_files.len() as u64);
        progress_bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .map_err(|e| ChiliQualityError::Configuration {
                message: e.to_string(),
            })?
            .progress_chars("#>-"),
        );

        let records: Vec<Record> = image_files
            .par_iter()
            .progress_with(progress_bar.clone())
            .filter_map(|path| match self.process_entry(input_dir, path, output) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping photo");
                    None
                }
            })
            .collect();

        progress_bar.finish();
        info!(
            analyzed = records.len(),
            skipped = image_files.len() - records.len(),
            "done"
        );
        Ok(records)
    }

    fn process_entry(
        &self,
        input_dir: &Path,
        path: &Path,
        output: Option<&OutputOptions>,
    ) -> Result<Record> {
        let relative_path = relative_path(input_dir, path)?;
        let analysis = self.analyze_file(path)?;

        if let Some(output) = output {
            save_segmented(&analysis, &output.output_dir.join(&relative_path), output)?;
        }

        Ok(Record {
            path: relative_path,
            features: analysis.features,
            estimate: analysis.estimate,
        })
    }
}

impl QualityAnalyzer<FileImageLoader, ColorThresholdSegmenter> {
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::new(
            config.loader()?,
            Pipeline::new(config.color_segmenter()?, config.predictor()?),
        ))
    }
}

impl QualityAnalyzer<FileImageLoader, EdgeSegmenter> {
    pub fn edge_from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::new(
            config.loader()?,
            Pipeline::new(config.edge_segmenter()?, config.predictor()?),
        ))
    }
}

pub fn is_supported_image_format(path: &Path) -> bool {
    ImageFormat::from_path(path).is_ok_and(|f| f.reading_enabled())
}

/// Supported photos below `input_dir`, natural-sorted by path.
pub fn collect_image_files(input_dir: &Path) -> Vec<PathBuf> {
    let mut image_files: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_supported_image_format(e.path()))
        .map(|e| e.into_path())
        .collect();

    image_files.sort_by(|a, b| {
        natural_sort::natural_cmp(&a.to_string_lossy(), &b.to_string_lossy())
    });
    image_files
}

fn relative_path(input_dir: &Path, path: &Path) -> Result<PathBuf> {
    path.strip_prefix(input_dir)
        .map(Path::to_path_buf)
        .map_err(|_| ChiliQualityError::FileSystem {
            path: path.to_path_buf(),
            operation: "resolve relative path".to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "file is not inside the input directory",
            ),
        })
}

fn save_segmented(analysis: &Analysis, target: &Path, output: &OutputOptions) -> Result<()> {
    let output_file = target.with_extension(&output.format);

    if let Some(parent) = output_file.parent() {
        fs::create_dir_all(parent).map_err(|e| ChiliQualityError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create output directory".to_string(),
            source: e,
        })?;
    }

    analysis
        .segmentation
        .image()
        .save_with_format(&output_file, output.image_format())
        .map_err(|e| ChiliQualityError::ImageProcessing {
            path: output_file.display().to_string(),
            operation: "save segmented image".to_string(),
            source: Box::new(e),
        })
}

pub const REPORT_HEADER: &str = "file,red,green,blue,area,vitamin_c,carotene";

/// CSV report, one row per record.
pub fn write_report<W: Write>(records: &[Record], mut writer: W) -> Result<()> {
    writeln!(writer, "{REPORT_HEADER}")?;
    for record in records {
        writeln!(
            writer,
            "{},{},{},{},{:.5},{},{}",
            record.path.display(),
            record.features.red(),
            record.features.green(),
            record.features.blue(),
            record.features.area(),
            record.estimate.vitamin_c,
            record.estimate.carotene
        )?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_mock_loader, synthetic_pepper, MockImageLoader};
    use tempfile::TempDir;

    fn analyzer() -> QualityAnalyzer<FileImageLoader, ColorThresholdSegmenter> {
        QualityAnalyzer::new(FileImageLoader::default(), Pipeline::default())
    }

    #[test]
    fn test_supported_formats() {
        let test_cases = vec![
            ("test.jpg", true),
            ("test.jpeg", true),
            ("test.png", true),
            ("test.webp", true),
            ("test.txt", false),
            ("test", false),
        ];

        for (filename, expected) in test_cases {
            assert_eq!(is_supported_image_format(Path::new(filename)), expected, "{filename}");
        }
    }

    #[test]
    fn test_relative_path_calculation() -> Result<()> {
        let relative = relative_path(Path::new("input"), Path::new("input/subdir/test.jpg"))?;
        assert_eq!(relative, Path::new("subdir/test.jpg"));
        assert!(relative_path(Path::new("input"), Path::new("elsewhere/test.jpg")).is_err());
        Ok(())
    }

    #[test]
    fn test_collect_natural_order() -> Result<()> {
        let temp_dir = TempDir::new()?;
        for name in ["chili10.png", "chili2.png", "chili1.png", "notes.txt"] {
            fs::write(temp_dir.path().join(name), b"")?;
        }

        let files = collect_image_files(temp_dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["chili1.png", "chili2.png", "chili10.png"]);
        Ok(())
    }

    #[test]
    fn test_process_file_with_mock_loader() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let analyzer = QualityAnalyzer::new(
            create_mock_loader(),
            Pipeline::<ColorThresholdSegmenter>::default(),
        );
        let output = OutputOptions {
            output_dir: temp_dir.path().to_path_buf(),
            format: "png".to_string(),
        };

        let record = analyzer.process_file(Path::new("captures/chili.jpg"), Some(&output))?;
        assert_eq!(record.path, Path::new("chili.jpg"));
        assert!(temp_dir.path().join("chili.png").exists());
        Ok(())
    }

    #[test]
    fn test_process_directory_skips_broken_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let input_dir = temp_dir.path().join("input");
        fs::create_dir_all(input_dir.join("batch"))?;
        synthetic_pepper(120, 90).save(input_dir.join("batch/chili1.png"))?;
        fs::write(input_dir.join("broken.png"), b"garbage")?;

        let records = analyzer().process_directory(&input_dir, None)?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, Path::new("batch/chili1.png"));
        Ok(())
    }

    #[test]
    fn test_missing_input_directory() {
        let result = analyzer().process_directory(Path::new("no/such/dir"), None);
        assert!(matches!(result, Err(ChiliQualityError::FileSystem { .. })));
    }

    #[test]
    fn test_report_format() -> Result<()> {
        let records = vec![Record {
            path: PathBuf::from("chili1.png"),
            features: Descriptor::new(100, 80, 60, 1521.0),
            estimate: QualityEstimate {
                vitamin_c: 195,
                carotene: -221,
            },
        }];

        let mut buffer = Vec::new();
        write_report(&records, &mut buffer)?;
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "file,red,green,blue,area,vitamin_c,carotene\nchili1.png,100,80,60,1521.00000,195,-221\n"
        );
        Ok(())
    }

    #[test]
    fn test_report_for_blank_photo() -> Result<()> {
        let analyzer = QualityAnalyzer::new(
            MockImageLoader::new(Image::from_pixel(10, 10, image::Rgb([240, 240, 240]))),
            Pipeline::<ColorThresholdSegmenter>::default(),
        );
        let record = analyzer.process_file(Path::new("blank.png"), None)?;

        let mut buffer = Vec::new();
        write_report(&[record], &mut buffer)?;
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().nth(1), Some("blank.png,0,0,0,0.00000,112,310"));
        Ok(())
    }
}
