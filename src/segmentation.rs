use image::{GrayImage, Luma};
use imageproc::filter::{median_filter, separable_filter_equal};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use tracing::debug;

use crate::contour::Contour;
use crate::errors::{ChiliQualityError, Result};
use crate::imageops::mask::{BACKGROUND, FOREGROUND};
use crate::imageops::HsvRange;
use crate::traits::SegmentationStrategy;
use crate::Image;

pub const COLOR_AREA_THRESHOLD: f64 = 0.03;
pub const EDGE_AREA_THRESHOLD: f64 = 0.05;
/// Half window of contour smoothing as a fraction of the shorter image side.
pub const SMOOTHING_WINDOW_FRACTION: f64 = 0.05;

/// Foreground-only image, the filled contour mask and the contours behind it.
///
/// Every image pixel outside the mask is zero, and the mask marks exactly the
/// filled interiors of `contours`.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationResult {
    image: Image,
    mask: GrayImage,
    contours: Vec<Contour>,
}

impl SegmentationResult {
    pub fn new(image: Image, mask: GrayImage, contours: Vec<Contour>) -> Self {
        debug_assert_eq!(image.dimensions(), mask.dimensions());
        Self {
            image,
            mask,
            contours,
        }
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }
}

/// Segmentation by an HSV range threshold. This is the production strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorThresholdSegmenter {
    range: HsvRange,
    area_threshold: f64,
    median_radius: u32,
    smooth_contours: bool,
}

impl ColorThresholdSegmenter {
    pub fn new(range: HsvRange, area_threshold: f64) -> Result<Self> {
        validate_fraction("color_area_threshold", area_threshold)?;
        for channel in 0..3 {
            if range.lower[channel] > range.upper[channel] {
                return Err(ChiliQualityError::validation(
                    "hsv_range",
                    format!(
                        "lower bound {:?} exceeds upper bound {:?}",
                        range.lower, range.upper
                    ),
                ));
            }
        }

        Ok(Self {
            range,
            area_threshold,
            median_radius: 0,
            smooth_contours: false,
        })
    }

    /// Median blur applied before thresholding; 0 disables it.
    pub const fn with_median_radius(mut self, radius: u32) -> Self {
        self.median_radius = radius;
        self
    }

    /// Savitzky-Golay smoothing of the retained contours before compositing.
    pub const fn with_contour_smoothing(mut self, enabled: bool) -> Self {
        self.smooth_contours = enabled;
        self
    }
}

impl Default for ColorThresholdSegmenter {
    fn default() -> Self {
        Self {
            range: HsvRange::default(),
            area_threshold: COLOR_AREA_THRESHOLD,
            median_radius: 0,
            smooth_contours: false,
        }
    }
}

impl SegmentationStrategy for ColorThresholdSegmenter {
    fn threshold_mask(&self, image: &Image) -> GrayImage {
        if image.width() == 0 || image.height() == 0 {
            return GrayImage::new(image.width(), image.height());
        }

        if self.median_radius > 0 {
            let blurred = median_filter(image, self.median_radius, self.median_radius);
            self.range.threshold(&blurred)
        } else {
            self.range.threshold(image)
        }
    }

    fn area_threshold(&self) -> f64 {
        self.area_threshold
    }

    fn refine_contours(&self, image: &Image, contours: Vec<Contour>) -> Vec<Contour> {
        if !self.smooth_contours {
            return contours;
        }

        let (width, height) = image.dimensions();
        let half_window =
            (f64::from(width.min(height)) * SMOOTHING_WINDOW_FRACTION).round() as usize;
        debug!(half_window, "smoothing contours");
        contours
            .iter()
            .map(|c| c.smoothed(half_window, width, height))
            .collect()
    }
}

/// Segmentation by Sobel gradient magnitude, thresholded at the mean gradient.
///
/// Incomplete: how the three per-channel gradients should be merged is not
/// settled, so this only looks at the gradient of one selected channel
/// (channel 2 by default). Never used unless selected explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSegmenter {
    channel: usize,
    area_threshold: f64,
}

impl EdgeSegmenter {
    /// 1-D factor of the 3x3 Gaussian kernel `(1 2 1 / 2 4 2 / 1 2 1) / 16`.
    pub const BLUR_KERNEL: [f32; 3] = [0.25, 0.5, 0.25];

    pub fn new(channel: usize, area_threshold: f64) -> Result<Self> {
        validate_fraction("edge_area_threshold", area_threshold)?;
        if channel > 2 {
            return Err(ChiliQualityError::validation(
                "edge_channel",
                format!("must be 0, 1 or 2, got {channel}"),
            ));
        }

        Ok(Self {
            channel,
            area_threshold,
        })
    }
}

impl Default for EdgeSegmenter {
    fn default() -> Self {
        Self {
            channel: 2,
            area_threshold: EDGE_AREA_THRESHOLD,
        }
    }
}

impl SegmentationStrategy for EdgeSegmenter {
    fn threshold_mask(&self, image: &Image) -> GrayImage {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return GrayImage::new(width, height);
        }

        let blurred = separable_filter_equal(image, &Self::BLUR_KERNEL);
        let edges = channel_gradient(&blurred, self.channel);

        let total: u64 = edges.pixels().map(|p| u64::from(p.0[0])).sum();
        let mean = total as f64 / (f64::from(width) * f64::from(height));
        debug!(channel = self.channel, mean, "edge threshold");

        GrayImage::from_fn(width, height, |x, y| {
            if f64::from(edges.get_pixel(x, y).0[0]) > mean {
                FOREGROUND
            } else {
                BACKGROUND
            }
        })
    }

    fn area_threshold(&self) -> f64 {
        self.area_threshold
    }
}

/// `0.5 * |gx| + 0.5 * |gy|` of one channel, each term saturated to 8 bits.
fn channel_gradient(image: &Image, channel: usize) -> GrayImage {
    let plane = GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y).0[channel]])
    });
    let gx = horizontal_sobel(&plane);
    let gy = vertical_sobel(&plane);

    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let ax = f32::from(gx.get_pixel(x, y).0[0].unsigned_abs().min(255));
        let ay = f32::from(gy.get_pixel(x, y).0[0].unsigned_abs().min(255));
        Luma([(0.5 * ax + 0.5 * ay).round() as u8])
    })
}

fn validate_fraction(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ChiliQualityError::validation(
            field,
            format!("must be within [0, 1], got {value}"),
        ))
    }
}
