use std::path::Path;

use tracing::debug;

use crate::errors::{ChiliQualityError, Result};
use crate::imageops::{downsample, scale_factor};
use crate::traits::ImageLoader;
use crate::Image;

pub const MAX_WORKING_DIMENSION: u32 = 200;

/// Decodes photos from disk and box-downsamples them to the working resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileImageLoader {
    max_dimension: u32,
}

impl FileImageLoader {
    pub fn new(max_dimension: u32) -> Result<Self> {
        if max_dimension == 0 {
            return Err(ChiliQualityError::validation(
                "max_dimension",
                "must be greater than zero",
            ));
        }
        Ok(Self { max_dimension })
    }

    pub const fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Downsample an already decoded photo the same way [`ImageLoader::load`] does.
    pub fn resize(&self, image: &Image) -> Image {
        let factor = scale_factor(image.width(), image.height(), self.max_dimension);
        downsample(image, factor)
    }
}

impl Default for FileImageLoader {
    fn default() -> Self {
        Self {
            max_dimension: MAX_WORKING_DIMENSION,
        }
    }
}

impl ImageLoader for FileImageLoader {
    fn load(&self, path: &Path) -> Result<Image> {
        let load_error = |source| ChiliQualityError::ImageLoad {
            path: path.to_path_buf(),
            source,
        };

        // Bounds first so the factor is known before the full decode.
        let (width, height) = image::image_dimensions(path).map_err(load_error)?;
        let factor = scale_factor(width, height, self.max_dimension);
        debug!(path = %path.display(), width, height, factor, "scale factor");

        let image = image::open(path).map_err(load_error)?.into_rgb8();
        Ok(downsample(&image, factor))
    }
}
