use tracing::debug;

use crate::errors::Result;
use crate::features::{extract_features, Descriptor};
use crate::predictor::{QualityEstimate, QualityPredictor};
use crate::segmentation::SegmentationResult;
use crate::traits::SegmentationStrategy;
use crate::Image;

/// Everything derived from one photo.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub segmentation: SegmentationResult,
    pub features: Descriptor,
    pub estimate: QualityEstimate,
}

/// segment → extract features → predict, for a single decoded photo.
///
/// Holds no per-photo state, so one pipeline can serve any number of photos,
/// including from several threads at once.
#[derive(Debug, Clone)]
pub struct Pipeline<S: SegmentationStrategy> {
    strategy: S,
    predictor: QualityPredictor,
}

impl<S: SegmentationStrategy> Pipeline<S> {
    pub const fn new(strategy: S, predictor: QualityPredictor) -> Self {
        Self {
            strategy,
            predictor,
        }
    }

    pub fn analyze(&self, image: &Image) -> Result<Analysis> {
        let segmentation = self.strategy.segment(image)?;
        debug!(contours = segmentation.contours().len(), "segmented");

        let features = extract_features(&segmentation);
        let estimate = self.predictor.predict(&features);
        debug!(
            red = features.red(),
            green = features.green(),
            blue = features.blue(),
            area = features.area(),
            vitamin_c = estimate.vitamin_c,
            carotene = estimate.carotene,
            "analyzed"
        );

        Ok(Analysis {
            segmentation,
            features,
            estimate,
        })
    }
}

impl<S: SegmentationStrategy + Default> Default for Pipeline<S> {
    fn default() -> Self {
        Self::new(S::default(), QualityPredictor::default())
    }
}
