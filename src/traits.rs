use std::path::Path;

use image::GrayImage;

use crate::compositor::composite_with_mask;
use crate::contour::{find_significant_contours, Contour};
use crate::errors::Result;
use crate::segmentation::SegmentationResult;
use crate::Image;

/// 前景（唐辛子）と背景を分離するセグメンテーション手法の抽象化
pub trait SegmentationStrategy: Send + Sync {
    /// 二値マスクを生成（前景 = 255、背景 = 0）
    fn threshold_mask(&self, image: &Image) -> GrayImage;

    /// 輪郭を残すための最小面積（マスク全体に対する割合）
    fn area_threshold(&self) -> f64;

    /// 面積で選別した輪郭の後処理（既定では何もしない）
    fn refine_contours(&self, _image: &Image, contours: Vec<Contour>) -> Vec<Contour> {
        contours
    }

    /// マスク生成 → 輪郭抽出 → 輪郭内部以外をゼロにした画像の合成
    fn segment(&self, image: &Image) -> Result<SegmentationResult> {
        let mask = self.threshold_mask(image);
        let contours = self.refine_contours(
            image,
            find_significant_contours(&mask, self.area_threshold()),
        );
        let (segmented, mask) = composite_with_mask(image, &contours)?;
        Ok(SegmentationResult::new(segmented, mask, contours))
    }
}

/// 撮影済み画像の読み込みの抽象化
///
/// 実装は長辺が作業解像度以下になるよう整数倍率で縮小した画像を返す
pub trait ImageLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Image>;
}
