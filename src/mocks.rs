use std::path::Path;

use image::Rgb;
use imageproc::drawing::draw_filled_ellipse_mut;

use crate::errors::{ChiliQualityError, Result};
use crate::traits::ImageLoader;
use crate::Image;

pub const PEPPER_COLOR: Rgb<u8> = Rgb([190, 35, 25]);
pub const BACKDROP_COLOR: Rgb<u8> = Rgb([235, 235, 230]);

/// テスト用の合成画像：明るい背景の中央に赤い楕円（唐辛子）
pub fn synthetic_pepper(width: u32, height: u32) -> Image {
    let mut image = Image::from_pixel(width, height, BACKDROP_COLOR);
    draw_filled_ellipse_mut(
        &mut image,
        ((width / 2) as i32, (height / 2) as i32),
        (width / 3) as i32,
        (height / 4) as i32,
        PEPPER_COLOR,
    );
    image
}

/// テスト用のモックローダー：パスに関係なく同じ画像を返す
#[derive(Debug, Clone)]
pub struct MockImageLoader {
    pub image: Image,
}

impl MockImageLoader {
    pub const fn new(image: Image) -> Self {
        Self { image }
    }
}

impl ImageLoader for MockImageLoader {
    fn load(&self, _path: &Path) -> Result<Image> {
        Ok(self.image.clone())
    }
}

/// テスト用：常にデコード失敗を返すローダー
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingImageLoader;

impl ImageLoader for FailingImageLoader {
    fn load(&self, path: &Path) -> Result<Image> {
        Err(ChiliQualityError::ImageLoad {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "mock decode failure",
            )),
        })
    }
}

/// テスト用のファクトリー関数
pub fn create_mock_loader() -> MockImageLoader {
    MockImageLoader::new(synthetic_pepper(160, 120))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_pepper_layout() {
        let image = synthetic_pepper(90, 60);
        assert_eq!(image.get_pixel(45, 30), &PEPPER_COLOR);
        assert_eq!(image.get_pixel(0, 0), &BACKDROP_COLOR);
    }

    #[test]
    fn test_mock_loader_ignores_path() -> Result<()> {
        let loader = create_mock_loader();
        let image = loader.load(Path::new("anything.jpg"))?;
        assert_eq!(image.dimensions(), (160, 120));
        Ok(())
    }

    #[test]
    fn test_failing_loader() {
        assert!(FailingImageLoader.load(Path::new("x.png")).is_err());
    }
}
