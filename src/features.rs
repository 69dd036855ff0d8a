use std::fmt;

use crate::imageops::mask::is_foreground;
use crate::segmentation::SegmentationResult;

/// Summary statistics of a segmented region.
///
/// Channel means are truncated whole numbers bound in the canonical order of
/// [`crate::Image`]: channel 0 is red, 1 is green, 2 is blue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Descriptor {
    red: u8,
    green: u8,
    blue: u8,
    area: f64,
}

impl Descriptor {
    pub const fn new(red: u8, green: u8, blue: u8, area: f64) -> Self {
        Self {
            red,
            green,
            blue,
            area,
        }
    }

    pub const fn red(&self) -> u8 {
        self.red
    }

    pub const fn green(&self) -> u8 {
        self.green
    }

    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Summed area of the retained contours.
    pub const fn area(&self) -> f64 {
        self.area
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "red={} green={} blue={} area={:.1}",
            self.red, self.green, self.blue, self.area
        )
    }
}

/// Mean color over the mask foreground and total contour area.
///
/// An empty foreground gives zero means rather than an error.
pub fn extract_features(segmented: &SegmentationResult) -> Descriptor {
    let mut sums = [0u64; 3];
    let mut count = 0u64;

    for (pixel, mask) in segmented.image().pixels().zip(segmented.mask().pixels()) {
        if is_foreground(mask) {
            for (sum, &c) in sums.iter_mut().zip(pixel.0.iter()) {
                *sum += u64::from(c);
            }
            count += 1;
        }
    }

    let [red, green, blue] = if count == 0 {
        [0; 3]
    } else {
        sums.map(|sum| (sum / count) as u8)
    };

    let area = segmented
        .contours()
        .iter()
        .fold(0.0, |total, contour| total + contour.area());

    Descriptor::new(red, green, blue, area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Rgb};
    use imageproc::point::Point;

    use crate::contour::Contour;
    use crate::imageops::mask::FOREGROUND;
    use crate::Image;

    #[test]
    fn test_empty_foreground_is_zero() {
        let result = SegmentationResult::new(
            Image::from_pixel(4, 4, Rgb([9, 9, 9])),
            GrayImage::new(4, 4),
            vec![],
        );
        let features = extract_features(&result);
        assert_eq!(features, Descriptor::new(0, 0, 0, 0.0));
        assert_eq!(features.area(), 0.0);
        assert!(features.area().is_sign_positive());
        assert!(!features.to_string().contains('-'));
    }

    #[test]
    fn test_means_are_truncated() {
        let mut image = Image::new(3, 1);
        image.put_pixel(0, 0, Rgb([10, 0, 255]));
        image.put_pixel(1, 0, Rgb([11, 1, 254]));
        image.put_pixel(2, 0, Rgb([200, 200, 200]));
        let mut mask = GrayImage::new(3, 1);
        mask.put_pixel(0, 0, FOREGROUND);
        mask.put_pixel(1, 0, FOREGROUND);

        let features = extract_features(&SegmentationResult::new(image, mask, vec![]));
        assert_eq!(features.red(), 10);
        assert_eq!(features.green(), 0);
        assert_eq!(features.blue(), 254);
    }

    #[test]
    fn test_area_sums_contours() {
        let square = |x: i32, side: i32| {
            Contour::new(vec![
                Point::new(x, 0),
                Point::new(x + side, 0),
                Point::new(x + side, side),
                Point::new(x, side),
            ])
        };
        let result = SegmentationResult::new(
            Image::new(2, 2),
            GrayImage::new(2, 2),
            vec![square(0, 3), square(10, 2)],
        );
        assert_eq!(extract_features(&result).area(), 13.0);
    }
}
