use image::{GrayImage, Luma, Rgb, RgbImage};

/// A pixel in 8-bit HSV units: hue in `[0, 180)`, saturation and value in `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub hue: u8,
    pub saturation: u8,
    pub value: u8,
}

impl Hsv {
    /// Saturation and value only depend on the channel extremes, so they are
    /// independent of channel order. Hue assumes `R, G, B`.
    pub fn from_rgb(Rgb([red, green, blue]): Rgb<u8>) -> Self {
        let max = red.max(green).max(blue);
        let min = red.min(green).min(blue);
        let delta = f32::from(max - min);

        let saturation = if max == 0 {
            0
        } else {
            (delta * 255.0 / f32::from(max)).round() as u8
        };

        let hue = if delta == 0.0 {
            0.0
        } else {
            let (r, g, b) = (f32::from(red), f32::from(green), f32::from(blue));
            let degrees = if max == red {
                60.0 * (g - b) / delta
            } else if max == green {
                120.0 + 60.0 * (b - r) / delta
            } else {
                240.0 + 60.0 * (r - g) / delta
            };
            if degrees < 0.0 {
                degrees + 360.0
            } else {
                degrees
            }
        };

        Self {
            hue: ((hue / 2.0).round() as u16 % 180) as u8,
            saturation,
            value: max,
        }
    }
}

/// Inclusive per-channel HSV bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        let channels = [hsv.hue, hsv.saturation, hsv.value];
        channels
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(&c, (&lo, &hi))| lo <= c && c <= hi)
    }

    /// Foreground (255) where the pixel's HSV value is inside the range.
    pub fn threshold(&self, image: &RgbImage) -> GrayImage {
        GrayImage::from_fn(image.width(), image.height(), |x, y| {
            if self.contains(Hsv::from_rgb(*image.get_pixel(x, y))) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }
}

impl Default for HsvRange {
    fn default() -> Self {
        Self::new([0, 100, 0], [255, 255, 240])
    }
}
