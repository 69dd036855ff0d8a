use anyhow::{ensure, Result};
use image::{GrayImage, ImageBuffer, Luma, Pixel, Primitive};

/// Foreground value written into masks.
pub const FOREGROUND: Luma<u8> = Luma([255]);
/// Background value written into masks.
pub const BACKGROUND: Luma<u8> = Luma([0]);

pub fn is_foreground(value: &Luma<u8>) -> bool {
    value.0[0] != 0
}

/// Per-channel AND against the broadcast mask: pixels keep their value where the
/// mask is foreground and become zero elsewhere.
pub fn apply<P, S>(image: &ImageBuffer<P, Vec<S>>, mask: &GrayImage) -> Result<ImageBuffer<P, Vec<S>>>
where
    P: Pixel<Subpixel = S>,
    S: Primitive + 'static,
{
    ensure!(
        image.dimensions() == mask.dimensions(),
        "Image and mask dimensions do not match: image {:?}, mask {:?}",
        image.dimensions(),
        mask.dimensions()
    );

    let mut output = image.clone();
    for (pixel, mask_pixel) in output.pixels_mut().zip(mask.pixels()) {
        if !is_foreground(mask_pixel) {
            pixel.channels_mut().fill(S::zero());
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_apply_zeroes_background() -> Result<()> {
        let image = RgbImage::from_pixel(2, 1, Rgb([10, 20, 30]));
        let mut mask = GrayImage::new(2, 1);
        mask.put_pixel(1, 0, FOREGROUND);

        let masked = apply(&image, &mask)?;
        assert_eq!(masked.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(masked.get_pixel(1, 0), &Rgb([10, 20, 30]));
        Ok(())
    }

    #[test]
    fn test_apply_dimension_mismatch() {
        let image = RgbImage::new(2, 2);
        let mask = GrayImage::new(3, 2);
        assert!(apply(&image, &mask).is_err());
    }
}
