use image::{ImageBuffer, Pixel, Primitive};
use num_traits::AsPrimitive;

use crate::imageops::is_floating_point;

/// Integer reduction factor that brings the longer side down towards `max_dimension`.
///
/// Follows `floor(longer / max_dimension)` and never returns less than 1, so a
/// side that is not a multiple of `max_dimension` may still end up slightly
/// above it.
pub fn scale_factor(width: u32, height: u32, max_dimension: u32) -> u32 {
    let longer = width.max(height);
    (longer / max_dimension.max(1)).max(1)
}

/// Box (area-average) downsampling by an integer factor on both axes.
///
/// Output dimensions are `floor(dim / factor)`, clamped to at least 1. Each output
/// pixel averages the `factor x factor` block it covers.
pub fn downsample<P, S>(image: &ImageBuffer<P, Vec<S>>, factor: u32) -> ImageBuffer<P, Vec<S>>
where
    P: Pixel<Subpixel = S>,
    S: Primitive + AsPrimitive<f32> + 'static,
    f32: AsPrimitive<S>,
{
    let (width, height) = image.dimensions();
    if factor <= 1 || width == 0 || height == 0 {
        return image.clone();
    }

    let out_width = (width / factor).max(1);
    let out_height = (height / factor).max(1);
    let round = !is_floating_point::<S>();

    ImageBuffer::from_fn(out_width, out_height, |ox, oy| {
        let (x0, y0) = (ox * factor, oy * factor);
        let (x1, y1) = ((x0 + factor).min(width), (y0 + factor).min(height));

        let mut sums = [0f32; 4];
        for y in y0..y1 {
            for x in x0..x1 {
                for (sum, &c) in sums.iter_mut().zip(image.get_pixel(x, y).channels()) {
                    *sum += c.as_();
                }
            }
        }

        let count = ((x1 - x0) * (y1 - y0)) as f32;
        let mut pixel = *image.get_pixel(x0, y0);
        for (c, sum) in pixel.channels_mut().iter_mut().zip(sums) {
            let mean = if round {
                (sum / count).round()
            } else {
                sum / count
            };
            *c = mean.as_();
        }
        pixel
    })
}
