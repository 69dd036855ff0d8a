use image::GrayImage;
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};

use crate::contour::Contour;
use crate::errors::Result;
use crate::imageops::mask::{self, FOREGROUND};
use crate::Image;

/// Mask of the given size with every contour's interior, boundary included,
/// set to foreground.
pub fn fill_contours(width: u32, height: u32, contours: &[Contour]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);

    for contour in contours {
        let mut points = contour.points.as_slice();
        // polygon drawing rejects an explicitly closed outline
        while points.len() > 1 && points.first() == points.last() {
            points = &points[..points.len() - 1];
        }

        match points {
            [] => {}
            [p] => {
                if p.x >= 0 && p.y >= 0 && (p.x as u32) < width && (p.y as u32) < height {
                    mask.put_pixel(p.x as u32, p.y as u32, FOREGROUND);
                }
            }
            [p, q] => draw_line_segment_mut(
                &mut mask,
                (p.x as f32, p.y as f32),
                (q.x as f32, q.y as f32),
                FOREGROUND,
            ),
            _ => draw_polygon_mut(&mut mask, points, FOREGROUND),
        }
    }

    mask
}

/// Copy of `image` with everything outside the filled contours set to zero,
/// together with the mask that was applied.
pub fn composite_with_mask(image: &Image, contours: &[Contour]) -> Result<(Image, GrayImage)> {
    let mask = fill_contours(image.width(), image.height(), contours);
    let composited = mask::apply(image, &mask)?;
    Ok((composited, mask))
}

pub fn composite(image: &Image, contours: &[Contour]) -> Result<Image> {
    composite_with_mask(image, contours).map(|(composited, _)| composited)
}
