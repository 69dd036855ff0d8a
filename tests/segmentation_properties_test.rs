use image::{GrayImage, Luma, Rgb};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use chili_quality::compositor::composite_with_mask;
use chili_quality::contour::find_significant_contours;
use chili_quality::features::extract_features;
use chili_quality::imageops::mask::{is_foreground, FOREGROUND};
use chili_quality::{ColorThresholdSegmenter, Image, SegmentationResult, SegmentationStrategy};

/// Small deterministic generator so failures are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + self.next() % (hi - lo)
    }
}

/// Mask side; the outer cells reach every image border.
const SIZE: u32 = 159;

/// Rectangles placed in separate 40x40 cells, returned with their outline areas.
/// A blob may start at its cell origin, so blobs in the first row and column
/// touch the image edge, and ones ending at offset 38 of the last cells touch
/// the opposite edge.
fn blob_mask(rng: &mut Lcg) -> (GrayImage, Vec<f64>) {
    let mut mask = GrayImage::new(SIZE, SIZE);
    let mut areas = Vec::new();

    for cell_y in 0..4 {
        for cell_x in 0..4 {
            if rng.next() % 3 == 0 {
                continue;
            }
            let w = rng.range(1, 36);
            let h = rng.range(1, 36);
            let x = cell_x * 40 + rng.range(0, 40 - w);
            let y = cell_y * 40 + rng.range(0, 40 - h);
            draw_filled_rect_mut(
                &mut mask,
                Rect::at(x as i32, y as i32).of_size(w, h),
                FOREGROUND,
            );
            areas.push(f64::from(w - 1) * f64::from(h - 1));
        }
    }
    (mask, areas)
}

fn noise_image(rng: &mut Lcg, width: u32, height: u32) -> Image {
    Image::from_fn(width, height, |_, _| {
        Rgb([rng.next() as u8, rng.next() as u8, rng.next() as u8])
    })
}

#[test]
fn test_contours_never_at_or_below_threshold() {
    let mut rng = Lcg(7);
    for fraction in [0.0, 0.01, 0.03, 0.05] {
        for _ in 0..20 {
            let (mask, areas) = blob_mask(&mut rng);
            let min_size = f64::from(SIZE * SIZE) * fraction;

            let contours = find_significant_contours(&mask, fraction);
            assert!(contours.iter().all(|c| c.area() > min_size));

            let expected = areas.iter().filter(|&&a| a > min_size).count();
            assert_eq!(contours.len(), expected);
        }
    }
}

#[test]
fn test_composite_exact_inside_zero_outside() -> chili_quality::Result<()> {
    let mut rng = Lcg(42);
    for _ in 0..10 {
        let (mask, _) = blob_mask(&mut rng);
        let image = noise_image(&mut rng, SIZE, SIZE);
        let contours = find_significant_contours(&mask, 0.0);

        let (composited, filled) = composite_with_mask(&image, &contours)?;
        for (x, y, m) in filled.enumerate_pixels() {
            let out = composited.get_pixel(x, y);
            if is_foreground(m) {
                assert_eq!(out, image.get_pixel(x, y));
            } else {
                assert_eq!(out, &Rgb([0, 0, 0]));
            }
        }
    }
    Ok(())
}

#[test]
fn test_filled_mask_stays_inside_blobs() -> chili_quality::Result<()> {
    let mut rng = Lcg(3);
    let (mask, _) = blob_mask(&mut rng);
    let contours = find_significant_contours(&mask, 0.0);
    let image = Image::from_pixel(SIZE, SIZE, Rgb([1, 2, 3]));

    let (_, filled) = composite_with_mask(&image, &contours)?;
    // filled interiors never leave the blobs they were traced from
    for (x, y, m) in filled.enumerate_pixels() {
        if is_foreground(m) {
            assert!(is_foreground(mask.get_pixel(x, y)));
        }
    }
    Ok(())
}

#[test]
fn test_edge_touching_blobs_are_kept() {
    let mut mask = GrayImage::new(SIZE, SIZE);
    for (x, y) in [(0, 0), (0, 60), (139, 60), (60, 139), (139, 139)] {
        draw_filled_rect_mut(&mut mask, Rect::at(x, y).of_size(20, 20), FOREGROUND);
    }

    let contours = find_significant_contours(&mask, 0.0);
    assert_eq!(contours.len(), 5);
    assert!(contours.iter().all(|c| c.area() == 19.0 * 19.0));
}

#[test]
fn test_no_foreground_gives_zero_features() -> chili_quality::Result<()> {
    let mut rng = Lcg(11);
    // saturation 0 everywhere: nothing passes the threshold
    let image = Image::from_fn(64, 48, |_, _| {
        let v = rng.next() as u8;
        Rgb([v, v, v])
    });

    let segmented = ColorThresholdSegmenter::default().segment(&image)?;
    assert!(segmented.contours().is_empty());
    assert!(segmented.image().pixels().all(|p| p.0 == [0, 0, 0]));

    let features = extract_features(&segmented);
    assert_eq!((features.red(), features.green(), features.blue()), (0, 0, 0));
    assert_eq!(features.area(), 0.0);
    assert!(features.area().is_sign_positive());
    Ok(())
}

#[test]
fn test_mask_only_result_with_empty_mask() {
    let result = SegmentationResult::new(
        Image::new(3, 3),
        GrayImage::from_pixel(3, 3, Luma([0])),
        vec![],
    );
    let features = extract_features(&result);
    assert_eq!(features.area(), 0.0);
    assert_eq!(features.red(), 0);
}
