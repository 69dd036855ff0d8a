use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use tracing::debug;

/// Closed boundary of a foreground region, in image coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// Enclosed area by the shoelace formula. Self-intersecting outlines are not
    /// validated and yield whatever the formula gives.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let twice_area: i64 = (0..n)
            .map(|i| {
                let p = self.points[i];
                let q = self.points[(i + 1) % n];
                i64::from(p.x) * i64::from(q.y) - i64::from(q.x) * i64::from(p.y)
            })
            .sum();
        twice_area.abs() as f64 / 2.0
    }

    /// Savitzky-Golay smoothing (cubic fit over `2 * half_window + 1` points) of
    /// the closed outline. The window wraps around the start of the outline and
    /// smoothed coordinates are rounded and clamped to `width x height`.
    ///
    /// Outlines with fewer points than the window are returned unchanged.
    pub fn smoothed(&self, half_window: usize, width: u32, height: u32) -> Contour {
        let n = self.points.len();
        if half_window == 0 || n < 2 * half_window + 1 || width == 0 || height == 0 {
            return self.clone();
        }

        let weights = savgol_weights(half_window);
        let (max_x, max_y) = (width as i32 - 1, height as i32 - 1);
        let points = (0..n)
            .map(|i| {
                let (mut x, mut y) = (0.0, 0.0);
                for (k, w) in weights.iter().enumerate() {
                    let p = self.points[(i + n + k - half_window) % n];
                    x += w * f64::from(p.x);
                    y += w * f64::from(p.y);
                }
                Point::new(
                    (x.round() as i32).clamp(0, max_x),
                    (y.round() as i32).clamp(0, max_y),
                )
            })
            .collect();
        Contour::new(points)
    }
}

/// Convolution weights of a quadratic/cubic Savitzky-Golay smoother with
/// window `2m + 1`: `3 (3m^2 + 3m - 1 - 5i^2) / ((2m + 3)(2m + 1)(2m - 1))`.
fn savgol_weights(m: usize) -> Vec<f64> {
    let half = m as i64;
    let m = m as f64;
    let norm = (2.0 * m + 3.0) * (2.0 * m + 1.0) * (2.0 * m - 1.0);
    (-half..=half)
        .map(|i| {
            let i = i as f64;
            3.0 * (3.0 * m * m + 3.0 * m - 1.0 - 5.0 * i * i) / norm
        })
        .collect()
}

/// Outer borders of the mask's foreground regions whose area is strictly larger
/// than `area_threshold_fraction` of the whole mask.
///
/// Holes are not tracked. The result is ordered by ascending area.
pub fn find_significant_contours(mask: &GrayImage, area_threshold_fraction: f64) -> Vec<Contour> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let min_size = f64::from(width) * f64::from(height) * area_threshold_fraction;

    // regions touching the image edge come back as top-level holes unless the
    // mask is surrounded by background
    let mut padded = GrayImage::new(width + 2, height + 2);
    for (x, y, pixel) in mask.enumerate_pixels() {
        padded.put_pixel(x + 1, y + 1, *pixel);
    }

    let (max_x, max_y) = (width as i32 - 1, height as i32 - 1);
    let mut significant: Vec<(Contour, f64)> = find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            let points = c
                .points
                .into_iter()
                .map(|p| Point::new((p.x - 1).clamp(0, max_x), (p.y - 1).clamp(0, max_y)))
                .collect();
            let contour = Contour::new(points);
            let area = contour.area();
            (contour, area)
        })
        .filter(|(_, area)| *area > min_size)
        .collect();

    significant.sort_by(|a, b| a.1.total_cmp(&b.1));

    debug!(
        min_size,
        retained = significant.len(),
        "filtered contours by area"
    );

    significant.into_iter().map(|(contour, _)| contour).collect()
}
