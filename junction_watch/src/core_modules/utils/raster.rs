// THEORY:
// Minimal drawing primitives over `image::RgbImage`, enough to paint the
// camera feed: filled and stroked rectangles, a translucent fill, dashed
// lines and small filled circles. Coordinates are signed so shapes can hang
// off any edge; every primitive clips to the image instead of panicking.

pub mod raster {
    use image::{Rgb, RgbImage};

    /// Clamps a span starting at `start` of `len` pixels to `0..limit`.
    fn clip(start: i32, len: u32, limit: u32) -> Option<(u32, u32)> {
        let lo = start.max(0) as i64;
        let hi = (start as i64 + len as i64).min(limit as i64);
        if hi <= lo { None } else { Some((lo as u32, hi as u32)) }
    }

    pub fn fill_rect(image: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, color: Rgb<u8>) {
        let (Some((x0, x1)), Some((y0, y1))) = (clip(x, width, image.width()), clip(y, height, image.height())) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                image.put_pixel(px, py, color);
            }
        }
    }

    /// Mixes `color` over the region with the given opacity (0.0 to 1.0).
    pub fn blend_rect(image: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, color: Rgb<u8>, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        let (Some((x0, x1)), Some((y0, y1))) = (clip(x, width, image.width()), clip(y, height, image.height())) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                let under = image.get_pixel(px, py).0;
                let mixed = [0, 1, 2].map(|c| {
                    (color.0[c] as f32 * alpha + under[c] as f32 * (1.0 - alpha)).round() as u8
                });
                image.put_pixel(px, py, Rgb(mixed));
            }
        }
    }

    /// Outline of a rectangle, `thickness` pixels drawn inward from its edges.
    pub fn stroke_rect(
        image: &mut RgbImage,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        thickness: u32,
        color: Rgb<u8>,
    ) {
        let t = thickness.max(1).min(width).min(height);
        fill_rect(image, x, y, width, t, color);
        fill_rect(image, x, y + height as i32 - t as i32, width, t, color);
        fill_rect(image, x, y, t, height, color);
        fill_rect(image, x + width as i32 - t as i32, y, t, height, color);
    }

    /// Dashed horizontal line centred on `y`.
    pub fn dashed_hline(image: &mut RgbImage, y: i32, thickness: u32, dash: u32, gap: u32, color: Rgb<u8>) {
        let period = (dash + gap).max(1);
        let top = y - (thickness / 2) as i32;
        let mut x = 0u32;
        while x < image.width() {
            fill_rect(image, x as i32, top, dash, thickness, color);
            x += period;
        }
    }

    /// Dashed vertical line centred on `x`.
    pub fn dashed_vline(image: &mut RgbImage, x: i32, thickness: u32, dash: u32, gap: u32, color: Rgb<u8>) {
        let period = (dash + gap).max(1);
        let left = x - (thickness / 2) as i32;
        let mut y = 0u32;
        while y < image.height() {
            fill_rect(image, left, y as i32, thickness, dash, color);
            y += period;
        }
    }

    pub fn fill_circle(image: &mut RgbImage, cx: i32, cy: i32, radius: u32, color: Rgb<u8>) {
        let r = radius as i32;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    fill_rect(image, cx + dx, cy + dy, 1, 1, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::raster::*;
    use image::{Rgb, RgbImage};

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    #[test]
    fn fill_clips_to_bounds() {
        let mut image = RgbImage::new(10, 10);
        fill_rect(&mut image, -5, -5, 8, 8, RED);
        assert_eq!(*image.get_pixel(0, 0), RED);
        assert_eq!(*image.get_pixel(2, 2), RED);
        assert_eq!(*image.get_pixel(3, 3), BLACK);

        // Entirely outside: nothing happens.
        fill_rect(&mut image, 20, 20, 5, 5, RED);
        fill_rect(&mut image, -30, 0, 5, 5, RED);
    }

    #[test]
    fn blend_mixes_with_background() {
        let mut image = RgbImage::from_pixel(4, 4, Rgb([200, 200, 200]));
        blend_rect(&mut image, 0, 0, 4, 4, BLACK, 0.75);
        assert_eq!(*image.get_pixel(1, 1), Rgb([50, 50, 50]));
    }

    #[test]
    fn stroke_leaves_interior_untouched() {
        let mut image = RgbImage::new(10, 10);
        stroke_rect(&mut image, 1, 1, 8, 8, 2, RED);
        assert_eq!(*image.get_pixel(1, 1), RED);
        assert_eq!(*image.get_pixel(2, 5), RED);
        assert_eq!(*image.get_pixel(8, 8), RED);
        assert_eq!(*image.get_pixel(5, 5), BLACK);
        assert_eq!(*image.get_pixel(0, 0), BLACK);
    }

    #[test]
    fn dashes_alternate() {
        let mut image = RgbImage::new(40, 5);
        dashed_hline(&mut image, 2, 1, 10, 10, RED);
        assert_eq!(*image.get_pixel(0, 2), RED);
        assert_eq!(*image.get_pixel(9, 2), RED);
        assert_eq!(*image.get_pixel(10, 2), BLACK);
        assert_eq!(*image.get_pixel(20, 2), RED);
        assert_eq!(*image.get_pixel(0, 0), BLACK);
    }

    #[test]
    fn circle_is_round() {
        let mut image = RgbImage::new(9, 9);
        fill_circle(&mut image, 4, 4, 3, RED);
        assert_eq!(*image.get_pixel(4, 4), RED);
        assert_eq!(*image.get_pixel(7, 4), RED);
        assert_eq!(*image.get_pixel(7, 7), BLACK);
    }
}
