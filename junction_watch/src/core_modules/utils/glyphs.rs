// THEORY:
// The camera feed overlay needs a few lines of text ("DETECTED", the status
// panel, the clock). Frames are rasterized straight into an `RgbImage` with no
// font files on disk, so text is drawn from a fixed 5x7 bitmap set covering
// upper-case letters, digits and the handful of punctuation marks the overlay
// uses. Lower-case input is folded to upper-case.
//
// Each glyph is seven rows, top to bottom; bit 4 is the leftmost column.

pub mod glyphs {
    use crate::core_modules::utils::raster::raster::fill_rect;
    use image::{Rgb, RgbImage};

    pub const GLYPH_WIDTH: u32 = 5;
    pub const GLYPH_HEIGHT: u32 = 7;
    /// Horizontal advance per character, one column of spacing included.
    pub const ADVANCE: u32 = GLYPH_WIDTH + 1;

    const UNKNOWN: [u8; 7] = [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04];

    /// Bitmap rows for `c`; characters outside the set render as `?`.
    pub fn glyph(c: char) -> [u8; 7] {
        match c.to_ascii_uppercase() {
            'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
            'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
            'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
            'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
            'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
            'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
            'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
            'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
            'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
            'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
            'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
            'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
            'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
            'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
            'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
            'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
            'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
            'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
            'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
            'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
            'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
            'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
            'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
            'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
            'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
            'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
            '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
            '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
            '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
            '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
            '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
            '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
            '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
            '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
            '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
            '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
            ' ' => [0x00; 7],
            ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
            '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
            '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
            '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
            '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
            _ => UNKNOWN,
        }
    }

    /// Width in pixels of `text` at `scale`, without trailing spacing.
    pub fn text_width(text: &str, scale: u32) -> u32 {
        let n = text.chars().count() as u32;
        if n == 0 { 0 } else { (n * ADVANCE - 1) * scale.max(1) }
    }

    /// Draws `text` with its top-left corner at (`x`, `y`). Pixels outside the image are clipped.
    pub fn draw_text(image: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>, scale: u32) {
        let scale = scale.max(1) as i32;
        let mut pen_x = x;
        for c in text.chars() {
            let rows = glyph(c);
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH as i32 {
                    if bits & (0x10 >> col) != 0 {
                        fill_rect(
                            image,
                            pen_x + col * scale,
                            y + row as i32 * scale,
                            scale as u32,
                            scale as u32,
                            color,
                        );
                    }
                }
            }
            pen_x += ADVANCE as i32 * scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::glyphs::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn lowercase_folds_to_uppercase() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph('q'), glyph('Q'));
    }

    #[test]
    fn unsupported_characters_are_visible() {
        assert_eq!(glyph('~'), glyph('#'));
        assert!(glyph('~').iter().any(|row| *row != 0));
        assert!(glyph(' ').iter().all(|row| *row == 0));
    }

    #[test]
    fn width_accounts_for_spacing_and_scale() {
        assert_eq!(text_width("", 1), 0);
        assert_eq!(text_width("A", 1), 5);
        assert_eq!(text_width("AB", 1), 11);
        assert_eq!(text_width("AB", 2), 22);
    }

    #[test]
    fn draws_inside_and_clips_outside() {
        let mut image = RgbImage::new(20, 10);
        let white = Rgb([255, 255, 255]);
        draw_text(&mut image, 0, 0, "T", white, 1);
        // Top bar of the T spans the first five columns.
        for x in 0..5 {
            assert_eq!(*image.get_pixel(x, 0), white);
        }
        assert_eq!(*image.get_pixel(2, 6), white);
        assert_eq!(*image.get_pixel(0, 6), Rgb([0, 0, 0]));

        // Partly off-canvas text must not panic.
        draw_text(&mut image, -3, 8, "TEXT", white, 2);
        draw_text(&mut image, 18, -4, "TEXT", white, 1);
    }
}
