pub mod frame_helper {
    use crate::error::Result;
    use image::{ExtendedColorType, ImageEncoder, RgbImage};
    use std::path::Path;

    pub const DEFAULT_JPEG_QUALITY: u8 = 80;

    /// Encodes a frame as a baseline JPEG.
    pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity((frame.width() * frame.height() / 4) as usize);
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        encoder.write_image(frame.as_raw(), frame.width(), frame.height(), ExtendedColorType::Rgb8)?;
        Ok(buffer)
    }

    /// Writes a frame to `path` as PNG.
    pub fn save_png(path: impl AsRef<Path>, frame: &RgbImage) -> Result<()> {
        let output = std::io::BufWriter::new(std::fs::File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);
        encoder.write_image(frame.as_raw(), frame.width(), frame.height(), ExtendedColorType::Rgb8)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::frame_helper::*;
    use image::{Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
    }

    #[test]
    fn jpeg_has_soi_and_eoi_markers() {
        let bytes = encode_jpeg(&gradient(64, 48), DEFAULT_JPEG_QUALITY).expect("Error encoding frame.");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn png_round_trips_dimensions() {
        let path = std::env::temp_dir().join(format!("junction_watch_frame_{}.png", std::process::id()));
        save_png(&path, &gradient(32, 16)).expect("Error saving file.");
        let reloaded = image::open(&path).expect("Error reading file.");
        assert_eq!((reloaded.width(), reloaded.height()), (32, 16));
        let _ = std::fs::remove_file(path);
    }
}
