//! A finished render: the RGBA pixels plus how long they took.

use image::{ColorType, RgbaImage};
use std::path::Path;
use std::time::Duration;

/// A complete, row-major RGBA image.  Only ever handed out once every
/// band has been written.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// `width * height * 4` bytes, alpha always 255.
    pub pixels: Vec<u8>,
    /// Wall-clock time from dispatch to the last band being merged.
    pub elapsed: Duration,
}

impl Frame {
    /// The RGBA quadruplet at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let offset = (y * self.width + x) * 4;
        let mut quad = [0u8; 4];
        quad.copy_from_slice(&self.pixels[offset..offset + 4]);
        quad
    }

    /// Render latency in milliseconds, for display.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs() as f64 * 1000.0 + f64::from(self.elapsed.subsec_nanos()) / 1e6
    }

    /// Converts into an image buffer the `image` crate can encode.
    pub fn into_image(self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width as u32, self.height as u32, self.pixels)
    }

    /// Writes the frame to disk; the format follows the file extension.
    /// Encodes straight from the pixel buffer without copying it.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), failure::Error> {
        if self.pixels.len() != self.width * self.height * 4 {
            return Err(failure::err_msg(
                "Frame buffer does not match its dimensions",
            ));
        }
        image::save_buffer(
            path,
            &self.pixels,
            self.width as u32,
            self.height as u32,
            ColorType::RGBA(8),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame {
            width: 2,
            height: 2,
            pixels: vec![
                1, 2, 3, 255, 4, 5, 6, 255, //
                7, 8, 9, 255, 10, 11, 12, 255,
            ],
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn pixel_reads_row_major() {
        let frame = frame();
        assert_eq!(frame.pixel(1, 0), [4, 5, 6, 255]);
        assert_eq!(frame.pixel(0, 1), [7, 8, 9, 255]);
    }

    #[test]
    fn elapsed_in_millis() {
        assert!((frame().elapsed_ms() - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn converts_to_image() {
        let image = frame().into_image().unwrap();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(1, 1).0, [10, 11, 12, 255]);
    }

    #[test]
    fn saves_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        frame().save(&path).unwrap();
        let saved = image::open(&path).unwrap().to_rgba();
        assert_eq!(saved.dimensions(), (2, 2));
        assert_eq!(saved.get_pixel(0, 1).0, [7, 8, 9, 255]);
    }

    #[test]
    fn short_buffer_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.png");
        let mut frame = frame();
        frame.pixels.truncate(12);
        assert!(frame.save(&path).is_err());
        assert!(!path.exists());
    }
}
