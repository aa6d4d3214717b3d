//! Terminal preview of CAT images as block-character art.

use crate::container::{decode, luma, CatError, RawImage};
use image::imageops::{self, FilterType};
use image::Rgba;
use log::debug;
use std::fs;
use std::path::Path;

/// Glyphs from brightest to darkest.
const RAMP: [char; 9] = ['█', '▉', '▊', '▋', '▌', '▍', '▎', '▏', ' '];

/// Largest rendering, in pixels. Two pixel rows share one text line.
pub const MAX_DISPLAY_WIDTH: u32 = 120;
pub const MAX_DISPLAY_HEIGHT: u32 = 40;

fn brightness(pixel: &Rgba<u8>) -> u8 {
    let [r, g, b, a] = pixel.0;
    if a == 0 {
        return 0;
    }
    luma(r, g, b)
}

/// Shrinks `(width, height)` to fit the display area, keeping the aspect
/// ratio.
fn fit(width: f64, height: f64) -> (u32, u32) {
    let (mut display_width, mut display_height) = (width, height);

    if display_width > MAX_DISPLAY_WIDTH as f64 {
        let ratio = MAX_DISPLAY_WIDTH as f64 / display_width;
        display_width = MAX_DISPLAY_WIDTH as f64;
        display_height = (display_height * ratio).floor();
    }

    if display_height > MAX_DISPLAY_HEIGHT as f64 {
        let ratio = MAX_DISPLAY_HEIGHT as f64 / display_height;
        display_height = MAX_DISPLAY_HEIGHT as f64;
        display_width = (display_width * ratio).floor();
    }

    (display_width as u32, display_height as u32)
}

/// Renders an image as lines of block characters.
///
/// The image is scaled by `scale` and then shrunk to fit
/// `MAX_DISPLAY_WIDTH x MAX_DISPLAY_HEIGHT`, with a single resize from the
/// source. Each character covers one column of two pixel rows and is picked
/// from their average brightness.
pub fn render_ascii(image: &RawImage, scale: f32) -> Result<String, CatError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CatError::InvalidScale(scale));
    }

    let mut art = String::new();
    if image.width() == 0 || image.height() == 0 {
        return Ok(art);
    }

    let scale = scale as f64;
    let (width, height) = fit(
        (image.width() as f64 * scale).round().max(1.0),
        (image.height() as f64 * scale).round().max(1.0),
    );
    if width == 0 || height == 0 {
        return Ok(art);
    }

    let source = image.to_rgba_image()?;
    let resized = if (width, height) == source.dimensions() {
        source
    } else {
        imageops::resize(&source, width, height, FilterType::Triangle)
    };
    debug!("Rendering {}x{} preview", width, height);

    let levels = (RAMP.len() - 1) as f64;
    for y in (0..height).step_by(2) {
        for x in 0..width {
            let top = brightness(resized.get_pixel(x, y)) as f64;
            let bottom = if y + 1 < height {
                brightness(resized.get_pixel(x, y + 1)) as f64
            } else {
                0.0
            };
            let level = ((top + bottom) / 2.0 / 255.0 * levels).floor() as usize;
            art.push(RAMP[RAMP.len() - 1 - level.min(RAMP.len() - 1)]);
        }
        art.push('\n');
    }
    Ok(art)
}

/// Decodes a CAT file and returns a banner followed by its block-character
/// rendering.
pub fn view<P>(path: P, scale: f32) -> Result<String, CatError>
where
    P: AsRef<Path>,
{
    let container = fs::read(&path)?;
    let image = decode(&container)?;
    let art = render_ascii(&image, scale)?;

    let mut out = format!(
        "=== CAT image ===\nSize: {}x{} (scale: {}x)\nFile: {}\n\n",
        image.width(),
        image.height(),
        scale,
        path.as_ref().display()
    );
    out.push_str(&art);
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> RawImage {
        let pixels = pixel.repeat((width * height) as usize);
        RawImage::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_white_is_full_block() {
        let art = render_ascii(&solid(3, 2, [255, 255, 255, 255]), 1.0).unwrap();
        assert_eq!(art, "███\n");
    }

    #[test]
    fn test_black_and_transparent_are_blank() {
        assert_eq!(render_ascii(&solid(2, 2, [0, 0, 0, 255]), 1.0).unwrap(), "  \n");
        assert_eq!(render_ascii(&solid(2, 2, [255, 255, 255, 0]), 1.0).unwrap(), "  \n");
    }

    #[test]
    fn test_odd_row_averages_with_black() {
        // One white row: the missing lower row counts as black, 127.5 -> level 4.
        let art = render_ascii(&solid(1, 1, [255, 255, 255, 255]), 1.0).unwrap();
        assert_eq!(art, "▌\n");
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit(10.0, 10.0), (10, 10));
        assert_eq!(fit(240.0, 80.0), (120, 40));
        assert_eq!(fit(120.0, 400.0), (12, 40));
        assert_eq!(fit(100.0, 41.0), (97, 40));
    }

    #[test]
    fn test_large_image_is_bounded() {
        let art = render_ascii(&solid(600, 300, [128, 128, 128, 255]), 1.0).unwrap();
        let lines: Vec<&str> = art.lines().collect();
        assert_eq!(lines.len(), 20);
        assert!(lines.iter().all(|line| line.chars().count() == 80));
    }

    #[test]
    fn test_scale() {
        let art = render_ascii(&solid(4, 4, [255, 255, 255, 255]), 0.5).unwrap();
        assert_eq!(art, "██\n");
    }

    #[test]
    fn test_huge_scale_is_bounded() {
        let art = render_ascii(&solid(2, 2, [255, 255, 255, 255]), 1000.0).unwrap();
        let lines: Vec<&str> = art.lines().collect();
        assert_eq!(lines.len(), 20);
        assert!(lines.iter().all(|line| line.chars().count() <= 40));

        let art = render_ascii(&solid(3, 1, [255, 255, 255, 255]), f32::MAX).unwrap();
        assert!(art.lines().count() <= 20);
        assert!(art.lines().all(|line| line.chars().count() <= 120));
    }

    #[test]
    fn test_invalid_scale() {
        let image = solid(2, 2, [255, 255, 255, 255]);
        for scale in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN, 0.0, -1.0] {
            assert!(matches!(
                render_ascii(&image, scale),
                Err(CatError::InvalidScale(_))
            ));
        }
    }

    #[test]
    fn test_empty_image() {
        assert_eq!(render_ascii(&solid(0, 5, [0; 4]), 1.0).unwrap(), "");
    }
}
