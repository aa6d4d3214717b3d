/// Channels closer than this to the pixel's luma are snapped to it.
pub const GRAY_TOLERANCE: i32 = 5;

/// Weighted brightness of an RGB triple, `0.299R + 0.587G + 0.114B`,
/// rounded to the nearest integer.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64).round() as u8
}

/// Maps a single RGBA pixel to its compression-friendly form.
///
/// Fully transparent pixels become `[0, 0, 0, 0]` whatever their color.
/// Pixels whose three channels all lie within `GRAY_TOLERANCE` (exclusive)
/// of their luma are replaced by that gray level, keeping alpha. Everything
/// else passes through untouched.
pub fn optimize_pixel([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    if a == 0 {
        return [0, 0, 0, 0];
    }

    let gray = luma(r, g, b);
    let near = |c: u8| (c as i32 - gray as i32).abs() < GRAY_TOLERANCE;

    if near(r) && near(g) && near(b) {
        [gray, gray, gray, a]
    } else {
        [r, g, b, a]
    }
}

/// Runs `optimize_pixel` over a whole RGBA8888 buffer.
///
/// The transform is lossy: near-gray colors can not be recovered. Only the
/// shape of the buffer (pixel count and order) is preserved. A trailing
/// partial pixel, which a well formed buffer never has, is copied as is.
pub fn optimize(data: &[u8]) -> Vec<u8> {
    let mut optimized = Vec::with_capacity(data.len());

    let pixels = data.chunks_exact(4);
    let remainder = pixels.remainder();
    for pixel in pixels {
        optimized.extend_from_slice(&optimize_pixel([pixel[0], pixel[1], pixel[2], pixel[3]]));
    }
    optimized.extend_from_slice(remainder);

    assert_eq!(
        optimized.len(),
        data.len(),
        "optimizer must preserve the buffer length"
    );
    optimized
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_luma() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(10, 10, 10), 10);
        // 59.8 + 29.35 + 5.7 = 94.85
        assert_eq!(luma(200, 50, 50), 95);
    }

    #[test]
    fn test_gray_and_color_pixels() {
        let data = [10, 10, 10, 255, 200, 50, 50, 255];
        assert_eq!(optimize(&data), vec![10, 10, 10, 255, 200, 50, 50, 255]);
    }

    #[test]
    fn test_transparent_pixel() {
        assert_eq!(optimize(&[123, 45, 67, 0]), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_near_gray_collapses() {
        // luma(100, 103, 98) = 29.9 + 60.461 + 11.172 = 101.533 -> 102
        assert_eq!(optimize_pixel([100, 103, 98, 128]), [102, 102, 102, 128]);
    }

    #[test]
    fn test_tolerance_is_exclusive() {
        // luma(110, 100, 100) = 32.89 + 58.7 + 11.4 = 102.99 -> 103, r is 7 away.
        assert_eq!(optimize_pixel([110, 100, 100, 255]), [110, 100, 100, 255]);
        // luma(105, 100, 100) = 31.395 + 58.7 + 11.4 = 101.495 -> 101,
        // r is 4 away, g and b 1 away.
        assert_eq!(optimize_pixel([105, 100, 100, 255]), [101, 101, 101, 255]);
        // luma(100, 100, 145) = 29.9 + 58.7 + 16.53 = 105.13 -> 105,
        // r and g are exactly 5 away.
        assert_eq!(optimize_pixel([100, 100, 145, 255]), [100, 100, 145, 255]);
    }

    #[test]
    fn test_length_invariance() {
        let mut rng = rand::thread_rng();
        for len in [0usize, 4, 8, 400, 4096] {
            let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            assert_eq!(optimize(&data).len(), len);
        }
        assert_eq!(optimize(&[1, 2, 3, 4, 5, 6]).len(), 6);
    }

    #[test]
    fn test_idempotent() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let data: Vec<u8> = (0..4 * 256)
                .map(|i| {
                    // Keep some alpha zero and some channels close together.
                    if i % 4 == 3 && rng.gen_bool(0.2) {
                        0
                    } else {
                        rng.gen_range(90..=120)
                    }
                })
                .collect();
            let once = optimize(&data);
            let twice = optimize(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_every_gray_is_fixed_point() {
        for v in 0..=u8::MAX {
            for a in [1, 128, 255] {
                assert_eq!(optimize_pixel([v, v, v, a]), [v, v, v, a]);
            }
        }
    }
}
