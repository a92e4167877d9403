//! Integer pixel arithmetic shared by the filters.
//!
//! All filters work on 8-bit channels with `i32` intermediates. Divisions
//! truncate toward zero, and the exact rounding of every helper here is
//! part of the visual output, so keep the operation order as written.

use image::{Rgba, RgbaImage};

/// Linearly remap `value` from `[src_min, src_max]` onto `[dst_min, dst_max]`.
///
/// Uses truncating integer division. A degenerate source range
/// (`src_min == src_max`) returns `dst_min`.
#[inline]
pub fn scale(value: i32, src_min: i32, src_max: i32, dst_min: i32, dst_max: i32) -> i32 {
    if src_min == src_max {
        return dst_min;
    }
    dst_min + ((dst_max - dst_min) * (value - src_min)) / (src_max - src_min)
}

/// Floating point variant of [`scale`], with the same degenerate case.
#[inline]
pub fn scale_f64(value: f64, src_min: f64, src_max: f64, dst_min: f64, dst_max: f64) -> f64 {
    if src_min == src_max {
        return dst_min;
    }
    dst_min + ((dst_max - dst_min) * (value - src_min)) / (src_max - src_min)
}

/// Weighted merge of two channel values: `a` gets `weight / total`, `b` the rest.
///
/// Each half is divided separately, so the result can be one below the
/// exact weighted mean. A zero `total` returns `b`.
#[inline]
pub fn merge_channels(a: i32, b: i32, weight: i32, total: i32) -> i32 {
    if total == 0 {
        return b;
    }
    a * weight / total + b * (total - weight) / total
}

/// Clamp an intermediate value into the 8-bit channel range.
#[inline]
pub fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Fold an out-of-range coordinate back into `[0, size)`.
///
/// Negative coordinates are mirrored about zero and coordinates past the
/// end are mirrored about the last pixel, both after wrapping modulo `size`.
#[inline]
fn reflect(coord: i64, size: i64) -> i64 {
    if coord < 0 {
        (-coord) % size
    } else if coord >= size {
        size - 1 - (coord % size)
    } else {
        coord
    }
}

/// Convolve the neighbourhood of `(x, y)` with a `rows` x `cols` kernel.
///
/// The kernel is row-major and centred on the pixel. Every channel,
/// alpha included, is summed independently, divided by `divisor` when
/// non-zero, offset by `bias` and clamped. Samples outside the image are
/// taken with [`reflect`] rather than clamped to the edge.
#[allow(clippy::too_many_arguments)]
pub fn convolve(
    image: &RgbaImage,
    x: u32,
    y: u32,
    kernel: &[i32],
    rows: usize,
    cols: usize,
    divisor: i32,
    bias: i32,
) -> Rgba<u8> {
    let width = image.width() as i64;
    let height = image.height() as i64;
    if width == 0 || height == 0 || kernel.len() < rows * cols {
        return Rgba([0, 0, 0, 0]);
    }

    let col_offset = x as i64 - (cols / 2) as i64;
    let row_offset = y as i64 - (rows / 2) as i64;

    let mut sums = [0i32; 4];
    for ky in 0..rows {
        let sy = reflect(row_offset + ky as i64, height) as u32;
        for kx in 0..cols {
            let sx = reflect(col_offset + kx as i64, width) as u32;
            let weight = kernel[ky * cols + kx];
            let sample = image.get_pixel(sx, sy);
            for (sum, channel) in sums.iter_mut().zip(sample.0.iter()) {
                *sum += *channel as i32 * weight;
            }
        }
    }

    let mut out = [0u8; 4];
    for (dst, sum) in out.iter_mut().zip(sums.iter()) {
        let mut value = *sum;
        if divisor != 0 {
            value /= divisor;
        }
        *dst = clamp_channel(value + bias);
    }
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scale_basic() {
        assert_eq!(scale(0, 0, 255, 64, 192), 64);
        assert_eq!(scale(255, 0, 255, 64, 192), 192);
        assert_eq!(scale(128, 0, 255, 64, 192), 128);
        assert_eq!(scale(50, 0, 100, 0, 10), 5);
        // Truncates toward zero
        assert_eq!(scale(1, 0, 3, 0, 2), 0);
        assert_eq!(scale(-1, 0, 3, 0, 2), 0);
    }

    #[test]
    fn test_scale_degenerate_range() {
        assert_eq!(scale(7, 5, 5, 10, 20), 10);
        assert_eq!(scale(i32::MAX, 0, 0, -3, 3), -3);
        assert_eq!(scale_f64(0.5, 1.0, 1.0, 2.0, 4.0), 2.0);
    }

    #[test]
    fn test_merge_channels_truncation() {
        // 255*50/100 + 0*50/100 = 127, not 127.5 rounded
        assert_eq!(merge_channels(255, 0, 50, 100), 127);
        // Two separate truncations: 1*1/3 + 1*2/3 = 0 + 0
        assert_eq!(merge_channels(1, 1, 1, 3), 0);
        assert_eq!(merge_channels(9, 4, 3, 0), 4);
    }

    #[test]
    fn test_reflect() {
        assert_eq!(reflect(-1, 4), 1);
        assert_eq!(reflect(-5, 4), 1);
        assert_eq!(reflect(4, 4), 3);
        assert_eq!(reflect(5, 4), 2);
        assert_eq!(reflect(2, 4), 2);
    }

    #[test]
    fn test_convolve_identity_kernel() {
        let mut img = RgbaImage::new(3, 3);
        img.put_pixel(1, 1, Rgba([10, 20, 30, 255]));
        let kernel = [0, 0, 0, 0, 1, 0, 0, 0, 0];
        assert_eq!(convolve(&img, 1, 1, &kernel, 3, 3, 1, 0), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_convolve_reflects_at_edges() {
        // A single bright column at x = 1; sampling at x = 0 with a
        // left-neighbour kernel reflects -1 to 1 and sees it.
        let mut img = RgbaImage::from_pixel(4, 1, Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 0, Rgba([200, 100, 50, 255]));
        let left = [1, 0, 0];
        assert_eq!(convolve(&img, 0, 0, &left, 1, 3, 0, 0), Rgba([200, 100, 50, 255]));

        // Clamping would have sampled x = 0 instead
        let mut img = RgbaImage::from_pixel(4, 1, Rgba([0, 0, 0, 0]));
        img.put_pixel(0, 0, Rgba([200, 100, 50, 255]));
        assert_eq!(convolve(&img, 0, 0, &left, 1, 3, 0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_convolve_divisor_and_bias() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([100, 100, 100, 100]));
        let blur = [1, 2, 1, 2, 2, 2, 1, 2, 1];
        assert_eq!(convolve(&img, 1, 1, &blur, 3, 3, 14, 0), Rgba([100, 100, 100, 100]));
        assert_eq!(convolve(&img, 0, 0, &blur, 3, 3, 14, 200), Rgba([255, 255, 255, 255]));
    }

    proptest! {
        #[test]
        fn test_merge_full_weight_identity(x in 0i32..=255, y in 0i32..=255) {
            prop_assert_eq!(merge_channels(x, y, 100, 100), x);
            prop_assert_eq!(merge_channels(x, y, 0, 100), y);
        }

        #[test]
        fn test_merge_stays_in_range(x in 0i32..=255, y in 0i32..=255, w in 0i32..=100) {
            let merged = merge_channels(x, y, w, 100);
            prop_assert!((0..=255).contains(&merged));
        }

        #[test]
        fn test_scale_endpoints(a in -500i32..500, span in 1i32..500, d0 in -255i32..255, d1 in -255i32..255) {
            prop_assert_eq!(scale(a, a, a + span, d0, d1), d0);
            prop_assert_eq!(scale(a + span, a, a + span, d0, d1), d1);
        }
    }
}
