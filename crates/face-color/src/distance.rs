//! Perceptual color distance.
//!
//! Red-mean weighted Euclidean metric ("Colour metric", T. Riemersma),
//! computed on 16-bit channels reduced to 8 bits.

use crate::color::Color;

/// Distance between two colors. Zero for identical colors; pure black
/// against pure white is 584_970.
pub fn color_distance(x: Color, y: Color) -> i64 {
    let r = channel_delta(x.red, y.red);
    let g = channel_delta(x.green, y.green);
    let b = channel_delta(x.blue, y.blue);
    let r_mean = (x.red as i64 + y.red as i64) >> 9;

    (((512 + r_mean) * r * r) >> 8) + 4 * g * g + (((767 - r_mean) * b * b) >> 8)
}

/// Absolute difference reduced to 8 bits, so the metric is symmetric.
fn channel_delta(a: u16, b: u16) -> i64 {
    ((a as i64 - b as i64).abs()) >> 8
}

/// True for colors close to black, or whose channels are within 5% of
/// each other.
pub fn is_gray(color: Color) -> bool {
    let (r, g, b) = (color.red as i64, color.green as i64, color.blue as i64);
    if r < 5000 && g < 5000 && b < 5000 {
        return true;
    }
    (r - g).abs() < r.max(g) / 20 && (g - b).abs() < g.max(b) / 20 && (b - r).abs() < b.max(r) / 20
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_identical_colors_have_zero_distance() {
        let c = Color::from_rgb8(12, 200, 99);
        assert_eq!(color_distance(c, c), 0);
    }

    #[test]
    fn test_black_white_distance() {
        // r = g = b = 255, r_mean = 127
        let expected = ((639 * 255 * 255) >> 8) + 4 * 255 * 255 + ((640 * 255 * 255) >> 8);
        assert_eq!(color_distance(Color::BLACK, Color::WHITE), expected);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let x = Color::new(rng.random(), rng.random(), rng.random());
            let y = Color::new(rng.random(), rng.random(), rng.random());
            assert_eq!(color_distance(x, y), color_distance(y, x), "{x} vs {y}");
        }
    }

    #[test]
    fn test_green_weighs_more_than_blue() {
        let green = color_distance(Color::BLACK, Color::from_rgb8(0, 128, 0));
        let blue = color_distance(Color::BLACK, Color::from_rgb8(0, 0, 128));
        assert!(green > blue);
    }

    #[test]
    fn test_is_gray() {
        assert!(is_gray(Color::BLACK));
        assert!(is_gray(Color::WHITE));
        assert!(is_gray(Color::from_rgb8(128, 128, 128)));
        assert!(is_gray(Color::new(4000, 100, 4999)));
        assert!(!is_gray(Color::from_rgb8(255, 0, 0)));
        assert!(!is_gray(Color::from_rgb8(128, 140, 128)));
    }
}
