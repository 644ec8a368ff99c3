//! Kernel support helpers.

/// Integer offsets `ceil(-W) ..= floor(W)` visited around a rounded coordinate.
///
/// A width below one still yields the centre tap `[0]`.
pub fn kernel_offsets(width: f32) -> Vec<i64> {
    let lo = (-width).ceil() as i64;
    let hi = width.floor() as i64;
    (lo..=hi).collect()
}

/// Number of taps per axis for a kernel half-width.
pub fn taps_per_axis(width: f32) -> usize {
    let lo = (-width).ceil() as i64;
    let hi = width.floor() as i64;
    (hi - lo + 1).max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_width_offsets() {
        assert_eq!(kernel_offsets(3.0), vec![-3, -2, -1, 0, 1, 2, 3]);
        assert_eq!(taps_per_axis(3.0), 7);
    }

    #[test]
    fn test_fractional_width_offsets() {
        assert_eq!(kernel_offsets(2.5), vec![-2, -1, 0, 1, 2]);
        assert_eq!(kernel_offsets(0.5), vec![0]);
        assert_eq!(taps_per_axis(0.5), 1);
    }
}
