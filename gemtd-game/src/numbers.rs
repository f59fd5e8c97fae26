//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f64 and clamp it to the u32 range, returning 0 for non-finite values.
#[must_use]
pub fn floor_f64_to_u32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(0.0, max).floor();
    cast::<f64, u32>(clamped).unwrap_or(0)
}

/// Scale a whole-unit amount by a fraction and floor the result.
#[must_use]
pub fn scale_floor(amount: u32, factor: f64) -> u32 {
    floor_f64_to_u32(f64::from(amount) * factor)
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Divide two counts, returning 0.0 when the denominator is zero.
#[must_use]
pub fn fraction(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    count_to_f64(numerator) / count_to_f64(denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_handles_non_finite_and_negative() {
        assert_eq!(floor_f64_to_u32(f64::NAN), 0);
        assert_eq!(floor_f64_to_u32(f64::INFINITY), 0);
        assert_eq!(floor_f64_to_u32(-4.5), 0);
        assert_eq!(floor_f64_to_u32(175.99), 175);
        assert_eq!(floor_f64_to_u32(f64::from(u32::MAX) * 2.0), u32::MAX);
    }

    #[test]
    fn scale_floor_truncates_like_whole_money() {
        assert_eq!(scale_floor(220, 0.8), 176);
        assert_eq!(scale_floor(220, 0.15), 33);
        assert_eq!(scale_floor(220, 0.05), 11);
    }

    #[test]
    fn fraction_guards_zero_denominator() {
        assert!((fraction(3, 4) - 0.75).abs() < f64::EPSILON);
        assert!(fraction(3, 0).abs() < f64::EPSILON);
    }
}
