/// Arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Arithmetic sum of a slice of values. Returns `None` for empty input, so an
/// all-missing year is not reported as a total of zero.
pub fn sum(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum())
}

/// Rounds to two decimal places, half away from zero (`0.125` -> `0.13`).
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_values() {
        assert_eq!(mean(&[1.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[4.0]), Some(4.0));
    }

    #[test]
    fn test_sum_empty_is_undefined() {
        assert_eq!(sum(&[]), None);
    }

    #[test]
    fn test_sum_values() {
        assert_eq!(sum(&[1.0, 2.0, 0.5]), Some(3.5));
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to_cents(0.125), 0.13);
        assert_eq!(round_to_cents(-0.125), -0.13);
        assert_eq!(round_to_cents(2.0), 2.0);
        assert_eq!(round_to_cents(27.456), 27.46);
        assert_eq!(round_to_cents(27.454), 27.45);
    }
}
