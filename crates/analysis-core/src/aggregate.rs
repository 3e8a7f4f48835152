/// Reduce per-article compound scores to one company-level score.
///
/// Arithmetic mean of `values`, or `0.0` for an empty slice.
pub fn mean_compound(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_is_zero() {
        assert_eq!(mean_compound(&[]), 0.0);
    }

    #[test]
    fn test_mean_compound() {
        let m = mean_compound(&[0.5, -0.1, 0.2]);
        assert!((m - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_mean_single_value() {
        assert_eq!(mean_compound(&[-0.75]), -0.75);
    }

    #[test]
    fn test_mean_stays_in_range() {
        let m = mean_compound(&[1.0, 1.0, -1.0, 1.0]);
        assert!((-1.0..=1.0).contains(&m));
        assert!((m - 0.5).abs() < 1e-12);
    }
}
