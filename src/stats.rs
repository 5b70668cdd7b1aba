pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Sample (n - 1) standard deviation. Zero for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;

    variance.sqrt()
}

/// Absolute differences between each consecutive pair, in order.
pub fn consecutive_differences(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|pair| (pair[1] - pair[0]).abs()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[10.0, 20.0, 15.0, 25.0, 30.0]), Some(20.0));
    }

    #[test]
    fn test_min_max() {
        let values = [10.0, 20.0, 15.0, 25.0, 30.0];
        assert_eq!(min(&values), Some(10.0));
        assert_eq!(max(&values), Some(30.0));
        assert_eq!(min(&[]), None);
        assert_eq!(max(&[]), None);
    }

    #[test]
    fn test_std_dev_single_value_is_zero() {
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(std_dev(&[5.0]), 0.0);
    }

    #[test]
    fn test_std_dev_is_sample_deviation() {
        // Differences [5, 2]: mean 3.5, variance (2.25 + 2.25) / 1
        let sd = std_dev(&[5.0, 2.0]);
        assert!((sd - 4.5_f64.sqrt()).abs() < 1e-12);

        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_consecutive_differences_keeps_order() {
        assert_eq!(consecutive_differences(&[10.0, 15.0, 13.0]), vec![5.0, 2.0]);
        assert!(consecutive_differences(&[10.0]).is_empty());
        assert!(consecutive_differences(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_mean_between_min_and_max(values in prop::collection::vec(0.0f64..10_000.0, 1..50)) {
            let mean = mean(&values).unwrap();
            prop_assert!(min(&values).unwrap() <= mean + 1e-9);
            prop_assert!(mean <= max(&values).unwrap() + 1e-9);
        }

        #[test]
        fn prop_differences_are_one_shorter_and_non_negative(values in prop::collection::vec(0.0f64..10_000.0, 1..50)) {
            let diffs = consecutive_differences(&values);
            prop_assert_eq!(diffs.len(), values.len() - 1);
            prop_assert!(diffs.iter().all(|d| *d >= 0.0));
        }
    }
}
