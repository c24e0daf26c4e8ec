//! Plateau detection over the trailing-average reward history.

/// Check whether recent reward improvement has become negligible.
///
/// Compares the mean of the last `patience` entries against the mean of
/// the last `2·patience` entries; a plateau is declared when their
/// relative difference falls below 0.1%. Histories shorter than
/// `2·patience` never plateau, and a zero recent mean makes the relative
/// difference non-finite, which also reports no plateau.
pub fn has_plateaued(mean_history: &[f32], patience: usize) -> bool {
    if patience == 0 || mean_history.len() < 2 * patience {
        return false;
    }

    let single = mean(&mean_history[mean_history.len() - patience..]);
    let double = mean(&mean_history[mean_history.len() - 2 * patience..]);

    ((single - double) / single).abs() < 1e-3
}

fn mean(values: &[f32]) -> f64 {
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_history_never_plateaus() {
        let history = vec![5.0; 9];
        assert!(!has_plateaued(&history, 5));
    }

    #[test]
    fn test_flat_history_plateaus_at_twice_patience() {
        let mut history = vec![3.2; 9];
        assert!(!has_plateaued(&history, 5));

        history.push(3.2);
        assert_eq!(history.len(), 10);
        assert!(has_plateaued(&history, 5));
    }

    #[test]
    fn test_improving_history_does_not_plateau() {
        let history: Vec<f32> = (0..40).map(|i| i as f32).collect();
        assert!(!has_plateaued(&history, 10));
    }

    #[test]
    fn test_only_the_trailing_windows_matter() {
        // Early noise, then flat: both windows sit inside the flat tail.
        let mut history: Vec<f32> = (0..50).map(|i| (i % 7) as f32).collect();
        history.extend(std::iter::repeat(42.0).take(20));
        assert!(has_plateaued(&history, 10));
    }

    #[test]
    fn test_zero_mean_reports_no_plateau() {
        let history = vec![0.0; 20];
        assert!(!has_plateaued(&history, 5));
    }

    #[test]
    fn test_zero_patience_is_inert() {
        let history = vec![1.0; 100];
        assert!(!has_plateaued(&history, 0));
    }
}
