use lotofacil_core::FilterConfig;

const MIN_COVERAGE: f64 = 0.05;
const MIN_STRENGTH: f64 = 1e-4;

/// Probabilité estimée qu'une combinaison aléatoire satisfasse tous les filtres actifs.
///
/// Chaque filtre actif contribue `taux_historique × max(couverture, 0.05)`,
/// borné à [1e-4, 1] ; les contributions sont combinées par moyenne géométrique.
pub fn estimate_success_probability(filters: &[FilterConfig]) -> f64 {
    let log_strengths: Vec<f64> = filters
        .iter()
        .filter(|f| f.is_enabled())
        .map(|f| filter_strength(f).ln())
        .collect();

    if log_strengths.is_empty() {
        return 1.0;
    }

    let mean_log = log_strengths.iter().sum::<f64>() / log_strengths.len() as f64;
    mean_log.exp().clamp(0.0, 1.0)
}

fn filter_strength(filter: &FilterConfig) -> f64 {
    let rate = filter.dimension().historical_success_rate();
    let coverage = filter.coverage_percentage().max(MIN_COVERAGE);
    (rate * coverage).clamp(MIN_STRENGTH, 1.0)
}

/// Nombre moyen de tirages aléatoires pour obtenir une combinaison valide.
pub fn expected_attempts(probability: f64) -> Option<u64> {
    if probability <= 0.0 || !probability.is_finite() {
        return None;
    }
    Some((1.0 / probability).ceil() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotofacil_core::{FilterDimension, ValueRange};
    use proptest::prelude::*;

    #[test]
    fn test_no_filters_is_certain() {
        assert_eq!(estimate_success_probability(&[]), 1.0);
    }

    #[test]
    fn test_disabled_filters_ignored() {
        let filters: Vec<FilterConfig> = FilterDimension::ALL.iter().map(|&d| FilterConfig::disabled(d)).collect();
        assert_eq!(estimate_success_probability(&filters), 1.0);
    }

    #[test]
    fn test_single_full_range_equals_rate() {
        let sum = FilterConfig::new(FilterDimension::Sum, true, FilterDimension::Sum.full_range()).unwrap();
        let p = estimate_success_probability(&[sum]);
        assert!((p - FilterDimension::Sum.historical_success_rate()).abs() < 1e-12, "p = {}", p);
    }

    #[test]
    fn test_zero_width_uses_coverage_floor() {
        let sum = FilterConfig::new(FilterDimension::Sum, true, ValueRange::new(190, 190)).unwrap();
        let p = estimate_success_probability(&[sum]);
        assert!((p - 0.84 * 0.05).abs() < 1e-12, "p = {}", p);
        assert!(p > 0.0);
    }

    #[test]
    fn test_geometric_mean_of_two() {
        let a = FilterConfig::new(FilterDimension::Sum, true, FilterDimension::Sum.full_range()).unwrap();
        let b = FilterConfig::new(FilterDimension::Even, true, FilterDimension::Even.full_range()).unwrap();
        let p = estimate_success_probability(&[a, b]);
        let expected = (0.84f64 * 0.82).sqrt();
        assert!((p - expected).abs() < 1e-12);
    }

    #[test]
    fn test_expected_attempts() {
        assert_eq!(expected_attempts(1.0), Some(1));
        assert_eq!(expected_attempts(0.3), Some(4));
        assert_eq!(expected_attempts(0.0), None);
    }

    proptest! {
        #[test]
        fn narrowing_never_increases(start in 120u32..=270, len in 0u32..=150, shrink in 0u32..=150) {
            let end = (start + len).min(270);
            let narrowed_end = end.saturating_sub(shrink).max(start);
            let others = FilterConfig::default_for(FilterDimension::Prime);
            let wide = FilterConfig::new(FilterDimension::Sum, true, ValueRange::new(start, end)).unwrap();
            let narrow = FilterConfig::new(FilterDimension::Sum, true, ValueRange::new(start, narrowed_end)).unwrap();
            let p_wide = estimate_success_probability(&[wide, others]);
            let p_narrow = estimate_success_probability(&[narrow, others]);
            prop_assert!(p_narrow <= p_wide + 1e-15);
            prop_assert!((0.0..=1.0).contains(&p_narrow));
        }
    }
}
