use feature_engine::{compute_statistics, StatisticsConfig};
use proptest::prelude::*;
use spectrum::{compute_spectrum, WindowKind};

proptest! {
    #[test]
    fn statistics_are_bit_identical_across_calls(
        samples in proptest::collection::vec(-10.0f64..10.0, 16..600)
    ) {
        let spectrum = compute_spectrum(&samples, 1000.0, WindowKind::Hanning, 50.0).unwrap();
        let config = StatisticsConfig::default();
        let first = compute_statistics(&samples, &spectrum, &config);
        let second = compute_statistics(&samples, &spectrum, &config);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn successful_bundles_are_finite(
        samples in proptest::collection::vec(-10.0f64..10.0, 16..256)
    ) {
        let spectrum = compute_spectrum(&samples, 500.0, WindowKind::Hamming, 0.0).unwrap();
        if let Ok(bundle) = compute_statistics(&samples, &spectrum, &StatisticsConfig::default()) {
            prop_assert!(bundle.temporal.kurtosis.is_finite());
            prop_assert!(bundle.spectral.entropy >= 0.0);
            prop_assert!(bundle.spectral.flatness >= 0.0);
            prop_assert!(bundle.diagnostic.normality.p_value > 0.0);
        }
    }
}
