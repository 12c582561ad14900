//! Property-based tests for the fixed-point core.
//!
//! These pin the rounding contract and the invariants every predictor leans on:
//! floor multiply, bounded nonlinearities, pure evaluation, monotone counters.

use proptest::prelude::*;

use reflex::core::activation::{sigmoid, tanh, Activation};
use reflex::core::dense::{FeedForward, LayerConfig, LayerWeights, NetworkConfig};
use reflex::core::fixed::{Fixed, ONE};
use reflex::core::recurrent::{density, History};
use reflex::core::stats::RunningStats;
use reflex::core::weights::{fingerprint, verify_fingerprint};

const LAYERS: [LayerConfig; 2] = [
    LayerConfig::new(3, Activation::Tanh),
    LayerConfig::new(2, Activation::Sigmoid),
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn mul_is_floor_of_scaled_product(a in any::<i32>(), b in any::<i32>()) {
        let wide = (a as i64 * b as i64).div_euclid(1 << 12);
        let expected = wide.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        prop_assert_eq!((Fixed::from_raw(a) * Fixed::from_raw(b)).raw(), expected);
    }

    #[test]
    fn add_saturates(a in any::<i32>(), b in any::<i32>()) {
        let expected = (a as i64 + b as i64).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        prop_assert_eq!((Fixed::from_raw(a) + Fixed::from_raw(b)).raw(), expected);
    }

    #[test]
    fn activations_stay_bounded(raw in any::<i32>()) {
        let x = Fixed::from_raw(raw);
        let s = sigmoid(x);
        prop_assert!(s >= Fixed::ZERO && s <= Fixed::ONE);
        prop_assert!(tanh(x).abs() <= Fixed::ONE);
    }

    #[test]
    fn activations_monotone(a in any::<i32>(), b in any::<i32>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(sigmoid(Fixed::from_raw(lo)) <= sigmoid(Fixed::from_raw(hi)));
        prop_assert!(tanh(Fixed::from_raw(lo)) <= tanh(Fixed::from_raw(hi)));
    }

    #[test]
    fn feed_forward_is_pure(
        w1 in prop::collection::vec(-2 * ONE..2 * ONE, 6),
        w2 in prop::collection::vec(-2 * ONE..2 * ONE, 6),
        x in prop::collection::vec(any::<i32>(), 2),
    ) {
        let w1: Vec<Fixed> = w1.into_iter().map(Fixed::from_raw).collect();
        let w2: Vec<Fixed> = w2.into_iter().map(Fixed::from_raw).collect();
        let b1 = [Fixed::ZERO; 3];
        let b2 = [Fixed::HALF; 2];
        let net = FeedForward::new(
            &NetworkConfig::new(2, &LAYERS),
            &[LayerWeights::new(&w1, &b1), LayerWeights::new(&w2, &b2)],
        ).unwrap();

        let x: Vec<Fixed> = x.into_iter().map(Fixed::from_raw).collect();
        let first = net.forward(&x);
        prop_assert_eq!(first.len(), 2);
        prop_assert_eq!(&first, &net.forward(&x));
        prop_assert!(first.iter().all(|y| *y >= Fixed::ZERO && *y <= Fixed::ONE));
    }

    #[test]
    fn history_holds_latest_in_order(ids in prop::collection::vec(any::<u64>(), 0..40)) {
        let mut history = History::<8>::new();
        for &id in &ids {
            history.push(id);
        }
        let mut expected = [0u64; 8];
        let tail = &ids[ids.len().saturating_sub(8)..];
        expected[8 - tail.len()..].copy_from_slice(tail);
        prop_assert_eq!(history.to_array(), expected);
    }

    #[test]
    fn density_in_unit_interval(raw in any::<u64>()) {
        let d = density(raw);
        prop_assert!(d.is_positive() && d <= Fixed::ONE);
    }

    #[test]
    fn welford_count_grows_and_m2_nonnegative(
        xs in prop::collection::vec((-64 * ONE..64 * ONE, -ONE..ONE), 1..200),
    ) {
        let mut stats = RunningStats::<2>::new();
        for (i, &(a, b)) in xs.iter().enumerate() {
            stats.observe(&[Fixed::from_raw(a), Fixed::from_raw(b)]);
            prop_assert_eq!(stats.count(), i as u64 + 1);
            prop_assert!(stats.m2().iter().all(|&m| m >= 0));
            prop_assert!(stats.variance(0).raw() >= 0);
        }
    }

    #[test]
    fn fingerprint_detects_any_flip(
        table in prop::collection::vec(any::<i32>(), 1..64),
        index in any::<prop::sample::Index>(),
        bit in 0u32..32,
    ) {
        let table: Vec<Fixed> = table.into_iter().map(Fixed::from_raw).collect();
        let digest = fingerprint(&[table.as_slice()]);
        prop_assert!(verify_fingerprint(&[table.as_slice()], &digest).is_ok());

        let mut tampered = table.clone();
        let i = index.index(tampered.len());
        tampered[i] = Fixed::from_raw(tampered[i].raw() ^ (1 << bit));
        prop_assert!(verify_fingerprint(&[tampered.as_slice()], &digest).is_err());
    }
}
