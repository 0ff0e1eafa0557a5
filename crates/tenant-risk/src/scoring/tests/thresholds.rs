use super::common::*;
use crate::scoring::thresholds::{
    clamp_to_bands, cost_adjustment, vacancy_adjustment, volume_adjustment, BASE_AUTO_APPROVE,
    BASE_AUTO_REJECT, BASE_MANUAL_REVIEW,
};
use crate::scoring::{
    compute_thresholds, AdjustmentFactor, ApplicationVolume, CostParameters, MarketContext,
    ThresholdSet, ValidationError,
};

fn market(vacancy_rate: f64, application_volume: ApplicationVolume) -> MarketContext {
    MarketContext {
        vacancy_rate,
        application_volume,
    }
}

#[test]
fn neutral_inputs_keep_the_base_prior() {
    let thresholds = compute_thresholds(&neutral_costs(), None).expect("valid inputs");

    assert_eq!(thresholds.auto_approve, BASE_AUTO_APPROVE);
    assert_eq!(thresholds.manual_review, BASE_MANUAL_REVIEW);
    assert_eq!(thresholds.auto_reject, BASE_AUTO_REJECT);
    assert!(thresholds.adjustments.is_empty());
    assert!(thresholds.reasoning.contains("cost ratio 1.00 (neutral)"));
}

#[test]
fn expensive_false_positives_raise_thresholds() {
    let costs = CostParameters::new(5000.0, 3000.0);

    let thresholds = compute_thresholds(&costs, None).expect("valid inputs");

    assert!(thresholds.auto_approve > BASE_AUTO_APPROVE);
    assert!(thresholds.manual_review > BASE_MANUAL_REVIEW);
    assert!(thresholds.auto_reject > BASE_AUTO_REJECT);
    let adjustment = thresholds
        .adjustments
        .iter()
        .find(|adjustment| adjustment.factor == AdjustmentFactor::CostRatio)
        .expect("cost adjustment recorded");
    assert!(adjustment.shift > 0.0);
    assert!(thresholds.reasoning.contains("cost ratio 1.67 (lenient)"));
}

#[test]
fn expensive_false_negatives_lower_thresholds() {
    let costs = CostParameters::new(1000.0, 2000.0);

    let thresholds = compute_thresholds(&costs, None).expect("valid inputs");

    assert!(thresholds.auto_approve < BASE_AUTO_APPROVE);
    assert!(thresholds.auto_reject < BASE_AUTO_REJECT);
    assert!(thresholds.reasoning.contains("(strict)"));
}

#[test]
fn cost_ratio_inside_neutral_range_has_no_effect() {
    for ratio in [0.7, 1.0, 1.2, 1.5] {
        assert_eq!(cost_adjustment(ratio).shift, 0.0, "ratio {ratio}");
    }
}

#[test]
fn cost_shift_scales_with_ratio_and_is_capped() {
    let moderate = cost_adjustment(2.0).shift;
    let large = cost_adjustment(4.0).shift;
    assert!(moderate > 0.0);
    assert!(large > moderate);

    assert_eq!(cost_adjustment(1.0e6).shift, 0.10);
    assert_eq!(cost_adjustment(1.0e-6).shift, -0.10);
}

#[test]
fn vacancy_bands_nudge_thresholds() {
    assert!(vacancy_adjustment(0.12).shift > 0.0);
    assert!(vacancy_adjustment(0.02).shift < 0.0);
    assert_eq!(vacancy_adjustment(0.10).shift, 0.0);
    assert_eq!(vacancy_adjustment(0.03).shift, 0.0);
    assert_eq!(vacancy_adjustment(0.05).shift, 0.0);
}

#[test]
fn application_volume_nudges_thresholds() {
    assert!(volume_adjustment(ApplicationVolume::Low).shift > 0.0);
    assert_eq!(volume_adjustment(ApplicationVolume::Normal).shift, 0.0);
    assert!(volume_adjustment(ApplicationVolume::High).shift < 0.0);
}

#[test]
fn slack_market_is_more_lenient_than_tight_market() {
    let slack = compute_thresholds(
        &neutral_costs(),
        Some(&market(0.12, ApplicationVolume::Low)),
    )
    .expect("valid inputs");
    let tight = compute_thresholds(
        &neutral_costs(),
        Some(&market(0.02, ApplicationVolume::High)),
    )
    .expect("valid inputs");

    assert!(slack.auto_approve > tight.auto_approve);
    assert!(slack.manual_review > tight.manual_review);
    assert!(slack.auto_reject > tight.auto_reject);
    assert_eq!(slack.adjustments.len(), 2);
    assert!(slack.reasoning.contains("(high)"));
    assert!(tight.reasoning.contains("(tight)"));
    assert!(tight.reasoning.contains("high application volume"));
}

#[test]
fn thresholds_stay_ordered_and_within_bands_for_all_inputs() {
    let amounts = [1.0, 250.0, 1000.0, 3000.0, 5000.0, 1.0e6];
    let vacancies = [0.0, 0.02, 0.03, 0.05, 0.10, 0.12, 0.5, 1.0];
    let volumes = [
        ApplicationVolume::Low,
        ApplicationVolume::Normal,
        ApplicationVolume::High,
    ];

    for fp in amounts {
        for fn_cost in amounts {
            for vacancy in vacancies {
                for volume in volumes {
                    let thresholds = compute_thresholds(
                        &CostParameters::new(fp, fn_cost),
                        Some(&market(vacancy, volume)),
                    )
                    .expect("valid inputs");

                    thresholds.validate().expect("ordering holds");
                    assert!((0.20..=0.50).contains(&thresholds.auto_approve));
                    assert!((0.55..=0.80).contains(&thresholds.manual_review));
                    assert!((0.75..=0.95).contains(&thresholds.auto_reject));
                }
            }
        }
    }
}

#[test]
fn repeated_computation_never_drifts() {
    let costs = CostParameters::new(5000.0, 3000.0);
    let context = market(0.12, ApplicationVolume::Low);
    let first = compute_thresholds(&costs, Some(&context)).expect("valid inputs");

    for _ in 0..100 {
        let again = compute_thresholds(&costs, Some(&context)).expect("valid inputs");
        assert_eq!(again.auto_approve.to_bits(), first.auto_approve.to_bits());
        assert_eq!(again.manual_review.to_bits(), first.manual_review.to_bits());
        assert_eq!(again.auto_reject.to_bits(), first.auto_reject.to_bits());
        assert_eq!(again, first);
    }
}

#[test]
fn missing_market_uses_defaults() {
    let implicit = compute_thresholds(&neutral_costs(), None).expect("valid inputs");
    let explicit =
        compute_thresholds(&neutral_costs(), Some(&MarketContext::default())).expect("valid");
    assert_eq!(implicit, explicit);
}

#[test]
fn rejects_non_positive_costs() {
    for costs in [
        CostParameters::new(0.0, 1000.0),
        CostParameters::new(1000.0, -5.0),
        CostParameters::new(f64::NAN, 1000.0),
    ] {
        let err = compute_thresholds(&costs, None).expect_err("invalid cost");
        assert!(matches!(err, ValidationError::NonPositiveCost { .. }));
    }
}

#[test]
fn rejects_vacancy_outside_unit_interval() {
    for vacancy in [-0.01, 1.5, f64::NAN] {
        let err = compute_thresholds(
            &neutral_costs(),
            Some(&market(vacancy, ApplicationVolume::Normal)),
        )
        .expect_err("invalid vacancy");
        assert!(matches!(err, ValidationError::VacancyRateOutOfRange(_)));
    }
}

#[test]
fn clamping_pins_values_to_operating_bands() {
    assert_eq!(clamp_to_bands(0.9, 0.9, 0.99), (0.50, 0.80, 0.95));
    assert_eq!(clamp_to_bands(0.1, 0.3, 0.5), (0.20, 0.55, 0.75));
}

#[test]
fn crossed_bounds_are_compressed_around_their_midpoint() {
    let (auto_approve, manual_review, auto_reject) = clamp_to_bands(0.35, 0.80, 0.76);

    assert_eq!(auto_approve, 0.35);
    assert!(manual_review < auto_reject);
    assert_close((manual_review + auto_reject) / 2.0, 0.78);
    assert_close(auto_reject - manual_review, 0.01);
}

#[test]
fn explicit_sets_must_be_ordered() {
    assert!(ThresholdSet::new(0.3, 0.6, 0.9).is_ok());
    for (a, m, r) in [(0.5, 0.4, 0.9), (0.0, 0.5, 0.9), (0.3, 0.6, 1.0), (0.3, 0.6, 0.6)] {
        let err = ThresholdSet::new(a, m, r).expect_err("ordering violated");
        assert!(matches!(err, ValidationError::ThresholdOrdering { .. }));
    }
}
