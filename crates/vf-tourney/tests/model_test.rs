//! Tournament model integration tests
//!
//! Fits payout and skill curves across a range of fields and checks the
//! combined outcome distribution and the Monte Carlo aggregates built on it.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use vf_core::{Unobserved, WarningKind};
use vf_tourney::{OutcomeSet, PayoutModel, SkillModel, TournamentRun, simulate_tournaments};

const FIELDS: &[(u32, f64, f64)] = &[
    // (field, percent paid, top prize multiple)
    (9, 33.4, 4.0),
    (45, 15.0, 10.0),
    (180, 12.5, 30.0),
    (1000, 20.0, 50.0),
    (5000, 15.0, 300.0),
];

#[test]
fn test_fitted_models_are_consistent() {
    for &(field, pct, multiple) in FIELDS {
        let payout = PayoutModel::fit(field, pct, 10.0, multiple).unwrap();
        for roi in [-0.2, 0.0, 0.15, 0.6] {
            let skill = SkillModel::fit(&payout, 11.0, roi).unwrap();
            assert!(skill.warnings.is_empty(), "field {field}, roi {roi}");
            assert_abs_diff_eq!(skill.achieved_roi, roi, epsilon = 1e-6);

            let set = OutcomeSet::new(&payout, &skill);
            let stats = set.stats();
            assert_abs_diff_eq!(stats.roi, roi, epsilon = 1e-6);
            assert_abs_diff_eq!(stats.itm_probability + stats.bust_probability, 1.0, epsilon = 1e-9);
            assert_relative_eq!(
                payout.prizes.iter().sum::<f64>(),
                payout.prize_pool,
                max_relative = 1e-6
            );
        }
    }
}

#[test]
fn test_clamps_surface_as_warnings() {
    let payout = PayoutModel::fit(20, 10.0, 50.0, 100.0).unwrap();
    assert_eq!(payout.warnings[0].kind, WarningKind::TopPrizeClamped);
    let skill = SkillModel::fit(&payout, 55.0, 50.0).unwrap();
    assert_eq!(skill.warnings[0].kind, WarningKind::RoiAboveMaximum);
    assert!(skill.achieved_roi <= skill.max_roi + 1e-9);
}

#[test]
fn test_simulated_roi_tracks_model() {
    let payout = PayoutModel::fit(180, 12.5, 10.0, 30.0).unwrap();
    let skill = SkillModel::fit(&payout, 11.0, 0.15).unwrap();
    let set = OutcomeSet::new(&payout, &skill);
    let run = TournamentRun {
        tournaments: 1_000,
        num_trials: 1_000,
        bankroll: 1_000.0,
        thresholds: vec![250.0, 500.0],
        sample_paths: 3,
        max_points: 100,
        seed: 2024,
    };
    let result = simulate_tournaments(&set, &run, &mut Unobserved).unwrap();
    // Mean over 1M entries: standard error of ROI is about 0.004
    assert_abs_diff_eq!(result.mean_roi, 0.15, epsilon = 0.03);
    assert!(result.bust_probability > 0.0 && result.bust_probability < 1.0);
    assert!(result.thresholds[0].probability >= result.thresholds[1].probability);
}
