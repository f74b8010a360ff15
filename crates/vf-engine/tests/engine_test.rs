//! Engine integration tests
//!
//! Runs every operation end to end and checks determinism, progress
//! reporting and the agreement between simulation and closed forms.

use approx::assert_abs_diff_eq;
use vf_engine::{
    EngineMessage, EngineRequest, EngineResponse, GameParameters, ModeConfig, ProgressTracker,
    SimulationMode, TournamentParameters, Unobserved, VfError, build_tournament_model, dispatch,
    run_cash_game_simulation, run_downswing_estimate, run_tournament_simulation,
};

fn quick() -> ModeConfig {
    ModeConfig { path_count: 10, downswing_simulations: 300, ..ModeConfig::turbo() }
}

fn tournament() -> TournamentParameters {
    TournamentParameters {
        field_size: 180,
        percent_paid: 15.0,
        buy_in: 10.0,
        fee: 1.0,
        top_prize_multiple: 30.0,
        roi_target_percent: 15.0,
    }
}

#[test]
fn test_cash_game_is_reproducible() {
    let params = GameParameters::new(3.0, 85.0, 50_000);
    let a = run_cash_game_simulation(&params, &quick(), 1234, &mut Unobserved).unwrap();
    let mut tracker = ProgressTracker::new();
    let b = run_cash_game_simulation(&params, &quick(), 1234, &mut tracker).unwrap();
    assert_eq!(a, b);
    assert_eq!(tracker.fraction(), 1.0);

    for path in &a.paths {
        assert_eq!(path.points[0].trial, 0);
        assert_eq!(path.total_trials(), 50_000);
        assert!(path.points.len() as u64 <= quick().max_points + 1);
    }
    let thresholds: Vec<f64> = a.downswings.thresholds.iter().map(|t| t.threshold).collect();
    assert_eq!(thresholds, quick().cash_thresholds);
}

#[test]
fn test_downswing_estimate_tracks_closed_form() {
    // The closed form measures a loss of the threshold from the start; the
    // drawdown from the running peak is at least as likely.
    let result = run_downswing_estimate(
        200_000,
        5.0,
        100.0,
        1_000.0,
        2_000,
        &ModeConfig::accurate(),
        77,
        &mut Unobserved,
    )
    .unwrap();
    assert_abs_diff_eq!(result.closed_form, (-1.0f64).exp(), epsilon = 1e-12);
    let estimate = result.estimate;
    assert!(
        (estimate.below_start_probability - result.closed_form).abs() < 0.07,
        "{} vs {}",
        estimate.below_start_probability,
        result.closed_form
    );
    assert!(estimate.probability >= estimate.below_start_probability);
    assert!(estimate.probability > result.closed_form + 0.3);
    assert_eq!(estimate.block_size, 100);
}

#[test]
fn test_tournament_pipeline() {
    let model = build_tournament_model(&tournament()).unwrap();
    assert!(model.warnings.is_empty());
    assert_abs_diff_eq!(model.stats.roi, 0.15, epsilon = 1e-6);

    let bust: Vec<f64> = [50.0, 200.0, 800.0]
        .into_iter()
        .map(|bankroll| {
            run_tournament_simulation(&model, 500, 1_000, bankroll, &[100.0], 3, &mut Unobserved)
                .unwrap()
                .result
                .bust_probability
        })
        .collect();
    assert!(bust[0] >= bust[1] && bust[1] >= bust[2], "{bust:?}");
}

#[test]
fn test_dispatch_tournament_simulation() {
    let request = EngineRequest::TournamentSimulation {
        params: tournament(),
        tournaments: 100,
        num_trials: Some(200),
        bankroll: 300.0,
        thresholds: vec![50.0, 150.0],
        mode: SimulationMode::Turbo,
        config: None,
        seed: Some(11),
    };
    let text = serde_json::to_string(&request).unwrap();
    let request = EngineRequest::from_json(&text).unwrap();

    let mut messages = Vec::new();
    dispatch(&request, |m| messages.push(m));
    let Some(EngineMessage::Result { result }) = messages.last() else {
        panic!("expected a result, got {:?}", messages.last());
    };
    let EngineResponse::TournamentSimulation(sim) = result.as_ref() else {
        panic!("unexpected response");
    };
    assert_eq!(sim.seed, 11);
    assert_eq!(sim.result.final_profits.len(), 200);
    assert_eq!(sim.result.thresholds.len(), 2);
    assert!(messages[..messages.len() - 1]
        .iter()
        .all(|m| matches!(m, EngineMessage::Progress { .. })));
}

#[test]
fn test_cash_summary_request() {
    let mut messages = Vec::new();
    dispatch(
        &EngineRequest::CashSummary { params: GameParameters::new(2.5, 75.0, 10_000) },
        |m| messages.push(m),
    );
    match &messages[..] {
        [EngineMessage::Result { result }] => match result.as_ref() {
            EngineResponse::CashSummary(summary) => {
                assert_eq!(summary.expected_value, 250.0);
                assert_eq!(summary.value_std_dev, 750.0);
            }
            other => panic!("unexpected response {other:?}"),
        },
        other => panic!("unexpected messages {other:?}"),
    }
}

#[test]
fn test_zero_simulations_rejected() {
    let result =
        run_downswing_estimate(1_000, 2.0, 80.0, 100.0, 0, &quick(), 1, &mut Unobserved);
    assert!(matches!(result, Err(VfError::Validation(_))));
}
