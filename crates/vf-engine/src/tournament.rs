//! Tournament operations

use serde::{Deserialize, Serialize};

use vf_core::{Checkpoint, VfResult, Warning};
use vf_tourney::{
    MonteCarloResult, OutcomeSet, PayoutModel, SkillModel, TournamentRun, TournamentStats,
    simulate_tournaments,
};

use crate::params::{TournamentParameters, validate_bankroll};

/// Default number of kept profit paths
pub const DEFAULT_SAMPLE_PATHS: usize = 20;
/// Default upper bound on recorded points per kept path
pub const DEFAULT_MAX_POINTS: u64 = 500;

/// Fitted payout and skill curves with the resulting outcome distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentModel {
    pub params: TournamentParameters,
    pub payout: PayoutModel,
    pub skill: SkillModel,
    pub outcomes: OutcomeSet,
    pub stats: TournamentStats,
    /// Every fitting warning, payout first
    pub warnings: Vec<Warning>,
}

/// Fit payout and skill curves for a tournament structure.
pub fn build_tournament_model(params: &TournamentParameters) -> VfResult<TournamentModel> {
    params.validate()?;

    let payout = PayoutModel::fit(
        params.field_size,
        params.percent_paid,
        params.buy_in,
        params.top_prize_multiple,
    )?;
    let skill = SkillModel::fit(&payout, params.cost(), params.roi_target_percent / 100.0)?;
    let outcomes = OutcomeSet::new(&payout, &skill);
    let stats = outcomes.stats();

    let warnings: Vec<Warning> =
        payout.warnings.iter().chain(&skill.warnings).cloned().collect();

    log::info!(
        "tournament model: field {}, {} paid, ROI {:.2}%, ITM {:.2}%, {} warnings",
        params.field_size,
        payout.num_paid,
        stats.roi * 100.0,
        stats.itm_probability * 100.0,
        warnings.len()
    );

    Ok(TournamentModel { params: *params, payout, skill, outcomes, stats, warnings })
}

/// Result of [`run_tournament_simulation`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentSimulation {
    pub seed: u32,
    pub stats: TournamentStats,
    #[serde(flatten)]
    pub result: MonteCarloResult,
    pub warnings: Vec<Warning>,
}

/// Monte Carlo over `num_trials` runs of `tournaments` entries each.
///
/// `thresholds` are drawdown sizes in currency units. The bust track starts
/// from `bankroll`.
#[allow(clippy::too_many_arguments)]
pub fn run_tournament_simulation<C>(
    model: &TournamentModel,
    tournaments: u64,
    num_trials: u64,
    bankroll: f64,
    thresholds: &[f64],
    seed: u32,
    checkpoint: &mut C,
) -> VfResult<TournamentSimulation>
where
    C: Checkpoint + ?Sized,
{
    validate_bankroll(bankroll)?;
    let run = TournamentRun {
        tournaments,
        num_trials,
        bankroll,
        thresholds: thresholds.to_vec(),
        sample_paths: DEFAULT_SAMPLE_PATHS,
        max_points: DEFAULT_MAX_POINTS,
        seed,
    };
    let result = simulate_tournaments(&model.outcomes, &run, checkpoint)?;

    Ok(TournamentSimulation {
        seed,
        stats: model.stats,
        result,
        warnings: model.warnings.clone(),
    })
}
