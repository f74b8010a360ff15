//! Discrete per-tournament outcome distribution

use serde::{Deserialize, Serialize};

use crate::payout::PayoutModel;
use crate::skill::SkillModel;

/// English ordinal: 1st, 2nd, 3rd, 4th, ..., 11th, 12th, 13th, 21st, ...
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// One possible result of a single tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub label: String,
    /// 1-based finishing place; `None` for a bust
    pub place: Option<u32>,
    pub prize: f64,
    /// `prize - cost`
    pub profit: f64,
    pub probability: f64,
}

/// Summary of one tournament's profit distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TournamentStats {
    pub cost: f64,
    pub expected_profit: f64,
    /// Expected profit over cost
    pub roi: f64,
    pub profit_std_dev: f64,
    pub itm_probability: f64,
    pub bust_probability: f64,
}

/// "bust" followed by every paid place; probabilities sum to 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSet {
    pub cost: f64,
    pub outcomes: Vec<Outcome>,
}

impl OutcomeSet {
    pub fn new(payout: &PayoutModel, skill: &SkillModel) -> Self {
        let cost = skill.cost;
        let paid: f64 = skill.place_probabilities.iter().sum();

        let mut outcomes = Vec::with_capacity(payout.prizes.len() + 1);
        outcomes.push(Outcome {
            label: "bust".to_string(),
            place: None,
            prize: 0.0,
            profit: -cost,
            probability: (1.0 - paid).max(0.0),
        });
        for (index, (&prize, &probability)) in
            payout.prizes.iter().zip(&skill.place_probabilities).enumerate()
        {
            let place = index as u32 + 1;
            outcomes.push(Outcome {
                label: ordinal(place),
                place: Some(place),
                prize,
                profit: prize - cost,
                probability,
            });
        }

        let total: f64 = outcomes.iter().map(|o| o.probability).sum();
        if total > 0.0 && total != 1.0 {
            for outcome in &mut outcomes {
                outcome.probability /= total;
            }
        }

        Self { cost, outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn mean_profit(&self) -> f64 {
        self.outcomes.iter().map(|o| o.probability * o.profit).sum()
    }

    pub fn profit_std_dev(&self) -> f64 {
        let mean = self.mean_profit();
        let variance: f64 = self
            .outcomes
            .iter()
            .map(|o| o.probability * (o.profit - mean).powi(2))
            .sum();
        variance.max(0.0).sqrt()
    }

    pub fn itm_probability(&self) -> f64 {
        self.outcomes.iter().filter(|o| o.place.is_some()).map(|o| o.probability).sum()
    }

    pub fn bust_probability(&self) -> f64 {
        self.outcomes.iter().filter(|o| o.place.is_none()).map(|o| o.probability).sum()
    }

    /// Running probability totals in outcome order; the last entry is exactly 1
    pub fn cumulative(&self) -> Vec<f64> {
        let mut running = 0.0;
        let mut cumulative: Vec<f64> = self
            .outcomes
            .iter()
            .map(|o| {
                running += o.probability;
                running
            })
            .collect();
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }
        cumulative
    }

    pub fn stats(&self) -> TournamentStats {
        let expected_profit = self.mean_profit();
        TournamentStats {
            cost: self.cost,
            expected_profit,
            roi: expected_profit / self.cost,
            profit_std_dev: self.profit_std_dev(),
            itm_probability: self.itm_probability(),
            bust_probability: self.bust_probability(),
        }
    }
}
