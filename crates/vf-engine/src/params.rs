//! Request parameters and entry validation

use serde::{Deserialize, Serialize};

use vf_core::{VfError, VfResult, ensure_finite, entropy_seed};

/// Tournament structure plus the player's edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TournamentParameters {
    pub field_size: u32,
    /// Percentage of the field that is paid, in (0, 100]
    pub percent_paid: f64,
    /// Prize-pool contribution per entry
    pub buy_in: f64,
    /// Rake per entry
    #[serde(default)]
    pub fee: f64,
    /// Requested first prize as a multiple of the buy-in
    pub top_prize_multiple: f64,
    /// Target ROI in percent of the entry cost
    pub roi_target_percent: f64,
}

impl TournamentParameters {
    /// Buy-in plus fee
    pub fn cost(&self) -> f64 {
        self.buy_in + self.fee
    }

    /// Reject out-of-domain structures before any fitting starts
    pub fn validate(&self) -> VfResult<()> {
        if self.field_size < 2 {
            return Err(VfError::invalid(format!(
                "field size must be at least 2, got {}",
                self.field_size
            )));
        }
        ensure_finite("percent paid", self.percent_paid)?;
        if self.percent_paid <= 0.0 || self.percent_paid > 100.0 {
            return Err(VfError::invalid(format!(
                "percent paid must be in (0, 100], got {}",
                self.percent_paid
            )));
        }
        ensure_finite("buy-in", self.buy_in)?;
        if self.buy_in <= 0.0 {
            return Err(VfError::invalid(format!("buy-in must be positive, got {}", self.buy_in)));
        }
        ensure_finite("fee", self.fee)?;
        if self.fee < 0.0 {
            return Err(VfError::invalid(format!("fee must not be negative, got {}", self.fee)));
        }
        ensure_finite("top prize multiple", self.top_prize_multiple)?;
        if self.top_prize_multiple <= 0.0 {
            return Err(VfError::invalid(format!(
                "top prize multiple must be positive, got {}",
                self.top_prize_multiple
            )));
        }
        ensure_finite("ROI target", self.roi_target_percent)?;
        Ok(())
    }
}

/// Use the caller's seed or draw a fresh one; seeds must fit in 32 bits.
pub fn resolve_seed(seed: Option<u64>) -> VfResult<u32> {
    match seed {
        Some(seed) => u32::try_from(seed)
            .map_err(|_| VfError::invalid(format!("seed must be at most {}, got {seed}", u32::MAX))),
        None => Ok(entropy_seed()),
    }
}

/// Bankroll for the tournament bust track
pub fn validate_bankroll(bankroll: f64) -> VfResult<()> {
    ensure_finite("bankroll", bankroll)?;
    if bankroll < 0.0 {
        return Err(VfError::invalid(format!("bankroll must not be negative, got {bankroll}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> TournamentParameters {
        TournamentParameters {
            field_size: 1000,
            percent_paid: 20.0,
            buy_in: 22.0,
            fee: 2.0,
            top_prize_multiple: 50.0,
            roi_target_percent: 10.0,
        }
    }

    #[test]
    fn test_reference_is_valid() {
        assert!(reference().validate().is_ok());
        assert_eq!(reference().cost(), 24.0);
    }

    #[test]
    fn test_rejects_each_bad_field() {
        let cases = [
            TournamentParameters { field_size: 1, ..reference() },
            TournamentParameters { percent_paid: 0.0, ..reference() },
            TournamentParameters { percent_paid: 101.0, ..reference() },
            TournamentParameters { buy_in: -5.0, ..reference() },
            TournamentParameters { fee: -0.5, ..reference() },
            TournamentParameters { top_prize_multiple: 0.0, ..reference() },
            TournamentParameters { roi_target_percent: f64::INFINITY, ..reference() },
        ];
        for params in cases {
            assert!(matches!(params.validate(), Err(VfError::Validation(_))), "{params:?}");
        }
    }

    #[test]
    fn test_seed_range() {
        assert_eq!(resolve_seed(Some(42)).unwrap(), 42);
        assert_eq!(resolve_seed(Some(u32::MAX as u64)).unwrap(), u32::MAX);
        assert!(matches!(resolve_seed(Some(u32::MAX as u64 + 1)), Err(VfError::Validation(_))));
        assert!(resolve_seed(None).is_ok());
    }

    #[test]
    fn test_bankroll() {
        assert!(validate_bankroll(0.0).is_ok());
        assert!(validate_bankroll(-1.0).is_err());
        assert!(validate_bankroll(f64::NAN).is_err());
    }

    #[test]
    fn test_fee_defaults_to_zero() {
        let params: TournamentParameters = serde_json::from_str(
            r#"{"field_size":100,"percent_paid":15,"buy_in":10,"top_prize_multiple":25,"roi_target_percent":5}"#,
        )
        .unwrap();
        assert_eq!(params.fee, 0.0);
    }
}
