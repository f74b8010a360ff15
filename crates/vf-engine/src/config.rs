//! Simulation mode presets
//!
//! Modes only trade statistical precision for runtime; every operation takes
//! an explicit [`ModeConfig`] so any custom configuration works too.

use serde::{Deserialize, Serialize};

use vf_core::{MAX_RUN_COUNT, VfError, VfResult, ensure_count};

/// Precision/runtime preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    /// Quick look
    Turbo,
    /// Balanced default
    #[default]
    Fast,
    /// Most simulations, finest blocks
    Accurate,
    /// Hand-tuned values
    Custom,
}

/// Drawdown thresholds reported by the cash-game batch analysis (value units)
pub const DEFAULT_CASH_THRESHOLDS: [f64; 8] =
    [100.0, 200.0, 300.0, 500.0, 750.0, 1000.0, 1500.0, 2000.0];

/// Largest accepted number of display paths
pub const MAX_PATH_COUNT: u64 = 10_000;
/// Largest accepted number of recorded points per path
pub const MAX_RECORDED_POINTS: u64 = 100_000;

/// Detailed run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    /// Preset this configuration came from
    pub mode: SimulationMode,

    /// Sample paths drawn for display
    pub path_count: usize,

    /// Trials per draw for display paths
    pub path_block_size: u64,

    /// Upper bound on recorded points per path
    pub max_points: u64,

    /// Runs in the downswing batch analysis
    pub downswing_simulations: u64,

    /// Trials per draw for the single-threshold estimate
    pub downswing_block_size: u64,

    /// Trials for tournament Monte Carlo when the request gives none
    pub tournament_trials: u64,

    /// Tournament trials whose profit path is kept
    pub tournament_sample_paths: usize,

    /// Thresholds for the cash-game batch analysis
    pub cash_thresholds: Vec<f64>,
}

impl ModeConfig {
    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            mode: SimulationMode::Turbo,
            path_count: 20,
            path_block_size: 500,
            max_points: 200,
            downswing_simulations: 500,
            downswing_block_size: 500,
            tournament_trials: 1_000,
            tournament_sample_paths: 10,
            cash_thresholds: DEFAULT_CASH_THRESHOLDS.to_vec(),
        }
    }

    /// Balanced defaults
    pub fn fast() -> Self {
        Self {
            mode: SimulationMode::Fast,
            path_count: 50,
            path_block_size: 250,
            max_points: 500,
            downswing_simulations: 2_000,
            downswing_block_size: 250,
            tournament_trials: 5_000,
            tournament_sample_paths: 20,
            cash_thresholds: DEFAULT_CASH_THRESHOLDS.to_vec(),
        }
    }

    /// Accurate mode
    pub fn accurate() -> Self {
        Self {
            mode: SimulationMode::Accurate,
            path_count: 100,
            path_block_size: 100,
            max_points: 1_000,
            downswing_simulations: 10_000,
            downswing_block_size: 100,
            tournament_trials: 20_000,
            tournament_sample_paths: 50,
            cash_thresholds: DEFAULT_CASH_THRESHOLDS.to_vec(),
        }
    }

    /// Get config for mode
    pub fn from_mode(mode: SimulationMode) -> Self {
        match mode {
            SimulationMode::Turbo => Self::turbo(),
            SimulationMode::Fast => Self::fast(),
            SimulationMode::Accurate => Self::accurate(),
            SimulationMode::Custom => Self::fast(),
        }
    }

    /// Scale every simulation count by `factor` (block sizes are kept)
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |count: u64| ((count as f64 * factor).round() as u64).max(1);
        Self {
            mode: SimulationMode::Custom,
            path_count: scale(self.path_count as u64) as usize,
            downswing_simulations: scale(self.downswing_simulations),
            tournament_trials: scale(self.tournament_trials),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> VfResult<()> {
        if self.path_block_size == 0 || self.downswing_block_size == 0 {
            return Err(VfError::invalid("block sizes must be at least 1"));
        }
        ensure_count("path count", self.path_count as u64, MAX_PATH_COUNT)?;
        if self.max_points > MAX_RECORDED_POINTS {
            return Err(VfError::invalid(format!(
                "max points must be at most {MAX_RECORDED_POINTS}, got {}",
                self.max_points
            )));
        }
        ensure_count("downswing simulations", self.downswing_simulations, MAX_RUN_COUNT)?;
        ensure_count("tournament trials", self.tournament_trials, MAX_RUN_COUNT)?;
        if self.cash_thresholds.iter().any(|t| !t.is_finite()) {
            return Err(VfError::invalid("cash thresholds must be finite"));
        }
        Ok(())
    }
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self::fast()
    }
}

impl From<SimulationMode> for ModeConfig {
    fn from(mode: SimulationMode) -> Self {
        Self::from_mode(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_order_by_precision() {
        let (turbo, fast, accurate) = (ModeConfig::turbo(), ModeConfig::fast(), ModeConfig::accurate());
        assert!(turbo.path_count < fast.path_count && fast.path_count < accurate.path_count);
        assert!(turbo.downswing_simulations < accurate.downswing_simulations);
        assert!(turbo.path_block_size > accurate.path_block_size);
        for config in [turbo, fast, accurate] {
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_from_mode() {
        assert_eq!(ModeConfig::from_mode(SimulationMode::Accurate), ModeConfig::accurate());
        assert_eq!(ModeConfig::default().mode, SimulationMode::Fast);
        assert_eq!(ModeConfig::from(SimulationMode::Turbo), ModeConfig::turbo());
    }

    #[test]
    fn test_scaled_is_custom() {
        let config = ModeConfig::fast().scaled(0.1);
        assert_eq!(config.mode, SimulationMode::Custom);
        assert_eq!(config.path_count, 5);
        assert_eq!(config.downswing_simulations, 200);
        assert_eq!(config.path_block_size, 250);
        assert_eq!(ModeConfig::turbo().scaled(0.0).path_count, 1);
    }

    #[test]
    fn test_custom_values_are_validated() {
        let config = ModeConfig { downswing_block_size: 0, ..ModeConfig::turbo() };
        assert!(matches!(config.validate(), Err(VfError::Validation(_))));
    }

    #[test]
    fn test_counts_are_bounded() {
        for config in [
            ModeConfig { path_count: 0, ..ModeConfig::turbo() },
            ModeConfig { path_count: MAX_PATH_COUNT as usize + 1, ..ModeConfig::turbo() },
            ModeConfig { max_points: u64::MAX, ..ModeConfig::turbo() },
            ModeConfig { downswing_simulations: u64::MAX, ..ModeConfig::turbo() },
            ModeConfig { tournament_trials: u64::MAX, ..ModeConfig::turbo() },
            ModeConfig { tournament_trials: 0, ..ModeConfig::turbo() },
        ] {
            assert!(matches!(config.validate(), Err(VfError::Validation(_))), "{config:?}");
        }
        let largest = ModeConfig {
            path_count: MAX_PATH_COUNT as usize,
            max_points: MAX_RECORDED_POINTS,
            ..ModeConfig::turbo()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(serde_json::to_string(&SimulationMode::Accurate).unwrap(), "\"accurate\"");
        let mode: SimulationMode = serde_json::from_str("\"turbo\"").unwrap();
        assert_eq!(mode, SimulationMode::Turbo);
    }
}
