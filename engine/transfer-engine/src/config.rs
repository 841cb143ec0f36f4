//! Configuration for the transfer engine

use crate::error::ConfigError;
use crate::{DEFAULT_HORIZON, MAX_HORIZON};
use player_registry::Money;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the transfer engine
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Candidate scoring parameters
    pub scoring: ScoringConfig,

    /// Availability filter parameters
    pub availability: AvailabilityConfig,

    /// Transfer selection parameters
    pub transfers: TransferConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Number of gameweeks to look ahead (1 for this week's decision, up to 5 for planning)
    pub horizon: u32,

    /// Per-gameweek weight decay; nearer fixtures weigh more when below 1.0
    pub decay: f64,

    /// Fixture multiplier at an average (3) difficulty before normalization
    pub difficulty_base: f64,

    /// Fixture multiplier change per difficulty step
    pub difficulty_step: f64,

    /// First gameweek of the horizon. Derived from the snapshot when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_gameweek: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    /// Confidence assumed for doubtful players the feed gives no chance for
    pub doubtful_default_confidence: f64,

    /// Players whose multiplier is at or below this are never transferred in
    pub min_transfer_in_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Points deducted per transfer beyond the banked free transfers.
    /// Overrides the squad's own penalty when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty_per_extra: Option<f64>,

    /// Money that must remain in the bank after all transfers
    pub budget_reserve: Money,

    /// Hard cap on transfers per plan (none when unset; chips lift it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_transfers: Option<usize>,

    /// Smallest horizon-score gain worth a transfer
    pub min_gain: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            decay: 0.9,
            difficulty_base: 1.2,
            difficulty_step: 0.1,
            next_gameweek: None,
        }
    }
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self { doubtful_default_confidence: 0.5, min_transfer_in_multiplier: 0.0 }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            penalty_per_extra: None,
            budget_reserve: Money::ZERO,
            max_transfers: None,
            min_gain: 0.0,
        }
    }
}

impl ScoringConfig {
    /// Horizon clamped to the supported 1..=5 gameweeks
    pub fn effective_horizon(&self) -> u32 {
        self.horizon.clamp(1, MAX_HORIZON)
    }
}

impl OptimizerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: OptimizerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load defaults, then apply environment variable overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(horizon) = lookup("OPTIMIZER_HORIZON") {
            self.scoring.horizon = parse_var("OPTIMIZER_HORIZON", &horizon)?;
        }

        if let Some(decay) = lookup("OPTIMIZER_DECAY") {
            self.scoring.decay = parse_var("OPTIMIZER_DECAY", &decay)?;
        }

        if let Some(penalty) = lookup("OPTIMIZER_TRANSFER_PENALTY") {
            self.transfers.penalty_per_extra =
                Some(parse_var("OPTIMIZER_TRANSFER_PENALTY", &penalty)?);
        }

        if let Some(reserve) = lookup("OPTIMIZER_BUDGET_RESERVE") {
            let tenths: i64 = parse_var("OPTIMIZER_BUDGET_RESERVE", &reserve)?;
            self.transfers.budget_reserve = Money::from_tenths(tenths);
        }

        if let Some(max) = lookup("OPTIMIZER_MAX_TRANSFERS") {
            self.transfers.max_transfers = Some(parse_var("OPTIMIZER_MAX_TRANSFERS", &max)?);
        }

        self.validate()
    }

    /// Reject parameter combinations the optimizer cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scoring = &self.scoring;
        if scoring.horizon == 0 || scoring.horizon > MAX_HORIZON {
            return Err(ConfigError::invalid(format!(
                "horizon must be between 1 and {MAX_HORIZON}, got {}",
                scoring.horizon
            )));
        }
        if !(scoring.decay > 0.0 && scoring.decay <= 1.0) {
            return Err(ConfigError::invalid(format!(
                "decay must be in (0, 1], got {}",
                scoring.decay
            )));
        }
        if scoring.difficulty_step < 0.0 {
            return Err(ConfigError::invalid("difficulty_step cannot be negative"));
        }
        if scoring.difficulty_base - 2.0 * scoring.difficulty_step <= 0.0 {
            return Err(ConfigError::invalid(
                "difficulty_base must exceed twice difficulty_step so every weight stays positive",
            ));
        }

        let availability = &self.availability;
        if !(0.0..=1.0).contains(&availability.doubtful_default_confidence) {
            return Err(ConfigError::invalid("doubtful_default_confidence must be in [0, 1]"));
        }
        if !(0.0..1.0).contains(&availability.min_transfer_in_multiplier) {
            return Err(ConfigError::invalid("min_transfer_in_multiplier must be in [0, 1)"));
        }

        let transfers = &self.transfers;
        if transfers.penalty_per_extra.is_some_and(|p| p < 0.0 || p.is_nan()) {
            return Err(ConfigError::invalid("penalty_per_extra cannot be negative"));
        }
        if transfers.budget_reserve.is_negative() {
            return Err(ConfigError::invalid("budget_reserve cannot be negative"));
        }
        if transfers.min_gain < 0.0 {
            return Err(ConfigError::invalid("min_gain cannot be negative"));
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::invalid(format!("Invalid {key}: '{value}'")))
}
