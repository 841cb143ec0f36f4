//! # Transfer Engine
//!
//! Recommends which squad members to swap and which eleven to field for the
//! next gameweek, maximizing expected points under budget, roster and
//! availability rules.
//!
//! Data flows one way: the availability filter feeds the candidate scorer,
//! whose scores drive both the transfer selector and the lineup selector.
//! The selector's plan is applied before the lineup is chosen. Every entry
//! point is a pure function of the snapshot passed in, so a single
//! [`TransferEngine`] can serve many teams concurrently.

pub mod availability;
pub mod config;
pub mod engine;
pub mod error;
pub mod lineup;
pub mod models;
pub mod predictor;
pub mod rules;
pub mod scorer;
pub mod transfers;
pub mod validator;

#[cfg(test)]
mod test_support;


pub use availability::{Availability, AvailabilityFilter};
pub use config::{AvailabilityConfig, OptimizerConfig, ScoringConfig, TransferConfig};
pub use engine::TransferEngine;
pub use error::{ConfigError, FormationViolation, OptimizerWarning, RosterViolation};
pub use lineup::LineupSelector;
pub use models::{
    Chip, Formation, GameweekDecision, Lineup, LineupSlot, TeamRequest, TransferPlan,
    TransferProposal,
};
pub use predictor::{Prediction, Predictor, SnapshotPredictor, TablePredictor};
pub use rules::{is_lineup_legal, is_squad_legal};
pub use scorer::{difficulty_weight, CandidateScorer, ScoredPlayer};
pub use transfers::TransferSelector;
pub use validator::{
    validate_transfers, TransferRequest, ValidationCode, ValidationLevel, ValidationMessage,
    ValidationReport, ValidationStatus,
};

use player_registry::{Player, Squad};

/// Default look-ahead in gameweeks
pub const DEFAULT_HORIZON: u32 = 1;

/// Longest supported look-ahead in gameweeks
pub const MAX_HORIZON: u32 = 5;

/// Transfer plan with the default configuration and embedded predictions
pub fn compute_transfer_plan(
    squad: &Squad,
    player_pool: &[Player],
    free_transfers: u8,
    penalty_per_extra: f64,
) -> TransferPlan {
    TransferEngine::new(OptimizerConfig::default()).compute_transfer_plan(
        squad,
        player_pool,
        free_transfers,
        penalty_per_extra,
    )
}

/// Lineup with the default configuration and embedded predictions
pub fn compute_lineup(squad: &Squad) -> Lineup {
    TransferEngine::new(OptimizerConfig::default()).compute_lineup(squad)
}
