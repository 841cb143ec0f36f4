//! Error and warning types for the transfer engine
//!
//! None of these abort an optimization run. Rule violations are returned by
//! the predicates in [`crate::rules`] and make the selectors discard the
//! candidate at hand; data gaps and infeasible lineups are attached to the
//! result as [`OptimizerWarning`]s.

use player_registry::{ClubId, MissingField, Money, PlayerId, Position};
use serde::Serialize;
use thiserror::Error;

/// A squad breaks a hard roster rule
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RosterViolation {
    #[error("Squad has {actual} players, expected {expected}")]
    SquadSize { expected: usize, actual: usize },

    #[error("Squad has {actual} {position} players, expected {expected}")]
    PositionQuota { position: Position, expected: usize, actual: usize },

    #[error("Squad has {count} players from club {club}, maximum is {max}")]
    ClubQuota { club: ClubId, count: usize, max: usize },

    #[error("Bank would be {bank}, budget cannot go negative")]
    NegativeBudget { bank: Money },

    #[error("Player {player_id} appears more than once in the squad")]
    DuplicatePlayer { player_id: PlayerId },

    #[error("Player {player_id} has no known position")]
    UnknownPosition { player_id: PlayerId },
}

/// A starting eleven breaks a formation rule
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FormationViolation {
    #[error("Lineup has {actual} starters, expected 11")]
    StarterCount { actual: usize },

    #[error("Lineup has {actual} {position} starters, allowed range is {min}-{max}")]
    PositionRange { position: Position, min: usize, max: usize, actual: usize },
}

/// Non-fatal conditions reported alongside a plan or lineup
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerWarning {
    #[error("Player {player_id}: {field} missing from snapshot, {assumption}")]
    DataIncompleteness { player_id: PlayerId, field: MissingField, assumption: String },

    #[error("Only a degraded lineup is possible: {shortfall} starter(s) cannot play")]
    InfeasibleLineup { shortfall: usize },

    #[error("Input squad is not legal: {violation}")]
    IllegalInputSquad { violation: RosterViolation },

    #[error("Transfer plan discarded after final check: {violation}")]
    PlanRejected { violation: RosterViolation },
}

impl OptimizerWarning {
    pub fn missing(player_id: PlayerId, field: MissingField, assumption: &str) -> Self {
        OptimizerWarning::DataIncompleteness { player_id, field, assumption: assumption.to_string() }
    }
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_messages() {
        let violation = RosterViolation::ClubQuota { club: 4, count: 4, max: 3 };
        assert_eq!(violation.to_string(), "Squad has 4 players from club 4, maximum is 3");

        let violation = FormationViolation::PositionRange {
            position: Position::Defender,
            min: 3,
            max: 5,
            actual: 2,
        };
        assert_eq!(violation.to_string(), "Lineup has 2 DEF starters, allowed range is 3-5");
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let warning = OptimizerWarning::missing(7, MissingField::Status, "treated as available");
        let json = serde_json::to_value(&warning).unwrap();

        assert_eq!(json["kind"], "data_incompleteness");
        assert_eq!(json["field"], "status");
        assert_eq!(
            warning.to_string(),
            "Player 7: status missing from snapshot, treated as available"
        );
    }
}
