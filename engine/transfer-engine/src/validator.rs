//! Plan validator
//!
//! Audits any transfer list against a squad before it is executed. Unlike
//! the selectors, which only ever build legal plans, this checks input from
//! outside the engine and reports every problem it finds instead of
//! stopping at the first.

use crate::models::{Chip, TransferPlan};
use crate::rules::{self, squad_quota, MAX_PER_CLUB};
use player_registry::{AvailabilityStatus, Money, Player, PlayerId, Position, Squad, SQUAD_SIZE};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Transfers per gameweek before a warning, unless a chip is active
pub const TRANSFERS_PER_GAMEWEEK: usize = 2;

/// Chance of playing below which an incoming player draws a warning
pub const LOW_CHANCE_WARN: f64 = 0.75;

/// Chance of playing below which an incoming player fails validation
pub const LOW_CHANCE_FAIL: f64 = 0.25;

/// Overall verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Pass,
    Warn,
    Fail,
}

/// Severity of a single message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Warn,
    Fail,
}

/// Stable message codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    InvalidTransfer,
    InvalidSquadSize,
    InvalidPositionCount,
    ClubLimitExceeded,
    InsufficientBudget,
    TransferLimitExceeded,
    PlayerUnavailable,
    LowChanceOfPlaying,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::InvalidTransfer => "INVALID_TRANSFER",
            ValidationCode::InvalidSquadSize => "INVALID_SQUAD_SIZE",
            ValidationCode::InvalidPositionCount => "INVALID_POSITION_COUNT",
            ValidationCode::ClubLimitExceeded => "CLUB_LIMIT_EXCEEDED",
            ValidationCode::InsufficientBudget => "INSUFFICIENT_BUDGET",
            ValidationCode::TransferLimitExceeded => "TRANSFER_LIMIT_EXCEEDED",
            ValidationCode::PlayerUnavailable => "PLAYER_UNAVAILABLE",
            ValidationCode::LowChanceOfPlaying => "LOW_CHANCE_OF_PLAYING",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationMessage {
    pub code: ValidationCode,
    pub level: ValidationLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub messages: Vec<ValidationMessage>,
}

impl ValidationReport {
    fn new() -> Self {
        Self { status: ValidationStatus::Pass, messages: Vec::new() }
    }

    fn push(&mut self, code: ValidationCode, level: ValidationLevel, message: String) {
        debug!("{}: {}", code, message);
        let status = match level {
            ValidationLevel::Warn => ValidationStatus::Warn,
            ValidationLevel::Fail => ValidationStatus::Fail,
        };
        self.status = self.status.max(status);
        self.messages.push(ValidationMessage { code, level, message });
    }

    fn fail(&mut self, code: ValidationCode, message: String) {
        self.push(code, ValidationLevel::Fail, message);
    }

    fn warn(&mut self, code: ValidationCode, message: String) {
        self.push(code, ValidationLevel::Warn, message);
    }

    pub fn is_pass(&self) -> bool {
        self.status == ValidationStatus::Pass
    }

    pub fn is_fail(&self) -> bool {
        self.status == ValidationStatus::Fail
    }

    pub fn has_code(&self, code: ValidationCode) -> bool {
        self.messages.iter().any(|m| m.code == code)
    }
}

/// One requested swap: who leaves, who arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferRequest {
    pub player_out: PlayerId,
    pub player_in: PlayerId,
}

impl TransferRequest {
    pub fn new(player_out: PlayerId, player_in: PlayerId) -> Self {
        Self { player_out, player_in }
    }

    /// Requests matching every transfer in a plan
    pub fn from_plan(plan: &TransferPlan) -> Vec<Self> {
        plan.transfers.iter().map(|t| Self::new(t.player_out, t.player_in)).collect()
    }
}

/// Check `transfers` against `squad`, looking incoming players up in `pool`
pub fn validate_transfers(
    squad: &Squad,
    transfers: &[TransferRequest],
    pool: &[Player],
    chip: Option<Chip>,
    budget_reserve: Money,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    let mut result = squad.clone();
    let mut seen_out = HashSet::new();
    let mut seen_in = HashSet::new();
    let mut incoming_players = Vec::new();

    for (index, transfer) in transfers.iter().enumerate() {
        let number = index + 1;
        let Some(outgoing) = squad.get(transfer.player_out) else {
            report.fail(
                ValidationCode::InvalidTransfer,
                format!("Transfer {number}: player {} is not in the squad", transfer.player_out),
            );
            continue;
        };
        let Some(incoming) = pool.iter().find(|p| p.id == transfer.player_in) else {
            report.fail(
                ValidationCode::InvalidTransfer,
                format!("Transfer {number}: player {} is not in the player pool", transfer.player_in),
            );
            continue;
        };
        if squad.contains(incoming.id) {
            report.fail(
                ValidationCode::InvalidTransfer,
                format!("Transfer {number}: {} is already in the squad", incoming.display_name()),
            );
            continue;
        }
        if !seen_out.insert(outgoing.id) || !seen_in.insert(incoming.id) {
            report.fail(
                ValidationCode::InvalidTransfer,
                format!("Transfer {number}: a player appears in more than one transfer"),
            );
            continue;
        }
        if outgoing.position != incoming.position {
            report.fail(
                ValidationCode::InvalidTransfer,
                format!(
                    "Transfer {number}: {} and {} play different positions",
                    outgoing.display_name(),
                    incoming.display_name()
                ),
            );
        }

        result.swap(outgoing.id, incoming.clone());
        incoming_players.push(incoming);
    }

    check_squad(&result, &mut report);

    if result.bank < budget_reserve {
        let short = budget_reserve - result.bank;
        report.fail(
            ValidationCode::InsufficientBudget,
            format!("Insufficient budget: {short} short, bank would be {}", result.bank),
        );
    }

    if chip.is_none() && transfers.len() > TRANSFERS_PER_GAMEWEEK {
        report.warn(
            ValidationCode::TransferLimitExceeded,
            format!(
                "Too many transfers: {} (max {TRANSFERS_PER_GAMEWEEK} per gameweek without a chip)",
                transfers.len()
            ),
        );
    }

    for incoming in incoming_players {
        check_availability(incoming, &mut report);
    }

    report
}

/// Size, position and club checks on the squad the transfers would produce
fn check_squad(squad: &Squad, report: &mut ValidationReport) {
    if squad.len() != SQUAD_SIZE {
        report.fail(
            ValidationCode::InvalidSquadSize,
            format!("Invalid squad size: {}, expected {SQUAD_SIZE}", squad.len()),
        );
    }

    for position in Position::ALL {
        let count = squad.at_position(position).count();
        let expected = squad_quota(position);
        if count != expected {
            report.fail(
                ValidationCode::InvalidPositionCount,
                format!("Invalid {position} count: {count}, expected {expected}"),
            );
        }
    }

    for (club, count) in rules::club_counts(&squad.players) {
        if count > MAX_PER_CLUB {
            report.fail(
                ValidationCode::ClubLimitExceeded,
                format!("Too many players from club {club}: {count} (max {MAX_PER_CLUB})"),
            );
        }
    }
}

fn check_availability(player: &Player, report: &mut ValidationReport) {
    let name = player.display_name();
    match player.status {
        Some(AvailabilityStatus::Available) => {}
        Some(status) => report.warn(
            ValidationCode::PlayerUnavailable,
            format!("Player {name} is {status}"),
        ),
        None => report.warn(
            ValidationCode::PlayerUnavailable,
            format!("Player {name} has no availability status"),
        ),
    }

    if let Some(chance) = player.chance_of_playing.filter(|c| c.is_finite()) {
        let chance = if chance > 1.0 { chance / 100.0 } else { chance };
        let percent = (chance * 100.0).round();
        if chance < LOW_CHANCE_FAIL {
            report.fail(
                ValidationCode::LowChanceOfPlaying,
                format!("Player {name} chance of playing: {percent}%"),
            );
        } else if chance < LOW_CHANCE_WARN {
            report.warn(
                ValidationCode::LowChanceOfPlaying,
                format!("Player {name} chance of playing: {percent}%"),
            );
        }
    }
}
