//! Availability filter
//!
//! Turns a player's status and chance of playing into a multiplier in
//! [0, 1]. Nothing here fails: unknown status is assumed available and
//! reported as a data gap.

use crate::config::AvailabilityConfig;
use crate::error::OptimizerWarning;
use player_registry::{AvailabilityStatus, MissingField, Player};
use serde::Serialize;
use tracing::debug;

/// Result of filtering one player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    /// Expected share of a full appearance, 0.0 (cannot play) to 1.0
    pub multiplier: f64,

    /// Whether the player may be bought this run
    pub transfer_in_eligible: bool,

    /// Data gaps found while filtering
    pub warnings: Vec<OptimizerWarning>,
}

/// Availability filter
#[derive(Debug, Clone)]
pub struct AvailabilityFilter {
    config: AvailabilityConfig,
}

impl AvailabilityFilter {
    pub fn new(config: AvailabilityConfig) -> Self {
        Self { config }
    }

    /// Multiplier for a status and confidence pair
    pub fn multiplier(&self, status: AvailabilityStatus, confidence: Option<f64>) -> f64 {
        match status {
            AvailabilityStatus::Available => 1.0,
            AvailabilityStatus::Doubtful => confidence
                .map(normalize_confidence)
                .unwrap_or(self.config.doubtful_default_confidence),
            AvailabilityStatus::Injured | AvailabilityStatus::Suspended => 0.0,
        }
    }

    /// Annotate one player
    pub fn assess(&self, player: &Player) -> Availability {
        let mut warnings = Vec::new();

        let multiplier = match player.status {
            Some(status) => self.multiplier(status, player.chance_of_playing),
            None => {
                debug!("Player {} has no status, assuming available", player.id);
                warnings.push(OptimizerWarning::missing(
                    player.id,
                    MissingField::Status,
                    "assumed available, excluded from transfer-in",
                ));
                1.0
            }
        };

        for field in player.missing_fields() {
            if field == MissingField::Status {
                continue;
            }
            warnings.push(OptimizerWarning::missing(
                player.id,
                field,
                "excluded from transfer-in, kept if owned",
            ));
        }

        let transfer_in_eligible =
            player.is_complete() && multiplier > self.config.min_transfer_in_multiplier;

        Availability { multiplier, transfer_in_eligible, warnings }
    }
}

impl Default for AvailabilityFilter {
    fn default() -> Self {
        Self::new(AvailabilityConfig::default())
    }
}

/// Clamp a confidence to [0, 1], reading values above 1 as percentages
fn normalize_confidence(confidence: f64) -> f64 {
    if !confidence.is_finite() {
        return 0.0;
    }
    let scaled = if confidence > 1.0 { confidence / 100.0 } else { confidence };
    scaled.clamp(0.0, 1.0)
}
