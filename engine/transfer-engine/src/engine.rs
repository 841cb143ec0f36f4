//! Decision engine
//!
//! Wires the availability filter, scorer and both selectors together for
//! one team, and fans independent teams out across threads.

use crate::availability::AvailabilityFilter;
use crate::config::OptimizerConfig;
use crate::error::OptimizerWarning;
use crate::lineup::LineupSelector;
use crate::models::{Chip, GameweekDecision, Lineup, TeamRequest, TransferPlan};
use crate::predictor::{Predictor, SnapshotPredictor};
use crate::scorer::{CandidateScorer, ScoredPlayer};
use crate::transfers::TransferSelector;
use crate::validator::{validate_transfers, TransferRequest, ValidationReport};
use player_registry::{Player, Squad};
use rayon::prelude::*;
use tracing::{info, warn};

/// Gameweek used when neither config nor snapshot names one
const FALLBACK_GAMEWEEK: u32 = 1;

/// Transfer and lineup engine
///
/// Holds only configuration and a predictor, so one engine can serve any
/// number of teams at once.
#[derive(Debug, Clone)]
pub struct TransferEngine<P: Predictor = SnapshotPredictor> {
    config: OptimizerConfig,
    filter: AvailabilityFilter,
    predictor: P,
}

impl TransferEngine<SnapshotPredictor> {
    /// Engine reading predictions embedded in the snapshot
    pub fn new(config: OptimizerConfig) -> Self {
        Self::with_predictor(config, SnapshotPredictor)
    }
}

impl Default for TransferEngine<SnapshotPredictor> {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

impl<P: Predictor> TransferEngine<P> {
    pub fn with_predictor(config: OptimizerConfig, predictor: P) -> Self {
        let filter = AvailabilityFilter::new(config.availability.clone());
        Self { config, filter, predictor }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// First gameweek of the horizon: configured, else earliest fixture seen
    pub fn next_gameweek(&self, squad: &Squad, pool: &[Player]) -> u32 {
        self.config.scoring.next_gameweek.unwrap_or_else(|| {
            squad
                .players
                .iter()
                .chain(pool)
                .flat_map(|p| p.fixtures.iter().map(|f| f.gameweek))
                .min()
                .unwrap_or(FALLBACK_GAMEWEEK)
        })
    }

    fn scorer(&self, next_gameweek: u32) -> CandidateScorer<'_, P> {
        CandidateScorer::new(&self.config.scoring, &self.filter, &self.predictor, next_gameweek)
    }

    /// Transfers for `squad` with explicit free transfers and penalty, no chip
    pub fn compute_transfer_plan(
        &self,
        squad: &Squad,
        pool: &[Player],
        free_transfers: u8,
        penalty_per_extra: f64,
    ) -> TransferPlan {
        let scorer = self.scorer(self.next_gameweek(squad, pool));
        self.select_transfers(&scorer, squad, pool, free_transfers, penalty_per_extra, None)
    }

    /// Transfers for one team using its own free transfers and penalty
    pub fn plan_transfers(&self, request: TeamRequest<'_>) -> TransferPlan {
        let scorer = self.scorer(self.next_gameweek(request.squad, request.pool));
        let (free, penalty) = self.transfer_terms(request.squad);
        self.select_transfers(&scorer, request.squad, request.pool, free, penalty, request.chip)
    }

    /// Best lineup for `squad` as it stands
    pub fn compute_lineup(&self, squad: &Squad) -> Lineup {
        let scorer = self.scorer(self.next_gameweek(squad, &[]));
        self.select_lineup(&scorer, squad)
    }

    /// Plan transfers, apply them, then pick the lineup for the new squad
    pub fn decide(&self, request: TeamRequest<'_>) -> GameweekDecision {
        let gameweek = self.next_gameweek(request.squad, request.pool);
        let scorer = self.scorer(gameweek);
        let (free, penalty) = self.transfer_terms(request.squad);

        let plan =
            self.select_transfers(&scorer, request.squad, request.pool, free, penalty, request.chip);
        let updated = plan.apply(request.squad, request.pool);
        let lineup = self.select_lineup(&scorer, &updated);

        info!(
            "Gameweek {} decision: {} transfer(s), {} lineup worth {:.2}",
            gameweek,
            plan.len(),
            lineup.formation,
            lineup.expected_points
        );
        GameweekDecision { gameweek, plan, lineup }
    }

    /// Decide for many teams in parallel; output order matches input order
    pub fn decide_all(&self, requests: &[TeamRequest<'_>]) -> Vec<GameweekDecision> {
        requests.par_iter().map(|request| self.decide(*request)).collect()
    }

    /// Audit a transfer list with the configured budget reserve
    pub fn validate(
        &self,
        squad: &Squad,
        transfers: &[TransferRequest],
        pool: &[Player],
        chip: Option<Chip>,
    ) -> ValidationReport {
        validate_transfers(squad, transfers, pool, chip, self.config.transfers.budget_reserve)
    }

    fn transfer_terms(&self, squad: &Squad) -> (u8, f64) {
        let penalty = self.config.transfers.penalty_per_extra.unwrap_or(squad.transfer_penalty);
        (squad.free_transfers, penalty)
    }

    fn select_transfers(
        &self,
        scorer: &CandidateScorer<'_, P>,
        squad: &Squad,
        pool: &[Player],
        free_transfers: u8,
        penalty_per_extra: f64,
        chip: Option<Chip>,
    ) -> TransferPlan {
        let owned = scorer.score_all(&squad.players);
        let scored_pool = scorer.score_all(pool);

        let mut plan = TransferSelector::new(&self.config.transfers).select(
            squad,
            &owned,
            &scored_pool,
            free_transfers,
            penalty_per_extra,
            chip,
        );
        plan.warnings.extend(data_warnings(&owned));
        plan.warnings.extend(pool_warnings(squad, &scored_pool));
        plan
    }

    fn select_lineup(&self, scorer: &CandidateScorer<'_, P>, squad: &Squad) -> Lineup {
        let scored = scorer.score_all(&squad.players);
        let mut lineup = LineupSelector::new().select(&scored);
        lineup.warnings.extend(data_warnings(&scored));
        lineup
    }
}

/// Data gaps found while scoring squad members
fn data_warnings(scored: &[ScoredPlayer<'_>]) -> Vec<OptimizerWarning> {
    let warnings: Vec<OptimizerWarning> =
        scored.iter().flat_map(|p| p.availability.warnings.iter().cloned()).collect();
    for warning in &warnings {
        warn!("{}", warning);
    }
    warnings
}

/// First data gap of each unowned pool player
fn pool_warnings(squad: &Squad, scored_pool: &[ScoredPlayer<'_>]) -> Vec<OptimizerWarning> {
    let warnings: Vec<OptimizerWarning> = scored_pool
        .iter()
        .filter(|p| !squad.contains(p.id()))
        .filter_map(|p| p.availability.warnings.first().cloned())
        .collect();
    if !warnings.is_empty() {
        warn!("{} pool player(s) have incomplete data", warnings.len());
    }
    warnings
}
