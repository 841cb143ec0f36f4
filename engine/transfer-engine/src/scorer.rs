//! Candidate scorer
//!
//! Combines predicted points, the availability multiplier and fixture
//! difficulty into one horizon score per player. The horizon score is the
//! only value the selectors compare, so everything here is deterministic.

use crate::availability::{Availability, AvailabilityFilter};
use crate::config::ScoringConfig;
use crate::error::OptimizerWarning;
use crate::predictor::Predictor;
use player_registry::{ClubId, MissingField, Player, PlayerId};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// Lowest and highest difficulty ratings
pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 5;

/// Gameweeks that count toward a horizon score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HorizonWindow {
    /// First gameweek in the window
    pub start: u32,

    /// Number of gameweeks in the window
    pub length: u32,
}

impl HorizonWindow {
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    pub fn contains(&self, gameweek: u32) -> bool {
        gameweek >= self.start && gameweek - self.start < self.length
    }

    /// Zero-based distance from the start of the window
    pub fn offset(&self, gameweek: u32) -> u32 {
        gameweek.saturating_sub(self.start)
    }
}

/// Fixture multiplier for an opponent difficulty rating
///
/// `(base - step * (d - 3)) / (base + 2 * step)`, so the easiest fixture
/// weighs 1.0 and harder fixtures weigh strictly less while staying
/// positive. Ratings outside 1..=5 are clamped.
pub fn difficulty_weight(config: &ScoringConfig, difficulty: u8) -> f64 {
    let d = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY) as f64;
    let easiest = config.difficulty_base + 2.0 * config.difficulty_step;
    let weight = (config.difficulty_base - config.difficulty_step * (d - 3.0)) / easiest;
    weight.min(1.0)
}

/// Contribution of one fixture to a horizon score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureScore {
    pub gameweek: u32,
    pub opponent: ClubId,
    pub difficulty: u8,
    pub predicted_points: Option<f64>,
    pub confidence: Option<f64>,
    pub difficulty_weight: f64,
    pub decay_weight: f64,
    pub score: f64,
}

/// A player with everything the selectors need to compare them
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPlayer<'a> {
    #[serde(skip)]
    pub player: &'a Player,
    pub player_id: PlayerId,
    pub availability: Availability,
    pub horizon_score: f64,

    /// Raw predicted points for the next gameweek, before any weighting
    pub next_fixture_points: f64,
    pub fixtures: Vec<FixtureScore>,
}

impl<'a> ScoredPlayer<'a> {
    pub fn id(&self) -> PlayerId {
        self.player.id
    }

    pub fn multiplier(&self) -> f64 {
        self.availability.multiplier
    }

    /// Whether the player can be expected to play at all
    pub fn can_play(&self) -> bool {
        self.availability.multiplier > 0.0
    }

    /// Horizon score per million spent (unknown or zero prices give None)
    pub fn value_per_million(&self) -> Option<f64> {
        let price = self.player.price?;
        if price.to_tenths() <= 0 {
            return None;
        }
        Some(self.horizon_score / price.to_millions())
    }
}

/// Rank players best first: horizon score, then next-fixture points, then lower id
pub fn rank_order(a: &ScoredPlayer<'_>, b: &ScoredPlayer<'_>) -> Ordering {
    b.horizon_score
        .total_cmp(&a.horizon_score)
        .then_with(|| b.next_fixture_points.total_cmp(&a.next_fixture_points))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Candidate scorer
pub struct CandidateScorer<'c, P: Predictor + ?Sized> {
    config: &'c ScoringConfig,
    filter: &'c AvailabilityFilter,
    predictor: &'c P,
    window: HorizonWindow,
}

impl<'c, P: Predictor + ?Sized> CandidateScorer<'c, P> {
    /// Create a scorer for the window starting at `next_gameweek`
    pub fn new(
        config: &'c ScoringConfig,
        filter: &'c AvailabilityFilter,
        predictor: &'c P,
        next_gameweek: u32,
    ) -> Self {
        let window = HorizonWindow::new(next_gameweek, config.effective_horizon());
        Self { config, filter, predictor, window }
    }

    pub fn window(&self) -> HorizonWindow {
        self.window
    }

    /// Score one player over the horizon
    pub fn score<'a>(&self, player: &'a Player) -> ScoredPlayer<'a> {
        let mut availability = self.filter.assess(player);
        let multiplier = availability.multiplier;

        let mut fixtures = Vec::new();
        let mut horizon_score = 0.0;
        let mut next_fixture_points = 0.0;
        let mut missing_prediction = false;

        for fixture in player.fixtures.iter().filter(|f| self.window.contains(f.gameweek)) {
            let prediction = self
                .predictor
                .predict(player.id, fixture)
                .filter(|p| p.expected_points.is_finite());
            let weight = difficulty_weight(self.config, fixture.difficulty);
            let offset = self.window.offset(fixture.gameweek);
            let decay_weight = self.config.decay.powi(offset as i32);

            let score = match prediction {
                Some(p) => p.expected_points * multiplier * weight * decay_weight,
                None => {
                    missing_prediction = true;
                    0.0
                }
            };
            if offset == 0 {
                next_fixture_points += prediction.map(|p| p.expected_points).unwrap_or(0.0);
            }
            horizon_score += score;

            fixtures.push(FixtureScore {
                gameweek: fixture.gameweek,
                opponent: fixture.opponent,
                difficulty: fixture.difficulty,
                predicted_points: prediction.map(|p| p.expected_points),
                confidence: prediction.map(|p| p.confidence),
                difficulty_weight: weight,
                decay_weight,
                score,
            });
        }

        if missing_prediction {
            debug!("Player {} is missing predictions inside the horizon", player.id);
            availability.warnings.push(OptimizerWarning::missing(
                player.id,
                MissingField::Prediction,
                "fixture scored as zero",
            ));
        }

        ScoredPlayer {
            player,
            player_id: player.id,
            availability,
            horizon_score,
            next_fixture_points,
            fixtures,
        }
    }

    /// Score a slice of players, preserving order
    pub fn score_all<'a>(&self, players: &'a [Player]) -> Vec<ScoredPlayer<'a>> {
        players.iter().map(|player| self.score(player)).collect()
    }
}
