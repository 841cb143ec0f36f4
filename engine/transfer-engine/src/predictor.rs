//! Expected-points oracle contract
//!
//! The statistical model lives outside this crate. The engine only needs a
//! point estimate per player and fixture, or an explicit "no prediction".

use player_registry::{Fixture, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One expected-points estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub expected_points: f64,

    /// Model confidence in [0, 1]. Reported, not used for scoring.
    pub confidence: f64,
}

impl Prediction {
    pub fn new(expected_points: f64, confidence: f64) -> Self {
        Self { expected_points, confidence }
    }
}

/// Source of per-fixture expected points
///
/// Implementations must be pure lookups: `None` means no prediction is
/// available and the engine scores that fixture as zero.
pub trait Predictor: Send + Sync {
    fn predict(&self, player_id: PlayerId, fixture: &Fixture) -> Option<Prediction>;
}

/// Reads predictions already embedded in the snapshot's fixtures
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotPredictor;

impl Predictor for SnapshotPredictor {
    fn predict(&self, _player_id: PlayerId, fixture: &Fixture) -> Option<Prediction> {
        fixture
            .predicted_points
            .filter(|points| points.is_finite())
            .map(|points| Prediction::new(points, 1.0))
    }
}

/// Explicit table of predictions keyed by player and gameweek
///
/// Double gameweeks share one entry per gameweek, applied to each fixture.
#[derive(Debug, Clone, Default)]
pub struct TablePredictor {
    predictions: HashMap<(PlayerId, u32), Prediction>,
}

impl TablePredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, player_id: PlayerId, gameweek: u32, prediction: Prediction) {
        self.predictions.insert((player_id, gameweek), prediction);
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

impl FromIterator<(PlayerId, u32, Prediction)> for TablePredictor {
    fn from_iter<I: IntoIterator<Item = (PlayerId, u32, Prediction)>>(iter: I) -> Self {
        let mut table = TablePredictor::new();
        for (player_id, gameweek, prediction) in iter {
            table.insert(player_id, gameweek, prediction);
        }
        table
    }
}

impl Predictor for TablePredictor {
    fn predict(&self, player_id: PlayerId, fixture: &Fixture) -> Option<Prediction> {
        self.predictions.get(&(player_id, fixture.gameweek)).copied()
    }
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, player_id: PlayerId, fixture: &Fixture) -> Option<Prediction> {
        (**self).predict(player_id, fixture)
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn predict(&self, player_id: PlayerId, fixture: &Fixture) -> Option<Prediction> {
        (**self).predict(player_id, fixture)
    }
}
