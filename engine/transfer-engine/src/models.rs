//! Result types for transfer plans, lineups and engine requests

use crate::error::OptimizerWarning;
use player_registry::{Money, Player, PlayerId, Position, Squad};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Chips that change how transfers are charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chip {
    /// Unlimited free transfers, permanent
    Wildcard,

    /// Unlimited free transfers for one gameweek
    FreeHit,
}

impl Chip {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chip::Wildcard => "wildcard",
            Chip::FreeHit => "free-hit",
        }
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chip {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wildcard" | "wc" => Ok(Chip::Wildcard),
            "free-hit" | "freehit" | "free_hit" | "fh" => Ok(Chip::FreeHit),
            other => Err(format!("Unknown chip '{other}', expected wildcard or free-hit")),
        }
    }
}

/// One proposed swap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferProposal {
    pub player_out: PlayerId,
    pub player_in: PlayerId,
    pub out_name: String,
    pub in_name: String,
    pub position: Position,

    /// What the outgoing player sells for
    pub selling_price: Money,

    /// What the incoming player costs
    pub price: Money,

    /// `price - selling_price`; negative frees money
    pub net_cost: Money,
    pub score_out: f64,
    pub score_in: f64,

    /// `score_in - score_out` over the horizon
    pub point_gain: f64,
}

/// A set of disjoint transfers plus what they cost in points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferPlan {
    pub transfers: Vec<TransferProposal>,
    pub free_transfers_used: usize,
    pub paid_transfers: usize,

    /// Points deducted for transfers beyond the free ones
    pub penalty: f64,

    /// Sum of point gains before the penalty
    pub total_gain: f64,
    pub net_gain: f64,
    pub bank_after: Money,
    pub chip: Option<Chip>,
    pub warnings: Vec<OptimizerWarning>,
}

impl TransferPlan {
    /// A plan that keeps the squad as it is
    pub fn empty(bank: Money, chip: Option<Chip>, warnings: Vec<OptimizerWarning>) -> Self {
        Self {
            transfers: Vec::new(),
            free_transfers_used: 0,
            paid_transfers: 0,
            penalty: 0.0,
            total_gain: 0.0,
            net_gain: 0.0,
            bank_after: bank,
            chip,
            warnings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    /// Player ids leaving the squad
    pub fn outgoing(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.transfers.iter().map(|t| t.player_out)
    }

    /// Player ids joining the squad
    pub fn incoming(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.transfers.iter().map(|t| t.player_in)
    }

    /// Squad after every transfer in the plan
    ///
    /// Incoming players are looked up in `pool`; a proposal whose incoming
    /// player is not in the pool is skipped. Free transfers drop by the
    /// number used.
    pub fn apply(&self, squad: &Squad, pool: &[Player]) -> Squad {
        let mut updated = squad.clone();
        for transfer in &self.transfers {
            let Some(incoming) = pool.iter().find(|p| p.id == transfer.player_in) else {
                warn!("Incoming player {} missing from pool, transfer skipped", transfer.player_in);
                continue;
            };
            let mut incoming = incoming.clone();
            incoming.selling_price = None;
            if !updated.swap(transfer.player_out, incoming) {
                warn!("Outgoing player {} not in squad, transfer skipped", transfer.player_out);
            }
        }
        let used = self.free_transfers_used.min(u8::MAX as usize) as u8;
        updated.free_transfers = updated.free_transfers.saturating_sub(used);
        updated
    }
}

/// Legal outfield shapes, ordered by fewest defenders first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Formation {
    #[serde(rename = "3-4-3")]
    ThreeFourThree,
    #[serde(rename = "3-5-2")]
    ThreeFiveTwo,
    #[serde(rename = "4-3-3")]
    FourThreeThree,
    #[serde(rename = "4-4-2")]
    FourFourTwo,
    #[serde(rename = "4-5-1")]
    FourFiveOne,
    #[serde(rename = "5-2-3")]
    FiveTwoThree,
    #[serde(rename = "5-3-2")]
    FiveThreeTwo,
    #[serde(rename = "5-4-1")]
    FiveFourOne,
}

impl Formation {
    /// Every shape in preference order
    pub const ALL: [Formation; 8] = [
        Formation::ThreeFourThree,
        Formation::ThreeFiveTwo,
        Formation::FourThreeThree,
        Formation::FourFourTwo,
        Formation::FourFiveOne,
        Formation::FiveTwoThree,
        Formation::FiveThreeTwo,
        Formation::FiveFourOne,
    ];

    /// (defenders, midfielders, forwards)
    pub fn counts(&self) -> (usize, usize, usize) {
        match self {
            Formation::ThreeFourThree => (3, 4, 3),
            Formation::ThreeFiveTwo => (3, 5, 2),
            Formation::FourThreeThree => (4, 3, 3),
            Formation::FourFourTwo => (4, 4, 2),
            Formation::FourFiveOne => (4, 5, 1),
            Formation::FiveTwoThree => (5, 2, 3),
            Formation::FiveThreeTwo => (5, 3, 2),
            Formation::FiveFourOne => (5, 4, 1),
        }
    }

    /// Starters needed at a position
    pub fn starters_at(&self, position: Position) -> usize {
        let (def, mid, fwd) = self.counts();
        match position {
            Position::Goalkeeper => 1,
            Position::Defender => def,
            Position::Midfielder => mid,
            Position::Forward => fwd,
        }
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (def, mid, fwd) = self.counts();
        write!(f, "{def}-{mid}-{fwd}")
    }
}

/// One player's place in a lineup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineupSlot {
    pub player_id: PlayerId,
    pub name: String,
    pub position: Option<Position>,
    pub horizon_score: f64,
    pub next_fixture_points: f64,

    /// False when the player is starting only because nobody else could
    pub available: bool,
}

/// Starting eleven, bench and armbands
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lineup {
    pub formation: Formation,

    /// Ordered goalkeeper, defenders, midfielders, forwards
    pub starters: Vec<LineupSlot>,

    /// Substitutes in priority order, goalkeeper last
    pub bench: Vec<LineupSlot>,
    pub captain: Option<PlayerId>,
    pub vice_captain: Option<PlayerId>,

    /// Horizon score of the eleven
    pub total_score: f64,

    /// Total with the captain's score counted twice
    pub expected_points: f64,
    pub degraded: bool,
    pub warnings: Vec<OptimizerWarning>,
}

impl Lineup {
    pub fn starter_ids(&self) -> Vec<PlayerId> {
        self.starters.iter().map(|s| s.player_id).collect()
    }

    pub fn bench_ids(&self) -> Vec<PlayerId> {
        self.bench.iter().map(|s| s.player_id).collect()
    }

    pub fn is_starting(&self, player_id: PlayerId) -> bool {
        self.starters.iter().any(|s| s.player_id == player_id)
    }

    /// Whether the eleven satisfies formation rules
    pub fn is_legal(&self) -> bool {
        let positions: Option<Vec<Position>> = self.starters.iter().map(|s| s.position).collect();
        positions.is_some_and(|eleven| crate::rules::is_lineup_legal(&eleven).is_ok())
    }
}

/// One team's inputs to [`crate::TransferEngine::decide`]
#[derive(Debug, Clone, Copy)]
pub struct TeamRequest<'a> {
    pub squad: &'a Squad,

    /// Every player in the league, owned or not
    pub pool: &'a [Player],
    pub chip: Option<Chip>,
}

impl<'a> TeamRequest<'a> {
    pub fn new(squad: &'a Squad, pool: &'a [Player]) -> Self {
        Self { squad, pool, chip: None }
    }

    pub fn with_chip(mut self, chip: Option<Chip>) -> Self {
        self.chip = chip;
        self
    }
}

/// Transfers to make and the lineup to field afterwards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameweekDecision {
    /// First gameweek of the scoring horizon
    pub gameweek: u32,
    pub plan: TransferPlan,
    pub lineup: Lineup,
}
