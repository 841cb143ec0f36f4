//! Lineup selector
//!
//! Tries every formation shape, fills each from the best players at each
//! position, and keeps the shape that needs the fewest unavailable starters
//! and scores the most.

use crate::error::OptimizerWarning;
use crate::models::{Formation, Lineup, LineupSlot};
use crate::scorer::{rank_order, ScoredPlayer};
use player_registry::{PlayerId, Position};
use tracing::{info, warn};

/// A formation filled from one squad
#[derive(Debug)]
struct Candidate<'s, 'a> {
    formation: Formation,
    starters: Vec<&'s ScoredPlayer<'a>>,

    /// Slots filled by players who cannot play
    unavailable: usize,

    /// Slots nobody in the squad can fill
    missing: usize,
    total: f64,
}

impl Candidate<'_, '_> {
    fn shortfall(&self) -> usize {
        self.unavailable + self.missing
    }

    /// Whether `self` should replace the current best
    fn beats(&self, best: &Self) -> bool {
        (self.missing, self.unavailable) < (best.missing, best.unavailable)
            || ((self.missing, self.unavailable) == (best.missing, best.unavailable)
                && self.total > best.total)
    }
}

/// Lineup selector
#[derive(Debug, Default, Clone, Copy)]
pub struct LineupSelector;

impl LineupSelector {
    pub fn new() -> Self {
        Self
    }

    /// Pick the eleven, bench order and armbands for a scored squad
    pub fn select(&self, squad: &[ScoredPlayer<'_>]) -> Lineup {
        let by_position = group_by_position(squad);

        let mut best = fill(Formation::ALL[0], &by_position);
        for formation in Formation::ALL.into_iter().skip(1) {
            let candidate = fill(formation, &by_position);
            if candidate.beats(&best) {
                best = candidate;
            }
        }

        let mut warnings = Vec::new();
        let degraded = best.shortfall() > 0;
        if degraded {
            warn!(
                "Degraded {} lineup: {} unavailable starter(s), {} empty slot(s)",
                best.formation, best.unavailable, best.missing
            );
            warnings.push(OptimizerWarning::InfeasibleLineup { shortfall: best.shortfall() });
        }

        let (captain, vice_captain) = armbands(&best.starters);
        let bench = bench_order(squad, &best.starters);
        let total_score = best.total;
        let captain_score = captain
            .and_then(|id| best.starters.iter().find(|p| p.id() == id))
            .map_or(0.0, |p| p.horizon_score);

        info!(
            "Lineup {} with {:.2} points, captain {:?}",
            best.formation, total_score, captain
        );

        Lineup {
            formation: best.formation,
            starters: best.starters.iter().map(|p| slot(p)).collect(),
            bench: bench.iter().map(|p| slot(p)).collect(),
            captain,
            vice_captain,
            total_score,
            expected_points: total_score + captain_score,
            degraded,
            warnings,
        }
    }
}

/// Squad members per position, each list ranked best first
fn group_by_position<'s, 'a>(squad: &'s [ScoredPlayer<'a>]) -> [Vec<&'s ScoredPlayer<'a>>; 4] {
    let mut groups: [Vec<&ScoredPlayer<'a>>; 4] = Default::default();
    for player in squad {
        if let Some(position) = player.player.position {
            groups[position.index()].push(player);
        }
    }
    for group in groups.iter_mut() {
        group.sort_by(|a, b| rank_order(a, b));
    }
    groups
}

/// Fill one formation: available players first, then whoever is left
fn fill<'s, 'a>(
    formation: Formation,
    by_position: &[Vec<&'s ScoredPlayer<'a>>; 4],
) -> Candidate<'s, 'a> {
    let mut starters = Vec::with_capacity(crate::rules::STARTING_XI);
    let mut unavailable = 0;
    let mut missing = 0;

    for position in Position::ALL {
        let needed = formation.starters_at(position);
        let group = &by_position[position.index()];

        let mut chosen: Vec<&ScoredPlayer<'a>> =
            group.iter().copied().filter(|p| p.can_play()).take(needed).collect();
        let short = needed - chosen.len();
        let fillers: Vec<&ScoredPlayer<'a>> =
            group.iter().copied().filter(|p| !p.can_play()).take(short).collect();
        unavailable += fillers.len();
        missing += short - fillers.len();
        chosen.extend(fillers);

        chosen.sort_by(|a, b| rank_order(a, b));
        starters.extend(chosen);
    }

    let total = starting_total(&starters);
    Candidate { formation, starters, unavailable, missing, total }
}

/// Sum of starter scores, added largest first so equal sets of scores
/// give bit-identical totals whatever the shape
fn starting_total(starters: &[&ScoredPlayer<'_>]) -> f64 {
    let mut scores: Vec<f64> = starters.iter().map(|p| p.horizon_score).collect();
    scores.sort_by(|a, b| b.total_cmp(a));
    scores.iter().sum()
}

/// Captain and vice from the starters, preferring players who can play
fn armbands(starters: &[&ScoredPlayer<'_>]) -> (Option<PlayerId>, Option<PlayerId>) {
    let mut ranked: Vec<&ScoredPlayer<'_>> = starters.to_vec();
    ranked.sort_by(|a, b| b.can_play().cmp(&a.can_play()).then_with(|| rank_order(a, b)));
    let mut ids = ranked.iter().map(|p| p.id());
    (ids.next(), ids.next())
}

/// Everyone not starting: outfielders best first, goalkeepers last
fn bench_order<'s, 'a>(
    squad: &'s [ScoredPlayer<'a>],
    starters: &[&ScoredPlayer<'a>],
) -> Vec<&'s ScoredPlayer<'a>> {
    let mut bench: Vec<&ScoredPlayer<'a>> =
        squad.iter().filter(|p| !starters.iter().any(|s| s.id() == p.id())).collect();
    bench.sort_by(|a, b| {
        let a_keeper = a.player.position == Some(Position::Goalkeeper);
        let b_keeper = b.player.position == Some(Position::Goalkeeper);
        a_keeper.cmp(&b_keeper).then_with(|| rank_order(a, b))
    });
    bench
}

fn slot(player: &ScoredPlayer<'_>) -> LineupSlot {
    LineupSlot {
        player_id: player.id(),
        name: player.player.display_name(),
        position: player.player.position,
        horizon_score: player.horizon_score,
        next_fixture_points: player.next_fixture_points,
        available: player.can_play(),
    }
}
