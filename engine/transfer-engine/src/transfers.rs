//! Transfer selector
//!
//! Greedy search over same-position swaps. Each round finds the best legal
//! replacement for every owned player against the current bank and club
//! counts, takes the single best swap, and repeats until no swap is worth
//! its penalty. Recomputing every round means a candidate that an earlier
//! swap made illegal is replaced by its owner's next best option instead of
//! being dropped.

use crate::config::TransferConfig;
use crate::error::OptimizerWarning;
use crate::models::{Chip, TransferPlan, TransferProposal};
use crate::rules::{self, MAX_PER_CLUB};
use crate::scorer::ScoredPlayer;
use player_registry::{ClubId, Money, PlayerId, Squad};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Per-run transfer state: bank, club counts and players already moved
#[derive(Debug, Clone)]
struct SelectionState {
    bank: Money,
    clubs: BTreeMap<ClubId, usize>,
    sold: HashSet<PlayerId>,
    bought: HashSet<PlayerId>,
}

impl SelectionState {
    fn new(squad: &Squad) -> Self {
        Self {
            bank: squad.bank,
            clubs: rules::club_counts(&squad.players),
            sold: HashSet::new(),
            bought: HashSet::new(),
        }
    }

    fn club_allows(&self, out_club: ClubId, in_club: ClubId) -> bool {
        out_club == in_club || rules::can_add_from_club(&self.clubs, in_club)
    }

    fn accept(&mut self, proposal: &TransferProposal, out_club: ClubId, in_club: ClubId) {
        self.bank = self.bank - proposal.net_cost;
        if let Some(count) = self.clubs.get_mut(&out_club) {
            *count = count.saturating_sub(1);
        }
        *self.clubs.entry(in_club).or_insert(0) += 1;
        self.sold.insert(proposal.player_out);
        self.bought.insert(proposal.player_in);
    }
}

/// Candidate order: gain, then cheaper, then weaker outgoing player, then ids
fn candidate_order(a: &TransferProposal, b: &TransferProposal) -> Ordering {
    b.point_gain
        .total_cmp(&a.point_gain)
        .then_with(|| a.net_cost.cmp(&b.net_cost))
        .then_with(|| a.score_out.total_cmp(&b.score_out))
        .then_with(|| a.player_out.cmp(&b.player_out))
        .then_with(|| a.player_in.cmp(&b.player_in))
}

/// Transfer selector
pub struct TransferSelector<'c> {
    config: &'c TransferConfig,
}

impl<'c> TransferSelector<'c> {
    pub fn new(config: &'c TransferConfig) -> Self {
        Self { config }
    }

    /// Choose transfers for `squad`
    ///
    /// `owned` holds the scored squad and `pool` the scored league; owned
    /// players inside `pool` are ignored. Never fails: an illegal input
    /// squad or a plan that breaks a rule after the fact is reported as a
    /// warning on the plan.
    pub fn select(
        &self,
        squad: &Squad,
        owned: &[ScoredPlayer<'_>],
        pool: &[ScoredPlayer<'_>],
        free_transfers: u8,
        penalty_per_extra: f64,
        chip: Option<Chip>,
    ) -> TransferPlan {
        let mut warnings = Vec::new();
        let input_legal = match rules::is_squad_legal(squad) {
            Ok(()) => true,
            Err(violation) => {
                warn!("Input squad is not legal: {}", violation);
                warnings.push(OptimizerWarning::IllegalInputSquad { violation });
                false
            }
        };

        let owned_ids = squad.player_ids();
        let candidates: Vec<&ScoredPlayer<'_>> = pool
            .iter()
            .filter(|c| !owned_ids.contains(&c.id()))
            .filter(|c| c.availability.transfer_in_eligible)
            .collect();

        let unlimited = chip.is_some();
        let penalty_per_extra = if unlimited { 0.0 } else { penalty_per_extra };
        let cap = if unlimited { None } else { self.config.max_transfers };

        let mut state = SelectionState::new(squad);
        let mut accepted: Vec<TransferProposal> = Vec::new();
        let mut penalty = 0.0;
        let mut free_used = 0;

        loop {
            if cap.is_some_and(|max| accepted.len() >= max) {
                debug!("Transfer cap of {} reached", accepted.len());
                break;
            }

            let Some((best, out_club, in_club)) = self.best_swap(owned, &candidates, &state) else {
                break;
            };

            let is_free = unlimited || accepted.len() < free_transfers as usize;
            if !is_free && best.point_gain <= penalty_per_extra {
                debug!(
                    "Best remaining swap {} -> {} gains {:.2}, not worth a {:.1} point hit",
                    best.player_out, best.player_in, best.point_gain, penalty_per_extra
                );
                break;
            }

            debug!(
                "Accepted {} -> {} for {:.2} points ({})",
                best.out_name, best.in_name, best.point_gain, best.net_cost
            );
            if is_free {
                free_used += 1;
            } else {
                penalty += penalty_per_extra;
            }
            state.accept(&best, out_club, in_club);
            accepted.push(best);
        }

        let total_gain: f64 = accepted.iter().map(|t| t.point_gain).sum();
        let plan = TransferPlan {
            paid_transfers: accepted.len() - free_used,
            free_transfers_used: free_used,
            transfers: accepted,
            penalty,
            total_gain,
            net_gain: total_gain - penalty,
            bank_after: state.bank,
            chip,
            warnings,
        };

        if input_legal && !plan.is_empty() {
            let pool_players: Vec<_> = pool.iter().map(|c| c.player.clone()).collect();
            if let Err(violation) = rules::is_squad_legal(&plan.apply(squad, &pool_players)) {
                warn!("Discarding transfer plan: {}", violation);
                let mut warnings = plan.warnings;
                warnings.push(OptimizerWarning::PlanRejected { violation });
                return TransferPlan::empty(squad.bank, chip, warnings);
            }
        }

        info!(
            "Transfer plan: {} transfer(s), gain {:.2}, penalty {:.1}, bank after {}",
            plan.len(),
            plan.total_gain,
            plan.penalty,
            plan.bank_after
        );
        plan
    }

    /// Best legal swap across all unsold owned players under the current state
    fn best_swap(
        &self,
        owned: &[ScoredPlayer<'_>],
        candidates: &[&ScoredPlayer<'_>],
        state: &SelectionState,
    ) -> Option<(TransferProposal, ClubId, ClubId)> {
        owned
            .iter()
            .filter(|out| !state.sold.contains(&out.id()))
            .filter_map(|out| self.best_replacement(out, candidates, state))
            .min_by(|a, b| candidate_order(&a.0, &b.0))
    }

    /// Best legal same-position replacement for one owned player
    fn best_replacement(
        &self,
        out: &ScoredPlayer<'_>,
        candidates: &[&ScoredPlayer<'_>],
        state: &SelectionState,
    ) -> Option<(TransferProposal, ClubId, ClubId)> {
        let position = out.player.position?;
        let selling_price = out.player.sale_value();

        candidates
            .iter()
            .filter(|c| c.player.position == Some(position))
            .filter(|c| !state.bought.contains(&c.id()))
            .filter_map(|incoming| {
                let price = incoming.player.price?;
                let point_gain = incoming.horizon_score - out.horizon_score;
                if point_gain <= self.config.min_gain {
                    return None;
                }

                let net_cost = price - selling_price;
                if state.bank - net_cost < self.config.budget_reserve {
                    return None;
                }
                if !state.club_allows(out.player.club, incoming.player.club) {
                    debug!(
                        "Skipping {} for {}: club {} already has {} players",
                        incoming.id(),
                        out.id(),
                        incoming.player.club,
                        MAX_PER_CLUB
                    );
                    return None;
                }

                let proposal = TransferProposal {
                    player_out: out.id(),
                    player_in: incoming.id(),
                    out_name: out.player.display_name(),
                    in_name: incoming.player.display_name(),
                    position,
                    selling_price,
                    price,
                    net_cost,
                    score_out: out.horizon_score,
                    score_in: incoming.horizon_score,
                    point_gain,
                };
                Some((proposal, out.player.club, incoming.player.club))
            })
            .min_by(|a, b| candidate_order(&a.0, &b.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::AvailabilityFilter;
    use crate::config::ScoringConfig;
    use crate::predictor::SnapshotPredictor;
    use crate::scorer::CandidateScorer;
    use crate::test_support::{legal_squad, pool_player};
    use player_registry::{AvailabilityStatus, Player, Position};

    fn run(
        squad: &Squad,
        pool: &[Player],
        config: &TransferConfig,
        chip: Option<Chip>,
    ) -> TransferPlan {
        let scoring = ScoringConfig::default();
        let filter = AvailabilityFilter::default();
        let scorer = CandidateScorer::new(&scoring, &filter, &SnapshotPredictor, 1);
        let owned = scorer.score_all(&squad.players);
        let scored_pool = scorer.score_all(pool);
        TransferSelector::new(config).select(
            squad,
            &owned,
            &scored_pool,
            squad.free_transfers,
            squad.transfer_penalty,
            chip,
        )
    }

    #[test]
    fn test_no_better_player_gives_empty_plan() {
        let squad = legal_squad();
        let pool = vec![pool_player(200, Position::Forward, 9, 60, 0.5)];
        let plan = run(&squad, &pool, &TransferConfig::default(), None);

        assert!(plan.is_empty());
        assert_eq!(plan.penalty, 0.0);
        assert_eq!(plan.bank_after, squad.bank);
    }

    #[test]
    fn test_single_upgrade_uses_free_transfer() {
        let squad = legal_squad();
        let pool = vec![pool_player(200, Position::Forward, 9, 80, 20.0)];
        let plan = run(&squad, &pool, &TransferConfig::default(), None);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.free_transfers_used, 1);
        assert_eq!(plan.paid_transfers, 0);
        assert_eq!(plan.penalty, 0.0);
        assert_eq!(plan.transfers[0].player_in, 200);
        assert_eq!(plan.transfers[0].position, Position::Forward);
    }

    #[test]
    fn test_paid_transfer_needs_gain_above_penalty() {
        let squad = legal_squad().with_free_transfers(1);
        let pool = vec![
            pool_player(200, Position::Forward, 9, 80, 30.0),
            // Beats the weakest midfielder by 3, less than the 4 point hit
            pool_player(201, Position::Midfielder, 9, 70, 7.0),
        ];
        let plan = run(&squad, &pool, &TransferConfig::default(), None);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.transfers[0].player_in, 200);
        assert_eq!(plan.penalty, 0.0);
    }

    #[test]
    fn test_hit_taken_when_gain_exceeds_penalty() {
        let squad = legal_squad().with_free_transfers(1);
        let pool = vec![
            pool_player(200, Position::Forward, 9, 80, 30.0),
            pool_player(201, Position::Forward, 10, 80, 25.0),
        ];
        let plan = run(&squad, &pool, &TransferConfig::default(), None);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.free_transfers_used, 1);
        assert_eq!(plan.paid_transfers, 1);
        assert_eq!(plan.penalty, 4.0);
        assert_eq!(plan.net_gain, plan.total_gain - 4.0);
    }

    #[test]
    fn test_chip_removes_penalty_and_cap() {
        let squad = legal_squad().with_free_transfers(0);
        let pool = vec![
            pool_player(200, Position::Forward, 9, 80, 30.0),
            pool_player(201, Position::Forward, 10, 80, 25.0),
        ];
        let config = TransferConfig { max_transfers: Some(1), ..Default::default() };

        let capped = run(&squad, &pool, &config, None);
        assert_eq!(capped.len(), 1);
        assert_eq!(capped.penalty, 4.0);

        let wildcard = run(&squad, &pool, &config, Some(Chip::Wildcard));
        assert_eq!(wildcard.len(), 2);
        assert_eq!(wildcard.penalty, 0.0);
        assert_eq!(wildcard.chip, Some(Chip::Wildcard));
    }

    #[test]
    fn test_budget_blocks_unaffordable_upgrade() {
        let squad = legal_squad();
        // Forwards sell for 8.0m and the bank holds 1.0m
        let pool = vec![pool_player(200, Position::Forward, 9, 95, 30.0)];
        let plan = run(&squad, &pool, &TransferConfig::default(), None);
        assert!(plan.is_empty());

        let pool = vec![pool_player(200, Position::Forward, 9, 90, 30.0)];
        let plan = run(&squad, &pool, &TransferConfig::default(), None);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.bank_after, Money::ZERO);

        let config = TransferConfig { budget_reserve: Money::from_tenths(5), ..Default::default() };
        let plan = run(&squad, &pool, &config, None);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_club_quota_respected() {
        let squad = legal_squad();
        // Club 1 already holds three players (ids 1 to 3)
        let pool = vec![
            pool_player(200, Position::Forward, 1, 80, 30.0),
            pool_player(201, Position::Forward, 9, 80, 20.0),
        ];
        let plan = run(&squad, &pool, &TransferConfig::default(), None);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.transfers[0].player_in, 201);
    }

    #[test]
    fn test_same_club_swap_allowed_at_quota() {
        let squad = legal_squad();
        // Defender 3 plays for club 1, which is full
        let pool = vec![pool_player(200, Position::Defender, 1, 50, 30.0)];
        let plan = run(&squad, &pool, &TransferConfig::default(), None);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.transfers[0].player_out, 3);
    }

    #[test]
    fn test_ineligible_players_never_bought() {
        let squad = legal_squad();
        let injured = pool_player(200, Position::Forward, 9, 80, 30.0)
            .with_status(AvailabilityStatus::Injured, Some(0.0));
        let mut unpriced = pool_player(201, Position::Forward, 9, 80, 30.0);
        unpriced.price = None;

        let plan = run(&squad, &[injured, unpriced], &TransferConfig::default(), None);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_illegal_input_squad_is_flagged() {
        let mut squad = legal_squad();
        squad.players.pop();
        let plan = run(&squad, &[], &TransferConfig::default(), None);

        assert!(plan.is_empty());
        assert!(matches!(plan.warnings[0], OptimizerWarning::IllegalInputSquad { .. }));
    }

    #[test]
    fn test_candidate_order_tie_breaks() {
        let base = TransferProposal {
            player_out: 5,
            player_in: 50,
            out_name: String::new(),
            in_name: String::new(),
            position: Position::Defender,
            selling_price: Money::from_tenths(50),
            price: Money::from_tenths(50),
            net_cost: Money::ZERO,
            score_out: 2.0,
            score_in: 5.0,
            point_gain: 3.0,
        };
        let cheaper = TransferProposal { net_cost: Money::from_tenths(-1), ..base.clone() };
        let weaker_out = TransferProposal { score_out: 1.0, ..base.clone() };
        let lower_out = TransferProposal { player_out: 4, ..base.clone() };
        let lower_in = TransferProposal { player_in: 49, ..base.clone() };

        assert_eq!(candidate_order(&cheaper, &base), Ordering::Less);
        assert_eq!(candidate_order(&weaker_out, &base), Ordering::Less);
        assert_eq!(candidate_order(&lower_out, &base), Ordering::Less);
        assert_eq!(candidate_order(&lower_in, &base), Ordering::Less);
    }
}
