//! The manager's current squad

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::money::Money;
use crate::types::{Player, PlayerId, Position};

/// Number of players a squad holds
pub const SQUAD_SIZE: usize = 15;

/// Most free transfers a manager can bank
pub const MAX_BANKED_FREE_TRANSFERS: u8 = 5;

/// Default points deducted per transfer beyond the banked free transfers
pub const DEFAULT_TRANSFER_PENALTY: f64 = 4.0;

fn default_free_transfers() -> u8 {
    1
}

fn default_transfer_penalty() -> f64 {
    DEFAULT_TRANSFER_PENALTY
}

/// A manager's owned players plus the transfer state that goes with them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Squad {
    /// Owned players (15 in a legal squad)
    pub players: Vec<Player>,

    /// Money left in the bank
    #[serde(default)]
    pub bank: Money,

    /// Free transfers currently banked (capped at 5)
    #[serde(default = "default_free_transfers")]
    pub free_transfers: u8,

    /// Points deducted per transfer beyond the free ones
    #[serde(default = "default_transfer_penalty")]
    pub transfer_penalty: f64,
}

impl Squad {
    /// Create a squad with one free transfer and the default penalty
    pub fn new(players: Vec<Player>, bank: Money) -> Self {
        Self {
            players,
            bank,
            free_transfers: default_free_transfers(),
            transfer_penalty: DEFAULT_TRANSFER_PENALTY,
        }
    }

    pub fn with_free_transfers(mut self, free_transfers: u8) -> Self {
        self.free_transfers = free_transfers.min(MAX_BANKED_FREE_TRANSFERS);
        self
    }

    pub fn with_transfer_penalty(mut self, penalty: f64) -> Self {
        self.transfer_penalty = penalty;
        self
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_ids(&self) -> HashSet<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    /// Owned players at a position
    pub fn at_position(&self, position: Position) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(move |p| p.position == Some(position))
    }

    /// Total sale value of the squad plus the bank
    pub fn team_value(&self) -> Money {
        self.players.iter().map(Player::sale_value).sum::<Money>() + self.bank
    }

    /// Replace `out_id` with `incoming`, adjusting the bank.
    ///
    /// Returns false and leaves the squad untouched when `out_id` is not owned.
    pub fn swap(&mut self, out_id: PlayerId, incoming: Player) -> bool {
        let Some(slot) = self.players.iter().position(|p| p.id == out_id) else {
            return false;
        };
        let sold = self.players[slot].sale_value();
        let bought = incoming.price.unwrap_or(Money::ZERO);
        self.bank = self.bank + sold - bought;
        self.players[slot] = incoming;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: PlayerId, position: Position, price: i64) -> Player {
        Player::new(id, "", position, id % 7, Money::from_tenths(price))
    }

    #[test]
    fn test_squad_lookup() {
        let squad = Squad::new(
            vec![player(1, Position::Goalkeeper, 45), player(2, Position::Forward, 80)],
            Money::from_tenths(10),
        );

        assert_eq!(squad.len(), 2);
        assert!(squad.contains(2));
        assert!(!squad.contains(3));
        assert_eq!(squad.at_position(Position::Forward).count(), 1);
        assert_eq!(squad.team_value(), Money::from_tenths(135));
    }

    #[test]
    fn test_swap_adjusts_bank() {
        let mut squad = Squad::new(vec![player(1, Position::Forward, 80)], Money::from_tenths(5));
        let incoming = player(9, Position::Forward, 82);

        assert!(squad.swap(1, incoming));
        assert_eq!(squad.bank, Money::from_tenths(3));
        assert!(squad.contains(9));
        assert!(!squad.contains(1));

        assert!(!squad.swap(1, player(10, Position::Forward, 50)));
        assert_eq!(squad.bank, Money::from_tenths(3));
    }

    #[test]
    fn test_free_transfers_capped() {
        let squad = Squad::new(Vec::new(), Money::ZERO).with_free_transfers(9);
        assert_eq!(squad.free_transfers, MAX_BANKED_FREE_TRANSFERS);
    }
}
