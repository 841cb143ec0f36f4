use crate::money::Money;
use crate::squad::{DEFAULT_TRANSFER_PENALTY, Squad};
use crate::types::{Player, PlayerId, Position, RegistryError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};

fn default_free_transfers() -> u8 {
    1
}

fn default_transfer_penalty() -> f64 {
    DEFAULT_TRANSFER_PENALTY
}

/// The calling team's holdings as reported by the league feed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SquadSnapshot {
    /// Owned player ids
    pub player_ids: Vec<PlayerId>,

    /// Money in the bank
    #[serde(default)]
    pub bank: Money,

    /// Free transfers banked
    #[serde(default = "default_free_transfers")]
    pub free_transfers: u8,

    /// Points deducted per extra transfer
    #[serde(default = "default_transfer_penalty")]
    pub transfer_penalty: f64,

    /// Selling prices for owned players, keyed by player id
    #[serde(default)]
    pub selling_prices: HashMap<PlayerId, Money>,
}

/// One league snapshot: the full player pool plus the team's squad
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    /// Next gameweek to be played, if the feed reports it
    #[serde(default)]
    pub gameweek: Option<u32>,

    pub players: Vec<Player>,

    pub squad: SquadSnapshot,
}

impl LeagueSnapshot {
    /// Load a snapshot from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(file_path: P) -> Result<Self, RegistryError> {
        info!("Loading league snapshot from: {:?}", file_path.as_ref());
        let json_content = std::fs::read_to_string(&file_path)?;
        let snapshot: LeagueSnapshot = serde_json::from_str(&json_content)?;
        info!(
            "Loaded {} players, squad of {}",
            snapshot.players.len(),
            snapshot.squad.player_ids.len()
        );
        Ok(snapshot)
    }
}

/// Player Registry - indexes one snapshot of the league's player pool
///
/// The registry is built once per run and never mutated afterwards, so it
/// can be shared freely between concurrent optimizations.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    /// Map from player ID to snapshot (ordered for deterministic iteration)
    players_by_id: BTreeMap<PlayerId, Player>,
}

impl PlayerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { players_by_id: BTreeMap::new() }
    }

    /// Build a registry from a player pool, rejecting duplicate ids
    pub fn from_players(players: Vec<Player>) -> Result<Self, RegistryError> {
        let mut players_by_id = BTreeMap::new();
        for player in players {
            let id = player.id;
            if players_by_id.insert(id, player).is_some() {
                return Err(RegistryError::DuplicatePlayer(id));
            }
        }
        Ok(Self { players_by_id })
    }

    /// Build a registry and the team's squad from a league snapshot
    pub fn from_snapshot(snapshot: LeagueSnapshot) -> Result<(Self, Squad), RegistryError> {
        let registry = Self::from_players(snapshot.players)?;
        let squad = registry.build_squad(&snapshot.squad)?;
        Ok((registry, squad))
    }

    /// Resolve a squad snapshot against the pool
    pub fn build_squad(&self, snapshot: &SquadSnapshot) -> Result<Squad, RegistryError> {
        let mut players = Vec::with_capacity(snapshot.player_ids.len());
        for id in &snapshot.player_ids {
            let mut player = self.get(*id)?.clone();
            match snapshot.selling_prices.get(id) {
                Some(price) => player.selling_price = Some(*price),
                None if player.selling_price.is_none() => {
                    warn!("No selling price for owned player {}, using market price", id);
                }
                None => {}
            }
            players.push(player);
        }

        Ok(Squad::new(players, snapshot.bank)
            .with_free_transfers(snapshot.free_transfers)
            .with_transfer_penalty(snapshot.transfer_penalty))
    }

    /// Get a player snapshot by id
    pub fn get(&self, id: PlayerId) -> Result<&Player, RegistryError> {
        self.players_by_id.get(&id).ok_or(RegistryError::PlayerNotFound(id))
    }

    /// All players in id order
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players_by_id.values()
    }

    /// Owned copy of the pool in id order
    pub fn to_pool(&self) -> Vec<Player> {
        self.players_by_id.values().cloned().collect()
    }

    /// Players at a position, in id order
    pub fn by_position(&self, position: Position) -> Vec<&Player> {
        self.players_by_id.values().filter(|p| p.position == Some(position)).collect()
    }

    /// Earliest gameweek that appears in any player's fixture list
    pub fn next_gameweek(&self) -> Option<u32> {
        self.players_by_id.values().flat_map(|p| p.fixtures.iter().map(|f| f.gameweek)).min()
    }

    pub fn len(&self) -> usize {
        self.players_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players_by_id.is_empty()
    }

    /// Search for players by partial name match
    pub fn search_players(&self, query: &str) -> Vec<&Player> {
        let query_lower = query.to_lowercase();
        self.players_by_id
            .values()
            .filter(|player| player.name.to_lowercase().contains(&query_lower))
            .collect()
    }
}
