//! Player Registry - strongly typed league snapshot for the squad optimizer
//!
//! This crate holds the immutable player pool, the manager's squad and the
//! money arithmetic they share. Everything here is plain data: it is built
//! once per run from the league feed and then only read.

pub mod money;
pub mod registry;
pub mod squad;
pub mod types;

pub use money::Money;
pub use registry::{LeagueSnapshot, PlayerRegistry, SquadSnapshot};
pub use squad::{DEFAULT_TRANSFER_PENALTY, MAX_BANKED_FREE_TRANSFERS, SQUAD_SIZE, Squad};
pub use types::{
    AvailabilityStatus, ClubId, Fixture, MissingField, Player, PlayerId, Position, RegistryError,
};
