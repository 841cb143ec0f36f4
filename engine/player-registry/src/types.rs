use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

/// League-wide player identifier
pub type PlayerId = u32;

/// Club identifier (matches the league feed's team id)
pub type ClubId = u32;

/// Playing position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PositionRepr", into = "String")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    /// All positions in squad order
    pub const ALL: [Position; 4] =
        [Position::Goalkeeper, Position::Defender, Position::Midfielder, Position::Forward];

    /// Short code used by the league feed (e.g. "GK")
    pub fn code(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Map the league's numeric element type (1 = GK ... 4 = FWD)
    pub fn from_element_type(element_type: u8) -> Option<Self> {
        match element_type {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GK" | "GKP" | "GOALKEEPER" => Ok(Position::Goalkeeper),
            "DEF" | "DEFENDER" => Ok(Position::Defender),
            "MID" | "MIDFIELDER" => Ok(Position::Midfielder),
            "FWD" | "FORWARD" => Ok(Position::Forward),
            other => Err(format!("unknown position '{other}'")),
        }
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.code().to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PositionRepr {
    ElementType(u8),
    Code(String),
}

impl TryFrom<PositionRepr> for Position {
    type Error = String;

    fn try_from(repr: PositionRepr) -> Result<Self, Self::Error> {
        match repr {
            PositionRepr::ElementType(n) => {
                Position::from_element_type(n).ok_or_else(|| format!("unknown element type {n}"))
            }
            PositionRepr::Code(code) => code.parse(),
        }
    }
}

/// Availability status reported by the league feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AvailabilityStatus {
    Available,
    Doubtful,
    Injured,
    Suspended,
}

impl AvailabilityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::Doubtful => "doubtful",
            AvailabilityStatus::Injured => "injured",
            AvailabilityStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AvailabilityStatus {
    type Err = String;

    /// Accepts full names and the feed's single-letter codes. "u"
    /// (unavailable) and "n" (not eligible) cannot play, so they map to
    /// `Injured`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "available" => Ok(AvailabilityStatus::Available),
            "d" | "doubtful" => Ok(AvailabilityStatus::Doubtful),
            "i" | "injured" | "u" | "unavailable" | "n" => Ok(AvailabilityStatus::Injured),
            "s" | "suspended" => Ok(AvailabilityStatus::Suspended),
            other => Err(format!("unknown availability status '{other}'")),
        }
    }
}

impl TryFrom<String> for AvailabilityStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AvailabilityStatus> for String {
    fn from(status: AvailabilityStatus) -> Self {
        status.as_str().to_string()
    }
}

fn default_difficulty() -> u8 {
    3
}

/// One upcoming fixture for a player's club
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Gameweek the fixture belongs to
    pub gameweek: u32,

    /// Opposing club
    pub opponent: ClubId,

    /// Opponent difficulty rating, 1 (easiest) to 5 (hardest)
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,

    /// Externally sourced expected points for this fixture
    #[serde(default)]
    pub predicted_points: Option<f64>,
}

impl Fixture {
    pub fn new(gameweek: u32, opponent: ClubId, difficulty: u8) -> Self {
        Self { gameweek, opponent, difficulty, predicted_points: None }
    }

    pub fn with_prediction(mut self, points: f64) -> Self {
        self.predicted_points = Some(points);
        self
    }
}

/// Snapshot field that the league feed failed to supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    Position,
    Price,
    Status,
    SellingPrice,
    Prediction,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissingField::Position => "position",
            MissingField::Price => "price",
            MissingField::Status => "status",
            MissingField::SellingPrice => "selling price",
            MissingField::Prediction => "prediction",
        };
        f.write_str(name)
    }
}

/// Immutable player snapshot for one optimization run
///
/// Fields the feed may omit are optional; the optimizer applies the
/// conservative defaults documented on each field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,

    /// Display name (e.g. "Saka")
    #[serde(default)]
    pub name: String,

    /// Playing position. Unknown positions are never transferred in and
    /// never start.
    #[serde(default)]
    pub position: Option<Position>,

    pub club: ClubId,

    /// Current market price. Unknown prices are never transferred in.
    #[serde(default)]
    pub price: Option<Money>,

    /// Price the manager would receive for selling (owned players only).
    /// Falls back to `price`, then zero.
    #[serde(default)]
    pub selling_price: Option<Money>,

    /// Availability status. Absent status is treated as available for
    /// scoring but blocks transfer-in.
    #[serde(default)]
    pub status: Option<AvailabilityStatus>,

    /// Chance of playing, 0-1 (percentages above 1 are accepted and scaled)
    #[serde(default)]
    pub chance_of_playing: Option<f64>,

    /// Upcoming fixtures, nearest first
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
}

impl Player {
    /// Create an available player with a known position and price
    pub fn new(id: PlayerId, name: &str, position: Position, club: ClubId, price: Money) -> Self {
        Self {
            id,
            name: name.to_string(),
            position: Some(position),
            club,
            price: Some(price),
            selling_price: None,
            status: Some(AvailabilityStatus::Available),
            chance_of_playing: None,
            fixtures: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: AvailabilityStatus, chance: Option<f64>) -> Self {
        self.status = Some(status);
        self.chance_of_playing = chance;
        self
    }

    pub fn with_selling_price(mut self, selling_price: Money) -> Self {
        self.selling_price = Some(selling_price);
        self
    }

    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixtures.push(fixture);
        self
    }

    /// Price received when this player is sold
    pub fn sale_value(&self) -> Money {
        self.selling_price.or(self.price).unwrap_or(Money::ZERO)
    }

    /// Snapshot fields required for a transfer-in that are absent
    pub fn missing_fields(&self) -> Vec<MissingField> {
        let mut missing = Vec::new();
        if self.position.is_none() {
            missing.push(MissingField::Position);
        }
        if self.price.is_none() {
            missing.push(MissingField::Price);
        }
        if self.status.is_none() {
            missing.push(MissingField::Status);
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.position.is_some() && self.price.is_some() && self.status.is_some()
    }

    pub fn display_name(&self) -> String {
        if self.name.is_empty() { format!("#{}", self.id) } else { self.name.clone() }
    }
}

/// Errors that can occur during registry lookup and snapshot loading
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Player {0} not found in registry")]
    PlayerNotFound(PlayerId),

    #[error("Player {0} appears more than once in the snapshot")]
    DuplicatePlayer(PlayerId),

    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parsing() {
        assert_eq!("gk".parse::<Position>().unwrap(), Position::Goalkeeper);
        assert_eq!("Midfielder".parse::<Position>().unwrap(), Position::Midfielder);
        assert!("QB".parse::<Position>().is_err());
        assert_eq!(Position::from_element_type(4), Some(Position::Forward));
        assert_eq!(Position::from_element_type(5), None);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!("a".parse::<AvailabilityStatus>().unwrap(), AvailabilityStatus::Available);
        assert_eq!("d".parse::<AvailabilityStatus>().unwrap(), AvailabilityStatus::Doubtful);
        assert_eq!("u".parse::<AvailabilityStatus>().unwrap(), AvailabilityStatus::Injured);
        assert_eq!("s".parse::<AvailabilityStatus>().unwrap(), AvailabilityStatus::Suspended);
        assert!("x".parse::<AvailabilityStatus>().is_err());
    }

    #[test]
    fn test_player_deserialize_feed_shapes() {
        let json = r#"{
            "id": 7,
            "name": "Saka",
            "position": 3,
            "club": 1,
            "price": 101,
            "status": "d",
            "chance_of_playing": 75,
            "fixtures": [{"gameweek": 12, "opponent": 4, "predicted_points": 6.1}]
        }"#;
        let player: Player = serde_json::from_str(json).unwrap();

        assert_eq!(player.position, Some(Position::Midfielder));
        assert_eq!(player.price, Some(Money::from_tenths(101)));
        assert_eq!(player.status, Some(AvailabilityStatus::Doubtful));
        assert_eq!(player.fixtures[0].difficulty, 3);
        assert!(player.is_complete());
    }

    #[test]
    fn test_missing_fields_reported() {
        let json = r#"{"id": 9, "club": 2}"#;
        let player: Player = serde_json::from_str(json).unwrap();

        assert_eq!(
            player.missing_fields(),
            vec![MissingField::Position, MissingField::Price, MissingField::Status]
        );
        assert_eq!(player.sale_value(), Money::ZERO);
        assert_eq!(player.display_name(), "#9");
    }

    #[test]
    fn test_sale_value_prefers_selling_price() {
        let player = Player::new(1, "Palmer", Position::Midfielder, 3, Money::from_tenths(110))
            .with_selling_price(Money::from_tenths(106));
        assert_eq!(player.sale_value(), Money::from_tenths(106));

        let unsold = Player::new(2, "Isak", Position::Forward, 4, Money::from_tenths(85));
        assert_eq!(unsold.sale_value(), Money::from_tenths(85));
    }
}
