//! Shared fixtures for unit and scenario tests

use player_registry::{Fixture, Money, Player, PlayerId, Position, Squad};

/// Opponent used for every fixture in test squads
pub const TEST_OPPONENT: u32 = 20;

/// Position for squad ids 1-15: two keepers, five defenders, five midfielders, three forwards
pub fn position_for(id: PlayerId) -> Position {
    match id {
        1..=2 => Position::Goalkeeper,
        3..=7 => Position::Defender,
        8..=12 => Position::Midfielder,
        _ => Position::Forward,
    }
}

fn price_for(position: Position) -> i64 {
    match position {
        Position::Goalkeeper => 45,
        Position::Defender => 50,
        Position::Midfielder => 70,
        Position::Forward => 80,
    }
}

/// Next-gameweek points for squad ids 1-15
fn points_for(id: PlayerId) -> f64 {
    match id {
        1 => 5.0,
        2 => 3.0,
        3 => 6.0,
        4 => 5.0,
        5 => 4.0,
        6 => 3.0,
        7 => 2.0,
        8 => 8.0,
        9 => 7.0,
        10 => 6.0,
        11 => 5.0,
        12 => 4.0,
        13 => 9.0,
        14 => 7.0,
        _ => 5.0,
    }
}

/// A legal 15-player squad with 1.0m in the bank
///
/// Three players per club (clubs 1-5), one easiest-difficulty fixture in
/// gameweek 1 each, so horizon scores equal the predicted points.
pub fn legal_squad() -> Squad {
    let players = (1..=15).map(|id| squad_player(id, points_for(id))).collect();
    Squad::new(players, Money::from_tenths(10))
}

/// Squad member `id` with the given points, priced and placed like `legal_squad`
pub fn squad_player(id: PlayerId, points: f64) -> Player {
    let position = position_for(id);
    let club = (id - 1) / 3 + 1;
    Player::new(id, &format!("Player {id}"), position, club, Money::from_tenths(price_for(position)))
        .with_fixture(Fixture::new(1, TEST_OPPONENT, 1).with_prediction(points))
}

/// Unowned available player with one gameweek-1 fixture
pub fn pool_player(id: PlayerId, position: Position, club: u32, price: i64, points: f64) -> Player {
    Player::new(id, &format!("Target {id}"), position, club, Money::from_tenths(price))
        .with_fixture(Fixture::new(1, TEST_OPPONENT, 1).with_prediction(points))
}

/// Squad built from per-id points, same layout as `legal_squad`
pub fn squad_with_points(points: &[f64; 15]) -> Squad {
    let players = (1..=15).map(|id| squad_player(id, points[(id - 1) as usize])).collect();
    Squad::new(players, Money::from_tenths(10))
}
