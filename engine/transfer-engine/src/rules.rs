//! Roster and formation legality
//!
//! Pure predicates with no state. Both selectors run these after every
//! candidate mutation and discard whatever fails.

use crate::error::{FormationViolation, RosterViolation};
use player_registry::{ClubId, Player, Position, SQUAD_SIZE, Squad};
use std::collections::{BTreeMap, HashSet};

/// Starters in a lineup
pub const STARTING_XI: usize = 11;

/// Most players a squad may hold from one club
pub const MAX_PER_CLUB: usize = 3;

/// Players a squad must hold at each position
pub fn squad_quota(position: Position) -> usize {
    match position {
        Position::Goalkeeper => 2,
        Position::Defender => 5,
        Position::Midfielder => 5,
        Position::Forward => 3,
    }
}

/// Inclusive range of starters allowed at each position
pub fn starting_range(position: Position) -> (usize, usize) {
    match position {
        Position::Goalkeeper => (1, 1),
        Position::Defender => (3, 5),
        Position::Midfielder => (2, 5),
        Position::Forward => (1, 3),
    }
}

/// Count positions, indexed by `Position::index`
pub fn position_counts<'a, I>(positions: I) -> [usize; 4]
where
    I: IntoIterator<Item = &'a Position>,
{
    let mut counts = [0; 4];
    for position in positions {
        counts[position.index()] += 1;
    }
    counts
}

/// Players held per club, ordered by club id
pub fn club_counts<'a, I>(players: I) -> BTreeMap<ClubId, usize>
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut counts = BTreeMap::new();
    for player in players {
        *counts.entry(player.club).or_insert(0) += 1;
    }
    counts
}

/// Whether one more player from `club` fits under the club quota
pub fn can_add_from_club(counts: &BTreeMap<ClubId, usize>, club: ClubId) -> bool {
    counts.get(&club).copied().unwrap_or(0) < MAX_PER_CLUB
}

/// Check squad size, position quota, club quota and budget
pub fn is_squad_legal(squad: &Squad) -> Result<(), RosterViolation> {
    if squad.players.len() != SQUAD_SIZE {
        return Err(RosterViolation::SquadSize {
            expected: SQUAD_SIZE,
            actual: squad.players.len(),
        });
    }

    let mut seen = HashSet::with_capacity(SQUAD_SIZE);
    let mut positions = Vec::with_capacity(SQUAD_SIZE);
    for player in &squad.players {
        if !seen.insert(player.id) {
            return Err(RosterViolation::DuplicatePlayer { player_id: player.id });
        }
        match player.position {
            Some(position) => positions.push(position),
            None => return Err(RosterViolation::UnknownPosition { player_id: player.id }),
        }
    }

    let counts = position_counts(&positions);
    for position in Position::ALL {
        let expected = squad_quota(position);
        let actual = counts[position.index()];
        if actual != expected {
            return Err(RosterViolation::PositionQuota { position, expected, actual });
        }
    }

    if let Some((club, count)) =
        club_counts(&squad.players).into_iter().find(|(_, count)| *count > MAX_PER_CLUB)
    {
        return Err(RosterViolation::ClubQuota { club, count, max: MAX_PER_CLUB });
    }

    if squad.bank.is_negative() {
        return Err(RosterViolation::NegativeBudget { bank: squad.bank });
    }

    Ok(())
}

/// Check a starting eleven's formation
pub fn is_lineup_legal(eleven: &[Position]) -> Result<(), FormationViolation> {
    if eleven.len() != STARTING_XI {
        return Err(FormationViolation::StarterCount { actual: eleven.len() });
    }

    let counts = position_counts(eleven);
    for position in Position::ALL {
        let (min, max) = starting_range(position);
        let actual = counts[position.index()];
        if actual < min || actual > max {
            return Err(FormationViolation::PositionRange { position, min, max, actual });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::legal_squad;
    use player_registry::Money;

    #[test]
    fn test_legal_squad_passes() {
        let squad = legal_squad();
        assert_eq!(is_squad_legal(&squad), Ok(()));
    }

    #[test]
    fn test_squad_size_checked() {
        let mut squad = legal_squad();
        squad.players.pop();
        assert_eq!(
            is_squad_legal(&squad),
            Err(RosterViolation::SquadSize { expected: 15, actual: 14 })
        );
    }

    #[test]
    fn test_position_quota_checked() {
        let mut squad = legal_squad();
        let forward = squad.players.iter_mut().find(|p| p.position == Some(Position::Forward));
        forward.unwrap().position = Some(Position::Midfielder);

        assert_eq!(
            is_squad_legal(&squad),
            Err(RosterViolation::PositionQuota {
                position: Position::Midfielder,
                expected: 5,
                actual: 6
            })
        );
    }

    #[test]
    fn test_club_quota_checked() {
        let mut squad = legal_squad();
        for player in squad.players.iter_mut().take(4) {
            player.club = 99;
        }
        assert_eq!(
            is_squad_legal(&squad),
            Err(RosterViolation::ClubQuota { club: 99, count: 4, max: 3 })
        );
    }

    #[test]
    fn test_negative_bank_checked() {
        let mut squad = legal_squad();
        squad.bank = Money::from_tenths(-1);
        assert!(matches!(is_squad_legal(&squad), Err(RosterViolation::NegativeBudget { .. })));
    }

    #[test]
    fn test_duplicate_and_unknown_position_checked() {
        let mut squad = legal_squad();
        let first = squad.players[0].id;
        squad.players[1].id = first;
        assert_eq!(
            is_squad_legal(&squad),
            Err(RosterViolation::DuplicatePlayer { player_id: first })
        );

        let mut squad = legal_squad();
        squad.players[3].position = None;
        let id = squad.players[3].id;
        assert_eq!(is_squad_legal(&squad), Err(RosterViolation::UnknownPosition { player_id: id }));
    }

    fn shape(def: usize, mid: usize, fwd: usize) -> Vec<Position> {
        let mut eleven = vec![Position::Goalkeeper];
        eleven.extend(std::iter::repeat(Position::Defender).take(def));
        eleven.extend(std::iter::repeat(Position::Midfielder).take(mid));
        eleven.extend(std::iter::repeat(Position::Forward).take(fwd));
        eleven
    }

    #[test]
    fn test_lineup_shapes() {
        assert!(is_lineup_legal(&shape(3, 4, 3)).is_ok());
        assert!(is_lineup_legal(&shape(5, 2, 3)).is_ok());
        assert!(is_lineup_legal(&shape(5, 4, 1)).is_ok());

        assert_eq!(
            is_lineup_legal(&shape(2, 5, 3)),
            Err(FormationViolation::PositionRange {
                position: Position::Defender,
                min: 3,
                max: 5,
                actual: 2
            })
        );
        assert!(is_lineup_legal(&shape(4, 6, 0)).is_err());
        assert_eq!(
            is_lineup_legal(&shape(3, 4, 2)),
            Err(FormationViolation::StarterCount { actual: 10 })
        );
    }

    #[test]
    fn test_lineup_needs_exactly_one_goalkeeper() {
        let mut eleven = shape(4, 4, 2);
        eleven[1] = Position::Goalkeeper;
        assert!(matches!(
            is_lineup_legal(&eleven),
            Err(FormationViolation::PositionRange { position: Position::Goalkeeper, .. })
        ));
    }

    #[test]
    fn test_can_add_from_club() {
        let squad = legal_squad();
        let counts = club_counts(&squad.players);
        let full_club = counts.iter().find(|(_, n)| **n == MAX_PER_CLUB).map(|(c, _)| *c);

        assert!(can_add_from_club(&counts, 12345));
        if let Some(club) = full_club {
            assert!(!can_add_from_club(&counts, club));
        }
    }
}
