//! Team rosters, match start parameters and autobalancing.

use crate::flag::Team;
use script_api::EntityId;

/// How teams are formed at match start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Teams are split by level automatically.
    Autobalance,
    /// Every player picks a team with `/join`.
    Choose,
}

impl MatchMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "autobalance" => Some(Self::Autobalance),
            "choose" => Some(Self::Choose),
            _ => None,
        }
    }
}

/// Parameters of the most recent `startgame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartParams {
    pub mode: MatchMode,
    pub point_count: u32,
}

impl Default for StartParams {
    fn default() -> Self {
        Self { mode: MatchMode::Autobalance, point_count: 1 }
    }
}

/// Where a player stands during a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player(Team),
    Spectator,
}

impl Role {
    /// Parses the argument of `/join`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "red" => Some(Self::Player(Team::Red)),
            "blue" => Some(Self::Player(Team::Blue)),
            "spectator" | "spectators" | "spec" => Some(Self::Spectator),
            _ => None,
        }
    }
}

/// Red, blue and spectator lists. A player is in at most one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rosters {
    pub red: Vec<EntityId>,
    pub blue: Vec<EntityId>,
    pub spectators: Vec<EntityId>,
}

impl Rosters {
    pub fn new(red: Vec<EntityId>, blue: Vec<EntityId>) -> Self {
        Self { red, blue, spectators: Vec::new() }
    }

    pub fn team(&self, team: Team) -> &[EntityId] {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    pub fn role_of(&self, player: EntityId) -> Option<Role> {
        if self.red.contains(&player) {
            Some(Role::Player(Team::Red))
        } else if self.blue.contains(&player) {
            Some(Role::Player(Team::Blue))
        } else if self.spectators.contains(&player) {
            Some(Role::Spectator)
        } else {
            None
        }
    }

    /// Removes a player from whichever list holds them.
    pub fn remove(&mut self, player: EntityId) -> Option<Role> {
        let role = self.role_of(player)?;
        self.red.retain(|id| *id != player);
        self.blue.retain(|id| *id != player);
        self.spectators.retain(|id| *id != player);
        Some(role)
    }

    /// Moves a player into `role`, leaving any previous list.
    pub fn assign(&mut self, player: EntityId, role: Role) {
        self.remove(player);
        match role {
            Role::Player(Team::Red) => self.red.push(player),
            Role::Player(Team::Blue) => self.blue.push(player),
            Role::Spectator => self.spectators.push(player),
        }
    }

    /// Red and blue players.
    pub fn participants(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.red.iter().chain(self.blue.iter()).copied()
    }
}

/// Splits players into red and blue by level.
///
/// Players are visited by level, highest first (equal levels keep their
/// input order), and each one joins the team with the lower level sum. Red
/// wins ties, so the first player always lands on red.
pub fn autobalance(players: &[(EntityId, u32)]) -> (Vec<EntityId>, Vec<EntityId>) {
    let mut sorted = players.to_vec();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    let (mut red, mut blue) = (Vec::new(), Vec::new());
    let (mut red_sum, mut blue_sum) = (0u64, 0u64);
    for (id, level) in sorted {
        if blue_sum >= red_sum {
            red.push(id);
            red_sum += u64::from(level);
        } else {
            blue.push(id);
            blue_sum += u64::from(level);
        }
    }
    (red, blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(levels: &[u32]) -> Vec<(EntityId, u32)> {
        levels
            .iter()
            .enumerate()
            .map(|(i, level)| (EntityId(i as u64 + 1), *level))
            .collect()
    }

    #[test]
    fn test_autobalance_scenario() {
        let players = ids(&[10, 8, 6, 4]);
        let (red, blue) = autobalance(&players);
        assert_eq!(red, vec![EntityId(1), EntityId(4)]);
        assert_eq!(blue, vec![EntityId(2), EntityId(3)]);
    }

    #[test]
    fn test_autobalance_bound_and_coverage() {
        let cases: [&[u32]; 5] = [
            &[1],
            &[5, 5, 5, 5, 5],
            &[1, 2, 3, 4, 5, 6, 7],
            &[100, 1, 1, 1],
            &[3, 9, 27, 2, 8, 30, 4, 4],
        ];
        for levels in cases {
            let players = ids(levels);
            let (red, blue) = autobalance(&players);
            assert_eq!(red.len() + blue.len(), players.len());

            let sum = |team: &[EntityId]| -> i64 {
                team.iter()
                    .map(|id| players.iter().find(|(p, _)| p == id).map(|(_, l)| *l as i64).unwrap())
                    .sum()
            };
            let max = *levels.iter().max().unwrap() as i64;
            assert!((sum(&red) - sum(&blue)).abs() <= max);
            for (id, _) in &players {
                assert!(red.contains(id) ^ blue.contains(id));
            }
        }
    }

    #[test]
    fn test_equal_levels_keep_input_order() {
        let players = ids(&[5, 5, 5, 5]);
        let (red, blue) = autobalance(&players);
        assert_eq!(red, vec![EntityId(1), EntityId(3)]);
        assert_eq!(blue, vec![EntityId(2), EntityId(4)]);
    }

    #[test]
    fn test_rosters_assign_moves_players() {
        let mut rosters = Rosters::default();
        let p = EntityId(9);
        rosters.assign(p, Role::Player(Team::Red));
        rosters.assign(p, Role::Spectator);
        assert_eq!(rosters.role_of(p), Some(Role::Spectator));
        assert!(rosters.red.is_empty());
        assert_eq!(rosters.remove(p), Some(Role::Spectator));
        assert_eq!(rosters.remove(p), None);
    }

    #[test]
    fn test_parsing() {
        assert_eq!(MatchMode::parse("Choose"), Some(MatchMode::Choose));
        assert_eq!(MatchMode::parse("random"), None);
        assert_eq!(Role::parse("BLUE"), Some(Role::Player(Team::Blue)));
        assert_eq!(Role::parse("green"), None);
    }
}
