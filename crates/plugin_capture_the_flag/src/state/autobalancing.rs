use super::{autobalance, GameState, Initialising, MatchContext, MatchEventSink, PreGame, Rosters};
use tracing::info;

/// Splits the connected players into teams on the next tick.
#[derive(Debug)]
pub struct Autobalancing {
    point_count: u32,
}

impl Autobalancing {
    pub fn new(point_count: u32) -> Self {
        Self { point_count }
    }
}

impl MatchEventSink for Autobalancing {
    fn update(&mut self, ctx: &mut MatchContext, _dt: f32) -> Option<GameState> {
        let players: Vec<_> = ctx
            .host
            .players()
            .into_iter()
            .filter_map(|id| ctx.host.player(id))
            .map(|p| (p.id, p.level))
            .collect();
        let (red, blue) = autobalance(&players);
        if red.is_empty() || blue.is_empty() {
            ctx.host.send_chat("Not enough players to start a match!");
            return Some(GameState::PreGame(PreGame));
        }
        info!("Autobalanced {} red and {} blue players", red.len(), blue.len());
        Some(GameState::Initialising(Initialising::new(
            Rosters::new(red, blue),
            self.point_count,
        )))
    }
}
