use super::{CommandResult, GameState, Initialising, MatchContext, MatchEventSink, Role, Rosters};
use script_api::EntityId;
use tracing::debug;

/// Players pick their team with `/join`.
///
/// Everyone connected when the match was started begins in an unassigned
/// pool. The match moves on once red and blue both have players and the
/// pool is empty.
#[derive(Debug)]
pub struct ChoosingTeams {
    pool: Vec<EntityId>,
    rosters: Rosters,
    point_count: u32,
}

impl ChoosingTeams {
    pub fn new(players: Vec<EntityId>, point_count: u32) -> Self {
        Self { pool: players, rosters: Rosters::default(), point_count }
    }

    pub fn pool(&self) -> &[EntityId] {
        &self.pool
    }

    pub fn rosters(&self) -> &Rosters {
        &self.rosters
    }

    fn ready(&self) -> bool {
        self.pool.is_empty() && !self.rosters.red.is_empty() && !self.rosters.blue.is_empty()
    }
}

impl MatchEventSink for ChoosingTeams {
    fn enter(&mut self, ctx: &mut MatchContext) {
        ctx.host.send_chat("Please choose a team: /join red, /join blue or /join spectator");
    }

    fn update(&mut self, _ctx: &mut MatchContext, _dt: f32) -> Option<GameState> {
        if !self.ready() {
            return None;
        }
        let rosters = std::mem::take(&mut self.rosters);
        Some(GameState::Initialising(Initialising::new(rosters, self.point_count)))
    }

    fn player_join(&mut self, ctx: &mut MatchContext, player: EntityId) -> Option<GameState> {
        self.pool.push(player);
        ctx.host
            .send_chat_to(player, "Teams are being chosen. Please choose a team: blue or red");
        None
    }

    fn player_leave(&mut self, _ctx: &mut MatchContext, player: EntityId) -> Option<GameState> {
        self.pool.retain(|id| *id != player);
        self.rosters.remove(player);
        None
    }

    fn join(&mut self, ctx: &mut MatchContext, player: EntityId, role: Role) -> CommandResult {
        self.pool.retain(|id| *id != player);
        self.rosters.assign(player, role);
        debug!("{} chose {:?}", player, role);

        let name = ctx.player_name(player);
        let reply = match role {
            Role::Player(team) => {
                ctx.host.send_chat(&format!("{} joined the {} team.", name, team));
                format!("You joined the {} team.", team)
            }
            Role::Spectator => {
                ctx.host.send_chat(&format!("{} is spectating.", name));
                "You are now a spectator.".to_string()
            }
        };
        (reply, None)
    }
}
