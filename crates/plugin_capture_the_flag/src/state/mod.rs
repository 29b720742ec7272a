//! # Match State Machine
//!
//! A match moves through five states:
//!
//! ```text
//! PreGame ──startgame──▶ Autobalancing ──next tick──┐
//!    ▲      └──────────▶ ChoosingTeams ──all chose──┤
//!    │                                               ▼
//!    ├──────── player left ─────────────────── Initialising (11 s)
//!    │                                               │
//!    └──────── target reached / abandoned ─── Running ◀┘
//! ```
//!
//! Every state implements [`MatchEventSink`]. Host events are forwarded to
//! the current state, which may ask for a transition by returning the next
//! [`GameState`]. [`Match::transition`] then runs the old state's `exit`
//! hook followed by the new state's `enter` hook.

mod autobalancing;
mod choosing_teams;
mod initialising;
mod pre_game;
mod running;
pub mod teams;

pub use autobalancing::Autobalancing;
pub use choosing_teams::ChoosingTeams;
pub use initialising::Initialising;
pub use pre_game::PreGame;
pub use running::Running;
pub use teams::{autobalance, MatchMode, Role, Rosters, StartParams};

use crate::flag::Arena;
use crate::loot::LootManager;
use crate::settings::CtfSettings;
use rand::rngs::StdRng;
use script_api::{EntityId, EventOutcome, ScriptHost, Vec3};
use tracing::info;

/// Reply to commands the current state does not accept.
pub const DEFAULT_REPLY: &str = "This command cannot be issued in the current state of the game.";

/// Pickup, return and scoring distance around flags and poles.
pub const CAPTURE_RADIUS: f64 = 150000.0;

/// Immunity after a respawn, in seconds.
pub const RESPAWN_IMMUNITY: f32 = 3.0;

/// Length of the staging countdown, in seconds.
pub const COUNTDOWN_SECONDS: f32 = 11.0;

/// How far a player outside the arena is moved back toward its center.
pub const OUT_OF_BOUNDS_NUDGE: f64 = 100000.0;

/// Where spectators are kept while a match is staged or running.
pub const SPECTATOR_POSITION: Vec3 = Vec3::ZERO;

/// Everything a state may touch besides its own data.
pub struct MatchContext<'a> {
    pub host: &'a mut dyn ScriptHost,
    pub arena: &'a mut Arena,
    pub loot: &'a mut LootManager,
    pub settings: &'a CtfSettings,
    pub rng: &'a mut StdRng,
}

impl MatchContext<'_> {
    /// Sends a message to each listed player.
    pub fn tell(&mut self, players: &[EntityId], message: &str) {
        for &id in players {
            self.host.send_chat_to(id, message);
        }
    }

    /// Keeps spectators out of the game.
    pub fn pin_spectators(&mut self, spectators: &[EntityId]) {
        for &id in spectators {
            self.host.teleport(id, SPECTATOR_POSITION);
        }
    }

    pub fn player_name(&self, id: EntityId) -> String {
        self.host
            .player(id)
            .map(|p| p.name)
            .unwrap_or_else(|| id.to_string())
    }
}

/// Reply of a command plus the transition it caused, if any.
pub type CommandResult = (String, Option<GameState>);

/// Handlers for the host events and commands a match state reacts to.
///
/// Methods returning `Option<GameState>` request a transition to the
/// returned state.
pub trait MatchEventSink {
    fn enter(&mut self, _ctx: &mut MatchContext) {}

    fn exit(&mut self, _ctx: &mut MatchContext) {}

    fn update(&mut self, _ctx: &mut MatchContext, _dt: f32) -> Option<GameState> {
        None
    }

    fn player_join(&mut self, _ctx: &mut MatchContext, _player: EntityId) -> Option<GameState> {
        None
    }

    fn player_leave(&mut self, _ctx: &mut MatchContext, _player: EntityId) -> Option<GameState> {
        None
    }

    fn on_hit(&self, _attacker: EntityId, _target: EntityId) -> EventOutcome {
        EventOutcome::Continue
    }

    fn on_respawn(&mut self, _ctx: &mut MatchContext, _player: EntityId) {}

    fn startgame(&mut self, _ctx: &mut MatchContext, _params: StartParams) -> CommandResult {
        (DEFAULT_REPLY.to_string(), None)
    }

    fn join(&mut self, _ctx: &mut MatchContext, _player: EntityId, _role: Role) -> CommandResult {
        (DEFAULT_REPLY.to_string(), None)
    }
}

/// Hits are cancelled between teammates and whenever a spectator or a
/// player outside the rosters is involved.
pub(crate) fn roster_hit_outcome(rosters: &Rosters, attacker: EntityId, target: EntityId) -> EventOutcome {
    match (rosters.role_of(attacker), rosters.role_of(target)) {
        (Some(Role::Player(a)), Some(Role::Player(b))) if a != b => EventOutcome::Continue,
        _ => EventOutcome::Cancel,
    }
}

/// The current phase of the match.
#[derive(Debug)]
pub enum GameState {
    PreGame(PreGame),
    Autobalancing(Autobalancing),
    ChoosingTeams(ChoosingTeams),
    Initialising(Initialising),
    Running(Running),
}

impl GameState {
    pub fn name(&self) -> &'static str {
        match self {
            GameState::PreGame(_) => "pre-game",
            GameState::Autobalancing(_) => "autobalancing",
            GameState::ChoosingTeams(_) => "choosing teams",
            GameState::Initialising(_) => "initialising",
            GameState::Running(_) => "running",
        }
    }

    fn sink(&mut self) -> &mut dyn MatchEventSink {
        match self {
            GameState::PreGame(s) => s,
            GameState::Autobalancing(s) => s,
            GameState::ChoosingTeams(s) => s,
            GameState::Initialising(s) => s,
            GameState::Running(s) => s,
        }
    }

    fn sink_ref(&self) -> &dyn MatchEventSink {
        match self {
            GameState::PreGame(s) => s,
            GameState::Autobalancing(s) => s,
            GameState::ChoosingTeams(s) => s,
            GameState::Initialising(s) => s,
            GameState::Running(s) => s,
        }
    }
}

/// Owns the current state and drives its transitions.
#[derive(Debug)]
pub struct Match {
    state: GameState,
    last_start: StartParams,
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

impl Match {
    /// A match in the lobby. Call [`Match::begin`] once the arena exists.
    pub fn new() -> Self {
        Self { state: GameState::PreGame(PreGame), last_start: StartParams::default() }
    }

    /// Runs the entry hook of the initial state.
    pub fn begin(&mut self, ctx: &mut MatchContext) {
        self.state.sink().enter(ctx);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_pre_game(&self) -> bool {
        matches!(self.state, GameState::PreGame(_))
    }

    /// Parameters used when `startgame` is issued without arguments.
    pub fn last_start(&self) -> StartParams {
        self.last_start
    }

    /// Leaves the current state and enters `next`.
    pub fn transition(&mut self, ctx: &mut MatchContext, next: GameState) {
        self.state.sink().exit(ctx);
        info!("Match state {} -> {}", self.state.name(), next.name());
        self.state = next;
        self.state.sink().enter(ctx);
    }

    fn apply(&mut self, ctx: &mut MatchContext, next: Option<GameState>) {
        if let Some(next) = next {
            self.transition(ctx, next);
        }
    }

    /// Re-runs the lobby entry hook so changed settings take effect.
    /// Does nothing while a match is under way.
    pub fn refresh_lobby(&mut self, ctx: &mut MatchContext) {
        if self.is_pre_game() {
            self.state.sink().enter(ctx);
        }
    }

    pub fn update(&mut self, ctx: &mut MatchContext, dt: f32) {
        let next = self.state.sink().update(ctx, dt);
        self.apply(ctx, next);
    }

    pub fn player_join(&mut self, ctx: &mut MatchContext, player: EntityId) {
        let next = self.state.sink().player_join(ctx, player);
        self.apply(ctx, next);
    }

    pub fn player_leave(&mut self, ctx: &mut MatchContext, player: EntityId) {
        let next = self.state.sink().player_leave(ctx, player);
        self.apply(ctx, next);
    }

    pub fn on_hit(&self, attacker: EntityId, target: EntityId) -> EventOutcome {
        self.state.sink_ref().on_hit(attacker, target)
    }

    pub fn on_respawn(&mut self, ctx: &mut MatchContext, player: EntityId) {
        self.state.sink().on_respawn(ctx, player);
    }

    /// Handles `/startgame [mode] [points]`. Omitted arguments fall back
    /// to the parameters of the previous start.
    pub fn startgame(&mut self, ctx: &mut MatchContext, mode: Option<&str>, points: Option<&str>) -> String {
        let mode = match mode {
            None => self.last_start.mode,
            Some(name) => match MatchMode::parse(name) {
                Some(mode) => mode,
                None => {
                    return format!(
                        "There is no matchmaking mode named '{}'.",
                        name.to_ascii_lowercase()
                    )
                }
            },
        };
        let point_count = match points {
            None => self.last_start.point_count,
            Some(text) => match text.parse::<i64>() {
                Err(_) => return format!("Could not parse {}.", text),
                Ok(p) if p <= 0 => return "You need at least one point to win.".to_string(),
                Ok(p) => u32::try_from(p).unwrap_or(u32::MAX),
            },
        };

        let params = StartParams { mode, point_count };
        let (reply, next) = self.state.sink().startgame(ctx, params);
        if next.is_some() {
            self.last_start = params;
        }
        self.apply(ctx, next);
        reply
    }

    /// Handles `/join <team>` for `player`.
    pub fn join(&mut self, ctx: &mut MatchContext, player: EntityId, team: &str) -> String {
        let Some(role) = Role::parse(team) else {
            return format!("There is no team named '{}'. Please choose blue or red.", team);
        };
        let (reply, next) = self.state.sink().join(ctx, player, role);
        self.apply(ctx, next);
        reply
    }

    /// Returns to the lobby regardless of the current state.
    pub fn abort(&mut self, ctx: &mut MatchContext) {
        self.transition(ctx, GameState::PreGame(PreGame));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::Team;

    #[test]
    fn test_roster_hit_outcome() {
        let mut rosters = Rosters::new(vec![EntityId(1), EntityId(2)], vec![EntityId(3)]);
        rosters.spectators.push(EntityId(4));
        assert_eq!(roster_hit_outcome(&rosters, EntityId(1), EntityId(3)), EventOutcome::Continue);
        assert_eq!(roster_hit_outcome(&rosters, EntityId(1), EntityId(2)), EventOutcome::Cancel);
        assert_eq!(roster_hit_outcome(&rosters, EntityId(4), EntityId(3)), EventOutcome::Cancel);
        assert_eq!(roster_hit_outcome(&rosters, EntityId(3), EntityId(99)), EventOutcome::Cancel);
        assert_eq!(rosters.role_of(EntityId(3)), Some(Role::Player(Team::Blue)));
    }
}
