use super::{
    roster_hit_outcome, GameState, MatchContext, MatchEventSink, PreGame, Role, Rosters, Running,
    COUNTDOWN_SECONDS,
};
use crate::flag::Team;
use script_api::{EntityId, EventOutcome};
use tracing::info;

/// Remaining seconds at which the countdown is announced.
const ANNOUNCE_AT: [u32; 5] = [10, 5, 3, 2, 1];

/// Staging countdown before the match starts.
///
/// Teams are fixed. Players do not need to reach their base before the
/// timer runs out.
#[derive(Debug)]
pub struct Initialising {
    rosters: Rosters,
    point_count: u32,
    remaining: f32,
    last_whole_second: u32,
}

impl Initialising {
    pub fn new(rosters: Rosters, point_count: u32) -> Self {
        Self {
            rosters,
            point_count,
            remaining: COUNTDOWN_SECONDS,
            last_whole_second: COUNTDOWN_SECONDS.ceil() as u32,
        }
    }

    pub fn rosters(&self) -> &Rosters {
        &self.rosters
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn team(&self, team: Team) -> &[EntityId] {
        self.rosters.team(team)
    }
}

impl MatchEventSink for Initialising {
    fn enter(&mut self, ctx: &mut MatchContext) {
        ctx.loot.new_match(ctx.rng);
        if ctx.loot.loot_enabled {
            if let Some(message) = ctx.loot.pre_game_message() {
                ctx.host.send_chat(&message);
            }
        }
        let points = if self.point_count == 1 { "point" } else { "points" };
        ctx.host.send_chat(&format!(
            "The first team to score {} {} wins!",
            self.point_count, points
        ));
        ctx.tell(&self.rosters.red, "Please go to the red base.");
        ctx.tell(&self.rosters.blue, "Please go to the blue base.");
        ctx.tell(&self.rosters.spectators, "You are spectating this match.");
    }

    fn update(&mut self, ctx: &mut MatchContext, dt: f32) -> Option<GameState> {
        ctx.pin_spectators(&self.rosters.spectators);

        self.remaining -= dt;
        if self.remaining <= 0.0 {
            let rosters = std::mem::take(&mut self.rosters);
            return Some(GameState::Running(Running::new(rosters, self.point_count)));
        }

        let whole = self.remaining.ceil() as u32;
        if whole != self.last_whole_second {
            self.last_whole_second = whole;
            if ANNOUNCE_AT.contains(&whole) {
                let unit = if whole == 1 { "second" } else { "seconds" };
                ctx.host.send_chat(&format!("The match starts in {} {}.", whole, unit));
            }
        }
        None
    }

    fn player_join(&mut self, ctx: &mut MatchContext, player: EntityId) -> Option<GameState> {
        self.rosters.assign(player, Role::Spectator);
        ctx.host
            .send_chat_to(player, "A match is about to start. You are spectating.");
        None
    }

    fn player_leave(&mut self, ctx: &mut MatchContext, player: EntityId) -> Option<GameState> {
        match self.rosters.remove(player) {
            Some(Role::Player(team)) => {
                let name = ctx.player_name(player);
                info!("{} left the {} team during staging, aborting", name, team);
                ctx.host.send_chat(&format!(
                    "The match was aborted because {} of the {} team left the game.",
                    name, team
                ));
                Some(GameState::PreGame(PreGame))
            }
            _ => None,
        }
    }

    fn on_hit(&self, attacker: EntityId, target: EntityId) -> EventOutcome {
        roster_hit_outcome(&self.rosters, attacker, target)
    }
}
