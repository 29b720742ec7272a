use super::{
    Autobalancing, ChoosingTeams, CommandResult, GameState, MatchContext, MatchEventSink, MatchMode,
    StartParams,
};
use crate::flag::Team;
use script_api::Relation;
use tracing::debug;

/// Lobby between matches.
#[derive(Debug, Default)]
pub struct PreGame;

impl MatchEventSink for PreGame {
    fn enter(&mut self, ctx: &mut MatchContext) {
        for (team, pole) in [(Team::Red, ctx.settings.red_pole), (Team::Blue, ctx.settings.blue_pole)] {
            if ctx.arena.pole_pos(team) != pole {
                ctx.arena.set_pole(ctx.host, team, pole);
            }
        }
        ctx.arena.reset_flags(ctx.host);
        ctx.host.set_relation_all(ctx.settings.relation_between_matches);
        debug!("Lobby open, relation {:?}", ctx.settings.relation_between_matches);
    }

    fn startgame(&mut self, ctx: &mut MatchContext, params: StartParams) -> CommandResult {
        if ctx.host.players().len() < 2 {
            return ("Not enough players to start a match!".to_string(), None);
        }

        ctx.host.set_relation_all(Relation::FriendlyPlayer);
        let next = match params.mode {
            MatchMode::Choose => {
                GameState::ChoosingTeams(ChoosingTeams::new(ctx.host.players(), params.point_count))
            }
            MatchMode::Autobalance => GameState::Autobalancing(Autobalancing::new(params.point_count)),
        };
        ("Game starting...".to_string(), Some(next))
    }
}
