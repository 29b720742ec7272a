use super::{
    roster_hit_outcome, GameState, MatchContext, MatchEventSink, PreGame, Role, Rosters,
    CAPTURE_RADIUS, OUT_OF_BOUNDS_NUDGE, RESPAWN_IMMUNITY,
};
use crate::flag::Team;
use crate::geometry::{distance, positions_equal};
use script_api::{EntityId, EventOutcome, PlayerInfo, Relation, Sound};
use std::collections::HashMap;
use tracing::info;

/// The match itself: flag handling, scoring and the arena boundary.
#[derive(Debug)]
pub struct Running {
    rosters: Rosters,
    point_count: u32,
    red_points: u32,
    blue_points: u32,
    /// Remaining port immunity per player, in seconds.
    immunity: HashMap<EntityId, f32>,
}

impl Running {
    pub fn new(rosters: Rosters, point_count: u32) -> Self {
        Self {
            rosters,
            point_count,
            red_points: 0,
            blue_points: 0,
            immunity: HashMap::new(),
        }
    }

    pub fn rosters(&self) -> &Rosters {
        &self.rosters
    }

    pub fn points(&self, team: Team) -> u32 {
        match team {
            Team::Red => self.red_points,
            Team::Blue => self.blue_points,
        }
    }

    pub fn immunity(&self, player: EntityId) -> f32 {
        self.immunity.get(&player).copied().unwrap_or(0.0)
    }

    fn living(ctx: &MatchContext, players: &[EntityId]) -> Vec<PlayerInfo> {
        players
            .iter()
            .filter_map(|id| ctx.host.player(*id))
            .filter(|p| p.is_alive())
            .collect()
    }

    /// Moves players that left the arena back toward its center.
    fn enforce_bounds(&mut self, ctx: &mut MatchContext, dt: f32) {
        let bounds = ctx.arena.bounds();
        let participants: Vec<EntityId> = self.rosters.participants().collect();
        for id in participants {
            let timer = self.immunity.entry(id).or_insert(0.0);
            *timer = (*timer - dt).max(0.0);
            if *timer > 0.0 {
                continue;
            }
            let Some(info) = ctx.host.player(id) else {
                continue;
            };
            if !bounds.is_outside(info.position) {
                continue;
            }
            let mut target = bounds.nudge_toward_center(info.position, OUT_OF_BOUNDS_NUDGE);
            target.z = ctx.host.terrain_height(target.x, target.y);
            ctx.host.teleport(id, target);
            ctx.host.send_chat_to(id, "You are leaving the battlefield!");
        }
    }

    /// Runs the flag of `team` for one tick. Returns `true` when the enemy
    /// team captured it.
    fn run_flag(&mut self, ctx: &mut MatchContext, team: Team) -> bool {
        let enemy = team.other();
        let home = ctx.arena.pole_pos(team);
        let flag_pos = ctx.arena.flag(team).pos();
        let flag_name = ctx.arena.flag(team).name.clone();

        let Some(carrier) = ctx.arena.flag(team).carrier else {
            if !positions_equal(flag_pos, home) {
                let defenders = Self::living(ctx, self.rosters.team(team));
                if let Some(defender) = defenders
                    .iter()
                    .find(|p| distance(p.position, flag_pos) <= CAPTURE_RADIUS)
                {
                    ctx.arena.flag_mut(team).set_pos(ctx.host, home);
                    ctx.host.play_sound(Sound::FlagReturn, home);
                    ctx.host
                        .send_chat(&format!("{} returned the {} flag.", defender.name, flag_name));
                    return false;
                }
            }

            let attackers = Self::living(ctx, self.rosters.team(enemy));
            if let Some(attacker) = attackers
                .iter()
                .find(|p| distance(p.position, flag_pos) <= CAPTURE_RADIUS)
            {
                let flag = ctx.arena.flag_mut(team);
                flag.carrier = Some(attacker.id);
                flag.set_pos(ctx.host, attacker.position);
                ctx.host.play_sound(Sound::Pickup, attacker.position);
                ctx.host
                    .send_chat(&format!("{} has taken the {} flag!", attacker.name, flag_name));
            }
            return false;
        };

        let holder = ctx.host.player(carrier).filter(|p| p.is_alive());
        let Some(holder) = holder else {
            let name = ctx.player_name(carrier);
            ctx.arena.flag_mut(team).carrier = None;
            ctx.host.play_sound(Sound::Drop, flag_pos);
            ctx.host.send_chat(&format!("{} dropped the {} flag!", name, flag_name));
            return false;
        };

        ctx.arena.flag_mut(team).set_pos(ctx.host, holder.position);
        if distance(holder.position, ctx.arena.pole_pos(enemy)) > CAPTURE_RADIUS {
            return false;
        }

        let flag = ctx.arena.flag_mut(team);
        flag.carrier = None;
        flag.set_pos(ctx.host, home);
        ctx.host.play_sound(Sound::Score, holder.position);
        ctx.host
            .send_chat(&format!("{} captured the {} flag!", holder.name, flag_name));
        info!("{} captured the {} flag", holder.name, flag_name);
        true
    }

    /// Announces the result and rewards the winners.
    fn finish(&mut self, ctx: &mut MatchContext, winner: Option<Team>) {
        let Some(team) = winner else {
            info!("Match ended in a draw");
            ctx.host.send_chat("The match ended in a draw!");
            ctx.loot.give_loot(ctx.host, &[], ctx.rng);
            for id in self.rosters.participants().collect::<Vec<_>>() {
                if let Some(player) = ctx.host.player(id) {
                    ctx.host.play_sound(Sound::MissionComplete, player.position);
                }
            }
            return;
        };

        info!("The {} team won {}:{}", team, self.points(team), self.points(team.other()));
        ctx.host.send_chat(&format!("The {} team wins the match!", team));

        let winners = self.rosters.team(team).to_vec();
        ctx.loot.give_loot(ctx.host, &winners, ctx.rng);
        let xp = ctx.settings.win_xp();
        for &id in &winners {
            let Some(player) = ctx.host.player(id) else {
                continue;
            };
            if ctx.settings.xp_on_win {
                ctx.host.grant_xp(id, None, xp);
            }
            ctx.host.play_sound(Sound::MissionComplete, player.position);
        }
    }
}

impl MatchEventSink for Running {
    fn enter(&mut self, ctx: &mut MatchContext) {
        for team in [Team::Red, Team::Blue] {
            let members = self.rosters.team(team).to_vec();
            let enemies = self.rosters.team(team.other()).to_vec();
            for &a in &members {
                for &b in &members {
                    if a != b {
                        ctx.host.set_relation(a, b, Relation::FriendlyPlayer);
                    }
                }
                for &e in &enemies {
                    ctx.host.set_relation(a, e, Relation::Hostile);
                }
            }

            let pole = ctx.arena.pole_pos(team);
            for &id in &members {
                ctx.host.teleport(id, pole);
                if let Some(player) = ctx.host.player(id) {
                    ctx.host.heal(id, player.max_hp);
                }
                self.immunity.insert(id, 0.0);
            }
        }
        ctx.host.send_chat("The match has started!");
    }

    fn exit(&mut self, ctx: &mut MatchContext) {
        ctx.arena.reset_flags(ctx.host);
    }

    fn update(&mut self, ctx: &mut MatchContext, dt: f32) -> Option<GameState> {
        ctx.pin_spectators(&self.rosters.spectators);
        self.enforce_bounds(ctx, dt);

        let mut scored = false;
        if self.run_flag(ctx, Team::Red) {
            self.blue_points += 1;
            scored = true;
        }
        if self.run_flag(ctx, Team::Blue) {
            self.red_points += 1;
            scored = true;
        }
        if !scored {
            return None;
        }

        ctx.host.send_chat(&format!(
            "Score: red {} - {} blue",
            self.red_points, self.blue_points
        ));
        let red_won = self.red_points >= self.point_count;
        let blue_won = self.blue_points >= self.point_count;
        let winner = match (red_won, blue_won) {
            (false, false) => return None,
            (true, true) => None,
            (true, false) => Some(Team::Red),
            (false, true) => Some(Team::Blue),
        };
        self.finish(ctx, winner);
        Some(GameState::PreGame(PreGame))
    }

    fn player_join(&mut self, ctx: &mut MatchContext, player: EntityId) -> Option<GameState> {
        self.rosters.assign(player, Role::Spectator);
        ctx.host
            .send_chat_to(player, "A match is running. You are spectating.");
        None
    }

    fn player_leave(&mut self, ctx: &mut MatchContext, player: EntityId) -> Option<GameState> {
        self.rosters.remove(player);
        self.immunity.remove(&player);
        if self.rosters.red.is_empty() && self.rosters.blue.is_empty() {
            info!("All players left, aborting match");
            ctx.host
                .send_chat("The match was aborted because all players left.");
            return Some(GameState::PreGame(PreGame));
        }
        None
    }

    fn on_respawn(&mut self, ctx: &mut MatchContext, player: EntityId) {
        let Some(Role::Player(team)) = self.rosters.role_of(player) else {
            return;
        };
        self.immunity.insert(player, RESPAWN_IMMUNITY);
        ctx.host.teleport(player, ctx.arena.pole_pos(team));
    }

    fn on_hit(&self, attacker: EntityId, target: EntityId) -> EventOutcome {
        match roster_hit_outcome(&self.rosters, attacker, target) {
            EventOutcome::Continue if self.immunity(target) > 0.0 => EventOutcome::Cancel,
            outcome => outcome,
        }
    }
}
