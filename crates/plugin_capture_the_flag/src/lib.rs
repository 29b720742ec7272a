//! # Capture the Flag
//!
//! Team game mode for cubolt servers. Two teams, red and blue, each guard a
//! flag at their flag pole. Carrying the enemy flag to your own pole scores
//! a point; the first team to reach the point target wins and receives the
//! match's loot.
//!
//! The script keeps the arena (poles and flags), the loot resolver and the
//! match state machine. Host events are forwarded to the current match
//! state, see [`state`].
//!
//! ## Commands
//!
//! | command | rights |
//! |---|---|
//! | `/startgame [autobalance\|choose] [points]` | everyone |
//! | `/join <red\|blue\|spectator>` | players |
//! | `/abortgame`, `/reloadconfig` | admins |
//! | `/setflagpoler`, `/setflagpoleb` | admin players |
//! | `/loot`, `/xponkill`, `/xponwin`, `/speedcap` `[on\|off]` | admins |

pub mod commands;
pub mod flag;
pub mod geometry;
pub mod loot;
pub mod settings;
pub mod state;

use flag::Arena;
use loot::LootManager;
use rand::rngs::StdRng;
use rand::SeedableRng;
use script_api::{
    CommandContext, EntityId, EventOutcome, HostEvent, ScriptError, ScriptHost, ServerScript,
};
use settings::{CtfSettings, SettingsError};
use state::{Match, MatchContext};
use tracing::{debug, info};

/// Script name, also the name of its settings document.
pub const SCRIPT_NAME: &str = "capture_the_flag";

/// Everything that exists while the script is loaded.
#[derive(Debug)]
pub(crate) struct Session {
    pub settings: CtfSettings,
    pub arena: Arena,
    pub loot: LootManager,
    pub game: Match,
}

/// The capture the flag script.
pub struct CaptureTheFlagScript {
    rng: StdRng,
    session: Option<Session>,
}

impl Default for CaptureTheFlagScript {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureTheFlagScript {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy(), session: None }
    }

    /// Creates the script with a fixed random seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), session: None }
    }

    pub fn settings(&self) -> Option<&CtfSettings> {
        self.session.as_ref().map(|s| &s.settings)
    }

    pub fn game(&self) -> Option<&Match> {
        self.session.as_ref().map(|s| &s.game)
    }

    pub fn arena(&self) -> Option<&Arena> {
        self.session.as_ref().map(|s| &s.arena)
    }

    pub fn loot(&self) -> Option<&LootManager> {
        self.session.as_ref().map(|s| &s.loot)
    }

    /// Runs `f` with the match and a context borrowing the rest of the
    /// session. Returns `None` before the script is loaded.
    pub(crate) fn with_match<T>(
        &mut self,
        host: &mut dyn ScriptHost,
        f: impl FnOnce(&mut Match, &mut MatchContext) -> T,
    ) -> Option<T> {
        let Session { settings, arena, loot, game } = self.session.as_mut()?;
        let mut ctx = MatchContext { host, arena, loot, settings, rng: &mut self.rng };
        Some(f(game, &mut ctx))
    }

    fn award_kill_xp(&self, host: &mut dyn ScriptHost, killer: EntityId, target: EntityId) {
        let Some(settings) = self.settings() else {
            return;
        };
        if !settings.xp_on_kill {
            return;
        }
        let (Some(k), Some(t)) = (host.player(killer), host.player(target)) else {
            return;
        };
        let xp = settings.kill_xp(k.level, t.level);
        debug!("{} gains {} xp for killing {}", k.name, xp, t.name);
        host.grant_xp(killer, Some(target), xp);
    }
}

impl ServerScript for CaptureTheFlagScript {
    fn name(&self) -> &str {
        SCRIPT_NAME
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn on_load(&mut self, host: &mut dyn ScriptHost) -> Result<(), ScriptError> {
        let settings = CtfSettings::load(host.data_store()).map_err(|e| match e {
            SettingsError::Data(e) => ScriptError::Data(e),
            other => ScriptError::Settings(other.to_string()),
        })?;
        host.set_speed_cap(settings.speed_cap);
        let arena = Arena::spawn(host, settings.red_pole, settings.blue_pole);
        let loot = LootManager::new(settings.loot);
        self.session = Some(Session { settings, arena, loot, game: Match::new() });
        self.with_match(host, |game, ctx| game.begin(ctx));
        info!("Capture the flag loaded");
        Ok(())
    }

    fn on_unload(&mut self, host: &mut dyn ScriptHost) -> Result<(), ScriptError> {
        if let Some(mut session) = self.session.take() {
            session.arena.dispose(host);
        }
        Ok(())
    }

    fn on_event(
        &mut self,
        host: &mut dyn ScriptHost,
        event: &HostEvent,
    ) -> Result<EventOutcome, ScriptError> {
        match *event {
            HostEvent::Join { player } => {
                self.with_match(host, |game, ctx| game.player_join(ctx, player));
            }
            HostEvent::Leave { player } => {
                self.with_match(host, |game, ctx| game.player_leave(ctx, player));
            }
            HostEvent::Hit { attacker, target, .. } => {
                if let Some(game) = self.game() {
                    return Ok(game.on_hit(attacker, target));
                }
            }
            HostEvent::Kill { killer, target } => self.award_kill_xp(host, killer, target),
            HostEvent::Respawn { player } => {
                self.with_match(host, |game, ctx| game.on_respawn(ctx, player));
            }
            HostEvent::Update { dt } => {
                self.with_match(host, |game, ctx| game.update(ctx, dt));
            }
            HostEvent::PositionUpdate { .. } | HostEvent::ChunkLoad { .. } => {}
        }
        Ok(EventOutcome::Continue)
    }

    fn on_command(
        &mut self,
        host: &mut dyn ScriptHost,
        ctx: &CommandContext,
        command: &str,
        args: &[&str],
    ) -> Option<String> {
        commands::handle(self, host, ctx, command, args)
    }

    fn game_mode(&self) -> Option<String> {
        Some("CTF".to_string())
    }
}
