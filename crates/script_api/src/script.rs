//! Script lifecycle trait and the events the host delivers to scripts.

use crate::data::DataError;
use crate::host::ScriptHost;
use crate::types::{EntityId, Vec3};
use thiserror::Error;

/// Reply given to players that lack the rights for an admin command.
pub const PERMISSION_DENIED: &str = "You do not have permission to use this command.";

/// Events the host forwards to every loaded script.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A player finished connecting.
    Join { player: EntityId },
    /// A player is disconnecting. The player is still queryable while this
    /// event is delivered.
    Leave { player: EntityId },
    /// `attacker` is about to hit `target`.
    Hit { attacker: EntityId, target: EntityId, damage: f32 },
    /// `killer` killed `target`.
    Kill { killer: EntityId, target: EntityId },
    /// A dead player came back to life.
    Respawn { player: EntityId },
    /// A player reported a new position.
    PositionUpdate { player: EntityId, position: Vec3 },
    /// A world chunk finished loading. Coordinates are chunk indices.
    ChunkLoad { x: i64, y: i64 },
    /// One server tick passed; `dt` is the elapsed time in seconds.
    Update { dt: f32 },
}

/// What the host should do with the event after a script saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventOutcome {
    #[default]
    Continue,
    /// Suppress the host's default handling (only meaningful for hits).
    Cancel,
}

/// Who issued a chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandContext {
    /// Issuing player, `None` for the server console.
    pub issuer: Option<EntityId>,
    pub is_admin: bool,
}

impl CommandContext {
    /// Context for commands typed into the server console.
    pub fn console() -> Self {
        Self { issuer: None, is_admin: true }
    }

    pub fn player(id: EntityId, is_admin: bool) -> Self {
        Self { issuer: Some(id), is_admin }
    }
}

/// Errors surfaced by script lifecycle callbacks.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script data error: {0}")]
    Data(#[from] DataError),
    #[error("invalid settings: {0}")]
    Settings(String),
    #[error("script runtime error: {0}")]
    Runtime(String),
}

/// A script the host loads and drives through lifecycle callbacks.
///
/// # Lifecycle
///
/// 1. **Load**: `on_load()` reads settings and creates world objects
/// 2. **Operation**: `on_event()` for every host event, `on_command()` for
///    every chat command
/// 3. **Unload**: `on_unload()` removes world objects the script created
pub trait ServerScript {
    /// Stable, unique script name. Also used as the data file name.
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn on_load(&mut self, host: &mut dyn ScriptHost) -> Result<(), ScriptError>;

    fn on_unload(&mut self, _host: &mut dyn ScriptHost) -> Result<(), ScriptError> {
        Ok(())
    }

    fn on_event(
        &mut self,
        host: &mut dyn ScriptHost,
        event: &HostEvent,
    ) -> Result<EventOutcome, ScriptError>;

    /// Handles a chat command. Returns `None` if the command is not one of
    /// this script's, otherwise the reply for the issuer.
    fn on_command(
        &mut self,
        _host: &mut dyn ScriptHost,
        _ctx: &CommandContext,
        _command: &str,
        _args: &[&str],
    ) -> Option<String> {
        None
    }

    /// Game mode name shown in the server list, if this script sets one.
    fn game_mode(&self) -> Option<String> {
        None
    }
}
