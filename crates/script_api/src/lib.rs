//! # Script API
//!
//! The contract between a cubolt-style game server and the scripts it
//! hosts. The server owns the world simulation, networking and storage;
//! scripts see it only through the [`ScriptHost`] trait and react to the
//! [`HostEvent`]s and chat commands the server forwards to them.
//!
//! ## Overview
//!
//! - [`types`]: ids, vectors, classes, relations, items
//! - [`host`]: the [`ScriptHost`] services trait and particle effects
//! - [`script`]: the [`ServerScript`] lifecycle trait and host events
//! - [`data`]: TOML persistence through [`DataStore`]
//! - [`model`]: voxel models placed into the world
//! - [`manager`]: [`ScriptManager`], which fans events out to scripts
//! - [`local`]: [`LocalWorld`], an in-memory host for tools and tests
//!
//! ## Writing a script
//!
//! ```rust
//! use script_api::*;
//!
//! struct Greeter;
//!
//! impl ServerScript for Greeter {
//!     fn name(&self) -> &str { "greeter" }
//!     fn version(&self) -> &str { "1.0.0" }
//!
//!     fn on_load(&mut self, _host: &mut dyn ScriptHost) -> Result<(), ScriptError> {
//!         Ok(())
//!     }
//!
//!     fn on_event(
//!         &mut self,
//!         host: &mut dyn ScriptHost,
//!         event: &HostEvent,
//!     ) -> Result<EventOutcome, ScriptError> {
//!         if let HostEvent::Join { player } = event {
//!             host.send_chat_to(*player, "Welcome!");
//!         }
//!         Ok(EventOutcome::Continue)
//!     }
//! }
//! ```

pub mod data;
pub mod host;
pub mod local;
pub mod manager;
pub mod model;
pub mod script;
pub mod types;

pub use data::{DataError, DataStore};
pub use host::{
    HostError, LogLevel, ParticleEffect, ParticleHandle, ParticleKind, PlayerInfo, ScriptHost,
};
pub use local::{ChatLine, LocalWorld, PlacedModel, XpGrant};
pub use manager::{ScriptManager, UNKNOWN_COMMAND};
pub use model::{BlockType, ModelError, ModelSize, VoxelModel};
pub use script::{
    CommandContext, EventOutcome, HostEvent, ScriptError, ServerScript, PERMISSION_DENIED,
};
pub use types::{ClassType, Color, EntityId, ItemData, Relation, Sound, Vec3};

/// Parses an on/off style switch argument.
///
/// Accepts `on`/`off`, `true`/`false`, `yes`/`no`, `enable`/`disable`
/// and `1`/`0`, ignoring case.
pub fn parse_switch(arg: &str) -> Option<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" | "enable" => Some(true),
        "off" | "false" | "no" | "0" | "disable" => Some(false),
        _ => None,
    }
}
