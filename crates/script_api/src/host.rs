//! # Host Interface
//!
//! The [`ScriptHost`] trait is everything a script may ask of the server
//! that loads it: entity accessors, chat, relations, particle effects,
//! terrain queries, model placement and persistence.
//!
//! ## Design Principles
//!
//! - **Serialized access**: the host invokes scripts one callback at a time,
//!   so every method takes `&mut self` or `&self` without locking
//! - **Fire and forget**: effects such as chat or teleports never fail from
//!   the script's point of view; unknown entity ids are ignored by the host
//! - **Snapshots**: entity state is read through [`PlayerInfo`] copies, never
//!   through references into host storage

use crate::data::DataStore;
use crate::model::{BlockType, VoxelModel};
use crate::types::{ClassType, Color, EntityId, ItemData, Relation, Sound, Vec3};
use std::path::Path;
use thiserror::Error;

/// Snapshot of a connected player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfo {
    pub id: EntityId,
    pub name: String,
    pub position: Vec3,
    pub level: u32,
    pub class: ClassType,
    pub hp: f32,
    pub max_hp: f32,
}

impl PlayerInfo {
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }
}

/// Particle behaviour, using the engine's particle type ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    NoAcceleration = 3,
    NoGravity = 4,
}

/// Description of a repeating particle emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleEffect {
    pub position: Vec3,
    pub acceleration: Vec3,
    pub color: Color,
    pub scale: f32,
    pub count: u32,
    pub kind: ParticleKind,
    pub spreading: f32,
    /// Seconds between two emissions.
    pub interval: f32,
}

/// Host-assigned handle of a registered particle effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleHandle(pub u32);

/// Log severity for [`ScriptHost::log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Failures reported by host operations that can fail.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("invalid model {path}: {reason}")]
    InvalidModel { path: String, reason: String },
}

/// Services the hosting server provides to scripts.
pub trait ScriptHost {
    /// Ids of all connected players, in join order.
    fn players(&self) -> Vec<EntityId>;

    /// Snapshot of a connected player, `None` if the id is not connected.
    fn player(&self, id: EntityId) -> Option<PlayerInfo>;

    /// Broadcasts a chat line to every player.
    fn send_chat(&mut self, message: &str);

    /// Sends a chat line to a single player.
    fn send_chat_to(&mut self, player: EntityId, message: &str);

    fn teleport(&mut self, player: EntityId, position: Vec3);

    fn heal(&mut self, player: EntityId, amount: f32);

    /// Damages a player and stuns them for `stun_ms` milliseconds.
    fn damage(&mut self, player: EntityId, amount: f32, stun_ms: u32);

    fn stun(&mut self, player: EntityId, duration_ms: u32);

    fn kill(&mut self, player: EntityId);

    fn give_item(&mut self, player: EntityId, item: ItemData);

    /// Grants experience to a player. `target` is the killed entity when
    /// the experience is a kill reward.
    fn grant_xp(&mut self, player: EntityId, target: Option<EntityId>, xp: u32);

    /// Sets how `from` sees `to`.
    fn set_relation(&mut self, from: EntityId, to: EntityId, relation: Relation);

    /// Sets the relation between every pair of players, and the default
    /// relation for players that connect later.
    fn set_relation_all(&mut self, relation: Relation);

    fn set_speed_cap(&mut self, enabled: bool);

    /// Registers a particle effect and fires it once.
    fn create_particle_effect(&mut self, effect: ParticleEffect) -> ParticleHandle;

    /// Replaces the data of a registered effect and fires it again.
    fn update_particle_effect(&mut self, handle: ParticleHandle, effect: ParticleEffect);

    fn remove_particle_effect(&mut self, handle: ParticleHandle);

    fn play_sound(&mut self, sound: Sound, position: Vec3);

    /// Ground height (z) at a horizontal world position.
    fn terrain_height(&self, x: f64, y: f64) -> f64;

    /// Seed of the world generator.
    fn world_seed(&self) -> u32;

    /// Height of the topmost block of a column, in block coordinates.
    fn column_height(&self, x: i64, y: i64) -> i64;

    /// Type of the block at a block coordinate.
    fn block_at(&self, x: i64, y: i64, z: i64) -> BlockType;

    /// Loads a voxel model from disk.
    fn load_model(&mut self, path: &Path) -> Result<VoxelModel, HostError>;

    /// Places a model with its lower corner at the given block coordinate.
    fn place_model(&mut self, model: &VoxelModel, x: i64, y: i64, z: i64);

    /// Persistence for script settings and state.
    fn data_store(&self) -> &DataStore;

    /// Logs a line through the host's logging system.
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => tracing::error!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Trace => tracing::trace!("{}", message),
        }
    }
}
