//! In-memory host.
//!
//! [`LocalWorld`] implements [`ScriptHost`] without a game engine behind it.
//! It keeps a player table and records every effect a script requests
//! (chat, teleports, items, relations, particles) so that the headless
//! server binary can print them and tests can assert on them.

use crate::data::DataStore;
use crate::host::{HostError, ParticleEffect, ParticleHandle, PlayerInfo, ScriptHost};
use crate::model::{BlockType, ModelSize, VoxelModel};
use crate::types::{ClassType, EntityId, ItemData, Relation, Sound, Vec3};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Health every local player starts with.
pub const DEFAULT_MAX_HP: f32 = 1000.0;

/// A chat line sent by a script.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLine {
    /// Recipient, `None` for broadcasts.
    pub to: Option<EntityId>,
    pub message: String,
}

/// Experience handed out through [`ScriptHost::grant_xp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpGrant {
    pub player: EntityId,
    pub target: Option<EntityId>,
    pub xp: u32,
}

/// A model placed into the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedModel {
    pub size: ModelSize,
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

/// A [`ScriptHost`] backed by plain collections.
#[derive(Debug)]
pub struct LocalWorld {
    next_entity: u64,
    players: Vec<PlayerInfo>,
    chat: Vec<ChatLine>,
    teleports: Vec<(EntityId, Vec3)>,
    stuns: Vec<(EntityId, u32)>,
    items: Vec<(EntityId, ItemData)>,
    xp: Vec<XpGrant>,
    relations: HashMap<(EntityId, EntityId), Relation>,
    default_relation: Relation,
    speed_cap: bool,
    next_particle: u32,
    particles: HashMap<ParticleHandle, ParticleEffect>,
    particle_fires: usize,
    sounds: Vec<(Sound, Vec3)>,
    ground: f64,
    seed: u32,
    column_heights: HashMap<(i64, i64), i64>,
    default_column_height: i64,
    blocks: HashMap<(i64, i64, i64), BlockType>,
    models: HashMap<PathBuf, VoxelModel>,
    placed: Vec<PlacedModel>,
    store: DataStore,
}

impl LocalWorld {
    /// Creates an empty world persisting script data under `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            next_entity: 1,
            players: Vec::new(),
            chat: Vec::new(),
            teleports: Vec::new(),
            stuns: Vec::new(),
            items: Vec::new(),
            xp: Vec::new(),
            relations: HashMap::new(),
            default_relation: Relation::Hostile,
            speed_cap: true,
            next_particle: 1,
            particles: HashMap::new(),
            particle_fires: 0,
            sounds: Vec::new(),
            ground: 0.0,
            seed: 0,
            column_heights: HashMap::new(),
            default_column_height: 64,
            blocks: HashMap::new(),
            models: HashMap::new(),
            placed: Vec::new(),
            store: DataStore::new(data_dir),
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    // ====================================================================
    // Players
    // ====================================================================

    /// Connects a new player at the origin with full health.
    pub fn add_player(&mut self, name: &str, level: u32, class: ClassType) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.players.push(PlayerInfo {
            id,
            name: name.to_string(),
            position: Vec3::ZERO,
            level,
            class,
            hp: DEFAULT_MAX_HP,
            max_hp: DEFAULT_MAX_HP,
        });
        debug!("Local player {} joined as {}", name, id);
        id
    }

    /// Disconnects a player. Returns whether the player was connected.
    pub fn remove_player(&mut self, id: EntityId) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != id);
        self.relations.retain(|(from, to), _| *from != id && *to != id);
        before != self.players.len()
    }

    pub fn find_player(&self, name: &str) -> Option<EntityId> {
        self.players
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.id)
    }

    fn player_mut(&mut self, id: EntityId) -> Option<&mut PlayerInfo> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Moves a player without recording a teleport.
    pub fn set_position(&mut self, id: EntityId, position: Vec3) {
        if let Some(player) = self.player_mut(id) {
            player.position = position;
        }
    }

    pub fn set_hp(&mut self, id: EntityId, hp: f32) {
        if let Some(player) = self.player_mut(id) {
            player.hp = hp;
        }
    }

    pub fn set_level(&mut self, id: EntityId, level: u32) {
        if let Some(player) = self.player_mut(id) {
            player.level = level;
        }
    }

    // ====================================================================
    // Recorded effects
    // ====================================================================

    pub fn chat(&self) -> &[ChatLine] {
        &self.chat
    }

    /// Takes every chat line recorded so far.
    pub fn drain_chat(&mut self) -> Vec<ChatLine> {
        std::mem::take(&mut self.chat)
    }

    /// Broadcast messages, oldest first.
    pub fn broadcasts(&self) -> Vec<&str> {
        self.chat
            .iter()
            .filter(|line| line.to.is_none())
            .map(|line| line.message.as_str())
            .collect()
    }

    /// Messages sent to a single player, oldest first.
    pub fn messages_to(&self, id: EntityId) -> Vec<&str> {
        self.chat
            .iter()
            .filter(|line| line.to == Some(id))
            .map(|line| line.message.as_str())
            .collect()
    }

    pub fn teleports(&self) -> &[(EntityId, Vec3)] {
        &self.teleports
    }

    pub fn stuns(&self) -> &[(EntityId, u32)] {
        &self.stuns
    }

    pub fn items(&self) -> &[(EntityId, ItemData)] {
        &self.items
    }

    pub fn xp_grants(&self) -> &[XpGrant] {
        &self.xp
    }

    /// How `from` currently sees `to`.
    pub fn relation(&self, from: EntityId, to: EntityId) -> Relation {
        self.relations
            .get(&(from, to))
            .copied()
            .unwrap_or(self.default_relation)
    }

    pub fn default_relation(&self) -> Relation {
        self.default_relation
    }

    pub fn speed_cap(&self) -> bool {
        self.speed_cap
    }

    /// Currently registered particle effects.
    pub fn particles(&self) -> impl Iterator<Item = (&ParticleHandle, &ParticleEffect)> {
        self.particles.iter()
    }

    pub fn particle(&self, handle: ParticleHandle) -> Option<&ParticleEffect> {
        self.particles.get(&handle)
    }

    /// How many times any effect was fired.
    pub fn particle_fires(&self) -> usize {
        self.particle_fires
    }

    pub fn sounds(&self) -> &[(Sound, Vec3)] {
        &self.sounds
    }

    pub fn placed_models(&self) -> &[PlacedModel] {
        &self.placed
    }

    // ====================================================================
    // Terrain
    // ====================================================================

    pub fn set_ground(&mut self, height: f64) {
        self.ground = height;
    }

    pub fn set_default_column_height(&mut self, height: i64) {
        self.default_column_height = height;
    }

    pub fn set_column_height(&mut self, x: i64, y: i64, height: i64) {
        self.column_heights.insert((x, y), height);
    }

    pub fn set_block(&mut self, x: i64, y: i64, z: i64, block: BlockType) {
        self.blocks.insert((x, y, z), block);
    }

    /// Makes `path` resolve to `model` in [`ScriptHost::load_model`]
    /// without touching the file system.
    pub fn register_model(&mut self, path: impl Into<PathBuf>, model: VoxelModel) {
        self.models.insert(path.into(), model);
    }
}

impl ScriptHost for LocalWorld {
    fn players(&self) -> Vec<EntityId> {
        self.players.iter().map(|p| p.id).collect()
    }

    fn player(&self, id: EntityId) -> Option<PlayerInfo> {
        self.players.iter().find(|p| p.id == id).cloned()
    }

    fn send_chat(&mut self, message: &str) {
        self.chat.push(ChatLine { to: None, message: message.to_string() });
    }

    fn send_chat_to(&mut self, player: EntityId, message: &str) {
        self.chat.push(ChatLine { to: Some(player), message: message.to_string() });
    }

    fn teleport(&mut self, player: EntityId, position: Vec3) {
        if let Some(info) = self.player_mut(player) {
            info.position = position;
            self.teleports.push((player, position));
        }
    }

    fn heal(&mut self, player: EntityId, amount: f32) {
        if let Some(info) = self.player_mut(player) {
            info.hp = (info.hp + amount).min(info.max_hp);
        }
    }

    fn damage(&mut self, player: EntityId, amount: f32, stun_ms: u32) {
        if let Some(info) = self.player_mut(player) {
            info.hp -= amount;
            if stun_ms > 0 {
                self.stuns.push((player, stun_ms));
            }
        }
    }

    fn stun(&mut self, player: EntityId, duration_ms: u32) {
        if self.player_mut(player).is_some() {
            self.stuns.push((player, duration_ms));
        }
    }

    fn kill(&mut self, player: EntityId) {
        if let Some(info) = self.player_mut(player) {
            info.hp = 0.0;
        }
    }

    fn give_item(&mut self, player: EntityId, item: ItemData) {
        self.items.push((player, item));
    }

    fn grant_xp(&mut self, player: EntityId, target: Option<EntityId>, xp: u32) {
        self.xp.push(XpGrant { player, target, xp });
    }

    fn set_relation(&mut self, from: EntityId, to: EntityId, relation: Relation) {
        self.relations.insert((from, to), relation);
    }

    fn set_relation_all(&mut self, relation: Relation) {
        self.default_relation = relation;
        let ids: Vec<EntityId> = self.players.iter().map(|p| p.id).collect();
        for &from in &ids {
            for &to in &ids {
                if from != to {
                    self.relations.insert((from, to), relation);
                }
            }
        }
    }

    fn set_speed_cap(&mut self, enabled: bool) {
        self.speed_cap = enabled;
    }

    fn create_particle_effect(&mut self, effect: ParticleEffect) -> ParticleHandle {
        let handle = ParticleHandle(self.next_particle);
        self.next_particle += 1;
        self.particles.insert(handle, effect);
        self.particle_fires += 1;
        handle
    }

    fn update_particle_effect(&mut self, handle: ParticleHandle, effect: ParticleEffect) {
        if let Some(slot) = self.particles.get_mut(&handle) {
            *slot = effect;
            self.particle_fires += 1;
        }
    }

    fn remove_particle_effect(&mut self, handle: ParticleHandle) {
        self.particles.remove(&handle);
    }

    fn play_sound(&mut self, sound: Sound, position: Vec3) {
        self.sounds.push((sound, position));
    }

    fn terrain_height(&self, _x: f64, _y: f64) -> f64 {
        self.ground
    }

    fn world_seed(&self) -> u32 {
        self.seed
    }

    fn column_height(&self, x: i64, y: i64) -> i64 {
        self.column_heights
            .get(&(x, y))
            .copied()
            .unwrap_or(self.default_column_height)
    }

    fn block_at(&self, x: i64, y: i64, z: i64) -> BlockType {
        if let Some(block) = self.blocks.get(&(x, y, z)) {
            return *block;
        }
        if z < self.column_height(x, y) {
            BlockType::Solid
        } else {
            BlockType::Empty
        }
    }

    fn load_model(&mut self, path: &Path) -> Result<VoxelModel, HostError> {
        if let Some(model) = self.models.get(path) {
            return Ok(model.clone());
        }
        let bytes = std::fs::read(path)
            .map_err(|_| HostError::ModelNotFound(path.display().to_string()))?;
        VoxelModel::from_cub_bytes(&bytes).map_err(|e| HostError::InvalidModel {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn place_model(&mut self, model: &VoxelModel, x: i64, y: i64, z: i64) {
        debug!("Placing {:?} model at ({}, {}, {})", model.size(), x, y, z);
        self.placed.push(PlacedModel { size: model.size(), x, y, z });
    }

    fn data_store(&self) -> &DataStore {
        &self.store
    }
}
