//! # Core Type Definitions
//!
//! Value types shared between the host and every script: entity ids,
//! world vectors, player classes, relations, colors and reward items.
//!
//! All world coordinates are expressed in engine distance units, where one
//! block is 65536 units wide. Heights grow along the `z` axis.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Unique identifier of an entity (and therefore of a connected player).
///
/// The host assigns these ids; scripts never invent them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A position or direction in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// The world origin.
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length of the vector.
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Projection onto the horizontal plane (z dropped).
    pub fn horizontal(&self) -> Vec3 {
        Vec3::new(self.x, self.y, 0.0)
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Character class of a player. The discriminants match the engine's
/// class ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassType {
    Warrior = 1,
    Ranger = 2,
    Mage = 3,
    Rogue = 4,
}

impl ClassType {
    /// Parses a class from its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "warrior" => Some(Self::Warrior),
            "ranger" => Some(Self::Ranger),
            "mage" => Some(Self::Mage),
            "rogue" => Some(Self::Rogue),
            _ => None,
        }
    }
}

/// How one entity is displayed to, and may interact with, another.
///
/// The numeric codes are the engine's relation ids and are what settings
/// files store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Relation {
    /// Friendly and shown as a player on the map.
    FriendlyPlayer = 10,
    /// Friendly.
    Friendly = 11,
    /// Friendly, with the name displayed.
    FriendlyNamed = 12,
    /// Shown as a player, but both sides can damage each other.
    Rival = 13,
    /// Hostile.
    Hostile = 14,
    /// Shown as friendly, but both sides can damage each other.
    FriendlyRival = 15,
}

impl Relation {
    /// The engine code of this relation.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether entities in this relation may hurt each other.
    pub fn can_damage(self) -> bool {
        matches!(self, Self::Rival | Self::Hostile | Self::FriendlyRival)
    }
}

impl TryFrom<u8> for Relation {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            10 => Ok(Self::FriendlyPlayer),
            11 => Ok(Self::Friendly),
            12 => Ok(Self::FriendlyNamed),
            13 => Ok(Self::Rival),
            14 => Ok(Self::Hostile),
            15 => Ok(Self::FriendlyRival),
            other => Err(other),
        }
    }
}

impl From<Relation> for u8 {
    fn from(relation: Relation) -> u8 {
        relation.code()
    }
}

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self { red, green, blue, alpha }
    }
}

/// An item handed to a player's inventory.
///
/// Field values are raw engine ids (item type, sub type, material).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemData {
    pub item_type: u8,
    pub sub_type: u8,
    pub modifier: u32,
    pub minus_modifier: u32,
    pub rarity: u8,
    pub material: u8,
    pub flags: u8,
    pub level: u16,
    pub upgrade_count: u32,
}

/// Sound cues scripts can ask the host to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Pickup,
    Drop,
    FlagReturn,
    Score,
    MissionComplete,
}
