//! Loot resolver.
//!
//! One reward tier is rolled per match and every member of the winning
//! team receives an item of that tier, tailored to their class and level.

use rand::Rng;
use script_api::{ClassType, EntityId, ItemData, ScriptHost};
use tracing::{debug, info};

/// Upper bound (inclusive) of the primary tier draw.
pub const PRIMARY_DRAW_MAX: u32 = 200;
/// Upper bound (inclusive) of the spirit draw.
pub const SPIRIT_DRAW_MAX: u32 = 3;

// Item type ids.
const ITEM_TYPE_WEAPON: u8 = 3;
const ITEM_TYPE_ARMOR: u8 = 4;
const ITEM_TYPE_GLOVES: u8 = 5;
const ITEM_TYPE_BOOTS: u8 = 6;
const ITEM_TYPE_SHOULDER_ARMOR: u8 = 7;
const ITEM_TYPE_AMULET: u8 = 8;
const ITEM_TYPE_RING: u8 = 9;
const ITEM_TYPE_SPIRIT: u8 = 11;
const ITEM_TYPE_MANA_CUBE: u8 = 25;

const SUB_TYPE_SPIRIT: u8 = 14;
const RARITY_RARE: u8 = 2;

// Weapon sub types.
const SWORD: u8 = 0;
const AXE: u8 = 1;
const MACE: u8 = 2;
const DAGGER: u8 = 3;
const FIST: u8 = 4;
const LONGSWORD: u8 = 5;
const BOW: u8 = 6;
const CROSSBOW: u8 = 7;
const BOOMERANG: u8 = 8;
const STAFF: u8 = 10;
const WAND: u8 = 11;
const BRACELET: u8 = 12;
const SHIELD: u8 = 13;
const GREATSWORD: u8 = 15;
const GREATAXE: u8 = 16;
const GREATMACE: u8 = 17;

// Materials.
const IRON: u8 = 1;
const WOOD: u8 = 2;
const GOLD: u8 = 11;
const SILVER: u8 = 12;
const SILK: u8 = 25;
const LINEN: u8 = 26;
const COTTON: u8 = 27;

/// Material of the first spirit tier; the others follow consecutively.
const SPIRIT_MATERIAL_BASE: u8 = 123;

/// Reward category of a match. The discriminant of the item tiers is the
/// rarity they grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LootTier {
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
    FireSpirit = 5,
    UnholySpirit = 6,
    IceSpirit = 7,
    WindSpirit = 8,
    ManaCube = 9,
}

impl LootTier {
    /// Maps a primary draw in `0..=200` and a spirit draw in `0..=3` to a
    /// tier.
    ///
    /// Spirit draws only ever produce fire (draw 0) or unholy (any other
    /// draw); wind and ice spirits are never rolled.
    pub fn from_draws(primary: u32, spirit: u32) -> Self {
        match primary {
            0..=99 => Self::Common,
            100..=149 => Self::Uncommon,
            150..=164 => Self::Rare,
            165..=169 => Self::Epic,
            170..=175 => Self::Legendary,
            176..=179 => Self::ManaCube,
            _ => match spirit {
                0 => Self::FireSpirit,
                _ => Self::UnholySpirit,
            },
        }
    }

    /// Rolls a tier.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let primary = rng.gen_range(0..=PRIMARY_DRAW_MAX);
        let spirit = rng.gen_range(0..=SPIRIT_DRAW_MAX);
        Self::from_draws(primary, spirit)
    }

    pub fn is_item(self) -> bool {
        (self as u8) <= Self::Legendary as u8
    }

    pub fn is_spirit(self) -> bool {
        matches!(
            self,
            Self::FireSpirit | Self::UnholySpirit | Self::IceSpirit | Self::WindSpirit
        )
    }

    /// Phrase used in the pre-game announcement.
    pub fn description(self) -> &'static str {
        match self {
            Self::Common => "a common item",
            Self::Uncommon => "an uncommon item",
            Self::Rare => "a rare item",
            Self::Epic => "an epic item",
            Self::Legendary => "a legendary item",
            Self::FireSpirit => "a fire spirit",
            Self::UnholySpirit => "an unholy spirit",
            Self::IceSpirit => "an ice spirit",
            Self::WindSpirit => "a wind spirit",
            Self::ManaCube => "a mana cube",
        }
    }
}

fn weapon_sub_types(class: ClassType) -> &'static [u8] {
    match class {
        ClassType::Warrior => &[SWORD, AXE, MACE, SHIELD, GREATSWORD, GREATAXE, GREATMACE],
        ClassType::Ranger => &[BOW, CROSSBOW, BOOMERANG],
        ClassType::Mage => &[STAFF, WAND, BRACELET],
        ClassType::Rogue => &[DAGGER, FIST, LONGSWORD],
    }
}

fn sub_types(item_type: u8, class: ClassType) -> &'static [u8] {
    if item_type == ITEM_TYPE_WEAPON {
        weapon_sub_types(class)
    } else {
        &[0]
    }
}

fn cloth(class: ClassType) -> &'static [u8] {
    match class {
        ClassType::Warrior => &[IRON],
        ClassType::Ranger => &[LINEN],
        ClassType::Mage => &[SILK],
        ClassType::Rogue => &[COTTON],
    }
}

fn materials(item_type: u8, sub_type: u8, class: ClassType) -> &'static [u8] {
    match item_type {
        ITEM_TYPE_WEAPON => match sub_type {
            BOW | CROSSBOW | BOOMERANG | STAFF | WAND => &[WOOD],
            BRACELET => &[SILVER, GOLD],
            _ => &[IRON],
        },
        ITEM_TYPE_ARMOR | ITEM_TYPE_GLOVES | ITEM_TYPE_BOOTS | ITEM_TYPE_SHOULDER_ARMOR => {
            cloth(class)
        }
        _ => &[GOLD, SILVER],
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &[u8]) -> u8 {
    pool[rng.gen_range(0..pool.len())]
}

/// Builds the reward item of `tier` for a player.
pub fn loot_item<R: Rng + ?Sized>(
    tier: LootTier,
    class: ClassType,
    level: u32,
    rng: &mut R,
) -> ItemData {
    let level = u16::try_from(level).unwrap_or(u16::MAX);
    if tier.is_item() {
        let item_type = rng.gen_range(ITEM_TYPE_WEAPON..=ITEM_TYPE_RING);
        let sub_type = pick(rng, sub_types(item_type, class));
        let material = pick(rng, materials(item_type, sub_type, class));
        ItemData {
            item_type,
            sub_type,
            modifier: rng.gen_range(1..=10),
            rarity: tier as u8,
            material,
            level,
            ..ItemData::default()
        }
    } else if tier.is_spirit() {
        ItemData {
            item_type: ITEM_TYPE_SPIRIT,
            sub_type: SUB_TYPE_SPIRIT,
            rarity: RARITY_RARE,
            material: SPIRIT_MATERIAL_BASE + tier as u8,
            level,
            ..ItemData::default()
        }
    } else {
        ItemData {
            item_type: ITEM_TYPE_MANA_CUBE,
            ..ItemData::default()
        }
    }
}

/// Holds the pending reward tier between match start and match end.
#[derive(Debug)]
pub struct LootManager {
    pending: Option<LootTier>,
    pub loot_enabled: bool,
}

impl LootManager {
    pub fn new(loot_enabled: bool) -> Self {
        Self { pending: None, loot_enabled }
    }

    pub fn pending(&self) -> Option<LootTier> {
        self.pending
    }

    /// Rolls the tier for the upcoming match unless one is already pending.
    pub fn new_match<R: Rng + ?Sized>(&mut self, rng: &mut R) -> LootTier {
        match self.pending {
            Some(tier) => tier,
            None => {
                let tier = LootTier::roll(rng);
                debug!("Rolled loot tier {:?}", tier);
                self.pending = Some(tier);
                tier
            }
        }
    }

    /// Announcement of the pending reward, if one was rolled.
    pub fn pre_game_message(&self) -> Option<String> {
        self.pending
            .map(|tier| format!("The winners will receive {} each!", tier.description()))
    }

    /// Hands every connected member of `team` their reward and clears the
    /// pending tier. Returns the number of items given.
    pub fn give_loot<R: Rng + ?Sized>(
        &mut self,
        host: &mut dyn ScriptHost,
        team: &[EntityId],
        rng: &mut R,
    ) -> usize {
        let tier = self.pending.take();
        let Some(tier) = tier.filter(|_| self.loot_enabled) else {
            return 0;
        };

        let mut given = 0;
        for &id in team {
            let Some(player) = host.player(id) else {
                continue;
            };
            let item = loot_item(tier, player.class, player.level, rng);
            host.give_item(id, item);
            given += 1;
        }
        info!("Gave {} {:?} rewards", given, tier);
        given
    }
}
