//! Data models for game templates, the loot manifest and normalized items.

use serde::{Deserialize, Serialize};

/// Quality tier of epic items; the only tier that is classified.
pub const EPIC_QUALITY: u8 = 4;

/// One (stat type, value) slot of an item template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemStat {
    pub stat_type: u8,
    pub value: i32,
}

/// One spell slot of an item template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemSpell {
    pub spell_id: u32,
    pub trigger: i32,
}

/// Row of the `item_template` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemTemplate {
    pub entry: u32,
    pub name: String,
    pub quality: u8,
    pub inventory_type: u8,
    pub subclass: u32,
    pub item_level: u32,
    pub stats: [ItemStat; 10],
    pub spells: [ItemSpell; 5],
    pub allowable_class: i32,
    pub max_count: i32,
    pub flags: u32,
    pub start_quest: u32,
    pub socket_colors: [u32; 3],
    pub armor: u32,
    pub dmg_min: f64,
    pub dmg_max: f64,
    /// Weapon swing delay in milliseconds
    pub delay: u32,
}

/// One effect slot of a spell template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellEffect {
    pub base_points: i32,
    pub aura: u32,
    pub trigger_spell: u32,
    pub misc_value: i32,
}

/// Row of the `spell_template` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellTemplate {
    pub id: u32,
    pub name: String,
    pub effects: [SpellEffect; 3],
}

/// Equipment slot of a normalized item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventorySlot {
    #[default]
    Unknown,
    Head,
    Neck,
    Shoulder,
    Shirt,
    Chest,
    Waist,
    Legs,
    Feet,
    Wrist,
    Hands,
    Finger,
    Trinket,
    Back,
    MainHand,
    OffHand,
    Tabard,
    OneHand,
    TwoHand,
    Ranged,
}

/// Armor material, weapon class or ranged/relic subtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    #[default]
    Other,
    Cloth,
    Leather,
    Mail,
    Plate,
    Shield,
    Libram,
    Idol,
    Totem,
    Bow,
    Crossbow,
    Dagger,
    Gun,
    Fist,
    Axe,
    Mace,
    Sword,
    Polearm,
    Stave,
    Thrown,
    Wand,
}

/// Bitmask of playable classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassMask(pub u32);

impl ClassMask {
    pub const WARRIOR: ClassMask = ClassMask(1);
    pub const PALADIN: ClassMask = ClassMask(1 << 1);
    pub const HUNTER: ClassMask = ClassMask(1 << 2);
    pub const ROGUE: ClassMask = ClassMask(1 << 3);
    pub const PRIEST: ClassMask = ClassMask(1 << 4);
    pub const SHAMAN: ClassMask = ClassMask(1 << 6);
    pub const MAGE: ClassMask = ClassMask(1 << 7);
    pub const WARLOCK: ClassMask = ClassMask(1 << 8);
    pub const DRUID: ClassMask = ClassMask(1 << 10);

    /// Union of the nine known class flags.
    pub const ALL_KNOWN: ClassMask = ClassMask(
        Self::WARRIOR.0
            | Self::PALADIN.0
            | Self::HUNTER.0
            | Self::ROGUE.0
            | Self::PRIEST.0
            | Self::SHAMAN.0
            | Self::MAGE.0
            | Self::WARLOCK.0
            | Self::DRUID.0,
    );

    pub fn contains(self, other: ClassMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitAnd for ClassMask {
    type Output = ClassMask;

    fn bitand(self, rhs: ClassMask) -> ClassMask {
        ClassMask(self.0 & rhs.0)
    }
}

/// Named numeric attribute of a normalized item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Strength,
    Agility,
    Stamina,
    Intellect,
    Spirit,
    Hit,
    SpellHit,
    Crit,
    SpellCrit,
    Haste,
    SpellHaste,
    Defense,
    Dodge,
    Parry,
    BlockRating,
    BlockValue,
    SpellPower,
    HealingPower,
    ManaPer5,
    AttackPower,
    RangedAttackPower,
    Resilience,
    Expertise,
    ArmorPenetration,
    SpellPenetration,
}

/// Normalized, semantically typed equippable item written to the seed file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_from_id: Option<u32>,
    pub slot: InventorySlot,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub item_level: u32,
    pub armor: u32,
    pub top_end_damage: u32,
    pub speed: f64,
    pub dps: f64,
    pub strength: i32,
    pub agility: i32,
    pub stamina: i32,
    pub intellect: i32,
    pub spirit: i32,
    pub hit: i32,
    pub spell_hit: i32,
    pub crit: i32,
    pub spell_crit: i32,
    pub haste: i32,
    pub spell_haste: i32,
    pub defense: i32,
    pub dodge: i32,
    pub parry: i32,
    pub block_rating: i32,
    pub block_value: i32,
    pub spell_power: i32,
    pub healing_power: i32,
    pub mana_per5: i32,
    pub attack_power: i32,
    pub ranged_attack_power: i32,
    pub resilience: i32,
    pub expertise: i32,
    pub armor_penetration: i32,
    pub spell_penetration: i32,
    pub sockets: u32,
    pub has_on_use: bool,
    pub has_proc: bool,
    pub has_special: bool,
    pub is_unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usable_classes: Option<ClassMask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quest_id: Option<u32>,
}

impl NormalizedItem {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Mutable access to the field backing a named attribute.
    pub fn attribute_mut(&mut self, attribute: Attribute) -> &mut i32 {
        match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Agility => &mut self.agility,
            Attribute::Stamina => &mut self.stamina,
            Attribute::Intellect => &mut self.intellect,
            Attribute::Spirit => &mut self.spirit,
            Attribute::Hit => &mut self.hit,
            Attribute::SpellHit => &mut self.spell_hit,
            Attribute::Crit => &mut self.crit,
            Attribute::SpellCrit => &mut self.spell_crit,
            Attribute::Haste => &mut self.haste,
            Attribute::SpellHaste => &mut self.spell_haste,
            Attribute::Defense => &mut self.defense,
            Attribute::Dodge => &mut self.dodge,
            Attribute::Parry => &mut self.parry,
            Attribute::BlockRating => &mut self.block_rating,
            Attribute::BlockValue => &mut self.block_value,
            Attribute::SpellPower => &mut self.spell_power,
            Attribute::HealingPower => &mut self.healing_power,
            Attribute::ManaPer5 => &mut self.mana_per5,
            Attribute::AttackPower => &mut self.attack_power,
            Attribute::RangedAttackPower => &mut self.ranged_attack_power,
            Attribute::Resilience => &mut self.resilience,
            Attribute::Expertise => &mut self.expertise,
            Attribute::ArmorPenetration => &mut self.armor_penetration,
            Attribute::SpellPenetration => &mut self.spell_penetration,
        }
    }
}

/// Encounter entry of the loot manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeedEncounter {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub index: i8,
    /// Single loot list, for manifests without difficulty tiers
    #[serde(default)]
    pub items: Vec<u32>,
    #[serde(default)]
    pub items10: Vec<u32>,
    #[serde(default, rename = "Items10H")]
    pub items10_heroic: Vec<u32>,
    #[serde(default)]
    pub items25: Vec<u32>,
    #[serde(default, rename = "Items25H")]
    pub items25_heroic: Vec<u32>,
}

impl SeedEncounter {
    /// Every loot item ID listed for this encounter, across all tiers.
    pub fn all_items(&self) -> impl Iterator<Item = u32> + '_ {
        self.items
            .iter()
            .chain(&self.items10)
            .chain(&self.items10_heroic)
            .chain(&self.items25)
            .chain(&self.items25_heroic)
            .copied()
    }
}

/// Instance entry of the loot manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeedInstance {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phase: u8,
    #[serde(default)]
    pub encounters: Vec<SeedEncounter>,
}
