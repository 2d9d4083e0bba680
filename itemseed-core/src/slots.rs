//! Equipment slot and subtype decoding.
//!
//! Decoding is two chained lookups: the inventory-type code selects a slot and
//! a [`TypeRule`]; bucket rules are then resolved against the subclass code.

use crate::models::{InventorySlot, ItemType};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Second-stage lookup keyed by subclass code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubclassBucket {
    /// Melee weapon classes (virtual inventory type 98)
    Weapon,
    /// Armor materials (virtual inventory type 99)
    Armor,
    RangedWeapon,
    Relic,
}

impl SubclassBucket {
    /// Resolve a subclass code to an item type. Unlisted codes yield `Other`.
    pub fn item_type(self, subclass: u32) -> ItemType {
        match self {
            SubclassBucket::Weapon => match subclass {
                0 | 1 => ItemType::Axe,
                4 | 5 => ItemType::Mace,
                6 => ItemType::Polearm,
                7 | 8 => ItemType::Sword,
                10 => ItemType::Stave,
                13 => ItemType::Fist,
                15 => ItemType::Dagger,
                _ => ItemType::Other,
            },
            SubclassBucket::Armor => match subclass {
                1 => ItemType::Cloth,
                2 => ItemType::Leather,
                3 => ItemType::Mail,
                4 => ItemType::Plate,
                _ => ItemType::Other,
            },
            SubclassBucket::RangedWeapon => match subclass {
                2 => ItemType::Bow,
                3 => ItemType::Gun,
                16 => ItemType::Thrown,
                18 => ItemType::Crossbow,
                19 => ItemType::Wand,
                _ => ItemType::Other,
            },
            SubclassBucket::Relic => match subclass {
                7 => ItemType::Libram,
                8 => ItemType::Idol,
                9 => ItemType::Totem,
                _ => ItemType::Other,
            },
        }
    }

    /// Virtual inventory-type code of the bucket, where one exists.
    pub fn virtual_code(self) -> Option<u8> {
        match self {
            SubclassBucket::Weapon => Some(98),
            SubclassBucket::Armor => Some(99),
            _ => None,
        }
    }
}

/// How the item type is derived once the slot is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRule {
    None,
    Fixed(ItemType),
    Bucket(SubclassBucket),
}

/// Primary table entry for one inventory-type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRule {
    pub slot: InventorySlot,
    pub type_rule: TypeRule,
}

const fn rule(slot: InventorySlot, type_rule: TypeRule) -> SlotRule {
    SlotRule { slot, type_rule }
}

const ARMOR: TypeRule = TypeRule::Bucket(SubclassBucket::Armor);
const WEAPON: TypeRule = TypeRule::Bucket(SubclassBucket::Weapon);

/// Inventory-type codes with a known slot. Codes 18 (bag), 24 (ammo) and
/// 27 (quiver) are intentionally absent.
const INVENTORY_TYPES: &[(u8, SlotRule)] = &[
    (0, rule(InventorySlot::Unknown, TypeRule::None)),
    (1, rule(InventorySlot::Head, ARMOR)),
    (2, rule(InventorySlot::Neck, TypeRule::None)),
    (3, rule(InventorySlot::Shoulder, ARMOR)),
    (4, rule(InventorySlot::Shirt, TypeRule::None)),
    (5, rule(InventorySlot::Chest, ARMOR)),
    (6, rule(InventorySlot::Waist, ARMOR)),
    (7, rule(InventorySlot::Legs, ARMOR)),
    (8, rule(InventorySlot::Feet, ARMOR)),
    (9, rule(InventorySlot::Wrist, ARMOR)),
    (10, rule(InventorySlot::Hands, ARMOR)),
    (11, rule(InventorySlot::Finger, TypeRule::None)),
    (12, rule(InventorySlot::Trinket, TypeRule::None)),
    (13, rule(InventorySlot::OneHand, WEAPON)),
    (14, rule(InventorySlot::OffHand, TypeRule::Fixed(ItemType::Shield))),
    (15, rule(InventorySlot::Ranged, TypeRule::Fixed(ItemType::Bow))),
    (16, rule(InventorySlot::Back, TypeRule::None)),
    (17, rule(InventorySlot::TwoHand, WEAPON)),
    (19, rule(InventorySlot::Tabard, TypeRule::None)),
    // Robe
    (20, rule(InventorySlot::Chest, ARMOR)),
    (21, rule(InventorySlot::MainHand, WEAPON)),
    (22, rule(InventorySlot::OffHand, WEAPON)),
    // Held in off-hand
    (23, rule(InventorySlot::OffHand, TypeRule::None)),
    (25, rule(InventorySlot::Ranged, TypeRule::Fixed(ItemType::Thrown))),
    (26, rule(InventorySlot::Ranged, TypeRule::Bucket(SubclassBucket::RangedWeapon))),
    (28, rule(InventorySlot::Ranged, TypeRule::Bucket(SubclassBucket::Relic))),
];

lazy_static! {
    static ref SLOT_RULES: HashMap<u8, SlotRule> = INVENTORY_TYPES.iter().copied().collect();
}

/// Look up the primary table entry for an inventory-type code.
pub fn slot_rule(inventory_type: u8) -> Option<SlotRule> {
    SLOT_RULES.get(&inventory_type).copied()
}

/// Decode slot and subtype. Returns `None` for codes absent from the table.
pub fn decode_slot(inventory_type: u8, subclass: u32) -> Option<(InventorySlot, ItemType)> {
    let rule = slot_rule(inventory_type)?;
    let item_type = match rule.type_rule {
        TypeRule::None => ItemType::Other,
        TypeRule::Fixed(item_type) => item_type,
        TypeRule::Bucket(bucket) => {
            let item_type = bucket.item_type(subclass);
            if item_type == ItemType::Other {
                match bucket.virtual_code() {
                    Some(code) => tracing::debug!(
                        "Subclass {} is not listed for virtual inventory type {}",
                        subclass,
                        code
                    ),
                    None => tracing::debug!("Subclass {} is not listed for {:?}", subclass, bucket),
                }
            }
            item_type
        }
    };
    Some((rule.slot, item_type))
}
