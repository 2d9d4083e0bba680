//! Item template stat decoding.

use crate::models::{Attribute, NormalizedItem};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Stat codes that carry no attribute in the output (mana, health, health regen).
const IGNORED_STATS: &[u8] = &[0, 1, 46];

/// Stat-type code to attribute. Melee and ranged variants of hit, crit and
/// haste share the combined physical attribute; spell variants stay separate.
const STAT_TABLE: &[(u8, Attribute)] = &[
    (3, Attribute::Agility),
    (4, Attribute::Strength),
    (5, Attribute::Intellect),
    (6, Attribute::Spirit),
    (7, Attribute::Stamina),
    (12, Attribute::Defense),
    (13, Attribute::Dodge),
    (14, Attribute::Parry),
    (15, Attribute::BlockRating),
    (16, Attribute::Hit),
    (17, Attribute::Hit),
    (18, Attribute::SpellHit),
    (19, Attribute::Crit),
    (20, Attribute::Crit),
    (21, Attribute::SpellCrit),
    (28, Attribute::Haste),
    (29, Attribute::Haste),
    (30, Attribute::SpellHaste),
    (31, Attribute::Hit),
    (32, Attribute::Crit),
    (35, Attribute::Resilience),
    (36, Attribute::Haste),
    (37, Attribute::Expertise),
    (38, Attribute::AttackPower),
    (39, Attribute::RangedAttackPower),
    (41, Attribute::HealingPower),
    (42, Attribute::SpellPower),
    (43, Attribute::ManaPer5),
    (44, Attribute::ArmorPenetration),
    (45, Attribute::SpellPower),
    (47, Attribute::SpellPenetration),
    (48, Attribute::BlockValue),
];

lazy_static! {
    static ref STATS: HashMap<u8, Attribute> = STAT_TABLE.iter().copied().collect();
}

/// Outcome of looking up a stat-type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatMapping {
    Ignored,
    Attribute(Attribute),
    Unknown,
}

pub fn stat_mapping(stat_type: u8) -> StatMapping {
    if IGNORED_STATS.contains(&stat_type) {
        return StatMapping::Ignored;
    }
    match STATS.get(&stat_type) {
        Some(attribute) => StatMapping::Attribute(*attribute),
        None => StatMapping::Unknown,
    }
}

/// Apply one stat slot to the item, overwriting the mapped attribute.
pub fn apply_stat(item: &mut NormalizedItem, stat_type: u8, value: i32) {
    match stat_mapping(stat_type) {
        StatMapping::Ignored => {}
        StatMapping::Attribute(attribute) => *item.attribute_mut(attribute) = value,
        StatMapping::Unknown => {
            tracing::warn!(
                "'{}' ({}) has an unknown primary stat of {}: {}.",
                item.name,
                item.id,
                stat_type,
                value
            );
        }
    }
}
