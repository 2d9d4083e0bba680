//! Spell reference and spell effect decoding.
//!
//! Passive spells are broken down into their effect slots and stat-granting
//! auras are credited to the item. Anything that cannot be expressed as a flat
//! stat bonus marks the item for manual review through `has_on_use`,
//! `has_proc` or `has_special`.

use crate::models::{NormalizedItem, SpellEffect, SpellTemplate};
use std::collections::{HashMap, HashSet};

/// Item whose spell-damage aura (13, misc 126) was authored for a healing
/// bonus in the game data. The aura is credited to healing power instead.
pub const MISAUTHORED_HEALING_ITEM: u32 = 28_518;

/// Misc value of spell-school auras covering every magic school.
const ALL_MAGIC_SCHOOLS: i32 = 126;

const AURA_NONE: u32 = 0;
const AURA_MOD_DAMAGE_DONE: u32 = 13;
const AURA_MOD_POWER_REGEN: u32 = 85;
const AURA_MOD_ATTACK_POWER: u32 = 99;
const AURA_MOD_TARGET_RESISTANCE: u32 = 123;
const AURA_MOD_RANGED_ATTACK_POWER: u32 = 124;
const AURA_MOD_HEALING_DONE: u32 = 135;
const AURA_MOD_SHIELD_BLOCKVALUE: u32 = 158;

/// Auras seen on raid loot that have no attribute yet:
/// 4 (improved seal of light), 107 (improved healing touch),
/// 108 and 112 (improved mana gem), 234 (silence resistance).
pub const UNSUPPORTED_AURAS: &[u32] = &[4, 107, 108, 112, 234];

/// When an item spell fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellTrigger {
    OnUse,
    Passive,
    OnHit,
    Other(i32),
}

impl From<i32> for SpellTrigger {
    fn from(code: i32) -> Self {
        match code {
            0 => SpellTrigger::OnUse,
            1 => SpellTrigger::Passive,
            2 => SpellTrigger::OnHit,
            other => SpellTrigger::Other(other),
        }
    }
}

/// Resolves item spell slots against the spell table.
pub struct SpellDecoder<'a> {
    spells: &'a HashMap<u32, SpellTemplate>,
    healing_overrides: &'a HashSet<u32>,
}

impl<'a> SpellDecoder<'a> {
    pub fn new(spells: &'a HashMap<u32, SpellTemplate>, healing_overrides: &'a HashSet<u32>) -> Self {
        Self {
            spells,
            healing_overrides,
        }
    }

    /// Apply one spell slot of an item template.
    pub fn apply_spell_ref(&self, item: &mut NormalizedItem, spell_id: u32, trigger: i32) {
        if spell_id == 0 {
            return;
        }

        let Some(spell) = self.spells.get(&spell_id) else {
            tracing::error!("'{}' ({}) has an unknown spell #{}!", item.name, item.id, spell_id);
            return;
        };

        match SpellTrigger::from(trigger) {
            SpellTrigger::OnUse => {
                tracing::warn!(
                    "'{}' ({}) has an on-use effect that will prevent auto-determination!",
                    item.name,
                    item.id
                );
                item.has_on_use = true;
            }
            SpellTrigger::Passive => {
                for effect in &spell.effects {
                    self.apply_effect(item, effect);
                }
            }
            SpellTrigger::OnHit => {
                tracing::warn!(
                    "'{}' ({}) has a proc effect that will prevent auto-determination!",
                    item.name,
                    item.id
                );
                item.has_proc = true;
            }
            SpellTrigger::Other(code) => {
                tracing::debug!(
                    "'{}' ({}) spell #{} has trigger {}, ignoring",
                    item.name,
                    item.id,
                    spell_id,
                    code
                );
            }
        }
    }

    /// Apply one effect slot of a passive spell.
    pub fn apply_effect(&self, item: &mut NormalizedItem, effect: &SpellEffect) {
        if effect.trigger_spell > 0 {
            tracing::warn!(
                "'{}' ({}) has a spell proc effect that will prevent auto-determination!",
                item.name,
                item.id
            );
            item.has_proc = true;
            return;
        }

        match effect.aura {
            AURA_NONE => {}
            AURA_MOD_DAMAGE_DONE if effect.misc_value == ALL_MAGIC_SCHOOLS => {
                if self.healing_overrides.contains(&item.id) {
                    tracing::debug!(
                        "'{}' ({}) spell damage aura credited to healing power",
                        item.name,
                        item.id
                    );
                    item.healing_power = stat_bonus(effect.base_points);
                } else {
                    item.spell_power = stat_bonus(effect.base_points);
                }
            }
            AURA_MOD_POWER_REGEN => item.mana_per5 = stat_bonus(effect.base_points),
            AURA_MOD_ATTACK_POWER => item.attack_power = stat_bonus(effect.base_points),
            AURA_MOD_TARGET_RESISTANCE if effect.misc_value == 1 => {
                item.armor_penetration = penetration(effect.base_points);
            }
            AURA_MOD_TARGET_RESISTANCE if matches!(effect.misc_value, 4 | 16 | 124) => {
                item.spell_penetration = penetration(effect.base_points);
            }
            AURA_MOD_RANGED_ATTACK_POWER => item.ranged_attack_power = stat_bonus(effect.base_points),
            AURA_MOD_HEALING_DONE if effect.misc_value == ALL_MAGIC_SCHOOLS => {
                item.healing_power = stat_bonus(effect.base_points);
            }
            AURA_MOD_SHIELD_BLOCKVALUE => {
                item.block_value = item.block_value.saturating_add(stat_bonus(effect.base_points));
            }
            aura if UNSUPPORTED_AURAS.contains(&aura) => {
                tracing::warn!(
                    "'{}' ({}) has unsupported aura {} that will prevent auto-determination!",
                    item.name,
                    item.id,
                    aura
                );
                item.has_special = true;
            }
            aura => {
                tracing::warn!(
                    "'{}' ({}) has a special effect (aura {}, misc {}) that will prevent auto-determination!",
                    item.name,
                    item.id,
                    aura,
                    effect.misc_value
                );
                item.has_special = true;
            }
        }
    }
}

/// Stat auras store their amount one below the displayed value.
fn stat_bonus(base_points: i32) -> i32 {
    base_points.saturating_add(1)
}

/// Resistance reduction is stored negated and offset by two.
fn penetration(base_points: i32) -> i32 {
    i32::try_from(base_points.unsigned_abs().saturating_sub(2)).unwrap_or(i32::MAX)
}
