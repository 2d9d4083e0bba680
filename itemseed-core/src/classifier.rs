//! Item classification: one item template in, one normalized item out.

use crate::database::TemplateSnapshot;
use crate::models::{ClassMask, EPIC_QUALITY, ItemTemplate, NormalizedItem};
use crate::slots::decode_slot;
use crate::spells::{MISAUTHORED_HEALING_ITEM, SpellDecoder};
use crate::stats::apply_stat;
use std::collections::HashSet;

/// `Flags` bit marking an item as unique-equipped.
pub const UNIQUE_EQUIPPED_FLAG: u32 = 0x0008_0000;

/// `AllowableClass` values used on items with no class restriction. Both equal
/// every class flag plus unused bits.
const ALL_CLASSES_SENTINELS: [i32; 2] = [1535, 32767];

/// Why a template produced no item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    NotFound,
    WrongQuality,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::WrongQuality => write!(f, "wrong quality"),
        }
    }
}

/// Result of classifying one item ID.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Classified(NormalizedItem),
    Skipped(SkipReason),
}

/// Turns item templates into normalized items using a template snapshot.
pub struct Classifier<'a> {
    templates: &'a TemplateSnapshot,
    healing_overrides: HashSet<u32>,
}

impl<'a> Classifier<'a> {
    pub fn new(templates: &'a TemplateSnapshot) -> Self {
        Self::with_healing_overrides(templates, [])
    }

    /// Create a classifier with extra items whose spell-damage aura is
    /// credited to healing power. [`MISAUTHORED_HEALING_ITEM`] is always included.
    pub fn with_healing_overrides(
        templates: &'a TemplateSnapshot,
        overrides: impl IntoIterator<Item = u32>,
    ) -> Self {
        let mut healing_overrides: HashSet<u32> = overrides.into_iter().collect();
        healing_overrides.insert(MISAUTHORED_HEALING_ITEM);
        Self {
            templates,
            healing_overrides,
        }
    }

    /// Classify one item, optionally linked to the token it is redeemed from.
    pub fn classify(&self, id: u32, reward_from: Option<u32>) -> Classification {
        let Some(template) = self.templates.items.get(&id) else {
            tracing::warn!("Item with ID {} was not found! Item will not be parsed.", id);
            return Classification::Skipped(SkipReason::NotFound);
        };

        if template.quality != EPIC_QUALITY {
            tracing::warn!(
                "'{}' ({}) is not epic quality. Item will not be parsed.",
                template.name,
                id
            );
            return Classification::Skipped(SkipReason::WrongQuality);
        }

        let mut item = NormalizedItem::new(id, template.name.clone());
        item.reward_from_id = reward_from;
        item.item_level = template.item_level;

        match decode_slot(template.inventory_type, template.subclass) {
            Some((slot, item_type)) => {
                item.slot = slot;
                item.item_type = item_type;
            }
            None => {
                tracing::warn!(
                    "'{}' ({}) has an unexpected InventoryType value of {}!",
                    template.name,
                    template.entry,
                    template.inventory_type
                );
            }
        }

        apply_weapon_fields(&mut item, template);

        for stat in &template.stats {
            apply_stat(&mut item, stat.stat_type, stat.value);
        }

        let spells = SpellDecoder::new(&self.templates.spells, &self.healing_overrides);
        for spell in &template.spells {
            spells.apply_spell_ref(&mut item, spell.spell_id, spell.trigger);
        }

        item.sockets = template.socket_colors.iter().filter(|color| **color != 0).count() as u32;
        item.usable_classes = usable_classes(template);
        item.is_unique = template.max_count == 1 || template.flags & UNIQUE_EQUIPPED_FLAG != 0;
        item.quest_id = (template.start_quest != 0).then_some(template.start_quest);

        tracing::info!("Finished parsing Item #{}. '{}' will be added.", id, item.name);
        Classification::Classified(item)
    }
}

/// Armor and weapon damage copied through from the template.
fn apply_weapon_fields(item: &mut NormalizedItem, template: &ItemTemplate) {
    item.armor = template.armor;
    item.top_end_damage = template.dmg_max.max(0.0) as u32;

    if template.delay > 0 && template.dmg_max > 0.0 {
        let speed = f64::from(template.delay) / 1000.0;
        let average = (template.dmg_min + template.dmg_max) / 2.0;
        item.speed = speed;
        item.dps = (average / speed * 10.0).round() / 10.0;
    }
}

/// Class restriction of the template, or `None` when every class may use it.
fn usable_classes(template: &ItemTemplate) -> Option<ClassMask> {
    let raw = template.allowable_class;
    if raw <= 0 || ALL_CLASSES_SENTINELS.contains(&raw) {
        return None;
    }

    let requested = ClassMask(raw as u32);
    if !ClassMask::ALL_KNOWN.contains(requested) {
        tracing::debug!(
            "'{}' ({}) AllowableClass {} has unknown class bits, ignoring them",
            template.name,
            template.entry,
            raw
        );
    }
    let mask = requested & ClassMask::ALL_KNOWN;
    if mask.is_empty() {
        tracing::warn!(
            "'{}' ({}) is restricted to unknown classes ({}); treating as unrestricted.",
            template.name,
            template.entry,
            raw
        );
        return None;
    }
    Some(mask)
}
