use crate::error::{ItemSeedError, Result};
use crate::models::{ItemSpell, ItemStat, ItemTemplate, SpellEffect, SpellTemplate};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OpenFlags, Row};
use std::collections::HashMap;

const ITEM_TEMPLATE_COLUMNS: &str = "entry, name, Quality, InventoryType, subclass, ItemLevel,
    stat_type1, stat_value1, stat_type2, stat_value2, stat_type3, stat_value3,
    stat_type4, stat_value4, stat_type5, stat_value5, stat_type6, stat_value6,
    stat_type7, stat_value7, stat_type8, stat_value8, stat_type9, stat_value9,
    stat_type10, stat_value10,
    spellid_1, spelltrigger_1, spellid_2, spelltrigger_2, spellid_3, spelltrigger_3,
    spellid_4, spelltrigger_4, spellid_5, spelltrigger_5,
    AllowableClass, maxcount, Flags, startquest,
    socketColor_1, socketColor_2, socketColor_3,
    armor, dmg_min1, dmg_max1, delay";

const SPELL_TEMPLATE_COLUMNS: &str = "Id, SpellName,
    EffectBasePoints1, EffectApplyAuraName1, EffectTriggerSpell1, EffectMiscValue1,
    EffectBasePoints2, EffectApplyAuraName2, EffectTriggerSpell2, EffectMiscValue2,
    EffectBasePoints3, EffectApplyAuraName3, EffectTriggerSpell3, EffectMiscValue3";

/// Read-only snapshot of both template tables, keyed by ID.
#[derive(Debug, Clone, Default)]
pub struct TemplateSnapshot {
    pub items: HashMap<u32, ItemTemplate>,
    pub spells: HashMap<u32, SpellTemplate>,
}

impl TemplateSnapshot {
    pub fn new(items: Vec<ItemTemplate>, spells: Vec<SpellTemplate>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.entry, item)).collect(),
            spells: spells.into_iter().map(|spell| (spell.id, spell)).collect(),
        }
    }
}

/// SQLite-backed store for the `item_template` and `spell_template` tables.
pub struct TemplateStore {
    pool: Pool<SqliteConnectionManager>,
}

impl TemplateStore {
    /// Open an existing template database for reading.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Err(ItemSeedError::NotFound(format!(
                "Template database not found: {}",
                path.display()
            )));
        }
        let manager = SqliteConnectionManager::file(path).with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY);
        Self::from_manager(manager)
    }

    /// Open a template database, creating the file and tables if needed.
    pub fn create(path: &std::path::Path) -> Result<Self> {
        let store = Self::from_manager(SqliteConnectionManager::file(path))?;
        store.create_schema()?;
        Ok(store)
    }

    fn from_manager(manager: SqliteConnectionManager) -> Result<Self> {
        let pool = Pool::builder()
            .max_size(2)
            .build(manager)
            .map_err(ItemSeedError::Pool)?;
        Ok(Self { pool })
    }

    pub fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(ItemSeedError::Pool)
    }

    /// Create empty template tables for a database dump to be loaded into.
    pub fn create_schema(&self) -> Result<()> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        let stat_columns: String = (1..=10)
            .map(|i| format!("stat_type{i} INTEGER NOT NULL DEFAULT 0, stat_value{i} INTEGER NOT NULL DEFAULT 0,"))
            .collect::<Vec<_>>()
            .join("\n");
        let spell_columns: String = (1..=5)
            .map(|i| format!("spellid_{i} INTEGER NOT NULL DEFAULT 0, spelltrigger_{i} INTEGER NOT NULL DEFAULT 0,"))
            .collect::<Vec<_>>()
            .join("\n");
        let effect_columns: String = (1..=3)
            .map(|i| {
                format!(
                    "EffectBasePoints{i} INTEGER NOT NULL DEFAULT 0,
                    EffectApplyAuraName{i} INTEGER NOT NULL DEFAULT 0,
                    EffectTriggerSpell{i} INTEGER NOT NULL DEFAULT 0,
                    EffectMiscValue{i} INTEGER NOT NULL DEFAULT 0"
                )
            })
            .collect::<Vec<_>>()
            .join(",\n");

        tx.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS item_template (
                entry INTEGER PRIMARY KEY,
                name TEXT NOT NULL DEFAULT '',
                Quality INTEGER NOT NULL DEFAULT 0,
                InventoryType INTEGER NOT NULL DEFAULT 0,
                subclass INTEGER NOT NULL DEFAULT 0,
                ItemLevel INTEGER NOT NULL DEFAULT 0,
                {stat_columns}
                {spell_columns}
                AllowableClass INTEGER NOT NULL DEFAULT -1,
                maxcount INTEGER NOT NULL DEFAULT 0,
                Flags INTEGER NOT NULL DEFAULT 0,
                startquest INTEGER NOT NULL DEFAULT 0,
                socketColor_1 INTEGER NOT NULL DEFAULT 0,
                socketColor_2 INTEGER NOT NULL DEFAULT 0,
                socketColor_3 INTEGER NOT NULL DEFAULT 0,
                armor INTEGER NOT NULL DEFAULT 0,
                dmg_min1 REAL NOT NULL DEFAULT 0,
                dmg_max1 REAL NOT NULL DEFAULT 0,
                delay INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS spell_template (
                Id INTEGER PRIMARY KEY,
                SpellName TEXT NOT NULL DEFAULT '',
                {effect_columns}
            );
            "#
        ))?;

        tx.commit()?;
        Ok(())
    }

    /// Load every row of `item_template`.
    pub fn load_item_templates(&self) -> Result<Vec<ItemTemplate>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM item_template", ITEM_TEMPLATE_COLUMNS))?;
        let rows = stmt.query_map([], item_template_from_row)?;
        let items = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!("Loaded {} item templates", items.len());
        Ok(items)
    }

    /// Load every row of `spell_template`.
    pub fn load_spell_templates(&self) -> Result<Vec<SpellTemplate>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM spell_template", SPELL_TEMPLATE_COLUMNS))?;
        let rows = stmt.query_map([], spell_template_from_row)?;
        let spells = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!("Loaded {} spell templates", spells.len());
        Ok(spells)
    }

    /// Load both tables into an in-memory snapshot.
    pub fn load_snapshot(&self) -> Result<TemplateSnapshot> {
        let items = self.load_item_templates()?;
        let spells = self.load_spell_templates()?;
        tracing::info!("Loaded {} item templates and {} spell templates", items.len(), spells.len());
        Ok(TemplateSnapshot::new(items, spells))
    }

    /// Insert or replace an item template row.
    pub fn insert_item_template(&self, item: &ItemTemplate) -> Result<()> {
        let conn = self.connection()?;
        let mut values: Vec<rusqlite::types::Value> = vec![
            (item.entry as i64).into(),
            item.name.clone().into(),
            (item.quality as i64).into(),
            (item.inventory_type as i64).into(),
            (item.subclass as i64).into(),
            (item.item_level as i64).into(),
        ];
        for stat in &item.stats {
            values.push((stat.stat_type as i64).into());
            values.push((stat.value as i64).into());
        }
        for spell in &item.spells {
            values.push((spell.spell_id as i64).into());
            values.push((spell.trigger as i64).into());
        }
        values.push((item.allowable_class as i64).into());
        values.push((item.max_count as i64).into());
        values.push((item.flags as i64).into());
        values.push((item.start_quest as i64).into());
        for color in &item.socket_colors {
            values.push((*color as i64).into());
        }
        values.push((item.armor as i64).into());
        values.push(item.dmg_min.into());
        values.push(item.dmg_max.into());
        values.push((item.delay as i64).into());

        let placeholders = vec!["?"; values.len()].join(", ");
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO item_template ({}) VALUES ({})",
                ITEM_TEMPLATE_COLUMNS, placeholders
            ),
            rusqlite::params_from_iter(values),
        )?;
        Ok(())
    }

    /// Insert or replace a spell template row.
    pub fn insert_spell_template(&self, spell: &SpellTemplate) -> Result<()> {
        let conn = self.connection()?;
        let mut values: Vec<rusqlite::types::Value> = vec![(spell.id as i64).into(), spell.name.clone().into()];
        for effect in &spell.effects {
            values.push((effect.base_points as i64).into());
            values.push((effect.aura as i64).into());
            values.push((effect.trigger_spell as i64).into());
            values.push((effect.misc_value as i64).into());
        }

        let placeholders = vec!["?"; values.len()].join(", ");
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO spell_template ({}) VALUES ({})",
                SPELL_TEMPLATE_COLUMNS, placeholders
            ),
            rusqlite::params_from_iter(values),
        )?;
        Ok(())
    }
}

fn int(row: &Row<'_>, column: &str) -> rusqlite::Result<i64> {
    Ok(row.get::<_, Option<i64>>(column)?.unwrap_or(0))
}

fn real(row: &Row<'_>, column: &str) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(column)?.unwrap_or(0.0))
}

/// Small enum-like columns. Out-of-range values are clamped so they fall
/// outside every known code.
fn byte(row: &Row<'_>, column: &str) -> rusqlite::Result<u8> {
    let value = int(row, column)?;
    Ok(u8::try_from(value).unwrap_or_else(|_| {
        tracing::warn!("Column {} value {} is out of range, clamping", column, value);
        if value < 0 { 0 } else { u8::MAX }
    }))
}

fn item_template_from_row(row: &Row<'_>) -> rusqlite::Result<ItemTemplate> {
    let mut stats = [ItemStat::default(); 10];
    for (i, stat) in stats.iter_mut().enumerate() {
        stat.stat_type = byte(row, &format!("stat_type{}", i + 1))?;
        stat.value = int(row, &format!("stat_value{}", i + 1))? as i32;
    }

    let mut spells = [ItemSpell::default(); 5];
    for (i, spell) in spells.iter_mut().enumerate() {
        spell.spell_id = int(row, &format!("spellid_{}", i + 1))? as u32;
        spell.trigger = int(row, &format!("spelltrigger_{}", i + 1))? as i32;
    }

    let mut socket_colors = [0u32; 3];
    for (i, color) in socket_colors.iter_mut().enumerate() {
        *color = int(row, &format!("socketColor_{}", i + 1))? as u32;
    }

    Ok(ItemTemplate {
        entry: int(row, "entry")? as u32,
        name: row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        quality: byte(row, "Quality")?,
        inventory_type: byte(row, "InventoryType")?,
        subclass: int(row, "subclass")? as u32,
        item_level: int(row, "ItemLevel")? as u32,
        stats,
        spells,
        allowable_class: int(row, "AllowableClass")? as i32,
        max_count: int(row, "maxcount")? as i32,
        flags: int(row, "Flags")? as u32,
        start_quest: int(row, "startquest")? as u32,
        socket_colors,
        armor: int(row, "armor")? as u32,
        dmg_min: real(row, "dmg_min1")?,
        dmg_max: real(row, "dmg_max1")?,
        delay: int(row, "delay")? as u32,
    })
}

fn spell_template_from_row(row: &Row<'_>) -> rusqlite::Result<SpellTemplate> {
    let mut effects = [SpellEffect::default(); 3];
    for (i, effect) in effects.iter_mut().enumerate() {
        let n = i + 1;
        effect.base_points = int(row, &format!("EffectBasePoints{n}"))? as i32;
        effect.aura = int(row, &format!("EffectApplyAuraName{n}"))? as u32;
        effect.trigger_spell = int(row, &format!("EffectTriggerSpell{n}"))? as u32;
        effect.misc_value = int(row, &format!("EffectMiscValue{n}"))? as i32;
    }

    Ok(SpellTemplate {
        id: int(row, "Id")? as u32,
        name: row.get::<_, Option<String>>("SpellName")?.unwrap_or_default(),
        effects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_item() -> ItemTemplate {
        let mut item = ItemTemplate {
            entry: 28_830,
            name: "Dragonspine Trophy".to_string(),
            quality: 4,
            inventory_type: 12,
            item_level: 125,
            allowable_class: -1,
            max_count: 1,
            ..Default::default()
        };
        item.stats[0] = ItemStat { stat_type: 38, value: 40 };
        item.spells[0] = ItemSpell { spell_id: 34774, trigger: 1 };
        item.socket_colors = [2, 4, 0];
        item
    }

    #[test]
    fn test_open_missing_database() {
        let dir = TempDir::new().unwrap();
        let result = TemplateStore::open(&dir.path().join("missing.sqlite"));
        assert!(matches!(result, Err(ItemSeedError::NotFound(_))));
    }

    #[test]
    fn test_item_template_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::create(&dir.path().join("world.sqlite")).unwrap();
        let item = sample_item();
        store.insert_item_template(&item).unwrap();

        let loaded = store.load_item_templates().unwrap();
        assert_eq!(loaded, vec![item]);
    }

    #[test]
    fn test_spell_template_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::create(&dir.path().join("world.sqlite")).unwrap();
        let spell = SpellTemplate {
            id: 34774,
            name: "Haste".to_string(),
            effects: [
                SpellEffect { base_points: 0, aura: 42, trigger_spell: 34775, misc_value: 0 },
                SpellEffect::default(),
                SpellEffect::default(),
            ],
        };
        store.insert_spell_template(&spell).unwrap();

        let loaded = store.load_spell_templates().unwrap();
        assert_eq!(loaded, vec![spell]);
    }

    #[test]
    fn test_snapshot_reopens_existing_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("world.sqlite");
        {
            let store = TemplateStore::create(&path).unwrap();
            store.insert_item_template(&sample_item()).unwrap();
        }

        let store = TemplateStore::open(&path).unwrap();
        let snapshot = store.load_snapshot().unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert!(snapshot.spells.is_empty());
        assert_eq!(snapshot.items[&28_830].name, "Dragonspine Trophy");
    }

    #[test]
    fn test_missing_columns_use_table_defaults() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::create(&dir.path().join("world.sqlite")).unwrap();
        store
            .connection()
            .unwrap()
            .execute("INSERT INTO item_template (entry, name, Quality) VALUES (1, 'Plain', 4)", [])
            .unwrap();

        let loaded = store.load_item_templates().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].quality, 4);
        assert_eq!(loaded[0].allowable_class, -1);
        assert_eq!(loaded[0].stats, [ItemStat::default(); 10]);
    }

    #[test]
    fn test_out_of_range_byte_columns_are_clamped() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::create(&dir.path().join("world.sqlite")).unwrap();
        store
            .connection()
            .unwrap()
            .execute(
                "INSERT INTO item_template (entry, name, Quality, InventoryType, stat_type1, stat_value1)
                 VALUES (1, 'Wrapped', 260, -3, 263, 12)",
                [],
            )
            .unwrap();

        let loaded = store.load_item_templates().unwrap();
        assert_eq!(loaded[0].quality, u8::MAX);
        assert_eq!(loaded[0].inventory_type, 0);
        assert_eq!(loaded[0].stats[0].stat_type, u8::MAX);
        assert_eq!(loaded[0].stats[0].value, 12);
    }

    #[test]
    fn test_open_is_read_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("world.sqlite");
        TemplateStore::create(&path).unwrap();

        let store = TemplateStore::open(&path).unwrap();
        assert!(store.insert_item_template(&sample_item()).is_err());
        assert!(store.load_item_templates().unwrap().is_empty());
    }
}
