//! File utility functions.

use crate::error::{ItemSeedError, Result};
use crate::models::{NormalizedItem, SeedInstance};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Read the instance/encounter manifest. An empty manifest is an error.
pub fn read_manifest(path: &Path) -> Result<Vec<SeedInstance>> {
    if !path.exists() {
        return Err(ItemSeedError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Manifest not found: {}", path.display()),
        )));
    }

    let file = std::fs::File::open(path)?;
    let instances: Vec<SeedInstance> = serde_json::from_reader(BufReader::new(file))?;
    if instances.is_empty() {
        return Err(ItemSeedError::Validation(format!(
            "Manifest {} contains no instances",
            path.display()
        )));
    }
    Ok(instances)
}

/// Write normalized items as indented JSON.
pub fn write_seed(path: &Path, items: &[NormalizedItem]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, items)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassMask, InventorySlot, ItemType};
    use tempfile::TempDir;

    #[test]
    fn test_read_manifest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("instances.json");
        std::fs::write(
            &path,
            r#"[
  {
    "Id": "kara",
    "Name": "Karazhan",
    "Phase": 1,
    "Encounters": [
      { "Id": "attumen", "Name": "Attumen the Huntsman", "Index": 0, "Items10": [28477, 28507] },
      { "Id": "moroes", "Name": "Moroes", "Index": 1, "Items10": [28529], "Items25H": [28530] }
    ]
  }
]"#,
        )
        .unwrap();

        let instances = read_manifest(&path).unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].name, "Karazhan");
        assert_eq!(instances[0].encounters.len(), 2);
        assert_eq!(instances[0].encounters[1].index, 1);
        assert_eq!(instances[0].encounters[1].items25_heroic, vec![28530]);
        assert!(instances[0].encounters[0].items25.is_empty());
    }

    #[test]
    fn test_read_manifest_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_manifest(&dir.path().join("missing.json")),
            Err(ItemSeedError::Io(_))
        ));

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "[]").unwrap();
        assert!(matches!(read_manifest(&empty), Err(ItemSeedError::Validation(_))));

        let malformed = dir.path().join("malformed.json");
        std::fs::write(&malformed, "[{").unwrap();
        assert!(matches!(read_manifest(&malformed), Err(ItemSeedError::Serialization(_))));
    }

    #[test]
    fn test_write_seed_omits_absent_optionals() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.json");

        let mut plain = NormalizedItem::new(28_830, "Dragonspine Trophy");
        plain.slot = InventorySlot::Trinket;
        plain.attack_power = 40;
        let mut linked = NormalizedItem::new(29_019, "Warbringer Breastplate");
        linked.slot = InventorySlot::Chest;
        linked.item_type = ItemType::Plate;
        linked.reward_from_id = Some(29_753);
        linked.usable_classes = Some(ClassMask::WARRIOR);
        linked.quest_id = Some(10_000);

        write_seed(&path, &[plain, linked]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  {"));
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        let first = &json[0];
        assert_eq!(first["id"], 28_830);
        assert_eq!(first["slot"], "Trinket");
        assert_eq!(first["type"], "Other");
        assert_eq!(first["attackPower"], 40);
        assert_eq!(first["manaPer5"], 0);
        assert!(first.get("rewardFromId").is_none());
        assert!(first.get("usableClasses").is_none());
        assert!(first.get("questId").is_none());

        let second = &json[1];
        assert_eq!(second["rewardFromId"], 29_753);
        assert_eq!(second["usableClasses"], 1);
        assert_eq!(second["questId"], 10_000);
        assert_eq!(second["type"], "Plate");
        assert_eq!(second["hasOnUse"], false);
    }
}
