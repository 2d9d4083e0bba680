//! Loot discovery and token expansion.

use crate::classifier::{Classification, Classifier, SkipReason};
use crate::models::{NormalizedItem, SeedInstance};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Every loot item ID in the manifest, deduplicated and ascending.
pub fn discover(instances: &[SeedInstance]) -> Vec<u32> {
    let ids: BTreeSet<u32> = instances
        .iter()
        .flat_map(|instance| instance.encounters.iter())
        .flat_map(|encounter| encounter.all_items())
        .collect();
    ids.into_iter().collect()
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub items: Vec<NormalizedItem>,
    pub discovered: usize,
    pub token_rewards: usize,
    pub not_found: usize,
    pub wrong_quality: usize,
}

impl ImportReport {
    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NotFound => self.not_found += 1,
            SkipReason::WrongQuality => self.wrong_quality += 1,
        }
    }
}

/// Classifies discovered items in order and expands token rewards.
pub struct Importer<'a, 'c> {
    classifier: &'a Classifier<'c>,
    tokens: &'a HashMap<u32, Vec<u32>>,
}

impl<'a, 'c> Importer<'a, 'c> {
    pub fn new(classifier: &'a Classifier<'c>, tokens: &'a HashMap<u32, Vec<u32>>) -> Self {
        Self { classifier, tokens }
    }

    /// Classify `ids` in order. `on_progress` is called once per discovered ID
    /// after it and its token rewards are handled.
    pub fn run(&self, ids: &[u32], mut on_progress: impl FnMut(u32)) -> ImportReport {
        let mut report = ImportReport {
            discovered: ids.len(),
            ..Default::default()
        };
        let mut positions: HashMap<u32, usize> = HashMap::new();
        let mut skipped: HashSet<u32> = HashSet::new();

        for &id in ids {
            tracing::debug!("Discovered Item #{}", id);

            if !positions.contains_key(&id) && !skipped.contains(&id) {
                match self.classifier.classify(id, None) {
                    Classification::Classified(item) => {
                        positions.insert(id, report.items.len());
                        report.items.push(item);
                    }
                    Classification::Skipped(reason) => {
                        skipped.insert(id);
                        report.record_skip(reason);
                    }
                }
            }

            if positions.contains_key(&id) {
                if let Some(rewards) = self.tokens.get(&id) {
                    self.expand_token(id, rewards, &mut positions, &mut skipped, &mut report);
                }
            }

            on_progress(id);
        }

        report
    }

    fn expand_token(
        &self,
        token_id: u32,
        rewards: &[u32],
        positions: &mut HashMap<u32, usize>,
        skipped: &mut HashSet<u32>,
        report: &mut ImportReport,
    ) {
        for &reward_id in rewards {
            tracing::debug!("Discovered Item #{} as a reward from token #{}.", reward_id, token_id);

            if let Some(&index) = positions.get(&reward_id) {
                report.items[index].reward_from_id = Some(token_id);
                continue;
            }
            if skipped.contains(&reward_id) {
                continue;
            }

            match self.classifier.classify(reward_id, Some(token_id)) {
                Classification::Classified(item) => {
                    positions.insert(reward_id, report.items.len());
                    report.items.push(item);
                    report.token_rewards += 1;
                }
                Classification::Skipped(reason) => {
                    skipped.insert(reward_id);
                    report.record_skip(reason);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::TemplateSnapshot;
    use crate::models::{EPIC_QUALITY, ItemTemplate, SeedEncounter};

    fn encounter(items10: Vec<u32>, items25: Vec<u32>) -> SeedEncounter {
        SeedEncounter {
            id: "boss".to_string(),
            name: "Boss".to_string(),
            items10,
            items25,
            ..Default::default()
        }
    }

    fn template(entry: u32, quality: u8) -> ItemTemplate {
        ItemTemplate {
            entry,
            name: format!("Item {}", entry),
            quality,
            inventory_type: 1,
            subclass: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_discover_sorted_and_distinct() {
        let instances = vec![
            SeedInstance {
                id: "kara".to_string(),
                encounters: vec![encounter(vec![30, 10, 20], vec![10, 40])],
                ..Default::default()
            },
            SeedInstance {
                id: "gruul".to_string(),
                encounters: vec![
                    encounter(vec![40, 5], vec![]),
                    SeedEncounter {
                        items: vec![20, 7],
                        items10_heroic: vec![99],
                        items25_heroic: vec![5],
                        ..Default::default()
                    },
                ],
                ..Default::default()
            },
        ];

        assert_eq!(discover(&instances), vec![5, 7, 10, 20, 30, 40, 99]);
    }

    #[test]
    fn test_discover_empty_manifest() {
        assert!(discover(&[]).is_empty());
    }

    #[test]
    fn test_token_rewards_are_classified_and_linked() {
        let templates = TemplateSnapshot::new(
            vec![
                template(1, EPIC_QUALITY),
                template(2, EPIC_QUALITY),
                template(3, EPIC_QUALITY),
                template(4, EPIC_QUALITY),
            ],
            vec![],
        );
        let classifier = Classifier::new(&templates);
        let tokens = HashMap::from([(1, vec![2, 3])]);
        let importer = Importer::new(&classifier, &tokens);

        let report = importer.run(&[1, 4], |_| {});
        let ids: Vec<u32> = report.items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(report.items[0].reward_from_id, None);
        assert_eq!(report.items[1].reward_from_id, Some(1));
        assert_eq!(report.items[2].reward_from_id, Some(1));
        assert_eq!(report.items[3].reward_from_id, None);
        assert_eq!(report.token_rewards, 2);
    }

    #[test]
    fn test_reward_already_dropped_is_annotated_not_duplicated() {
        let templates = TemplateSnapshot::new(
            vec![template(5, EPIC_QUALITY), template(9, EPIC_QUALITY)],
            vec![],
        );
        let classifier = Classifier::new(&templates);
        let tokens = HashMap::from([(9, vec![5])]);
        let importer = Importer::new(&classifier, &tokens);

        let report = importer.run(&[5, 9], |_| {});
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].id, 5);
        assert_eq!(report.items[0].reward_from_id, Some(9));
        assert_eq!(report.token_rewards, 0);
    }

    #[test]
    fn test_reward_discovered_later_as_drop_is_not_duplicated() {
        let templates = TemplateSnapshot::new(
            vec![template(1, EPIC_QUALITY), template(8, EPIC_QUALITY)],
            vec![],
        );
        let classifier = Classifier::new(&templates);
        let tokens = HashMap::from([(1, vec![8])]);
        let importer = Importer::new(&classifier, &tokens);

        let report = importer.run(&[1, 8], |_| {});
        let ids: Vec<u32> = report.items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 8]);
        assert_eq!(report.items[1].reward_from_id, Some(1));
    }

    #[test]
    fn test_skipped_token_does_not_expand() {
        let templates = TemplateSnapshot::new(
            vec![template(1, 3), template(2, EPIC_QUALITY)],
            vec![],
        );
        let classifier = Classifier::new(&templates);
        let tokens = HashMap::from([(1, vec![2])]);
        let importer = Importer::new(&classifier, &tokens);

        let report = importer.run(&[1, 404], |_| {});
        assert!(report.items.is_empty());
        assert_eq!(report.wrong_quality, 1);
        assert_eq!(report.not_found, 1);
    }

    #[test]
    fn test_skipped_reward_counted_once() {
        let templates = TemplateSnapshot::new(
            vec![
                template(1, EPIC_QUALITY),
                template(2, EPIC_QUALITY),
                template(3, 3),
            ],
            vec![],
        );
        let classifier = Classifier::new(&templates);
        let tokens = HashMap::from([(1, vec![3, 404]), (2, vec![3, 404])]);
        let importer = Importer::new(&classifier, &tokens);

        let report = importer.run(&[1, 2, 3], |_| {});
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.wrong_quality, 1);
        assert_eq!(report.not_found, 1);
    }

    #[test]
    fn test_unique_ids_and_progress() {
        let templates = TemplateSnapshot::new(
            vec![template(1, EPIC_QUALITY), template(2, EPIC_QUALITY), template(3, EPIC_QUALITY)],
            vec![],
        );
        let classifier = Classifier::new(&templates);
        let tokens = HashMap::from([(1, vec![2, 3]), (2, vec![3, 1])]);
        let importer = Importer::new(&classifier, &tokens);

        let mut progressed = Vec::new();
        let report = importer.run(&[1, 2, 3], |id| progressed.push(id));
        let mut ids: Vec<u32> = report.items.iter().map(|item| item.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), report.items.len());
        assert_eq!(progressed, vec![1, 2, 3]);
        assert_eq!(report.discovered, 3);
    }

    #[test]
    fn test_import_from_store_and_manifest() {
        use crate::database::TemplateStore;
        use crate::file_utils::{read_manifest, write_seed};
        use crate::models::{InventorySlot, ItemStat, ItemType};
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let store = TemplateStore::create(&dir.path().join("world.sqlite")).unwrap();
        let mut helm = template(30_000, EPIC_QUALITY);
        helm.subclass = 4;
        helm.stats[0] = ItemStat { stat_type: 4, value: 20 };
        store.insert_item_template(&helm).unwrap();
        store.insert_item_template(&template(30_001, EPIC_QUALITY)).unwrap();
        store.insert_item_template(&template(30_002, 2)).unwrap();

        let manifest = dir.path().join("instances.json");
        std::fs::write(
            &manifest,
            r#"[{"Id": "i", "Name": "Instance", "Encounters": [
                {"Id": "a", "Name": "A", "Index": 0, "Items25": [30002, 30000]},
                {"Id": "b", "Name": "B", "Index": 1, "Items25": [30000]}
            ]}]"#,
        )
        .unwrap();

        let ids = discover(&read_manifest(&manifest).unwrap());
        assert_eq!(ids, vec![30_000, 30_002]);

        let templates = store.load_snapshot().unwrap();
        let classifier = Classifier::new(&templates);
        let tokens = HashMap::from([(30_000, vec![30_001])]);
        let report = Importer::new(&classifier, &tokens).run(&ids, |_| {});

        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].slot, InventorySlot::Head);
        assert_eq!(report.items[0].item_type, ItemType::Plate);
        assert_eq!(report.items[0].strength, 20);
        assert_eq!(report.items[1].reward_from_id, Some(30_000));
        assert_eq!(report.wrong_quality, 1);

        let output = dir.path().join("items.json");
        write_seed(&output, &report.items).unwrap();
        let written: Vec<NormalizedItem> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, report.items);
    }
}
