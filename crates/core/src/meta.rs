use crate::{Catalog, GemDef, MasteryRule, PlayerClass};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Progress that outlives a single run: banked zenny, unlocked gems per
/// class and mastery per gem id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetaProgress {
    #[serde(default)]
    pub zenny: i64,
    #[serde(default)]
    pub unlocked: BTreeMap<PlayerClass, BTreeSet<String>>,
    #[serde(default)]
    pub mastery: BTreeMap<String, u8>,
}

impl MetaProgress {
    pub fn new(catalog: &Catalog) -> Self {
        let mut meta = Self::default();
        for class in &catalog.classes {
            meta.unlocked
                .insert(class.class, class.starting_unlocks.iter().cloned().collect());
        }
        meta
    }

    pub fn unlocked_for(&self, class: PlayerClass) -> Vec<String> {
        self.unlocked
            .get(&class)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_unlocked(&self, class: PlayerClass, gem: &str) -> bool {
        self.unlocked
            .get(&class)
            .is_some_and(|ids| ids.contains(gem))
    }

    pub fn unlock(&mut self, class: PlayerClass, gem: &str) -> bool {
        self.unlocked.entry(class).or_default().insert(gem.to_string())
    }

    pub fn mastery_of(&self, def: &GemDef, rule: &MasteryRule) -> u8 {
        self.mastery
            .get(def.mastery_key())
            .copied()
            .unwrap_or_else(|| rule.starting_for(def.advanced))
            .min(rule.cap_for(def.advanced))
    }

    /// Record a successful play. Returns the new level when it changed.
    pub fn record_success(&mut self, def: &GemDef, rule: &MasteryRule) -> Option<u8> {
        let current = self.mastery_of(def, rule);
        let cap = rule.cap_for(def.advanced);
        if current >= cap {
            return None;
        }
        let next = current.saturating_add(rule.increment).min(cap);
        self.mastery.insert(def.mastery_key().to_string(), next);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_unlocks_come_from_catalog() {
        let catalog = Catalog::builtin();
        let meta = MetaProgress::new(&catalog);
        assert!(meta.is_unlocked(PlayerClass::Knight, "red-attack"));
        assert!(!meta.is_unlocked(PlayerClass::Knight, "red-heavy-attack"));
        assert!(!meta.is_unlocked(PlayerClass::Mage, "red-attack"));
    }

    #[test]
    fn advanced_mastery_climbs_to_cap() {
        let catalog = Catalog::builtin();
        let rule = MasteryRule::default();
        let def = catalog.gem("red-heavy-attack").expect("gem").clone();
        let mut meta = MetaProgress::new(&catalog);
        assert_eq!(meta.mastery_of(&def, &rule), 50);
        let mut last = 50;
        while let Some(next) = meta.record_success(&def, &rule) {
            assert_eq!(next, last + 5);
            last = next;
        }
        assert_eq!(last, 90);
        assert_eq!(meta.mastery_of(&def, &rule), 90);
    }

    #[test]
    fn basic_gems_start_certain() {
        let catalog = Catalog::builtin();
        let rule = MasteryRule::default();
        let def = catalog.gem("red-attack").expect("gem").clone();
        let mut meta = MetaProgress::new(&catalog);
        assert_eq!(meta.mastery_of(&def, &rule), 100);
        assert_eq!(meta.record_success(&def, &rule), None);
    }
}
