use anyhow::{bail, Context};
use gemfire_core::{Catalog, DayPhase, GameConfig, PlayerClass, BASIC_ATTACK_GEM};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "config.json";
pub const CATALOG_FILE: &str = "catalog.json";

pub fn load_game_config(path: &Path) -> anyhow::Result<GameConfig> {
    let config: GameConfig = load_json(path)?;
    validate_config(&config).with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

/// Load `config.json` from `dir`, or the built-in defaults when there is none.
pub fn load_game_config_or_default(dir: &Path) -> anyhow::Result<GameConfig> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        load_game_config(&path)
    } else {
        Ok(GameConfig::default())
    }
}

pub fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let catalog: Catalog = load_json(path)?;
    validate_catalog(&catalog).with_context(|| format!("validate {}", path.display()))?;
    Ok(catalog)
}

/// Load `catalog.json` from `dir`, or the built-in catalog when there is none.
pub fn load_catalog_or_builtin(dir: &Path) -> anyhow::Result<Catalog> {
    let path = dir.join(CATALOG_FILE);
    if path.exists() {
        load_catalog(&path)
    } else {
        Ok(Catalog::builtin())
    }
}

pub fn validate_config(config: &GameConfig) -> anyhow::Result<()> {
    let ratios = [
        ("ai.low_health_ratio", config.ai.low_health_ratio),
        ("ai.greedy_chance", config.ai.greedy_chance),
        ("ai.bite_stun_chance", config.ai.bite_stun_chance),
        ("mastery.failure_stun_chance", config.mastery.failure_stun_chance),
        ("camp.rest_heal_ratio", config.camp.rest_heal_ratio),
        ("combat.piercing_bypass", config.combat.piercing_bypass),
    ];
    for (name, value) in ratios {
        if !(0.0..=1.0).contains(&value) {
            bail!("{name} must be within 0..=1, got {value}");
        }
    }
    if config.mastery.cap > 100 {
        bail!("mastery.cap must not exceed 100, got {}", config.mastery.cap);
    }
    if config.progression.final_day == Some(0) {
        bail!("progression.final_day must be at least 1");
    }
    for weight in &config.ai.weights {
        if !weight.weight.is_finite() || weight.weight < 0.0 {
            bail!("ai weight for {:?} must be a non-negative number", weight.action);
        }
    }
    Ok(())
}

/// Reject catalogs the engine cannot run: duplicate ids, unlocks that name
/// missing gems, classes without a loadout and phases without enemies.
/// Unknown starting-bag ids only warn; runs swap them for the basic attack.
pub fn validate_catalog(catalog: &Catalog) -> anyhow::Result<()> {
    let mut ids = HashSet::new();
    for gem in &catalog.gems {
        if gem.id.contains('+') {
            bail!("gem id {} must not contain '+'", gem.id);
        }
        if !ids.insert(gem.id.as_str()) {
            bail!("duplicate gem id {}", gem.id);
        }
    }
    for class in PlayerClass::ALL {
        let def = catalog
            .class_def(class)
            .with_context(|| format!("missing class {class:?}"))?;
        if def.starting_bag.is_empty() {
            bail!("class {class:?} has an empty starting bag");
        }
        for id in &def.starting_bag {
            if catalog.resolve_gem(id).is_some() {
                continue;
            }
            if catalog.gem(BASIC_ATTACK_GEM).is_none() {
                bail!(
                    "class {class:?} bag holds unknown gem {id} and fallback \
                     {BASIC_ATTACK_GEM} is missing"
                );
            }
            tracing::warn!(class = ?class, gem = %id, "catalog.bag.unknown_gem");
        }
        for id in &def.starting_unlocks {
            if catalog.resolve_gem(id).is_none() {
                bail!("class {class:?} unlocks unknown gem {id}");
            }
        }
    }
    for phase in [DayPhase::Dawn, DayPhase::Dusk, DayPhase::Dark] {
        if catalog.last_authored_day(phase).is_none() {
            bail!("no enemy authored for {phase:?}");
        }
    }
    for template in &catalog.enemies {
        if template.max_health <= 0 {
            bail!("enemy {} needs positive health", template.name);
        }
        if let Some(threshold) = template.phase_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                bail!("enemy {} phase threshold {threshold} out of range", template.name);
            }
        }
    }
    Ok(())
}

pub(crate) fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_data_validates() {
        validate_config(&GameConfig::default()).expect("config");
        validate_catalog(&Catalog::builtin()).expect("catalog");
    }

    #[test]
    fn duplicate_gem_ids_are_rejected() {
        let mut catalog = Catalog::builtin();
        let copy = catalog.gems[0].clone();
        catalog.gems.push(copy);
        let err = validate_catalog(&catalog).expect_err("duplicate");
        assert!(err.to_string().contains("duplicate gem id"));
    }

    #[test]
    fn unknown_starting_gem_only_warns() {
        let mut catalog = Catalog::builtin();
        catalog.classes[0].starting_bag.push("void-gem".to_string());
        validate_catalog(&catalog).expect("bag falls back");

        catalog.gems.retain(|gem| gem.id != BASIC_ATTACK_GEM);
        let err = validate_catalog(&catalog).expect_err("no fallback");
        assert!(err.to_string().contains("fallback grey-attack is missing"));
    }

    #[test]
    fn unknown_unlock_is_rejected() {
        let mut catalog = Catalog::builtin();
        catalog.classes[0].starting_unlocks.push("void-gem".to_string());
        let err = validate_catalog(&catalog).expect_err("unknown unlock");
        assert!(err.to_string().contains("void-gem"));
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        let mut config = GameConfig::default();
        config.ai.greedy_chance = 1.5;
        let err = validate_config(&config).expect_err("ratio");
        assert!(err.to_string().contains("ai.greedy_chance"));
    }
}
