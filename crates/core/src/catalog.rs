use crate::{
    Augmentation, DayPhase, Enemy, EnemyTemplate, GemColor, GemDef, GemKind, PlayerClass,
    RngState, SpecialEffect,
};
use serde::{Deserialize, Serialize};

/// Stand-in for gem ids the catalog does not know.
pub const BASIC_ATTACK_GEM: &str = "grey-attack";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassDef {
    pub class: PlayerClass,
    pub max_health: i32,
    pub max_stamina: u32,
    pub starting_bag: Vec<String>,
    /// Gems the class can find in shops from the first run.
    pub starting_unlocks: Vec<String>,
}

/// Static reference data: gems, enemies and class loadouts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub gems: Vec<GemDef>,
    pub enemies: Vec<EnemyTemplate>,
    pub classes: Vec<ClassDef>,
}

impl Catalog {
    pub fn gem(&self, id: &str) -> Option<&GemDef> {
        self.gems.iter().find(|gem| gem.id == id)
    }

    /// Resolve a gem id, including augmented ids such as `red-attack+swift`.
    pub fn resolve_gem(&self, id: &str) -> Option<GemDef> {
        if let Some(def) = self.gem(id) {
            return Some(def.clone());
        }
        let (base, suffix) = id.split_once('+')?;
        let augmentation = Augmentation::ALL
            .iter()
            .copied()
            .find(|aug| aug.id_suffix() == suffix)?;
        self.gem(base).map(|def| def.with_augmentation(augmentation))
    }

    /// Like [`Catalog::resolve_gem`], but an unknown id becomes the basic
    /// attack gem. `None` only when the catalog lacks that gem too.
    pub fn resolve_gem_or_basic(&self, id: &str) -> Option<GemDef> {
        if let Some(def) = self.resolve_gem(id) {
            return Some(def);
        }
        tracing::warn!(gem = %id, fallback = BASIC_ATTACK_GEM, "catalog.gem.unknown");
        self.resolve_gem(BASIC_ATTACK_GEM)
    }

    pub fn class_def(&self, class: PlayerClass) -> Option<&ClassDef> {
        self.classes.iter().find(|def| def.class == class)
    }

    /// Last day with authored templates for `phase`.
    pub fn last_authored_day(&self, phase: DayPhase) -> Option<u32> {
        self.enemies
            .iter()
            .filter(|template| template.phase == phase)
            .map(|template| template.day)
            .max()
    }

    /// Template for (day, phase) and the stat scale to apply. Days beyond the
    /// authored range reuse the last authored template, scaled linearly.
    pub fn enemy_template(
        &self,
        day: u32,
        phase: DayPhase,
        scaling_per_day: f64,
    ) -> Option<(&EnemyTemplate, f64)> {
        if let Some(template) = self
            .enemies
            .iter()
            .find(|template| template.day == day && template.phase == phase)
        {
            return Some((template, 1.0));
        }
        let last = self.last_authored_day(phase)?;
        let template = self
            .enemies
            .iter()
            .find(|template| template.day == last && template.phase == phase)?;
        let extra = day.saturating_sub(last) as f64;
        Some((template, 1.0 + scaling_per_day * extra))
    }

    pub fn spawn_enemy(&self, day: u32, phase: DayPhase, scaling_per_day: f64) -> Option<Enemy> {
        self.enemy_template(day, phase, scaling_per_day)
            .map(|(template, scale)| Enemy::from_template(template, scale))
    }

    /// Gems a shop may offer: unlocked gems of the class color plus every grey gem.
    pub fn shop_pool<'a>(&'a self, class: PlayerClass, unlocked: &[String]) -> Vec<&'a GemDef> {
        self.gems
            .iter()
            .filter(|gem| {
                gem.color == GemColor::Grey
                    || (gem.color == class.favored_color() && unlocked.contains(&gem.id))
            })
            .collect()
    }

    pub fn pick_shop_gem<'a>(
        &'a self,
        class: PlayerClass,
        unlocked: &[String],
        rng: &mut RngState,
    ) -> Option<&'a GemDef> {
        let pool = self.shop_pool(class, unlocked);
        rng.index(pool.len()).map(|idx| pool[idx])
    }

    pub fn builtin() -> Self {
        Self {
            gems: builtin_gems(),
            enemies: builtin_enemies(),
            classes: builtin_classes(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

struct GemSpec {
    id: &'static str,
    name: &'static str,
    color: GemColor,
    kind: GemKind,
    value: i32,
    cost: u32,
    duration: Option<u32>,
    special: Option<SpecialEffect>,
    advanced: bool,
    price: i64,
    unlock_cost: i64,
}

impl GemSpec {
    fn build(self) -> GemDef {
        GemDef {
            id: self.id.to_string(),
            name: self.name.to_string(),
            color: self.color,
            kind: self.kind,
            base_value: self.value,
            stamina_cost: self.cost,
            duration: self.duration,
            special: self.special,
            augmentation: None,
            advanced: self.advanced,
            price: self.price,
            unlock_cost: self.unlock_cost,
        }
    }
}

fn builtin_gems() -> Vec<GemDef> {
    use GemColor::*;
    use GemKind::*;
    let plain = |id, name, color, kind, value, cost, price| GemSpec {
        id,
        name,
        color,
        kind,
        value,
        cost,
        duration: None,
        special: None,
        advanced: false,
        price,
        unlock_cost: 0,
    };
    vec![
        plain("red-attack", "Ruby Strike", Red, Attack, 10, 2, 8).build(),
        GemSpec {
            duration: Some(2),
            ..plain("red-shield", "Ruby Guard", Red, Shield, 8, 2, 8)
        }
        .build(),
        GemSpec {
            advanced: true,
            unlock_cost: 30,
            ..plain("red-heavy-attack", "Ruby Cleave", Red, Attack, 18, 3, 14)
        }
        .build(),
        GemSpec {
            special: Some(SpecialEffect::Stun),
            advanced: true,
            unlock_cost: 40,
            ..plain("red-bash", "Ruby Bash", Red, Attack, 6, 2, 16)
        }
        .build(),
        plain("blue-magic-attack", "Sapphire Bolt", Blue, Attack, 8, 2, 8).build(),
        GemSpec {
            duration: Some(2),
            ..plain("blue-shield", "Sapphire Ward", Blue, Shield, 6, 1, 8)
        }
        .build(),
        plain("blue-heal", "Sapphire Mend", Blue, Heal, 10, 2, 9).build(),
        GemSpec {
            duration: Some(1),
            special: Some(SpecialEffect::Focus),
            unlock_cost: 25,
            ..plain("blue-focus", "Sapphire Focus", Blue, Shield, 3, 1, 12)
        }
        .build(),
        GemSpec {
            advanced: true,
            unlock_cost: 40,
            ..plain("blue-storm", "Sapphire Storm", Blue, Attack, 16, 3, 15)
        }
        .build(),
        GemSpec {
            special: Some(SpecialEffect::DrawExtra),
            ..plain("green-quick-attack", "Emerald Dart", Green, Attack, 5, 1, 7)
        }
        .build(),
        GemSpec {
            duration: Some(3),
            ..plain("green-poison", "Emerald Venom", Green, Poison, 3, 1, 8)
        }
        .build(),
        plain("green-heal", "Emerald Salve", Green, Heal, 8, 1, 8).build(),
        GemSpec {
            duration: Some(4),
            advanced: true,
            unlock_cost: 35,
            ..plain("green-toxin", "Emerald Toxin", Green, Poison, 5, 2, 14)
        }
        .build(),
        plain("grey-attack", "Stone Chip", Grey, Attack, 5, 1, 5).build(),
        GemSpec {
            duration: Some(2),
            ..plain("grey-shield", "Stone Wall", Grey, Shield, 4, 1, 5)
        }
        .build(),
        plain("grey-heal", "Stone Balm", Grey, Heal, 5, 1, 5).build(),
    ]
}

fn template(
    name: &str,
    day: u32,
    phase: DayPhase,
    max_health: i32,
    attack: i32,
    actions: &[&str],
    reward: i64,
) -> EnemyTemplate {
    EnemyTemplate {
        name: name.to_string(),
        day,
        phase,
        max_health,
        attack,
        actions: actions.iter().map(|id| id.to_string()).collect(),
        reward,
        phase_threshold: if phase == DayPhase::Dark { Some(0.5) } else { None },
    }
}

fn builtin_enemies() -> Vec<EnemyTemplate> {
    use DayPhase::*;
    vec![
        template("Grey Wolf", 1, Dawn, 20, 5, &["attack", "bite", "howl"], 10),
        template("Goblin Scout", 1, Dusk, 24, 5, &["attack", "steal", "defend"], 12),
        template("Goblin Chief", 1, Dark, 40, 7, &["attack", "defend", "enrage", "heal"], 25),
        template("Giant Spider", 2, Dawn, 28, 6, &["attack", "web", "poison", "bite"], 14),
        template("Bandit", 2, Dusk, 32, 7, &["attack", "claw", "steal", "parry"], 16),
        template("Troll", 2, Dark, 60, 9, &["attack", "harden", "heal", "enrage"], 35),
        template("Wraith", 3, Dawn, 34, 8, &["attack", "phase", "curse"], 18),
        template("Cultist", 3, Dusk, 36, 8, &["attack", "ritual", "summon", "curse"], 20),
        template(
            "Dragon",
            3,
            Dark,
            90,
            11,
            &["attack", "breathe", "tail", "burn", "defend"],
            50,
        ),
    ]
}

fn builtin_classes() -> Vec<ClassDef> {
    let ids = |list: &[&str]| list.iter().map(|id| id.to_string()).collect::<Vec<_>>();
    vec![
        ClassDef {
            class: PlayerClass::Knight,
            max_health: 40,
            max_stamina: 3,
            starting_bag: ids(&[
                "red-attack",
                "red-attack",
                "red-attack",
                "red-shield",
                "red-shield",
                "grey-attack",
                "grey-attack",
                "grey-heal",
            ]),
            starting_unlocks: ids(&["red-attack", "red-shield"]),
        },
        ClassDef {
            class: PlayerClass::Mage,
            max_health: 30,
            max_stamina: 3,
            starting_bag: ids(&[
                "blue-magic-attack",
                "blue-magic-attack",
                "blue-magic-attack",
                "blue-shield",
                "blue-shield",
                "blue-heal",
                "blue-heal",
                "grey-attack",
            ]),
            starting_unlocks: ids(&["blue-magic-attack", "blue-shield", "blue-heal"]),
        },
        ClassDef {
            class: PlayerClass::Rogue,
            max_health: 35,
            max_stamina: 3,
            starting_bag: ids(&[
                "green-quick-attack",
                "green-quick-attack",
                "green-quick-attack",
                "green-poison",
                "green-poison",
                "green-heal",
                "green-heal",
                "grey-shield",
            ]),
            starting_unlocks: ids(&["green-quick-attack", "green-poison", "green-heal"]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_references_resolve() {
        let catalog = Catalog::builtin();
        for class in &catalog.classes {
            for id in class.starting_bag.iter().chain(&class.starting_unlocks) {
                assert!(catalog.gem(id).is_some(), "missing gem {id}");
            }
        }
        for phase in [DayPhase::Dawn, DayPhase::Dusk, DayPhase::Dark] {
            assert_eq!(catalog.last_authored_day(phase), Some(3));
        }
    }

    #[test]
    fn authored_days_are_unscaled() {
        let catalog = Catalog::builtin();
        let (template, scale) = catalog
            .enemy_template(2, DayPhase::Dusk, 0.25)
            .expect("template");
        assert_eq!(template.name, "Bandit");
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn later_days_scale_last_template() {
        let catalog = Catalog::builtin();
        let enemy = catalog.spawn_enemy(5, DayPhase::Dark, 0.25).expect("enemy");
        assert_eq!(enemy.name, "Dragon");
        assert_eq!(enemy.max_health, 135);
        assert!(enemy.boss);
        assert_eq!(enemy.phase_threshold, Some(0.5));
    }

    #[test]
    fn augmented_ids_resolve() {
        let catalog = Catalog::builtin();
        let def = catalog.resolve_gem("red-attack+swift").expect("resolve");
        assert_eq!(def.effective_cost(), 1);
        assert!(catalog.resolve_gem("red-attack+shiny").is_none());
        assert!(catalog.resolve_gem("nope").is_none());
    }

    #[test]
    fn unknown_ids_fall_back_to_basic_attack() {
        let catalog = Catalog::builtin();
        let def = catalog.resolve_gem_or_basic("void-gem").expect("fallback");
        assert_eq!(def.id, BASIC_ATTACK_GEM);
        let known = catalog.resolve_gem_or_basic("red-attack").expect("known");
        assert_eq!(known.id, "red-attack");

        let mut bare = catalog.clone();
        bare.gems.retain(|gem| gem.id != BASIC_ATTACK_GEM);
        assert!(bare.resolve_gem_or_basic("void-gem").is_none());
    }

    #[test]
    fn shop_pool_respects_unlocks() {
        let catalog = Catalog::builtin();
        let unlocked = vec!["red-attack".to_string()];
        let pool = catalog.shop_pool(PlayerClass::Knight, &unlocked);
        assert!(pool.iter().any(|gem| gem.id == "red-attack"));
        assert!(pool.iter().all(|gem| gem.id != "red-heavy-attack"));
        assert!(pool.iter().all(|gem| gem.color != GemColor::Blue));
    }
}
