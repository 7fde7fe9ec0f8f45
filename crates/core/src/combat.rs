//! Pure arithmetic of gem resolution. Applying the numbers to combatants is
//! the battle's job; everything here is a function of its inputs.

use crate::{
    Augmentation, CombatRule, Enemy, GemDef, GemKind, MasteryRule, Player, PlayerClass,
    StatusKind, StatusLedger,
};

/// Final magnitude of a gem before the target's defenses.
///
/// Order: base value, class affinity, focus, powerful augmentation, then the
/// rogue's double damage against a poisoned enemy. Rounded down once at the
/// end.
pub fn gem_value(def: &GemDef, player: &Player, enemy: Option<&Enemy>, rule: &CombatRule) -> i32 {
    let mut value = def.base_value.max(0) as f64;
    if def.color == player.class.favored_color() {
        value *= 1.0 + rule.affinity_bonus;
    }
    if player.buffs.has(StatusKind::Focus) {
        value *= 1.0 + rule.focus_bonus;
    }
    if def.augmentation == Some(Augmentation::Powerful) {
        value *= 1.0 + rule.powerful_bonus;
    }
    let poisoned = enemy.is_some_and(|enemy| enemy.buffs.has(StatusKind::Poison));
    if def.kind == GemKind::Attack && player.class == PlayerClass::Rogue && poisoned {
        value *= rule.poisoned_target_multiplier;
    }
    clamp_to_i32(value.floor())
}

fn clamp_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, i32::MAX as f64) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Absorption {
    pub damage: i32,
    pub absorbed: i32,
}

/// Damage that gets through the target's buffs. A phased target takes
/// nothing; a defended one takes at least 1.
pub fn absorb(value: i32, target: &StatusLedger, piercing_bypass: Option<f64>) -> Absorption {
    let value = value.max(0);
    if target.has(StatusKind::Phased) {
        return Absorption {
            damage: 0,
            absorbed: value,
        };
    }
    let Some(defense) = target.get(StatusKind::Defense) else {
        return Absorption {
            damage: value,
            absorbed: 0,
        };
    };
    let mut guard = defense.magnitude.max(0);
    if let Some(bypass) = piercing_bypass {
        guard = clamp_to_i32((guard as f64 * (1.0 - bypass.clamp(0.0, 1.0))).floor());
    }
    let damage = value.saturating_sub(guard).max(1);
    Absorption {
        damage,
        absorbed: value.saturating_sub(damage).max(0),
    }
}

pub fn piercing_of(def: &GemDef, rule: &CombatRule) -> Option<f64> {
    (def.augmentation == Some(Augmentation::Piercing)).then_some(rule.piercing_bypass)
}

/// Turns a shield or poison lasts.
pub fn gem_duration(def: &GemDef, rule: &CombatRule) -> u32 {
    let base = def.duration.unwrap_or(1).max(1);
    if def.augmentation == Some(Augmentation::Lasting) {
        base.saturating_add(rule.lasting_extra_turns)
    } else {
        base
    }
}

/// Success threshold in percent after a curse.
pub fn success_threshold(mastery: u8, player: &Player) -> f64 {
    let curse = player.buffs.magnitude(StatusKind::Curse).max(0);
    (mastery as f64 - curse as f64).max(0.0)
}

pub fn failure_damage(value: i32, rule: &MasteryRule) -> i32 {
    clamp_to_i32((value.max(0) as f64 * rule.failure_damage_ratio).floor()).max(1)
}

pub fn reflected(value: i32, percent: i32) -> i32 {
    let percent = percent.clamp(0, 100) as i64;
    (value.max(0) as i64 * percent / 100) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Catalog, EnemyTemplate, DayPhase, StatusEffect};

    fn gem(id: &str) -> GemDef {
        Catalog::builtin().resolve_gem(id).expect("gem")
    }

    fn enemy() -> Enemy {
        Enemy::from_template(
            &EnemyTemplate {
                name: "Dummy".to_string(),
                day: 1,
                phase: DayPhase::Dawn,
                max_health: 20,
                attack: 8,
                actions: vec!["attack".to_string()],
                reward: 10,
                phase_threshold: None,
            },
            1.0,
        )
    }

    #[test]
    fn knight_affinity_on_red() {
        let player = Player::new(PlayerClass::Knight, 100, 3);
        let rule = CombatRule::default();
        assert_eq!(gem_value(&gem("red-attack"), &player, Some(&enemy()), &rule), 15);
        assert_eq!(gem_value(&gem("grey-attack"), &player, Some(&enemy()), &rule), 5);
    }

    #[test]
    fn focus_and_powerful_stack_multiplicatively() {
        let mut player = Player::new(PlayerClass::Knight, 100, 3);
        player.buffs.apply(StatusEffect::new(StatusKind::Focus, 20, 2));
        let rule = CombatRule::default();
        let value = gem_value(&gem("red-attack+powerful"), &player, None, &rule);
        // 10 * 1.5 * 1.2 * 1.3 = 23.4
        assert_eq!(value, 23);
    }

    #[test]
    fn rogue_doubles_on_poisoned_target() {
        let player = Player::new(PlayerClass::Rogue, 35, 3);
        let rule = CombatRule::default();
        let mut target = enemy();
        let plain = gem_value(&gem("green-quick-attack"), &player, Some(&target), &rule);
        target.buffs.apply(StatusEffect::new(StatusKind::Poison, 3, 2));
        let doubled = gem_value(&gem("green-quick-attack"), &player, Some(&target), &rule);
        assert_eq!(plain, 7);
        assert_eq!(doubled, 15);
        let knight = Player::new(PlayerClass::Knight, 40, 3);
        assert_eq!(gem_value(&gem("red-attack"), &knight, Some(&target), &rule), 15);
    }

    #[test]
    fn defense_absorbs_with_floor_of_one() {
        let mut buffs = StatusLedger::new();
        assert_eq!(absorb(8, &buffs, None).damage, 8);
        buffs.apply(StatusEffect::new(StatusKind::Defense, 5, 2));
        assert_eq!(absorb(8, &buffs, None), Absorption { damage: 3, absorbed: 5 });
        assert_eq!(absorb(4, &buffs, None), Absorption { damage: 1, absorbed: 3 });
        assert_eq!(absorb(8, &buffs, Some(0.5)).damage, 6);
    }

    #[test]
    fn phased_takes_nothing() {
        let mut buffs = StatusLedger::new();
        buffs.apply(StatusEffect::new(StatusKind::Phased, 1, 2));
        buffs.apply(StatusEffect::new(StatusKind::Defense, 1, 2));
        assert_eq!(absorb(50, &buffs, Some(0.5)).damage, 0);
    }

    #[test]
    fn lasting_extends_duration() {
        let rule = CombatRule::default();
        assert_eq!(gem_duration(&gem("green-poison"), &rule), 3);
        assert_eq!(gem_duration(&gem("green-poison+lasting"), &rule), 4);
    }

    #[test]
    fn curse_lowers_threshold() {
        let mut player = Player::new(PlayerClass::Mage, 30, 3);
        assert_eq!(success_threshold(60, &player), 60.0);
        player.buffs.apply(StatusEffect::new(StatusKind::Curse, 20, 3));
        assert_eq!(success_threshold(60, &player), 40.0);
        assert_eq!(success_threshold(10, &player), 0.0);
    }

    #[test]
    fn failure_and_reflect_amounts() {
        let rule = MasteryRule::default();
        assert_eq!(failure_damage(18, &rule), 4);
        assert_eq!(failure_damage(2, &rule), 1);
        assert_eq!(reflected(15, 50), 7);
        assert_eq!(reflected(15, 500), 15);
    }
}
