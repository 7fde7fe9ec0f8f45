use crate::EnemyActionKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CombatRule {
    pub affinity_bonus: f64,
    pub focus_bonus: f64,
    pub powerful_bonus: f64,
    pub poisoned_target_multiplier: f64,
    pub piercing_bypass: f64,
    pub lasting_extra_turns: u32,
    pub focus_magnitude: i32,
    pub focus_turns: u32,
    pub special_stun_turns: u32,
}

impl Default for CombatRule {
    fn default() -> Self {
        Self {
            affinity_bonus: 0.5,
            focus_bonus: 0.2,
            powerful_bonus: 0.3,
            poisoned_target_multiplier: 2.0,
            piercing_bypass: 0.5,
            lasting_extra_turns: 1,
            focus_magnitude: 20,
            focus_turns: 2,
            special_stun_turns: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MasteryRule {
    pub increment: u8,
    pub cap: u8,
    pub advanced_cap: u8,
    pub starting: u8,
    pub advanced_starting: u8,
    pub failure_damage_ratio: f64,
    pub failure_stun_chance: f64,
    pub failure_stun_turns: u32,
}

impl Default for MasteryRule {
    fn default() -> Self {
        Self {
            increment: 5,
            cap: 100,
            advanced_cap: 90,
            starting: 100,
            advanced_starting: 50,
            failure_damage_ratio: 0.25,
            failure_stun_chance: 0.25,
            failure_stun_turns: 2,
        }
    }
}

impl MasteryRule {
    pub fn cap_for(&self, advanced: bool) -> u8 {
        if advanced {
            self.advanced_cap.min(self.cap)
        } else {
            self.cap
        }
    }

    pub fn starting_for(&self, advanced: bool) -> u8 {
        if advanced {
            self.advanced_starting.min(self.cap_for(true))
        } else {
            self.starting.min(self.cap)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StaminaRule {
    pub minimum_recovery: u32,
    pub auto_end_when_exhausted: bool,
}

impl Default for StaminaRule {
    fn default() -> Self {
        Self {
            minimum_recovery: 1,
            auto_end_when_exhausted: true,
        }
    }
}

impl StaminaRule {
    /// Stamina regained at the start of a player turn. Spending nothing
    /// recovers everything; each two points spent cost one point of recovery.
    pub fn recovery(&self, max_stamina: u32, spent: u32, webbed: u32) -> u32 {
        let base = if spent == 0 {
            max_stamina
        } else {
            max_stamina
                .saturating_sub(spent.div_ceil(2))
                .max(self.minimum_recovery)
        };
        base.saturating_sub(webbed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionWeight {
    pub action: EnemyActionKind,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiRule {
    pub low_health_ratio: f64,
    pub greedy_chance: f64,
    pub unknown_weight: f64,
    pub weights: Vec<ActionWeight>,
    pub bite_stun_chance: f64,
    pub stun_turns: u32,
    pub parry_percent: i32,
    pub curse_magnitude: i32,
    pub phase_attack_bonus: f64,
}

impl Default for AiRule {
    fn default() -> Self {
        let weights = EnemyActionKind::ALL
            .iter()
            .map(|&action| ActionWeight {
                action,
                weight: action.default_weight(),
            })
            .collect();
        Self {
            low_health_ratio: 0.3,
            greedy_chance: 0.7,
            unknown_weight: 0.1,
            weights,
            bite_stun_chance: 0.3,
            stun_turns: 2,
            parry_percent: 50,
            curse_magnitude: 20,
            phase_attack_bonus: 0.5,
        }
    }
}

impl AiRule {
    pub fn weight_for(&self, action: EnemyActionKind) -> f64 {
        self.weights
            .iter()
            .find(|entry| entry.action == action)
            .map(|entry| entry.weight)
            .unwrap_or(self.unknown_weight)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShopRule {
    pub offer_slots: usize,
    pub removal_cost: i64,
    pub upgrade_cost: i64,
    pub heal_cost: i64,
    pub heal_amount: i32,
}

impl Default for ShopRule {
    fn default() -> Self {
        Self {
            offer_slots: 3,
            removal_cost: 5,
            upgrade_cost: 12,
            heal_cost: 6,
            heal_amount: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CampRule {
    pub rest_heal_ratio: f64,
}

impl Default for CampRule {
    fn default() -> Self {
        Self {
            rest_heal_ratio: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProgressionRule {
    pub final_day: Option<u32>,
    pub scaling_per_day: f64,
}

impl Default for ProgressionRule {
    fn default() -> Self {
        Self {
            final_day: Some(7),
            scaling_per_day: 0.25,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub combat: CombatRule,
    pub mastery: MasteryRule,
    pub stamina: StaminaRule,
    pub ai: AiRule,
    pub shop: ShopRule,
    pub camp: CampRule,
    pub progression: ProgressionRule,
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! recovery_case {
        ($name:ident, $max:expr, $spent:expr, $webbed:expr, $expected:expr) => {
            #[test]
            fn $name() {
                let rule = StaminaRule::default();
                assert_eq!(rule.recovery($max, $spent, $webbed), $expected);
            }
        };
    }

    recovery_case!(recovery_nothing_spent, 3, 0, 0, 3);
    recovery_case!(recovery_one_spent, 3, 1, 0, 2);
    recovery_case!(recovery_two_spent, 3, 2, 0, 2);
    recovery_case!(recovery_all_spent, 3, 3, 0, 1);
    recovery_case!(recovery_overspent_floor, 3, 9, 0, 1);
    recovery_case!(recovery_webbed, 3, 0, 1, 2);
    recovery_case!(recovery_webbed_to_zero, 3, 3, 2, 0);

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"combat": {"affinity_bonus": 1.0}}"#).expect("parse");
        assert_eq!(config.combat.affinity_bonus, 1.0);
        assert_eq!(config.combat.focus_bonus, 0.2);
        assert_eq!(config.mastery, MasteryRule::default());
    }

    #[test]
    fn weight_table_defaults() {
        let ai = AiRule::default();
        assert_eq!(ai.weight_for(EnemyActionKind::Attack), 0.6);
        assert_eq!(ai.weight_for(EnemyActionKind::Ultimate), 0.0);
        let mut trimmed = ai.clone();
        trimmed.weights.clear();
        assert_eq!(trimmed.weight_for(EnemyActionKind::Attack), 0.1);
    }
}
